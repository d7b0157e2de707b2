use std::collections::BTreeSet;

use allersafe_db::table;
use allersafe_shared::day_to_timestamp;
use allersafe_shared::mealplan::{MealItem, MealPlan, MealPlanEntry};
use allersafe_shared::name_key;
use async_trait::async_trait;
use sea_query::{Expr, ExprTrait, OnConflict, Query, SqliteQueryBuilder};
use sea_query_sqlx::SqlxBinder;
use sqlx::{SqliteConnection, SqlitePool};

use crate::{Dataset, PlanDiff, PlanWriter};

/// Persists generated plans.
#[derive(Clone)]
pub struct SqlitePlanWriter(pub SqlitePool);

#[async_trait]
impl PlanWriter for SqlitePlanWriter {
    #[tracing::instrument(skip_all, fields(meal_plan_id = %diff.meal_plan_id))]
    async fn apply(&self, diff: &PlanDiff) -> allersafe_shared::Result<()> {
        let mut tx = self.0.begin().await?;

        if let Some(plan) = diff.create.as_ref() {
            insert_meal_plan(&mut tx, plan).await?;
        }

        for (date, meal_type) in diff.remove.iter() {
            let statement = Query::delete()
                .from_table(table::MealPlanEntry::Table)
                .and_where(Expr::col(table::MealPlanEntry::MealPlanId).eq(&diff.meal_plan_id))
                .and_where(Expr::col(table::MealPlanEntry::MealDate).eq(day_to_timestamp(*date)))
                .and_where(Expr::col(table::MealPlanEntry::MealType).eq(meal_type.to_string()))
                .to_owned();

            let (sql, values) = statement.build_sqlx(SqliteQueryBuilder);
            sqlx::query_with(&sql, values).execute(&mut *tx).await?;
        }

        for entry in diff.add.iter() {
            insert_meal_plan_entry(&mut tx, entry).await?;
        }

        tx.commit().await?;

        tracing::info!(
            created = diff.create.is_some(),
            removed = diff.remove.len(),
            added = diff.add.len(),
            "meal plan diff applied"
        );

        Ok(())
    }
}

async fn insert_meal_plan(
    conn: &mut SqliteConnection,
    plan: &MealPlan,
) -> allersafe_shared::Result<()> {
    let statement = Query::insert()
        .into_table(table::MealPlan::Table)
        .columns([
            table::MealPlan::Id,
            table::MealPlan::UserId,
            table::MealPlan::StartDate,
            table::MealPlan::EndDate,
        ])
        .values_panic([
            plan.id.to_owned().into(),
            plan.user_id.to_owned().into(),
            day_to_timestamp(plan.start_date).into(),
            day_to_timestamp(plan.end_date).into(),
        ])
        .to_owned();

    let (sql, values) = statement.build_sqlx(SqliteQueryBuilder);
    sqlx::query_with(&sql, values).execute(&mut *conn).await?;

    Ok(())
}

async fn insert_meal_plan_entry(
    conn: &mut SqliteConnection,
    entry: &MealPlanEntry,
) -> allersafe_shared::Result<()> {
    let (recipe_id, product_id, custom_name) = match &entry.item {
        MealItem::Recipe(id) => (Some(id.to_owned()), None, None),
        MealItem::Product(id) => (None, Some(id.to_owned()), None),
        MealItem::Custom(name) => (None, None, Some(name.to_owned())),
    };

    let statement = Query::insert()
        .into_table(table::MealPlanEntry::Table)
        .columns([
            table::MealPlanEntry::MealPlanId,
            table::MealPlanEntry::MealDate,
            table::MealPlanEntry::MealType,
            table::MealPlanEntry::RecipeId,
            table::MealPlanEntry::ProductId,
            table::MealPlanEntry::CustomName,
            table::MealPlanEntry::Servings,
            table::MealPlanEntry::Completed,
        ])
        .values_panic([
            entry.meal_plan_id.to_owned().into(),
            day_to_timestamp(entry.meal_date).into(),
            entry.meal_type.to_string().into(),
            recipe_id.into(),
            product_id.into(),
            custom_name.into(),
            entry.servings.into(),
            entry.completed.into(),
        ])
        .to_owned();

    let (sql, values) = statement.build_sqlx(SqliteQueryBuilder);
    sqlx::query_with(&sql, values).execute(&mut *conn).await?;

    Ok(())
}

/// Loads a [`Dataset`] into the database in one transaction. Rows are
/// upserted by id and seeded plans get their entries replaced, so loading
/// the same file twice leaves the same state.
#[tracing::instrument(skip_all)]
pub async fn seed(pool: &SqlitePool, dataset: &Dataset) -> allersafe_shared::Result<()> {
    let mut tx = pool.begin().await?;

    for allergen in dataset.allergens.iter() {
        let statement = Query::insert()
            .into_table(table::Allergen::Table)
            .columns([
                table::Allergen::Id,
                table::Allergen::Name,
                table::Allergen::Category,
                table::Allergen::ScientificName,
            ])
            .values_panic([
                allergen.id.to_owned().into(),
                allergen.name.to_owned().into(),
                allergen.category.to_string().into(),
                allergen.scientific_name.to_owned().into(),
            ])
            .on_conflict(
                OnConflict::column(table::Allergen::Id)
                    .update_columns([
                        table::Allergen::Name,
                        table::Allergen::Category,
                        table::Allergen::ScientificName,
                    ])
                    .to_owned(),
            )
            .to_owned();

        let (sql, values) = statement.build_sqlx(SqliteQueryBuilder);
        sqlx::query_with(&sql, values).execute(&mut *tx).await?;
    }

    for group in dataset.groups.iter() {
        let statement = Query::insert()
            .into_table(table::CrossReactivityGroup::Table)
            .columns([
                table::CrossReactivityGroup::Id,
                table::CrossReactivityGroup::Name,
                table::CrossReactivityGroup::ProteinFamily,
            ])
            .values_panic([
                group.id.to_owned().into(),
                group.name.to_owned().into(),
                group.protein_family.to_owned().into(),
            ])
            .on_conflict(
                OnConflict::column(table::CrossReactivityGroup::Id)
                    .update_columns([
                        table::CrossReactivityGroup::Name,
                        table::CrossReactivityGroup::ProteinFamily,
                    ])
                    .to_owned(),
            )
            .to_owned();

        let (sql, values) = statement.build_sqlx(SqliteQueryBuilder);
        sqlx::query_with(&sql, values).execute(&mut *tx).await?;

        for allergen_id in group.allergen_ids.iter() {
            let statement = Query::insert()
                .into_table(table::AllergenCrossReactivity::Table)
                .columns([
                    table::AllergenCrossReactivity::GroupId,
                    table::AllergenCrossReactivity::AllergenId,
                ])
                .values_panic([group.id.to_owned().into(), allergen_id.trim().into()])
                .on_conflict(
                    OnConflict::columns([
                        table::AllergenCrossReactivity::GroupId,
                        table::AllergenCrossReactivity::AllergenId,
                    ])
                    .do_nothing()
                    .to_owned(),
                )
                .to_owned();

            let (sql, values) = statement.build_sqlx(SqliteQueryBuilder);
            sqlx::query_with(&sql, values).execute(&mut *tx).await?;
        }
    }

    for record in dataset.ingredients.iter() {
        let ingredient = &record.ingredient;
        let statement = Query::insert()
            .into_table(table::Ingredient::Table)
            .columns([
                table::Ingredient::Id,
                table::Ingredient::Name,
                table::Ingredient::NameKey,
                table::Ingredient::Category,
            ])
            .values_panic([
                ingredient.id.to_owned().into(),
                ingredient.name.trim().into(),
                name_key(&ingredient.name).into(),
                ingredient.category.to_string().into(),
            ])
            .on_conflict(
                OnConflict::column(table::Ingredient::Id)
                    .update_columns([
                        table::Ingredient::Name,
                        table::Ingredient::NameKey,
                        table::Ingredient::Category,
                    ])
                    .to_owned(),
            )
            .to_owned();

        let (sql, values) = statement.build_sqlx(SqliteQueryBuilder);
        sqlx::query_with(&sql, values).execute(&mut *tx).await?;

        for tag in record.allergens.iter() {
            let statement = Query::insert()
                .into_table(table::IngredientAllergen::Table)
                .columns([
                    table::IngredientAllergen::IngredientId,
                    table::IngredientAllergen::AllergenId,
                    table::IngredientAllergen::AllergenType,
                ])
                .values_panic([
                    ingredient.id.to_owned().into(),
                    tag.allergen_id.trim().into(),
                    tag.allergen_type.to_string().into(),
                ])
                .on_conflict(
                    OnConflict::columns([
                        table::IngredientAllergen::IngredientId,
                        table::IngredientAllergen::AllergenId,
                    ])
                    .update_column(table::IngredientAllergen::AllergenType)
                    .to_owned(),
                )
                .to_owned();

            let (sql, values) = statement.build_sqlx(SqliteQueryBuilder);
            sqlx::query_with(&sql, values).execute(&mut *tx).await?;
        }
    }

    for recipe in dataset.recipes.iter() {
        let statement = Query::insert()
            .into_table(table::Recipe::Table)
            .columns([
                table::Recipe::Id,
                table::Recipe::Name,
                table::Recipe::CuisineType,
                table::Recipe::MealType,
                table::Recipe::PrepTime,
                table::Recipe::CookTime,
                table::Recipe::Difficulty,
                table::Recipe::Servings,
                table::Recipe::CaloriesPerServing,
            ])
            .values_panic([
                recipe.id.to_owned().into(),
                recipe.name.to_owned().into(),
                recipe.cuisine_type.to_string().into(),
                recipe.meal_type.to_string().into(),
                recipe.prep_time.into(),
                recipe.cook_time.into(),
                recipe.difficulty.to_string().into(),
                recipe.servings.into(),
                recipe.calories_per_serving.into(),
            ])
            .on_conflict(
                OnConflict::column(table::Recipe::Id)
                    .update_columns([
                        table::Recipe::Name,
                        table::Recipe::CuisineType,
                        table::Recipe::MealType,
                        table::Recipe::PrepTime,
                        table::Recipe::CookTime,
                        table::Recipe::Difficulty,
                        table::Recipe::Servings,
                        table::Recipe::CaloriesPerServing,
                    ])
                    .to_owned(),
            )
            .to_owned();

        let (sql, values) = statement.build_sqlx(SqliteQueryBuilder);
        sqlx::query_with(&sql, values).execute(&mut *tx).await?;

        // Ingredient lines and declared allergens are replaced wholesale.
        let statements = [
            Query::delete()
                .from_table(table::RecipeIngredient::Table)
                .and_where(Expr::col(table::RecipeIngredient::RecipeId).eq(&recipe.id))
                .to_owned(),
            Query::delete()
                .from_table(table::RecipeAllergen::Table)
                .and_where(Expr::col(table::RecipeAllergen::RecipeId).eq(&recipe.id))
                .to_owned(),
        ];

        for statement in statements {
            let (sql, values) = statement.build_sqlx(SqliteQueryBuilder);
            sqlx::query_with(&sql, values).execute(&mut *tx).await?;
        }

        for (position, ingredient) in recipe.ingredients.iter().enumerate() {
            let statement = Query::insert()
                .into_table(table::RecipeIngredient::Table)
                .columns([
                    table::RecipeIngredient::RecipeId,
                    table::RecipeIngredient::Position,
                    table::RecipeIngredient::Name,
                    table::RecipeIngredient::Quantity,
                    table::RecipeIngredient::Unit,
                ])
                .values_panic([
                    recipe.id.to_owned().into(),
                    (position as i64).into(),
                    ingredient.name.to_owned().into(),
                    (ingredient.quantity as f64).into(),
                    ingredient.unit.to_owned().into(),
                ])
                .to_owned();

            let (sql, values) = statement.build_sqlx(SqliteQueryBuilder);
            sqlx::query_with(&sql, values).execute(&mut *tx).await?;
        }

        for allergen in recipe.allergens.iter() {
            let statement = Query::insert()
                .into_table(table::RecipeAllergen::Table)
                .columns([
                    table::RecipeAllergen::RecipeId,
                    table::RecipeAllergen::AllergenId,
                ])
                .values_panic([recipe.id.to_owned().into(), allergen.allergen_id.trim().into()])
                .on_conflict(
                    OnConflict::columns([
                        table::RecipeAllergen::RecipeId,
                        table::RecipeAllergen::AllergenId,
                    ])
                    .do_nothing()
                    .to_owned(),
                )
                .to_owned();

            let (sql, values) = statement.build_sqlx(SqliteQueryBuilder);
            sqlx::query_with(&sql, values).execute(&mut *tx).await?;
        }
    }

    for allergy in dataset.user_allergies.iter() {
        let statement = Query::insert()
            .into_table(table::UserAllergy::Table)
            .columns([
                table::UserAllergy::UserId,
                table::UserAllergy::AllergenId,
                table::UserAllergy::Severity,
                table::UserAllergy::Outgrown,
            ])
            .values_panic([
                allergy.user_id.to_owned().into(),
                allergy.allergen_id.trim().into(),
                allergy.severity.to_string().into(),
                allergy.outgrown.into(),
            ])
            .on_conflict(
                OnConflict::columns([table::UserAllergy::UserId, table::UserAllergy::AllergenId])
                    .update_columns([table::UserAllergy::Severity, table::UserAllergy::Outgrown])
                    .to_owned(),
            )
            .to_owned();

        let (sql, values) = statement.build_sqlx(SqliteQueryBuilder);
        sqlx::query_with(&sql, values).execute(&mut *tx).await?;
    }

    for plan in dataset.meal_plans.iter() {
        let statement = Query::insert()
            .into_table(table::MealPlan::Table)
            .columns([
                table::MealPlan::Id,
                table::MealPlan::UserId,
                table::MealPlan::StartDate,
                table::MealPlan::EndDate,
            ])
            .values_panic([
                plan.id.to_owned().into(),
                plan.user_id.to_owned().into(),
                day_to_timestamp(plan.start_date).into(),
                day_to_timestamp(plan.end_date).into(),
            ])
            .on_conflict(
                OnConflict::column(table::MealPlan::Id)
                    .update_columns([
                        table::MealPlan::UserId,
                        table::MealPlan::StartDate,
                        table::MealPlan::EndDate,
                    ])
                    .to_owned(),
            )
            .to_owned();

        let (sql, values) = statement.build_sqlx(SqliteQueryBuilder);
        sqlx::query_with(&sql, values).execute(&mut *tx).await?;
    }

    // Seeded plans hold exactly the dataset's entries.
    let plan_ids = dataset
        .meal_plans
        .iter()
        .map(|p| p.id.to_owned())
        .chain(dataset.entries.iter().map(|e| e.meal_plan_id.to_owned()))
        .collect::<BTreeSet<_>>();

    if !plan_ids.is_empty() {
        let statement = Query::delete()
            .from_table(table::MealPlanEntry::Table)
            .and_where(Expr::col(table::MealPlanEntry::MealPlanId).is_in(plan_ids))
            .to_owned();

        let (sql, values) = statement.build_sqlx(SqliteQueryBuilder);
        sqlx::query_with(&sql, values).execute(&mut *tx).await?;
    }

    for entry in dataset.entries.iter() {
        insert_meal_plan_entry(&mut tx, entry).await?;
    }

    tx.commit().await?;

    tracing::info!(
        allergens = dataset.allergens.len(),
        groups = dataset.groups.len(),
        ingredients = dataset.ingredients.len(),
        recipes = dataset.recipes.len(),
        meal_plans = dataset.meal_plans.len(),
        "dataset seeded"
    );

    Ok(())
}

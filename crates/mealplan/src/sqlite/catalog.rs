use std::collections::HashMap;

use allersafe_allergen::{CatalogError, IngredientIndex, IngredientRecord};
use allersafe_db::table;
use allersafe_shared::allergen::{
    AllergenCrossReactivity, AllergenType, CrossReactivityGroup, IngredientAllergen,
};
use allersafe_shared::mealplan::MealType;
use allersafe_shared::name_key;
use allersafe_shared::recipe::{
    Ingredient, IngredientCategory, Recipe, RecipeAllergen, RecipeIngredient,
};
use async_trait::async_trait;
use sea_query::{Cond, Expr, ExprTrait, Order, Query, SqliteQueryBuilder};
use sea_query_sqlx::SqlxBinder;
use sqlx::{SqlitePool, prelude::FromRow};

use crate::{CatalogReader, MalformedRecipe, RecipeFilter};

#[derive(FromRow)]
struct RecipeRow {
    id: String,
    name: String,
    cuisine_type: String,
    meal_type: String,
    prep_time: u16,
    cook_time: u16,
    difficulty: String,
    servings: u16,
    calories_per_serving: Option<u16>,
}

impl TryFrom<RecipeRow> for Recipe {
    type Error = allersafe_shared::Error;

    fn try_from(value: RecipeRow) -> Result<Self, Self::Error> {
        Ok(Recipe {
            id: value.id,
            name: value.name,
            cuisine_type: value.cuisine_type.parse()?,
            meal_type: value.meal_type.parse()?,
            prep_time: value.prep_time,
            cook_time: value.cook_time,
            difficulty: value.difficulty.parse()?,
            servings: value.servings,
            calories_per_serving: value.calories_per_serving,
            ingredients: vec![],
            allergens: vec![],
        })
    }
}

#[derive(FromRow)]
struct RecipeIngredientRow {
    recipe_id: String,
    name: String,
    quantity: f64,
    unit: String,
}

#[derive(FromRow)]
struct IngredientRow {
    id: String,
    name: String,
    category: String,
}

#[derive(FromRow)]
struct IngredientAllergenRow {
    ingredient_id: String,
    allergen_id: String,
    allergen_type: String,
}

/// Read side of the recipe catalog.
#[derive(Clone)]
pub struct SqliteCatalog(pub SqlitePool);

impl SqliteCatalog {
    async fn recipe_rows(&self, filter: &RecipeFilter) -> allersafe_shared::Result<Vec<RecipeRow>> {
        let mut statement = Query::select()
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
            .from(table::Recipe::Table)
            .order_by(table::Recipe::Id, Order::Asc)
            .to_owned();

        if !filter.meal_types.is_empty() {
            statement.cond_where(
                Cond::any()
                    .add(
                        Expr::col(table::Recipe::MealType)
                            .is_in(filter.meal_types.iter().map(|t| t.to_string())),
                    )
                    .add(Expr::col(table::Recipe::Id).is_in(filter.include_ids.iter().cloned())),
            );
        }

        let (sql, values) = statement.build_sqlx(SqliteQueryBuilder);

        Ok(sqlx::query_as_with::<_, RecipeRow, _>(&sql, values)
            .fetch_all(&self.0)
            .await?)
    }

    async fn ingredient_rows(
        &self,
        recipe_ids: &[String],
    ) -> allersafe_shared::Result<Vec<RecipeIngredientRow>> {
        let statement = Query::select()
            .columns([
                table::RecipeIngredient::RecipeId,
                table::RecipeIngredient::Name,
                table::RecipeIngredient::Quantity,
                table::RecipeIngredient::Unit,
            ])
            .from(table::RecipeIngredient::Table)
            .and_where(Expr::col(table::RecipeIngredient::RecipeId).is_in(recipe_ids.iter().cloned()))
            .order_by(table::RecipeIngredient::RecipeId, Order::Asc)
            .order_by(table::RecipeIngredient::Position, Order::Asc)
            .to_owned();

        let (sql, values) = statement.build_sqlx(SqliteQueryBuilder);

        Ok(sqlx::query_as_with::<_, RecipeIngredientRow, _>(&sql, values)
            .fetch_all(&self.0)
            .await?)
    }

    async fn allergen_rows(
        &self,
        recipe_ids: &[String],
    ) -> allersafe_shared::Result<Vec<(String, String)>> {
        let statement = Query::select()
            .columns([
                table::RecipeAllergen::RecipeId,
                table::RecipeAllergen::AllergenId,
            ])
            .from(table::RecipeAllergen::Table)
            .and_where(Expr::col(table::RecipeAllergen::RecipeId).is_in(recipe_ids.iter().cloned()))
            .order_by(table::RecipeAllergen::AllergenId, Order::Asc)
            .to_owned();

        let (sql, values) = statement.build_sqlx(SqliteQueryBuilder);

        Ok(sqlx::query_as_with::<_, (String, String), _>(&sql, values)
            .fetch_all(&self.0)
            .await?)
    }

    /// Splits matching rows into readable recipes and malformed ones.
    async fn read_recipes(
        &self,
        filter: &RecipeFilter,
    ) -> allersafe_shared::Result<(Vec<Recipe>, Vec<MalformedRecipe>)> {
        let mut recipes = vec![];
        let mut malformed = vec![];

        for row in self.recipe_rows(filter).await? {
            let recipe_id = row.id.to_owned();
            let meal_type: Option<MealType> = row.meal_type.parse().ok();

            match Recipe::try_from(row) {
                Ok(recipe) => recipes.push(recipe),
                Err(err) => malformed.push(MalformedRecipe {
                    recipe_id: recipe_id.to_owned(),
                    meal_type,
                    error: CatalogError::Unreadable {
                        recipe_id,
                        detail: err.to_string(),
                    },
                }),
            }
        }

        Ok((recipes, malformed))
    }
}

#[async_trait]
impl CatalogReader for SqliteCatalog {
    async fn get_recipes(&self, filter: &RecipeFilter) -> allersafe_shared::Result<Vec<Recipe>> {
        let (mut recipes, malformed) = self.read_recipes(filter).await?;

        for row in malformed.iter() {
            tracing::warn!(
                recipe_id = %row.recipe_id,
                error = %row.error,
                "skipping unreadable recipe"
            );
        }

        let ids = recipes.iter().map(|r| r.id.to_owned()).collect::<Vec<_>>();

        let mut ingredients: HashMap<String, Vec<RecipeIngredient>> = HashMap::new();
        for row in self.ingredient_rows(&ids).await? {
            ingredients
                .entry(row.recipe_id)
                .or_default()
                .push(RecipeIngredient {
                    name: row.name,
                    quantity: row.quantity as f32,
                    unit: row.unit,
                });
        }

        let mut allergens: HashMap<String, Vec<RecipeAllergen>> = HashMap::new();
        for (recipe_id, allergen_id) in self.allergen_rows(&ids).await? {
            allergens
                .entry(recipe_id)
                .or_default()
                .push(RecipeAllergen { allergen_id });
        }

        for recipe in recipes.iter_mut() {
            recipe.ingredients = ingredients.remove(&recipe.id).unwrap_or_default();
            recipe.allergens = allergens.remove(&recipe.id).unwrap_or_default();
        }

        Ok(recipes)
    }

    async fn get_malformed_recipes(
        &self,
        filter: &RecipeFilter,
    ) -> allersafe_shared::Result<Vec<MalformedRecipe>> {
        let (_, malformed) = self.read_recipes(filter).await?;

        Ok(malformed)
    }

    async fn get_ingredient_allergens(
        &self,
        ingredient_names: &[String],
    ) -> allersafe_shared::Result<HashMap<String, IngredientRecord>> {
        let keys = ingredient_names.iter().map(|n| name_key(n)).collect::<Vec<_>>();

        let statement = Query::select()
            .columns([
                table::Ingredient::Id,
                table::Ingredient::Name,
                table::Ingredient::Category,
            ])
            .from(table::Ingredient::Table)
            .and_where(Expr::col(table::Ingredient::NameKey).is_in(keys))
            .to_owned();

        let (sql, values) = statement.build_sqlx(SqliteQueryBuilder);
        let rows = sqlx::query_as_with::<_, IngredientRow, _>(&sql, values)
            .fetch_all(&self.0)
            .await?;

        let ids = rows.iter().map(|r| r.id.to_owned()).collect::<Vec<_>>();

        let statement = Query::select()
            .columns([
                table::IngredientAllergen::IngredientId,
                table::IngredientAllergen::AllergenId,
                table::IngredientAllergen::AllergenType,
            ])
            .from(table::IngredientAllergen::Table)
            .and_where(Expr::col(table::IngredientAllergen::IngredientId).is_in(ids))
            .order_by(table::IngredientAllergen::AllergenId, Order::Asc)
            .to_owned();

        let (sql, values) = statement.build_sqlx(SqliteQueryBuilder);
        let tags = sqlx::query_as_with::<_, IngredientAllergenRow, _>(&sql, values)
            .fetch_all(&self.0)
            .await?;

        let mut tags_by_ingredient: HashMap<String, Vec<IngredientAllergen>> = HashMap::new();

        for tag in tags {
            // An unreadable qualifier is read as "contains".
            let allergen_type = tag.allergen_type.parse().unwrap_or_else(|_| {
                tracing::warn!(
                    ingredient_id = %tag.ingredient_id,
                    allergen_id = %tag.allergen_id,
                    allergen_type = %tag.allergen_type,
                    "unknown allergen type"
                );

                AllergenType::Contains
            });

            tags_by_ingredient
                .entry(tag.ingredient_id.to_owned())
                .or_default()
                .push(IngredientAllergen {
                    ingredient_id: tag.ingredient_id,
                    allergen_id: tag.allergen_id,
                    allergen_type,
                });
        }

        let records = rows.into_iter().map(|row| {
            let category = row.category.parse().unwrap_or_else(|_| {
                tracing::warn!(
                    ingredient_id = %row.id,
                    category = %row.category,
                    "unknown ingredient category"
                );

                IngredientCategory::Other
            });

            IngredientRecord {
                allergens: tags_by_ingredient.remove(&row.id).unwrap_or_default(),
                ingredient: Ingredient {
                    id: row.id,
                    name: row.name,
                    category,
                },
            }
        });

        Ok(IngredientIndex::new(records.collect::<Vec<_>>()).into_records())
    }

    async fn get_allergen_groups(&self) -> allersafe_shared::Result<Vec<CrossReactivityGroup>> {
        let statement = Query::select()
            .columns([
                table::CrossReactivityGroup::Id,
                table::CrossReactivityGroup::Name,
                table::CrossReactivityGroup::ProteinFamily,
            ])
            .from(table::CrossReactivityGroup::Table)
            .order_by(table::CrossReactivityGroup::Id, Order::Asc)
            .to_owned();

        let (sql, values) = statement.build_sqlx(SqliteQueryBuilder);
        let groups = sqlx::query_as_with::<_, (String, String, Option<String>), _>(&sql, values)
            .fetch_all(&self.0)
            .await?;

        let statement = Query::select()
            .columns([
                table::AllergenCrossReactivity::GroupId,
                table::AllergenCrossReactivity::AllergenId,
            ])
            .from(table::AllergenCrossReactivity::Table)
            .order_by(table::AllergenCrossReactivity::AllergenId, Order::Asc)
            .to_owned();

        let (sql, values) = statement.build_sqlx(SqliteQueryBuilder);
        let rows = sqlx::query_as_with::<_, (String, String), _>(&sql, values)
            .fetch_all(&self.0)
            .await?;

        Ok(CrossReactivityGroup::from_rows(
            groups,
            rows.into_iter()
                .map(|(group_id, allergen_id)| AllergenCrossReactivity {
                    group_id,
                    allergen_id,
                }),
        ))
    }
}

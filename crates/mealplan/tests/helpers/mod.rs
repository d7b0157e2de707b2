use std::{path::PathBuf, str::FromStr};

use allersafe_allergen::IngredientRecord;
use allersafe_mealplan::{Dataset, Generate, RegenerateMode};
use allersafe_shared::allergen::{AllergenType, CrossReactivityGroup, IngredientAllergen};
use allersafe_shared::mealplan::{MealItem, MealPlan, MealPlanEntry, MealType};
use allersafe_shared::recipe::{
    CuisineType, Difficulty, Ingredient, IngredientCategory, Recipe, RecipeAllergen,
    RecipeIngredient,
};
use allersafe_shared::user::{Severity, UserAllergy};
use sqlx::{SqlitePool, sqlite::SqliteConnectOptions};
use sqlx_migrator::{Migrate, Plan};
use time::Date;
use time::macros::date;

pub const USER: &str = "user-1";
pub const TODAY: Date = date!(2025 - 05 - 05);

#[allow(dead_code)]
pub async fn setup_test_pool(path: PathBuf) -> anyhow::Result<SqlitePool> {
    let opts = SqliteConnectOptions::from_str(&format!("sqlite:{}", path.to_str().unwrap()))?
        .create_if_missing(true)
        .foreign_keys(true);
    let pool = SqlitePool::connect_with(opts).await?;
    let mut conn = pool.acquire().await?;
    allersafe_db::migrator::<sqlx::Sqlite>()?
        .run(&mut conn, &Plan::apply_all())
        .await?;

    Ok(pool)
}

#[allow(dead_code)]
pub fn recipe(id: &str, meal_type: MealType, cuisine_type: CuisineType) -> Recipe {
    Recipe {
        id: id.to_owned(),
        name: format!("Recipe {id}"),
        cuisine_type,
        meal_type,
        prep_time: 10,
        cook_time: 20,
        difficulty: Difficulty::Easy,
        servings: 2,
        calories_per_serving: None,
        ingredients: vec![],
        allergens: vec![],
    }
}

#[allow(dead_code)]
pub fn with_ingredients(mut recipe: Recipe, ingredients: &[(&str, f32, &str)]) -> Recipe {
    recipe.ingredients = ingredients
        .iter()
        .map(|(name, quantity, unit)| RecipeIngredient {
            name: name.to_string(),
            quantity: *quantity,
            unit: unit.to_string(),
        })
        .collect();

    recipe
}

#[allow(dead_code)]
pub fn with_allergens(mut recipe: Recipe, allergens: &[&str]) -> Recipe {
    recipe.allergens = allergens
        .iter()
        .map(|id| RecipeAllergen {
            allergen_id: id.to_string(),
        })
        .collect();

    recipe
}

#[allow(dead_code)]
pub fn ingredient(
    name: &str,
    category: IngredientCategory,
    tags: &[(&str, AllergenType)],
) -> IngredientRecord {
    let id = format!("ing-{}", name.to_lowercase().replace(' ', "-"));

    IngredientRecord {
        ingredient: Ingredient {
            id: id.to_owned(),
            name: name.to_owned(),
            category,
        },
        allergens: tags
            .iter()
            .map(|(allergen_id, allergen_type)| IngredientAllergen {
                ingredient_id: id.to_owned(),
                allergen_id: allergen_id.to_string(),
                allergen_type: *allergen_type,
            })
            .collect(),
    }
}

#[allow(dead_code)]
pub fn allergy(allergen_id: &str) -> UserAllergy {
    UserAllergy {
        user_id: USER.to_owned(),
        allergen_id: allergen_id.to_owned(),
        severity: Severity::Severe,
        outgrown: false,
    }
}

#[allow(dead_code)]
pub fn shellfish_group() -> CrossReactivityGroup {
    CrossReactivityGroup {
        id: "tropomyosin".to_owned(),
        name: "Tropomyosin".to_owned(),
        protein_family: Some("Tropomyosin".to_owned()),
        allergen_ids: vec!["shrimp".to_owned(), "crab".to_owned(), "dust-mite".to_owned()],
    }
}

#[allow(dead_code)]
pub fn plan(id: &str, start: Date, end: Date) -> MealPlan {
    MealPlan {
        id: id.to_owned(),
        user_id: USER.to_owned(),
        start_date: start,
        end_date: end,
    }
}

#[allow(dead_code)]
pub fn entry(plan_id: &str, day: Date, meal_type: MealType, recipe_id: &str) -> MealPlanEntry {
    MealPlanEntry {
        meal_plan_id: plan_id.to_owned(),
        meal_date: day,
        meal_type,
        item: MealItem::Recipe(recipe_id.to_owned()),
        servings: 2,
        completed: true,
    }
}

#[allow(dead_code)]
pub fn generate(plan_id: &str, start: Date, end: Date, slots: &[MealType]) -> Generate {
    Generate {
        user_id: USER.to_owned(),
        meal_plan_id: plan_id.to_owned(),
        start,
        end,
        slots: slots.to_vec(),
        cuisine_type: None,
        max_prep_time: None,
        max_cook_time: None,
        servings: None,
        target_calories: None,
        exclude_allergens: vec![],
        mode: RegenerateMode::FillGaps,
        today: Some(TODAY),
    }
}

/// Shellfish-allergic user with a small catalog covering every slot.
#[allow(dead_code)]
pub fn shellfish_dataset() -> Dataset {
    Dataset {
        groups: vec![shellfish_group()],
        ingredients: vec![
            ingredient("Flour", IngredientCategory::Bakery, &[("wheat", AllergenType::Contains)]),
            ingredient("Milk", IngredientCategory::DairyAndEggs, &[("milk", AllergenType::Contains)]),
            ingredient("Crab", IngredientCategory::Seafood, &[("crab", AllergenType::Contains)]),
            ingredient("Shrimp", IngredientCategory::Seafood, &[("shrimp", AllergenType::Contains)]),
            ingredient("Rice", IngredientCategory::Grocery, &[]),
            ingredient("Tomato", IngredientCategory::FruitsAndVegetables, &[]),
        ],
        recipes: vec![
            with_ingredients(
                recipe("pancakes", MealType::Breakfast, CuisineType::American),
                &[("Flour", 200.0, "g"), ("Milk", 250.0, "ml")],
            ),
            with_ingredients(
                recipe("crab-cakes", MealType::Dinner, CuisineType::American),
                &[("Crab", 300.0, "g"), ("Flour", 50.0, "g")],
            ),
            with_ingredients(
                recipe("tomato-rice", MealType::Dinner, CuisineType::Italian),
                &[("Rice", 150.0, "g"), ("Tomato", 2.0, "")],
            ),
        ],
        user_allergies: vec![allergy("shrimp")],
        ..Default::default()
    }
}

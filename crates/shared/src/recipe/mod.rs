use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString, VariantArray};

use crate::mealplan::MealType;

#[derive(
    EnumString,
    VariantArray,
    Display,
    Clone,
    Copy,
    Debug,
    Default,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    AsRefStr,
)]
pub enum CuisineType {
    American,
    Caribbean,
    Chinese,
    Italian,
    French,
    Greek,
    Indian,
    Japanese,
    Korean,
    Mediterranean,
    Mexican,
    Thai,
    #[default]
    Other,
}

#[derive(
    EnumString,
    VariantArray,
    Display,
    Clone,
    Copy,
    Debug,
    Default,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
    AsRefStr,
)]
pub enum Difficulty {
    Easy,
    #[default]
    Medium,
    Hard,
}

#[derive(
    EnumString,
    Display,
    VariantArray,
    Default,
    Clone,
    Copy,
    Debug,
    PartialEq,
    Eq,
    Hash,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
    AsRefStr,
)]
pub enum IngredientCategory {
    /// Fresh fruits, fresh vegetables, herbs
    FruitsAndVegetables,
    /// Red meat, white meat, ground meat
    Butcher,
    /// Fresh fish, seafood, shellfish
    Seafood,
    /// Milk, butter, cream, yogurt, eggs
    DairyAndEggs,
    /// Bread, pastries, flour
    Bakery,
    /// Canned goods, pasta/rice, sauces, oils, spices
    Grocery,
    /// Frozen vegetables, ice cream, frozen seafood
    Frozen,
    /// Cookies, chocolate, nuts, chips
    SnacksAndConfectionery,
    #[default]
    Other,
}

/// Reference record for an ingredient. Recipes point at it by name only.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Ingredient {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub category: IngredientCategory,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RecipeIngredient {
    pub name: String,
    pub quantity: f32,
    #[serde(default)]
    pub unit: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct RecipeAllergen {
    pub allergen_id: String,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Recipe {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub cuisine_type: CuisineType,
    pub meal_type: MealType,
    #[serde(default)]
    pub prep_time: u16,
    #[serde(default)]
    pub cook_time: u16,
    #[serde(default)]
    pub difficulty: Difficulty,
    pub servings: u16,
    #[serde(default)]
    pub calories_per_serving: Option<u16>,
    #[serde(default)]
    pub ingredients: Vec<RecipeIngredient>,
    /// Allergens precomputed from the ingredient list at write time. May be stale.
    #[serde(default)]
    pub allergens: Vec<RecipeAllergen>,
}

impl Recipe {
    pub fn total_time(&self) -> u16 {
        self.prep_time.saturating_add(self.cook_time)
    }

    pub fn declares_allergen(&self, allergen_id: &str) -> bool {
        self.allergens.iter().any(|a| a.allergen_id == allergen_id)
    }
}

mod allergen;
mod cross_reactivity;
mod ingredient;
mod recipe;

use sqlx_migrator::vec_box;

pub struct Migration;

sqlx_migrator::sqlite_migration!(
    Migration,
    "allersafe",
    "m0_1",
    vec_box![],
    vec_box![
        allergen::CreateTable,
        cross_reactivity::CreateGroupTable,
        cross_reactivity::CreateMembershipTable,
        ingredient::CreateTable,
        ingredient::CreateNameKeyIdx,
        ingredient::CreateAllergenTable,
        recipe::CreateTable,
        recipe::CreateMealTypeIdx,
        recipe::CreateIngredientTable,
        recipe::CreateAllergenTable
    ]
);

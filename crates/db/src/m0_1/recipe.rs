use sea_query::{
    ColumnDef, ForeignKey, ForeignKeyAction, Index, IndexCreateStatement, IndexDropStatement,
    Table, TableCreateStatement, TableDropStatement,
};

use crate::table::{Recipe, RecipeAllergen, RecipeIngredient};

fn create_table() -> TableCreateStatement {
    Table::create()
        .table(Recipe::Table)
        .col(
            ColumnDef::new(Recipe::Id)
                .string()
                .not_null()
                .primary_key(),
        )
        .col(ColumnDef::new(Recipe::Name).string().not_null())
        .col(ColumnDef::new(Recipe::CuisineType).string().not_null())
        .col(ColumnDef::new(Recipe::MealType).string().not_null())
        .col(
            ColumnDef::new(Recipe::PrepTime)
                .integer()
                .not_null()
                .default(0),
        )
        .col(
            ColumnDef::new(Recipe::CookTime)
                .integer()
                .not_null()
                .default(0),
        )
        .col(ColumnDef::new(Recipe::Difficulty).string().not_null())
        .col(ColumnDef::new(Recipe::Servings).integer().not_null())
        .col(ColumnDef::new(Recipe::CaloriesPerServing).integer().null())
        .to_owned()
}

fn drop_table() -> TableDropStatement {
    Table::drop().table(Recipe::Table).to_owned()
}

fn create_meal_type_idx() -> IndexCreateStatement {
    Index::create()
        .name("idx_recipe_meal_type")
        .table(Recipe::Table)
        .col(Recipe::MealType)
        .to_owned()
}

fn drop_meal_type_idx() -> IndexDropStatement {
    Index::drop()
        .name("idx_recipe_meal_type")
        .table(Recipe::Table)
        .to_owned()
}

/// Ingredients reference the ingredient table by name only.
fn create_ingredient_table() -> TableCreateStatement {
    Table::create()
        .table(RecipeIngredient::Table)
        .col(
            ColumnDef::new(RecipeIngredient::RecipeId)
                .string()
                .not_null(),
        )
        .col(
            ColumnDef::new(RecipeIngredient::Position)
                .integer()
                .not_null(),
        )
        .col(ColumnDef::new(RecipeIngredient::Name).string().not_null())
        .col(ColumnDef::new(RecipeIngredient::Quantity).double().not_null())
        .col(
            ColumnDef::new(RecipeIngredient::Unit)
                .string()
                .not_null()
                .default(""),
        )
        .primary_key(
            Index::create()
                .col(RecipeIngredient::RecipeId)
                .col(RecipeIngredient::Position),
        )
        .foreign_key(
            ForeignKey::create()
                .name("fk_recipe_ingredient_recipe")
                .from(RecipeIngredient::Table, RecipeIngredient::RecipeId)
                .to(Recipe::Table, Recipe::Id)
                .on_delete(ForeignKeyAction::Cascade),
        )
        .to_owned()
}

fn drop_ingredient_table() -> TableDropStatement {
    Table::drop().table(RecipeIngredient::Table).to_owned()
}

fn create_allergen_table() -> TableCreateStatement {
    Table::create()
        .table(RecipeAllergen::Table)
        .col(ColumnDef::new(RecipeAllergen::RecipeId).string().not_null())
        .col(
            ColumnDef::new(RecipeAllergen::AllergenId)
                .string()
                .not_null(),
        )
        .primary_key(
            Index::create()
                .col(RecipeAllergen::RecipeId)
                .col(RecipeAllergen::AllergenId),
        )
        .foreign_key(
            ForeignKey::create()
                .name("fk_recipe_allergen_recipe")
                .from(RecipeAllergen::Table, RecipeAllergen::RecipeId)
                .to(Recipe::Table, Recipe::Id)
                .on_delete(ForeignKeyAction::Cascade),
        )
        .to_owned()
}

fn drop_allergen_table() -> TableDropStatement {
    Table::drop().table(RecipeAllergen::Table).to_owned()
}

sqlite_operation!(CreateTable, create_table(), drop_table());
sqlite_operation!(CreateMealTypeIdx, create_meal_type_idx(), drop_meal_type_idx());
sqlite_operation!(
    CreateIngredientTable,
    create_ingredient_table(),
    drop_ingredient_table()
);
sqlite_operation!(
    CreateAllergenTable,
    create_allergen_table(),
    drop_allergen_table()
);

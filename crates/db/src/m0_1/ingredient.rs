use sea_query::{
    ColumnDef, ForeignKey, ForeignKeyAction, Index, IndexCreateStatement, IndexDropStatement,
    Table, TableCreateStatement, TableDropStatement,
};

use crate::table::{Ingredient, IngredientAllergen};

fn create_table() -> TableCreateStatement {
    Table::create()
        .table(Ingredient::Table)
        .col(
            ColumnDef::new(Ingredient::Id)
                .string()
                .not_null()
                .primary_key(),
        )
        .col(ColumnDef::new(Ingredient::Name).string().not_null())
        .col(ColumnDef::new(Ingredient::NameKey).string().not_null())
        .col(ColumnDef::new(Ingredient::Category).string().not_null())
        .to_owned()
}

fn drop_table() -> TableDropStatement {
    Table::drop().table(Ingredient::Table).to_owned()
}

fn create_name_key_idx() -> IndexCreateStatement {
    Index::create()
        .name("idx_ingredient_name_key")
        .table(Ingredient::Table)
        .unique()
        .col(Ingredient::NameKey)
        .to_owned()
}

fn drop_name_key_idx() -> IndexDropStatement {
    Index::drop()
        .name("idx_ingredient_name_key")
        .table(Ingredient::Table)
        .to_owned()
}

fn create_allergen_table() -> TableCreateStatement {
    Table::create()
        .table(IngredientAllergen::Table)
        .col(
            ColumnDef::new(IngredientAllergen::IngredientId)
                .string()
                .not_null(),
        )
        .col(
            ColumnDef::new(IngredientAllergen::AllergenId)
                .string()
                .not_null(),
        )
        .col(
            ColumnDef::new(IngredientAllergen::AllergenType)
                .string()
                .not_null(),
        )
        .primary_key(
            Index::create()
                .col(IngredientAllergen::IngredientId)
                .col(IngredientAllergen::AllergenId),
        )
        .foreign_key(
            ForeignKey::create()
                .name("fk_ingredient_allergen_ingredient")
                .from(IngredientAllergen::Table, IngredientAllergen::IngredientId)
                .to(Ingredient::Table, Ingredient::Id)
                .on_delete(ForeignKeyAction::Cascade),
        )
        .to_owned()
}

fn drop_allergen_table() -> TableDropStatement {
    Table::drop().table(IngredientAllergen::Table).to_owned()
}

sqlite_operation!(CreateTable, create_table(), drop_table());
sqlite_operation!(CreateNameKeyIdx, create_name_key_idx(), drop_name_key_idx());
sqlite_operation!(
    CreateAllergenTable,
    create_allergen_table(),
    drop_allergen_table()
);

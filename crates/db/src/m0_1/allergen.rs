use sea_query::{ColumnDef, Table, TableCreateStatement, TableDropStatement};

use crate::table::Allergen;

fn create_table() -> TableCreateStatement {
    Table::create()
        .table(Allergen::Table)
        .col(
            ColumnDef::new(Allergen::Id)
                .string()
                .not_null()
                .primary_key(),
        )
        .col(ColumnDef::new(Allergen::Name).string().not_null())
        .col(ColumnDef::new(Allergen::Category).string().not_null())
        .col(ColumnDef::new(Allergen::ScientificName).string().null())
        .to_owned()
}

fn drop_table() -> TableDropStatement {
    Table::drop().table(Allergen::Table).to_owned()
}

sqlite_operation!(CreateTable, create_table(), drop_table());

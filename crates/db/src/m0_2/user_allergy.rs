use sea_query::{ColumnDef, Index, Table, TableCreateStatement, TableDropStatement};

use crate::table::UserAllergy;

fn create_table() -> TableCreateStatement {
    Table::create()
        .table(UserAllergy::Table)
        .col(ColumnDef::new(UserAllergy::UserId).string().not_null())
        .col(ColumnDef::new(UserAllergy::AllergenId).string().not_null())
        .col(ColumnDef::new(UserAllergy::Severity).string().not_null())
        .col(
            ColumnDef::new(UserAllergy::Outgrown)
                .boolean()
                .not_null()
                .default(false),
        )
        .primary_key(
            Index::create()
                .col(UserAllergy::UserId)
                .col(UserAllergy::AllergenId),
        )
        .to_owned()
}

fn drop_table() -> TableDropStatement {
    Table::drop().table(UserAllergy::Table).to_owned()
}

sqlite_operation!(CreateTable, create_table(), drop_table());

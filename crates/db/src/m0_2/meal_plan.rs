use sea_query::{
    ColumnDef, Index, IndexCreateStatement, IndexDropStatement, Table, TableCreateStatement,
    TableDropStatement,
};

use crate::table::MealPlan;

/// Dates are stored as the unix timestamp of their UTC midnight.
fn create_table() -> TableCreateStatement {
    Table::create()
        .table(MealPlan::Table)
        .col(
            ColumnDef::new(MealPlan::Id)
                .string()
                .not_null()
                .primary_key(),
        )
        .col(ColumnDef::new(MealPlan::UserId).string().not_null())
        .col(ColumnDef::new(MealPlan::StartDate).big_integer().not_null())
        .col(ColumnDef::new(MealPlan::EndDate).big_integer().not_null())
        .to_owned()
}

fn drop_table() -> TableDropStatement {
    Table::drop().table(MealPlan::Table).to_owned()
}

fn create_user_idx() -> IndexCreateStatement {
    Index::create()
        .name("idx_meal_plan_user_id")
        .table(MealPlan::Table)
        .col(MealPlan::UserId)
        .to_owned()
}

fn drop_user_idx() -> IndexDropStatement {
    Index::drop()
        .name("idx_meal_plan_user_id")
        .table(MealPlan::Table)
        .to_owned()
}

sqlite_operation!(CreateTable, create_table(), drop_table());
sqlite_operation!(CreateUserIdx, create_user_idx(), drop_user_idx());

use sea_query::{
    ColumnDef, ForeignKey, ForeignKeyAction, Index, IndexCreateStatement, IndexDropStatement,
    Table, TableCreateStatement, TableDropStatement,
};

use crate::table::{MealPlan, MealPlanEntry};

/// Exactly one of `recipe_id`, `product_id` and `custom_name` is set.
fn create_table() -> TableCreateStatement {
    Table::create()
        .table(MealPlanEntry::Table)
        .col(ColumnDef::new(MealPlanEntry::MealPlanId).string().not_null())
        .col(ColumnDef::new(MealPlanEntry::MealDate).big_integer().not_null())
        .col(ColumnDef::new(MealPlanEntry::MealType).string().not_null())
        .col(ColumnDef::new(MealPlanEntry::RecipeId).string().null())
        .col(ColumnDef::new(MealPlanEntry::ProductId).string().null())
        .col(ColumnDef::new(MealPlanEntry::CustomName).string().null())
        .col(ColumnDef::new(MealPlanEntry::Servings).integer().not_null())
        .col(
            ColumnDef::new(MealPlanEntry::Completed)
                .boolean()
                .not_null()
                .default(false),
        )
        .foreign_key(
            ForeignKey::create()
                .name("fk_meal_plan_entry_meal_plan")
                .from(MealPlanEntry::Table, MealPlanEntry::MealPlanId)
                .to(MealPlan::Table, MealPlan::Id)
                .on_delete(ForeignKeyAction::Cascade),
        )
        .to_owned()
}

fn drop_table() -> TableDropStatement {
    Table::drop().table(MealPlanEntry::Table).to_owned()
}

fn create_slot_idx() -> IndexCreateStatement {
    Index::create()
        .name("idx_meal_plan_entry_slot")
        .table(MealPlanEntry::Table)
        .col(MealPlanEntry::MealPlanId)
        .col(MealPlanEntry::MealDate)
        .col(MealPlanEntry::MealType)
        .to_owned()
}

fn drop_slot_idx() -> IndexDropStatement {
    Index::drop()
        .name("idx_meal_plan_entry_slot")
        .table(MealPlanEntry::Table)
        .to_owned()
}

sqlite_operation!(CreateTable, create_table(), drop_table());
sqlite_operation!(CreateSlotIdx, create_slot_idx(), drop_slot_idx());

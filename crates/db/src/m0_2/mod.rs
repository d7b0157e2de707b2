mod meal_plan;
mod meal_plan_entry;
mod user_allergy;

use sqlx_migrator::vec_box;

pub struct Migration;

sqlx_migrator::sqlite_migration!(
    Migration,
    "allersafe",
    "m0_2",
    vec_box![crate::m0_1::Migration],
    vec_box![
        user_allergy::CreateTable,
        meal_plan::CreateTable,
        meal_plan::CreateUserIdx,
        meal_plan_entry::CreateTable,
        meal_plan_entry::CreateSlotIdx
    ]
);

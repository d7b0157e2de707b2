use allersafe_db::table;
use allersafe_shared::mealplan::{MealItem, MealPlan, MealPlanEntry};
use allersafe_shared::user::UserAllergy;
use allersafe_shared::{DateRange, day_to_timestamp, timestamp_to_day};
use async_trait::async_trait;
use sea_query::{Expr, ExprTrait, Order, Query, SelectStatement, SqliteQueryBuilder};
use sea_query_sqlx::SqlxBinder;
use sqlx::{SqlitePool, prelude::FromRow};

use crate::HistoryReader;

#[derive(FromRow)]
struct UserAllergyRow {
    user_id: String,
    allergen_id: String,
    severity: String,
    outgrown: bool,
}

#[derive(FromRow)]
struct MealPlanRow {
    id: String,
    user_id: String,
    start_date: i64,
    end_date: i64,
}

#[derive(FromRow)]
struct MealPlanEntryRow {
    meal_plan_id: String,
    meal_date: i64,
    meal_type: String,
    recipe_id: Option<String>,
    product_id: Option<String>,
    custom_name: Option<String>,
    servings: u16,
    completed: bool,
}

impl TryFrom<MealPlanEntryRow> for MealPlanEntry {
    type Error = allersafe_shared::Error;

    fn try_from(value: MealPlanEntryRow) -> Result<Self, Self::Error> {
        let item = match (value.recipe_id, value.product_id, value.custom_name) {
            (Some(id), None, None) => MealItem::Recipe(id),
            (None, Some(id), None) => MealItem::Product(id),
            (None, None, Some(name)) => MealItem::Custom(name),
            _ => allersafe_shared::bail!(
                "meal plan entry of {} on {} must have exactly one item",
                value.meal_plan_id,
                value.meal_date
            ),
        };

        Ok(MealPlanEntry {
            meal_plan_id: value.meal_plan_id,
            meal_date: timestamp_to_day(value.meal_date)?,
            meal_type: value.meal_type.parse()?,
            item,
            servings: value.servings,
            completed: value.completed,
        })
    }
}

fn entry_select() -> SelectStatement {
    Query::select()
        .columns([
            (table::MealPlanEntry::Table, table::MealPlanEntry::MealPlanId),
            (table::MealPlanEntry::Table, table::MealPlanEntry::MealDate),
            (table::MealPlanEntry::Table, table::MealPlanEntry::MealType),
            (table::MealPlanEntry::Table, table::MealPlanEntry::RecipeId),
            (table::MealPlanEntry::Table, table::MealPlanEntry::ProductId),
            (table::MealPlanEntry::Table, table::MealPlanEntry::CustomName),
            (table::MealPlanEntry::Table, table::MealPlanEntry::Servings),
            (table::MealPlanEntry::Table, table::MealPlanEntry::Completed),
        ])
        .from(table::MealPlanEntry::Table)
        .order_by(
            (table::MealPlanEntry::Table, table::MealPlanEntry::MealDate),
            Order::Asc,
        )
        .order_by(
            (table::MealPlanEntry::Table, table::MealPlanEntry::MealType),
            Order::Asc,
        )
        .to_owned()
}

/// Read side of allergy profiles and meal plans.
#[derive(Clone)]
pub struct SqliteHistory(pub SqlitePool);

impl SqliteHistory {
    /// Unreadable entries are skipped.
    async fn entries(&self, statement: SelectStatement) -> allersafe_shared::Result<Vec<MealPlanEntry>> {
        let (sql, values) = statement.build_sqlx(SqliteQueryBuilder);

        let rows = sqlx::query_as_with::<_, MealPlanEntryRow, _>(&sql, values)
            .fetch_all(&self.0)
            .await?;

        let entries = rows
            .into_iter()
            .filter_map(|row| {
                let meal_plan_id = row.meal_plan_id.to_owned();

                MealPlanEntry::try_from(row)
                    .inspect_err(|err| {
                        tracing::warn!(
                            %meal_plan_id,
                            error = %err,
                            "skipping unreadable meal plan entry"
                        )
                    })
                    .ok()
            })
            .collect();

        Ok(entries)
    }
}

#[async_trait]
impl HistoryReader for SqliteHistory {
    async fn get_user_allergies(
        &self,
        user_id: &str,
    ) -> allersafe_shared::Result<Vec<UserAllergy>> {
        let statement = Query::select()
            .columns([
                table::UserAllergy::UserId,
                table::UserAllergy::AllergenId,
                table::UserAllergy::Severity,
                table::UserAllergy::Outgrown,
            ])
            .from(table::UserAllergy::Table)
            .and_where(Expr::col(table::UserAllergy::UserId).eq(user_id))
            .order_by(table::UserAllergy::AllergenId, Order::Asc)
            .to_owned();

        let (sql, values) = statement.build_sqlx(SqliteQueryBuilder);

        sqlx::query_as_with::<_, UserAllergyRow, _>(&sql, values)
            .fetch_all(&self.0)
            .await?
            .into_iter()
            .map(|row| {
                Ok(UserAllergy {
                    user_id: row.user_id,
                    allergen_id: row.allergen_id,
                    severity: row.severity.parse()?,
                    outgrown: row.outgrown,
                })
            })
            .collect()
    }

    async fn get_user_meal_history(
        &self,
        user_id: &str,
        window: DateRange,
    ) -> allersafe_shared::Result<Vec<MealPlanEntry>> {
        let statement = entry_select()
            .inner_join(
                table::MealPlan::Table,
                Expr::col((table::MealPlan::Table, table::MealPlan::Id))
                    .equals((table::MealPlanEntry::Table, table::MealPlanEntry::MealPlanId)),
            )
            .and_where(Expr::col((table::MealPlan::Table, table::MealPlan::UserId)).eq(user_id))
            .and_where(
                Expr::col((table::MealPlanEntry::Table, table::MealPlanEntry::MealDate))
                    .gte(day_to_timestamp(window.start)),
            )
            .and_where(
                Expr::col((table::MealPlanEntry::Table, table::MealPlanEntry::MealDate))
                    .lte(day_to_timestamp(window.end)),
            )
            .to_owned();

        self.entries(statement).await
    }

    async fn get_meal_plan(
        &self,
        meal_plan_id: &str,
    ) -> allersafe_shared::Result<Option<MealPlan>> {
        let statement = Query::select()
            .columns([
                table::MealPlan::Id,
                table::MealPlan::UserId,
                table::MealPlan::StartDate,
                table::MealPlan::EndDate,
            ])
            .from(table::MealPlan::Table)
            .and_where(Expr::col(table::MealPlan::Id).eq(meal_plan_id))
            .limit(1)
            .to_owned();

        let (sql, values) = statement.build_sqlx(SqliteQueryBuilder);

        let Some(row) = sqlx::query_as_with::<_, MealPlanRow, _>(&sql, values)
            .fetch_optional(&self.0)
            .await?
        else {
            return Ok(None);
        };

        Ok(Some(MealPlan {
            id: row.id,
            user_id: row.user_id,
            start_date: timestamp_to_day(row.start_date)?,
            end_date: timestamp_to_day(row.end_date)?,
        }))
    }

    async fn get_meal_plan_entries(
        &self,
        meal_plan_id: &str,
    ) -> allersafe_shared::Result<Vec<MealPlanEntry>> {
        let statement = entry_select()
            .and_where(
                Expr::col((table::MealPlanEntry::Table, table::MealPlanEntry::MealPlanId))
                    .eq(meal_plan_id),
            )
            .to_owned();

        self.entries(statement).await
    }
}

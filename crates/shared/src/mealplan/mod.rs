use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString, VariantArray};
use time::Date;

use crate::DateRange;

/// Meal slots, declared in the order a day is filled.
#[derive(
    EnumString,
    VariantArray,
    Display,
    AsRefStr,
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
)]
#[strum(ascii_case_insensitive)]
pub enum MealType {
    Breakfast,
    Lunch,
    Dinner,
    Snack,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MealPlan {
    pub id: String,
    pub user_id: String,
    pub start_date: Date,
    pub end_date: Date,
}

impl MealPlan {
    pub fn new(
        id: impl Into<String>,
        user_id: impl Into<String>,
        start_date: Date,
        end_date: Date,
    ) -> crate::Result<Self> {
        if end_date <= start_date {
            crate::invalid!("meal plan must end after it starts ({start_date} - {end_date})");
        }

        Ok(Self {
            id: id.into(),
            user_id: user_id.into(),
            start_date,
            end_date,
        })
    }

    pub fn range(&self) -> DateRange {
        DateRange {
            start: self.start_date,
            end: self.end_date,
        }
    }
}

/// What an entry serves. Exactly one kind per entry.
#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MealItem {
    Recipe(String),
    Product(String),
    Custom(String),
}

impl MealItem {
    pub fn recipe_id(&self) -> Option<&str> {
        match self {
            MealItem::Recipe(id) => Some(id),
            _ => None,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct MealPlanEntry {
    pub meal_plan_id: String,
    pub meal_date: Date,
    pub meal_type: MealType,
    pub item: MealItem,
    pub servings: u16,
    #[serde(default)]
    pub completed: bool,
}

impl MealPlanEntry {
    pub fn slot(&self) -> (Date, MealType) {
        (self.meal_date, self.meal_type)
    }

    pub fn recipe_id(&self) -> Option<&str> {
        self.item.recipe_id()
    }
}

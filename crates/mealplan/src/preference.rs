use std::collections::{BTreeMap, HashMap, HashSet};

use allersafe_shared::DateRange;
use allersafe_shared::mealplan::MealPlanEntry;
use allersafe_shared::recipe::{CuisineType, Recipe};
use allersafe_shared::user::UserCuisinePreference;
use serde::Serialize;
use time::Date;

/// Affinity of a user for each cuisine, in `[0, 1]`.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CuisineAffinity {
    by_cuisine: BTreeMap<CuisineType, f32>,
}

impl CuisineAffinity {
    /// Affinity of cuisines the user never had, so new cuisines still get picked.
    pub const NEUTRAL: f32 = 0.5;

    pub fn get(&self, cuisine: CuisineType) -> f32 {
        self.by_cuisine
            .get(&cuisine)
            .copied()
            .unwrap_or(Self::NEUTRAL)
    }

    pub fn is_empty(&self) -> bool {
        self.by_cuisine.is_empty()
    }

    pub fn preferences(&self, user_id: &str) -> Vec<UserCuisinePreference> {
        self.by_cuisine
            .iter()
            .map(|(cuisine_type, affinity)| UserCuisinePreference {
                user_id: user_id.to_owned(),
                cuisine_type: *cuisine_type,
                affinity: *affinity,
            })
            .collect()
    }
}

impl FromIterator<(CuisineType, f32)> for CuisineAffinity {
    fn from_iter<T: IntoIterator<Item = (CuisineType, f32)>>(iter: T) -> Self {
        Self {
            by_cuisine: iter
                .into_iter()
                .map(|(cuisine, affinity)| (cuisine, affinity.clamp(0.0, 1.0)))
                .collect(),
        }
    }
}

/// Fraction of planned entries of a recipe that were marked completed.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct CompletionRates {
    by_recipe: HashMap<String, f32>,
}

impl CompletionRates {
    /// `None` for recipes the user was never served.
    pub fn get(&self, recipe_id: &str) -> Option<f32> {
        self.by_recipe.get(recipe_id).copied()
    }

    pub fn len(&self) -> usize {
        self.by_recipe.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_recipe.is_empty()
    }
}

impl FromIterator<(String, f32)> for CompletionRates {
    fn from_iter<T: IntoIterator<Item = (String, f32)>>(iter: T) -> Self {
        Self {
            by_recipe: iter
                .into_iter()
                .map(|(id, rate)| (id, rate.clamp(0.0, 1.0)))
                .collect(),
        }
    }
}

/// Turns meal-plan history into preference weights.
///
/// Only entries dated on or before `today` count as history; entries that
/// are still ahead are planned, not eaten.
#[derive(Debug, Clone)]
pub struct PreferenceModel {
    today: Date,
    cuisines: HashMap<String, CuisineType>,
    history: HashMap<String, Vec<MealPlanEntry>>,
}

impl PreferenceModel {
    /// `recipes` resolves the cuisine of recipes found in history.
    pub fn new<'a>(today: Date, recipes: impl IntoIterator<Item = &'a Recipe>) -> Self {
        Self {
            today,
            cuisines: recipes
                .into_iter()
                .map(|r| (r.id.to_owned(), r.cuisine_type))
                .collect(),
            history: HashMap::new(),
        }
    }

    pub fn with_history(
        mut self,
        user_id: impl Into<String>,
        entries: impl IntoIterator<Item = MealPlanEntry>,
    ) -> Self {
        self.history
            .entry(user_id.into())
            .or_default()
            .extend(entries);

        self
    }

    fn past_recipe_entries(&self, user_id: &str) -> impl Iterator<Item = (&str, &MealPlanEntry)> {
        let today = self.today;

        self.history
            .get(user_id)
            .into_iter()
            .flatten()
            .filter(move |e| e.meal_date <= today)
            .filter_map(|e| e.recipe_id().map(|id| (id, e)))
    }

    /// Frequency of each cuisine in history, scaled so the most frequent one
    /// is `1.0`.
    pub fn cuisine_affinity(&self, user_id: &str) -> CuisineAffinity {
        let mut counts: BTreeMap<CuisineType, u32> = BTreeMap::new();

        for (recipe_id, _) in self.past_recipe_entries(user_id) {
            let Some(cuisine) = self.cuisines.get(recipe_id) else {
                continue;
            };

            *counts.entry(*cuisine).or_default() += 1;
        }

        let Some(max) = counts.values().max().copied() else {
            return CuisineAffinity::default();
        };

        counts
            .into_iter()
            .map(|(cuisine, count)| (cuisine, count as f32 / max as f32))
            .collect()
    }

    pub fn completion_rate(&self, user_id: &str) -> CompletionRates {
        let mut tally: HashMap<&str, (u32, u32)> = HashMap::new();

        for (recipe_id, entry) in self.past_recipe_entries(user_id) {
            let (completed, planned) = tally.entry(recipe_id).or_default();
            *planned += 1;

            if entry.completed {
                *completed += 1;
            }
        }

        tally
            .into_iter()
            .map(|(id, (completed, planned))| (id.to_owned(), completed as f32 / planned as f32))
            .collect()
    }

    /// Recipe ids planned within the `lookback_days` days ending today.
    pub fn recently_used(&self, user_id: &str, lookback_days: u16) -> HashSet<String> {
        let window = DateRange::trailing(self.today, lookback_days);

        self.history
            .get(user_id)
            .into_iter()
            .flatten()
            .filter(|e| window.contains(e.meal_date))
            .filter_map(|e| e.recipe_id().map(ToOwned::to_owned))
            .collect()
    }
}

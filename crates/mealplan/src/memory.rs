use std::collections::HashMap;
use std::sync::Arc;

use allersafe_allergen::{IngredientIndex, IngredientRecord};
use allersafe_shared::allergen::{Allergen, CrossReactivityGroup};
use allersafe_shared::mealplan::{MealPlan, MealPlanEntry};
use allersafe_shared::recipe::Recipe;
use allersafe_shared::user::UserAllergy;
use allersafe_shared::{DateRange, name_key};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;

use crate::{CatalogReader, HistoryReader, PlanDiff, PlanWriter, RecipeFilter};

/// Catalog and history in one document. Also the format of seed files.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Dataset {
    pub allergens: Vec<Allergen>,
    pub groups: Vec<CrossReactivityGroup>,
    pub ingredients: Vec<IngredientRecord>,
    pub recipes: Vec<Recipe>,
    pub user_allergies: Vec<UserAllergy>,
    pub meal_plans: Vec<MealPlan>,
    pub entries: Vec<MealPlanEntry>,
}

/// Collaborators backed by a [`Dataset`] held in memory. Clones share state.
#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
    data: Arc<RwLock<Dataset>>,
}

impl MemoryStore {
    pub fn new(data: Dataset) -> Self {
        Self {
            data: Arc::new(RwLock::new(data)),
        }
    }

    pub async fn snapshot(&self) -> Dataset {
        self.data.read().await.clone()
    }

    pub async fn entries_of(&self, meal_plan_id: &str) -> Vec<MealPlanEntry> {
        let data = self.data.read().await;

        let mut entries = data
            .entries
            .iter()
            .filter(|e| e.meal_plan_id == meal_plan_id)
            .cloned()
            .collect::<Vec<_>>();

        entries.sort_by_key(|e| e.slot());
        entries
    }
}

#[async_trait]
impl CatalogReader for MemoryStore {
    async fn get_recipes(&self, filter: &RecipeFilter) -> allersafe_shared::Result<Vec<Recipe>> {
        let data = self.data.read().await;

        Ok(data
            .recipes
            .iter()
            .filter(|r| filter.matches(r))
            .cloned()
            .collect())
    }

    async fn get_ingredient_allergens(
        &self,
        ingredient_names: &[String],
    ) -> allersafe_shared::Result<HashMap<String, IngredientRecord>> {
        let data = self.data.read().await;
        let wanted = ingredient_names
            .iter()
            .map(|n| name_key(n))
            .collect::<Vec<_>>();

        let records = data
            .ingredients
            .iter()
            .filter(|r| wanted.contains(&name_key(&r.ingredient.name)))
            .cloned();

        Ok(IngredientIndex::new(records).into_records())
    }

    async fn get_allergen_groups(&self) -> allersafe_shared::Result<Vec<CrossReactivityGroup>> {
        Ok(self.data.read().await.groups.to_vec())
    }
}

#[async_trait]
impl HistoryReader for MemoryStore {
    async fn get_user_allergies(
        &self,
        user_id: &str,
    ) -> allersafe_shared::Result<Vec<UserAllergy>> {
        let data = self.data.read().await;

        Ok(data
            .user_allergies
            .iter()
            .filter(|a| a.user_id == user_id)
            .cloned()
            .collect())
    }

    async fn get_user_meal_history(
        &self,
        user_id: &str,
        window: DateRange,
    ) -> allersafe_shared::Result<Vec<MealPlanEntry>> {
        let data = self.data.read().await;

        Ok(data
            .entries
            .iter()
            .filter(|e| window.contains(e.meal_date))
            .filter(|e| {
                data.meal_plans
                    .iter()
                    .any(|p| p.id == e.meal_plan_id && p.user_id == user_id)
            })
            .cloned()
            .collect())
    }

    async fn get_meal_plan(
        &self,
        meal_plan_id: &str,
    ) -> allersafe_shared::Result<Option<MealPlan>> {
        let data = self.data.read().await;

        Ok(data.meal_plans.iter().find(|p| p.id == meal_plan_id).cloned())
    }

    async fn get_meal_plan_entries(
        &self,
        meal_plan_id: &str,
    ) -> allersafe_shared::Result<Vec<MealPlanEntry>> {
        Ok(self.entries_of(meal_plan_id).await)
    }
}

#[async_trait]
impl PlanWriter for MemoryStore {
    async fn apply(&self, diff: &PlanDiff) -> allersafe_shared::Result<()> {
        let mut data = self.data.write().await;

        if let Some(plan) = diff.create.as_ref() {
            if data.meal_plans.iter().any(|p| p.id == plan.id) {
                allersafe_shared::bail!("meal plan {} already exists", plan.id);
            }

            data.meal_plans.push(plan.clone());
        } else if !data.meal_plans.iter().any(|p| p.id == diff.meal_plan_id) {
            return Err(allersafe_shared::Error::NotFound(format!(
                "meal plan {}",
                diff.meal_plan_id
            )));
        }

        data.entries.retain(|e| {
            e.meal_plan_id != diff.meal_plan_id || !diff.remove.contains(&e.slot())
        });
        data.entries.extend(diff.add.iter().cloned());

        Ok(())
    }
}

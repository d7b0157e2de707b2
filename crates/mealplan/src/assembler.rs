use std::collections::{BTreeMap, BTreeSet, HashSet};

use allersafe_allergen::{
    AllergenGraph, AllergenSet, IngredientIndex, SafetyFilter, SafetyWarning,
};
use allersafe_shared::DateRange;
use allersafe_shared::mealplan::{MealItem, MealPlan, MealPlanEntry, MealType};
use allersafe_shared::recipe::{IngredientCategory, Recipe};
use allersafe_shared::user::UserAllergy;
use allersafe_shopping::{CategorizationService, ShoppingItem, ShoppingList};
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString};
use time::Date;
use tokio_util::sync::CancellationToken;

use crate::{
    GenerationError, GenerationSettings, MalformedRecipe, PreferenceModel, RecipeScore,
    RecipeScorer, SafetyTable, ScoringContext, SlotConstraints, SlotFailure, SlotFailureReason,
};

/// How already planned slots inside the requested range are treated.
#[derive(
    EnumString,
    Display,
    AsRefStr,
    Clone,
    Copy,
    Debug,
    Default,
    PartialEq,
    Eq,
    Serialize,
    Deserialize,
)]
#[serde(rename_all = "snake_case")]
#[strum(serialize_all = "snake_case")]
pub enum RegenerateMode {
    /// Only empty slots are filled.
    #[default]
    FillGaps,
    /// Planned slots are replaced when a new recipe is found for them.
    Replace,
}

/// A validated generation request.
#[derive(Debug, Clone, PartialEq)]
pub struct PlanRequest {
    pub user_id: String,
    pub meal_plan_id: String,
    pub range: DateRange,
    pub slots: BTreeSet<MealType>,
    /// `meal_type` is ignored, each slot sets its own.
    pub constraints: SlotConstraints,
    /// Request scoped exclusions on top of the stored allergy profile.
    pub exclude_allergens: Vec<String>,
    pub mode: RegenerateMode,
    /// Reference day for history windows.
    pub today: Date,
}

/// Everything a run reads, loaded once before assembling.
#[derive(Debug, Clone, Default)]
pub struct CatalogSnapshot {
    pub recipes: Vec<Recipe>,
    /// Rows the catalog could not read. They only explain empty slots.
    pub malformed: Vec<MalformedRecipe>,
    pub ingredients: IngredientIndex,
    pub allergies: Vec<UserAllergy>,
    pub history: Vec<MealPlanEntry>,
    pub plan: Option<MealPlan>,
    /// Entries already stored for the target plan.
    pub entries: Vec<MealPlanEntry>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Assignment {
    pub date: Date,
    pub meal_type: MealType,
    pub recipe_id: String,
    pub recipe_name: String,
    pub servings: u16,
    pub score: RecipeScore,
    pub warnings: Vec<SafetyWarning>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Outcome {
    Complete,
    Partial,
}

/// Changes a run wants persisted. Applied atomically by a [`crate::PlanWriter`].
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PlanDiff {
    pub meal_plan_id: String,
    /// Set when the plan does not exist yet.
    pub create: Option<MealPlan>,
    /// Slots whose existing entries are replaced.
    pub remove: Vec<(Date, MealType)>,
    pub add: Vec<MealPlanEntry>,
}

impl PlanDiff {
    pub fn is_empty(&self) -> bool {
        self.create.is_none() && self.remove.is_empty() && self.add.is_empty()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct GeneratedPlan {
    pub meal_plan_id: String,
    pub user_id: String,
    pub range: DateRange,
    pub outcome: Outcome,
    pub exclusion: AllergenSet,
    pub assignments: Vec<Assignment>,
    pub unfilled: Vec<SlotFailure>,
    pub shopping_list: ShoppingList,
    #[serde(skip)]
    pub diff: PlanDiff,
}

/// Walks days by slots and fills each slot with the best safe recipe.
///
/// Pure over its [`CatalogSnapshot`]: it reads nothing and writes nothing.
pub struct MealPlanAssembler<'a> {
    graph: &'a AllergenGraph,
    settings: &'a GenerationSettings,
}

impl<'a> MealPlanAssembler<'a> {
    pub fn new(graph: &'a AllergenGraph, settings: &'a GenerationSettings) -> Self {
        Self { graph, settings }
    }

    fn validate(
        &self,
        request: &PlanRequest,
        plan: Option<&MealPlan>,
    ) -> crate::Result<Option<MealPlan>> {
        if request.slots.is_empty() {
            return Err(GenerationError::Validation(
                "at least one meal slot is required".to_owned(),
            ));
        }

        let Some(plan) = plan else {
            let plan = MealPlan::new(
                &request.meal_plan_id,
                &request.user_id,
                request.range.start,
                request.range.end,
            )?;

            return Ok(Some(plan));
        };

        if plan.user_id != request.user_id {
            return Err(GenerationError::Validation(format!(
                "meal plan {} belongs to another user",
                plan.id
            )));
        }

        if !plan.range().contains_range(&request.range) {
            return Err(GenerationError::Validation(format!(
                "requested days {} - {} are outside meal plan {} ({} - {})",
                request.range.start, request.range.end, plan.id, plan.start_date, plan.end_date
            )));
        }

        Ok(None)
    }

    pub fn assemble(
        &self,
        request: &PlanRequest,
        snapshot: &CatalogSnapshot,
        cancel: &CancellationToken,
    ) -> crate::Result<GeneratedPlan> {
        let create = self.validate(request, snapshot.plan.as_ref())?;

        let exclusion = self
            .graph
            .resolve_for_user(&snapshot.allergies, &request.exclude_allergens);

        let filter =
            SafetyFilter::new(&snapshot.ingredients).with_policy(self.settings.may_contain);
        let safety = SafetyTable::evaluate(&filter, &snapshot.recipes, exclusion);

        let preferences = PreferenceModel::new(request.today, &snapshot.recipes)
            .with_history(&request.user_id, snapshot.history.iter().cloned());
        let affinity = preferences.cuisine_affinity(&request.user_id);
        let completion = preferences.completion_rate(&request.user_id);
        let mut recently_used =
            preferences.recently_used(&request.user_id, self.settings.lookback_days);

        let mut planned = HashSet::new();

        for entry in snapshot.entries.iter() {
            if request.range.contains(entry.meal_date) && request.slots.contains(&entry.meal_type)
            {
                planned.insert(entry.slot());
            }

            if let Some(id) = entry.recipe_id() {
                recently_used.insert(id.to_owned());
            }
        }

        let mut pools: BTreeMap<MealType, Vec<&Recipe>> = BTreeMap::new();
        let mut seen = HashSet::new();

        for recipe in snapshot.recipes.iter() {
            if request.slots.contains(&recipe.meal_type) && seen.insert(recipe.id.as_str()) {
                pools.entry(recipe.meal_type).or_default().push(recipe);
            }
        }

        let mut unreadable: BTreeMap<MealType, &MalformedRecipe> = BTreeMap::new();

        for row in snapshot.malformed.iter() {
            if let Some(meal_type) = row.meal_type.filter(|t| request.slots.contains(t)) {
                unreadable.entry(meal_type).or_insert(row);
            }
        }

        let scorer = RecipeScorer::new(self.settings.weights, self.settings.tie_epsilon);
        let mut ctx = ScoringContext {
            safety: &safety,
            affinity: &affinity,
            completion: &completion,
            recently_used,
            constraints: SlotConstraints {
                servings_tolerance: request
                    .constraints
                    .servings_tolerance
                    .or(self.settings.servings_tolerance),
                ..request.constraints.clone()
            },
        };

        let mut selected = Vec::new();
        let mut unfilled = Vec::new();
        let mut remove = Vec::new();

        for date in request.range.days() {
            for meal_type in request.slots.iter().copied() {
                if cancel.is_cancelled() {
                    tracing::info!(meal_plan_id = %request.meal_plan_id, "generation cancelled");

                    return Err(GenerationError::Cancelled);
                }

                let is_planned = planned.contains(&(date, meal_type));

                if is_planned && request.mode == RegenerateMode::FillGaps {
                    continue;
                }

                ctx.constraints.meal_type = Some(meal_type);

                let pool = pools.get(&meal_type).map(Vec::as_slice).unwrap_or_default();

                match scorer.select_smart_recipe(pool.iter().copied(), &ctx) {
                    Ok(selection) => {
                        tracing::debug!(
                            %date,
                            %meal_type,
                            recipe_id = %selection.recipe.id,
                            score = selection.score.score,
                            "slot assigned"
                        );

                        ctx.recently_used.insert(selection.recipe.id.to_owned());

                        if is_planned {
                            remove.push((date, meal_type));
                        }

                        let servings = request
                            .constraints
                            .servings
                            .unwrap_or(selection.recipe.servings);

                        selected.push((
                            selection.recipe,
                            Assignment {
                                date,
                                meal_type,
                                recipe_id: selection.recipe.id.to_owned(),
                                recipe_name: selection.recipe.name.to_owned(),
                                servings,
                                score: selection.score,
                                warnings: selection.verdict.warnings,
                            },
                        ));
                    }
                    Err(reason) => {
                        let reason = match (reason, unreadable.get(&meal_type)) {
                            (SlotFailureReason::NoCandidates, Some(row)) => {
                                SlotFailureReason::from(row.error.clone())
                            }
                            (reason, _) => reason,
                        };

                        tracing::warn!(%date, %meal_type, %reason, "slot left unfilled");

                        unfilled.push(SlotFailure {
                            date,
                            meal_type,
                            reason,
                        });
                    }
                }
            }
        }

        if selected.is_empty() && !unfilled.is_empty() {
            return Err(GenerationError::NoCandidatesAtAll { unfilled });
        }

        let shopping_list = ShoppingList::build(
            selected
                .iter()
                .flat_map(|(recipe, a)| shopping_items(recipe, a.servings, &snapshot.ingredients)),
        );

        let add = selected
            .iter()
            .map(|(_, a)| MealPlanEntry {
                meal_plan_id: request.meal_plan_id.to_owned(),
                meal_date: a.date,
                meal_type: a.meal_type,
                item: MealItem::Recipe(a.recipe_id.to_owned()),
                servings: a.servings,
                completed: false,
            })
            .collect::<Vec<_>>();

        let outcome = if unfilled.is_empty() {
            Outcome::Complete
        } else {
            Outcome::Partial
        };

        tracing::info!(
            meal_plan_id = %request.meal_plan_id,
            assigned = add.len(),
            unfilled = unfilled.len(),
            replaced = remove.len(),
            ?outcome,
            "meal plan assembled"
        );

        Ok(GeneratedPlan {
            meal_plan_id: request.meal_plan_id.to_owned(),
            user_id: request.user_id.to_owned(),
            range: request.range,
            outcome,
            exclusion: safety.exclusion().clone(),
            assignments: selected.into_iter().map(|(_, a)| a).collect(),
            unfilled,
            shopping_list,
            diff: PlanDiff {
                meal_plan_id: request.meal_plan_id.to_owned(),
                create,
                remove,
                add,
            },
        })
    }
}

/// Ingredient lines of a recipe scaled to the planned servings.
fn shopping_items<'r>(
    recipe: &'r Recipe,
    servings: u16,
    ingredients: &'r IngredientIndex,
) -> impl Iterator<Item = ShoppingItem> + 'r {
    let factor = servings as f32 / recipe.servings.max(1) as f32;

    recipe.ingredients.iter().map(move |ingredient| {
        let category = ingredients
            .get(&ingredient.name)
            .map(|r| r.ingredient.category)
            .filter(|c| *c != IngredientCategory::Other)
            .unwrap_or_else(|| CategorizationService::categorize(&ingredient.name));

        ShoppingItem {
            name: ingredient.name.trim().to_owned(),
            quantity: ingredient.quantity * factor,
            unit: ingredient.unit.to_owned(),
            category,
        }
    })
}

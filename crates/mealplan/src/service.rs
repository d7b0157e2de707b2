use std::collections::{BTreeSet, HashMap};
use std::sync::Arc;

use allersafe_allergen::{AllergenGraph, CatalogError, IngredientIndex, IngredientRecord};
use allersafe_shared::allergen::CrossReactivityGroup;
use allersafe_shared::mealplan::{MealPlan, MealPlanEntry, MealType};
use allersafe_shared::recipe::{CuisineType, Recipe};
use allersafe_shared::user::UserAllergy;
use allersafe_shared::{DateRange, name_key};
use async_trait::async_trait;
use serde::Deserialize;
use time::Date;
use tokio::sync::RwLock;
use tokio_util::sync::CancellationToken;
use validator::Validate;

use crate::{
    CatalogSnapshot, GeneratedPlan, GenerationError, GenerationSettings, MealPlanAssembler,
    PlanDiff, PlanRequest, RegenerateMode, SlotConstraints,
};

/// Recipes matching any of `meal_types` (all when empty), plus every recipe
/// listed in `include_ids`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecipeFilter {
    pub meal_types: Vec<MealType>,
    pub include_ids: Vec<String>,
}

impl RecipeFilter {
    pub fn matches(&self, recipe: &Recipe) -> bool {
        self.meal_types.is_empty()
            || self.meal_types.contains(&recipe.meal_type)
            || self.include_ids.contains(&recipe.id)
    }
}

/// A catalog row matching a filter that could not be turned into a [`Recipe`].
#[derive(Debug, Clone, PartialEq)]
pub struct MalformedRecipe {
    pub recipe_id: String,
    /// `None` when the meal type itself is unreadable.
    pub meal_type: Option<MealType>,
    pub error: CatalogError,
}

#[async_trait]
pub trait CatalogReader: Send + Sync {
    /// Readable recipes only, see [`CatalogReader::get_malformed_recipes`].
    async fn get_recipes(&self, filter: &RecipeFilter) -> allersafe_shared::Result<Vec<Recipe>>;

    async fn get_malformed_recipes(
        &self,
        _filter: &RecipeFilter,
    ) -> allersafe_shared::Result<Vec<MalformedRecipe>> {
        Ok(vec![])
    }

    /// Records keyed by normalised ingredient name. Unknown names are absent.
    async fn get_ingredient_allergens(
        &self,
        ingredient_names: &[String],
    ) -> allersafe_shared::Result<HashMap<String, IngredientRecord>>;

    async fn get_allergen_groups(&self) -> allersafe_shared::Result<Vec<CrossReactivityGroup>>;
}

#[async_trait]
pub trait HistoryReader: Send + Sync {
    async fn get_user_allergies(&self, user_id: &str)
    -> allersafe_shared::Result<Vec<UserAllergy>>;

    /// Entries of every plan owned by the user dated within `window`.
    async fn get_user_meal_history(
        &self,
        user_id: &str,
        window: DateRange,
    ) -> allersafe_shared::Result<Vec<MealPlanEntry>>;

    async fn get_meal_plan(&self, meal_plan_id: &str)
    -> allersafe_shared::Result<Option<MealPlan>>;

    async fn get_meal_plan_entries(
        &self,
        meal_plan_id: &str,
    ) -> allersafe_shared::Result<Vec<MealPlanEntry>>;
}

#[async_trait]
pub trait PlanWriter: Send + Sync {
    /// Applies the whole diff or nothing.
    async fn apply(&self, diff: &PlanDiff) -> allersafe_shared::Result<()>;
}

fn validate_slots(slots: &[MealType]) -> Result<(), validator::ValidationError> {
    if slots.is_empty() {
        return Err(validator::ValidationError::new("slots")
            .with_message("at least one meal slot is required".into()));
    }

    Ok(())
}

#[derive(Debug, Clone, Validate, Deserialize)]
pub struct Generate {
    #[validate(length(min = 1, message = "User is required"))]
    pub user_id: String,
    #[validate(length(min = 1, message = "Meal plan is required"))]
    pub meal_plan_id: String,
    pub start: Date,
    pub end: Date,
    #[validate(custom(function = "validate_slots"))]
    pub slots: Vec<MealType>,
    #[serde(default)]
    pub cuisine_type: Option<CuisineType>,
    #[serde(default)]
    pub max_prep_time: Option<u16>,
    #[serde(default)]
    pub max_cook_time: Option<u16>,
    #[validate(range(min = 1, message = "Servings must be at least 1"))]
    #[serde(default)]
    pub servings: Option<u16>,
    #[validate(range(min = 1, message = "Target calories must be at least 1"))]
    #[serde(default)]
    pub target_calories: Option<u16>,
    #[serde(default)]
    pub exclude_allergens: Vec<String>,
    #[serde(default)]
    pub mode: RegenerateMode,
    /// Reference day for history windows, defaults to the current UTC day.
    #[serde(default)]
    pub today: Option<Date>,
}

impl Generate {
    fn into_request(self) -> crate::Result<PlanRequest> {
        self.validate()?;

        let range = DateRange::new(self.start, self.end)?;

        Ok(PlanRequest {
            user_id: self.user_id,
            meal_plan_id: self.meal_plan_id,
            range,
            slots: self.slots.into_iter().collect::<BTreeSet<_>>(),
            constraints: SlotConstraints {
                meal_type: None,
                cuisine_type: self.cuisine_type,
                max_prep_time: self.max_prep_time,
                max_cook_time: self.max_cook_time,
                servings: self.servings,
                servings_tolerance: None,
                target_calories: self.target_calories,
            },
            exclude_allergens: self
                .exclude_allergens
                .iter()
                .map(|id| id.trim().to_owned())
                .filter(|id| !id.is_empty())
                .collect(),
            mode: self.mode,
            today: self.today.unwrap_or_else(allersafe_shared::today),
        })
    }
}

/// Generation entry point: one bulk read, one pure assembly, one atomic write.
pub struct Command<C, H, W> {
    catalog: C,
    history: H,
    writer: W,
    settings: GenerationSettings,
    graph: RwLock<Option<Arc<AllergenGraph>>>,
}

impl<C: CatalogReader, H: HistoryReader, W: PlanWriter> Command<C, H, W> {
    pub fn new(catalog: C, history: H, writer: W, settings: GenerationSettings) -> Self {
        Self {
            catalog,
            history,
            writer,
            settings,
            graph: RwLock::new(None),
        }
    }

    pub fn settings(&self) -> &GenerationSettings {
        &self.settings
    }

    /// Cross-reactivity graph, built on first use and shared by every run.
    pub async fn allergen_graph(&self) -> crate::Result<Arc<AllergenGraph>> {
        if let Some(graph) = self.graph.read().await.as_ref() {
            return Ok(graph.clone());
        }

        let mut cached = self.graph.write().await;

        if let Some(graph) = cached.as_ref() {
            return Ok(graph.clone());
        }

        let graph = self.build_allergen_graph().await?;
        *cached = Some(graph.clone());

        Ok(graph)
    }

    /// Rebuilds the cached graph from the catalog. Runs already holding the
    /// previous graph keep using it.
    pub async fn refresh_allergen_graph(&self) -> crate::Result<Arc<AllergenGraph>> {
        let graph = self.build_allergen_graph().await?;
        *self.graph.write().await = Some(graph.clone());

        tracing::info!(
            allergens = graph.len(),
            edges = graph.edge_count(),
            "allergen graph refreshed"
        );

        Ok(graph)
    }

    async fn build_allergen_graph(&self) -> crate::Result<Arc<AllergenGraph>> {
        let groups = self.catalog.get_allergen_groups().await?;

        Ok(Arc::new(AllergenGraph::from_groups(&groups)))
    }

    async fn load_snapshot(&self, request: &PlanRequest) -> crate::Result<CatalogSnapshot> {
        let plan = self.history.get_meal_plan(&request.meal_plan_id).await?;
        let entries = match plan {
            Some(_) => {
                self.history
                    .get_meal_plan_entries(&request.meal_plan_id)
                    .await?
            }
            None => vec![],
        };

        let allergies = self.history.get_user_allergies(&request.user_id).await?;
        let history = self
            .history
            .get_user_meal_history(
                &request.user_id,
                DateRange::trailing(request.today, self.settings.history_days),
            )
            .await?;

        let filter = RecipeFilter {
            meal_types: request.slots.iter().copied().collect(),
            include_ids: history
                .iter()
                .filter_map(|e| e.recipe_id().map(ToOwned::to_owned))
                .collect::<BTreeSet<_>>()
                .into_iter()
                .collect(),
        };

        let recipes = self.catalog.get_recipes(&filter).await?;
        let malformed = self.catalog.get_malformed_recipes(&filter).await?;

        let names = recipes
            .iter()
            .flat_map(|r| r.ingredients.iter().map(|i| name_key(&i.name)))
            .filter(|n| !n.is_empty())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect::<Vec<_>>();

        let ingredients = self.catalog.get_ingredient_allergens(&names).await?;

        tracing::debug!(
            recipes = recipes.len(),
            malformed = malformed.len(),
            ingredients = ingredients.len(),
            allergies = allergies.len(),
            history = history.len(),
            "catalog snapshot loaded"
        );

        Ok(CatalogSnapshot {
            recipes,
            malformed,
            ingredients: IngredientIndex::from(ingredients),
            allergies,
            history,
            plan,
            entries,
        })
    }

    #[tracing::instrument(skip_all, fields(user_id = %input.user_id, meal_plan_id = %input.meal_plan_id))]
    pub async fn generate(
        &self,
        input: Generate,
        cancel: &CancellationToken,
    ) -> crate::Result<GeneratedPlan> {
        let request = input.into_request()?;
        let graph = self.allergen_graph().await?;
        let snapshot = self.load_snapshot(&request).await?;

        let generated =
            MealPlanAssembler::new(&graph, &self.settings).assemble(&request, &snapshot, cancel)?;

        if cancel.is_cancelled() {
            return Err(GenerationError::Cancelled);
        }

        if !generated.diff.is_empty() {
            self.writer.apply(&generated.diff).await?;
        }

        Ok(generated)
    }
}

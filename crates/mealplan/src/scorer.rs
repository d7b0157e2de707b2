use std::collections::{HashMap, HashSet};

use allersafe_allergen::{AllergenSet, CatalogError, SafetyFilter, SafetyVerdict, UnsafeReason};
use allersafe_shared::mealplan::MealType;
use allersafe_shared::recipe::{CuisineType, Recipe};
use serde::Serialize;

use crate::{CompletionRates, CuisineAffinity, SlotFailureReason, Weights};

/// Neutral completion rate for recipes never served.
pub const NEUTRAL_COMPLETION: f32 = 0.5;

/// Hard constraints of a slot.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct SlotConstraints {
    pub meal_type: Option<MealType>,
    pub cuisine_type: Option<CuisineType>,
    pub max_prep_time: Option<u16>,
    pub max_cook_time: Option<u16>,
    pub servings: Option<u16>,
    pub servings_tolerance: Option<u16>,
    pub target_calories: Option<u16>,
}

impl SlotConstraints {
    pub fn violation(&self, recipe: &Recipe) -> Option<ConstraintViolation> {
        if self.meal_type.is_some_and(|t| t != recipe.meal_type) {
            return Some(ConstraintViolation::MealType);
        }

        if self.cuisine_type.is_some_and(|c| c != recipe.cuisine_type) {
            return Some(ConstraintViolation::CuisineType);
        }

        if self.max_prep_time.is_some_and(|max| recipe.prep_time > max) {
            return Some(ConstraintViolation::PrepTime);
        }

        if self.max_cook_time.is_some_and(|max| recipe.cook_time > max) {
            return Some(ConstraintViolation::CookTime);
        }

        let out_of_tolerance = self
            .servings_tolerance
            .zip(self.servings_deviation(recipe))
            .is_some_and(|(tolerance, deviation)| deviation > tolerance);

        if out_of_tolerance {
            return Some(ConstraintViolation::Servings);
        }

        None
    }

    /// Absolute distance between recipe and requested servings, `None` when
    /// no servings were requested.
    pub fn servings_deviation(&self, recipe: &Recipe) -> Option<u16> {
        self.servings.map(|s| s.abs_diff(recipe.servings))
    }

    /// `1 - min(1, |calories - target| / target)`, neutral `1.0` when either
    /// side is unknown.
    pub fn nutrition_fit(&self, recipe: &Recipe) -> f32 {
        let (Some(target), Some(calories)) = (self.target_calories, recipe.calories_per_serving)
        else {
            return 1.0;
        };

        if target == 0 {
            return 1.0;
        }

        let gap = target.abs_diff(calories) as f32 / target as f32;

        1.0 - gap.min(1.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ConstraintViolation {
    MealType,
    CuisineType,
    PrepTime,
    CookTime,
    Servings,
}

/// Why a candidate got no score.
#[derive(Debug, Clone, PartialEq)]
pub enum Rejection {
    Constraint(ConstraintViolation),
    Unsafe(Vec<UnsafeReason>),
    Malformed(CatalogError),
}

/// Safety verdicts of a catalog snapshot for one exclusion set.
///
/// Recipes unknown to the table are rejected as unsafe.
#[derive(Debug, Clone, Default)]
pub struct SafetyTable {
    exclusion: AllergenSet,
    verdicts: HashMap<String, Result<SafetyVerdict, CatalogError>>,
}

impl SafetyTable {
    pub fn evaluate<'r>(
        filter: &SafetyFilter<'_>,
        recipes: impl IntoIterator<Item = &'r Recipe>,
        exclusion: AllergenSet,
    ) -> Self {
        let verdicts = recipes
            .into_iter()
            .map(|r| (r.id.to_owned(), filter.inspect(r, &exclusion)))
            .collect();

        Self {
            exclusion,
            verdicts,
        }
    }

    pub fn exclusion(&self) -> &AllergenSet {
        &self.exclusion
    }

    pub fn verdict(&self, recipe_id: &str) -> Option<&Result<SafetyVerdict, CatalogError>> {
        self.verdicts.get(recipe_id)
    }

    fn check(&self, recipe: &Recipe) -> Result<&SafetyVerdict, Rejection> {
        match self.verdicts.get(&recipe.id) {
            Some(Ok(verdict)) if verdict.is_safe() => Ok(verdict),
            Some(Ok(verdict)) => Err(Rejection::Unsafe(verdict.reasons.to_vec())),
            Some(Err(err)) => Err(Rejection::Malformed(err.clone())),
            None => Err(Rejection::Unsafe(vec![])),
        }
    }
}

/// Everything needed to score candidates for one slot.
///
/// `recently_used` is owned so the assembler can grow it as slots get filled.
#[derive(Debug, Clone)]
pub struct ScoringContext<'a> {
    pub safety: &'a SafetyTable,
    pub affinity: &'a CuisineAffinity,
    pub completion: &'a CompletionRates,
    pub recently_used: HashSet<String>,
    pub constraints: SlotConstraints,
}

impl ScoringContext<'_> {
    pub fn exclusion(&self) -> &AllergenSet {
        self.safety.exclusion()
    }
}

/// Score breakdown of a candidate that passed the hard filters.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RecipeScore {
    pub recipe_id: String,
    pub safe: bool,
    pub preference: f32,
    pub completion: f32,
    pub variety_penalty: f32,
    pub nutrition_fit: f32,
    pub score: f32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct Selection<'r> {
    pub recipe: &'r Recipe,
    pub score: RecipeScore,
    pub verdict: SafetyVerdict,
}

/// Ranks candidates. Deterministic: ties are broken by servings deviation,
/// then by lowest recipe id.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RecipeScorer {
    weights: Weights,
    tie_epsilon: f32,
}

impl Default for RecipeScorer {
    fn default() -> Self {
        Self::new(Weights::default(), 0.01)
    }
}

impl RecipeScorer {
    pub fn new(weights: Weights, tie_epsilon: f32) -> Self {
        Self {
            weights,
            tie_epsilon,
        }
    }

    pub fn score(
        &self,
        recipe: &Recipe,
        ctx: &ScoringContext<'_>,
    ) -> Result<RecipeScore, Rejection> {
        self.evaluate(recipe, ctx).map(|(score, _)| score)
    }

    fn evaluate<'c>(
        &self,
        recipe: &Recipe,
        ctx: &'c ScoringContext<'_>,
    ) -> Result<(RecipeScore, &'c SafetyVerdict), Rejection> {
        if let Some(violation) = ctx.constraints.violation(recipe) {
            return Err(Rejection::Constraint(violation));
        }

        let verdict = ctx.safety.check(recipe)?;

        let preference = ctx.affinity.get(recipe.cuisine_type);
        let completion = ctx
            .completion
            .get(&recipe.id)
            .unwrap_or(NEUTRAL_COMPLETION);
        let variety_penalty = if ctx.recently_used.contains(&recipe.id) {
            1.0
        } else {
            0.0
        };
        let nutrition_fit = ctx.constraints.nutrition_fit(recipe);

        let score = self.weights.cuisine * preference + self.weights.completion * completion
            - self.weights.variety * variety_penalty
            + self.weights.nutrition * nutrition_fit;

        Ok((
            RecipeScore {
                recipe_id: recipe.id.to_owned(),
                safe: true,
                preference,
                completion,
                variety_penalty,
                nutrition_fit,
                score,
            },
            verdict,
        ))
    }

    /// Best candidate of the pool, or why there is none.
    ///
    /// Every candidate within the tie epsilon of the top score is a
    /// contender; among those the smallest servings deviation wins, then
    /// the lowest recipe id.
    pub fn select_smart_recipe<'r>(
        &self,
        candidates: impl IntoIterator<Item = &'r Recipe>,
        ctx: &ScoringContext<'_>,
    ) -> Result<Selection<'r>, SlotFailureReason> {
        let mut scored: Vec<(&'r Recipe, RecipeScore, &SafetyVerdict)> = Vec::new();
        let mut matched = 0usize;
        let mut unsafe_count = 0usize;
        let mut malformed: Option<CatalogError> = None;

        for recipe in candidates {
            match self.evaluate(recipe, ctx) {
                Ok((score, verdict)) => {
                    matched += 1;
                    scored.push((recipe, score, verdict));
                }
                Err(Rejection::Constraint(_)) => {}
                Err(Rejection::Unsafe(_)) => {
                    matched += 1;
                    unsafe_count += 1;
                }
                Err(Rejection::Malformed(err)) => {
                    matched += 1;
                    malformed.get_or_insert(err);
                }
            }
        }

        let top = scored
            .iter()
            .map(|(_, score, _)| score.score)
            .fold(f32::NEG_INFINITY, f32::max);

        let deviation = |r: &Recipe| ctx.constraints.servings_deviation(r).unwrap_or(0);

        let best = scored
            .into_iter()
            .filter(|(_, score, _)| top - score.score <= self.tie_epsilon)
            .min_by(|(a, _, _), (b, _, _)| {
                deviation(*a)
                    .cmp(&deviation(*b))
                    .then_with(|| a.id.cmp(&b.id))
            });

        if let Some((recipe, score, verdict)) = best {
            return Ok(Selection {
                recipe,
                score,
                verdict: verdict.clone(),
            });
        }

        if matched == 0 {
            return Err(SlotFailureReason::NoCandidates);
        }

        match malformed {
            Some(err) if unsafe_count == 0 => Err(err.into()),
            _ => Err(SlotFailureReason::NoSafeCandidates),
        }
    }
}

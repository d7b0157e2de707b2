use std::collections::hash_map::Entry;
use std::collections::{BTreeSet, HashMap};

use allersafe_shared::allergen::{AllergenType, IngredientAllergen};
use allersafe_shared::name_key;
use allersafe_shared::recipe::{Ingredient, IngredientCategory, Recipe};
use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString};

use crate::{AllergenSet, CatalogError};

/// Whether "may contain" tags exclude a recipe or only warn about it.
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
pub enum MayContainPolicy {
    #[default]
    Exclude,
    Warn,
}

/// An ingredient record together with its allergen tags.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct IngredientRecord {
    pub ingredient: Ingredient,
    #[serde(default)]
    pub allergens: Vec<IngredientAllergen>,
}

impl IngredientRecord {
    /// Folds in another record of the same ingredient name. Tags are
    /// unioned so no allergen is ever dropped.
    pub fn merge(&mut self, other: IngredientRecord) {
        if self.ingredient.category == IngredientCategory::Other {
            self.ingredient.category = other.ingredient.category;
        }

        for tag in other.allergens {
            let known = self
                .allergens
                .iter()
                .any(|t| t.allergen_id == tag.allergen_id && t.allergen_type == tag.allergen_type);

            if !known {
                self.allergens.push(tag);
            }
        }
    }
}

/// Name-keyed lookup of ingredient records (trimmed, case-insensitive).
#[derive(Clone, Debug, Default)]
pub struct IngredientIndex {
    by_name: HashMap<String, IngredientRecord>,
}

impl IngredientIndex {
    /// Records sharing a name key are merged.
    pub fn new(records: impl IntoIterator<Item = IngredientRecord>) -> Self {
        let mut by_name: HashMap<String, IngredientRecord> = HashMap::new();

        for record in records {
            match by_name.entry(name_key(&record.ingredient.name)) {
                Entry::Occupied(mut entry) => entry.get_mut().merge(record),
                Entry::Vacant(entry) => {
                    entry.insert(record);
                }
            }
        }

        Self { by_name }
    }

    pub fn into_records(self) -> HashMap<String, IngredientRecord> {
        self.by_name
    }

    pub fn get(&self, name: &str) -> Option<&IngredientRecord> {
        self.by_name.get(&name_key(name))
    }

    pub fn len(&self) -> usize {
        self.by_name.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_name.is_empty()
    }
}

impl From<HashMap<String, IngredientRecord>> for IngredientIndex {
    fn from(value: HashMap<String, IngredientRecord>) -> Self {
        Self::new(value.into_values())
    }
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum UnsafeReason {
    DeclaredAllergen {
        allergen_id: String,
    },
    IngredientAllergen {
        ingredient: String,
        allergen_id: String,
        allergen_type: AllergenType,
    },
    UnknownIngredient {
        ingredient: String,
    },
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub enum SafetyWarning {
    MayContain {
        ingredient: String,
        allergen_id: String,
    },
}

#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct SafetyVerdict {
    pub reasons: Vec<UnsafeReason>,
    pub warnings: Vec<SafetyWarning>,
}

impl SafetyVerdict {
    pub fn is_safe(&self) -> bool {
        self.reasons.is_empty()
    }
}

/// Declared allergens of a recipe disagree with what its ingredients carry.
#[derive(Clone, Debug, PartialEq)]
pub struct DataInconsistency {
    pub recipe_id: String,
    pub declared: AllergenSet,
    pub derived: AllergenSet,
}

/// Classifies recipes against an exclusion set.
///
/// A recipe is rejected when its declared allergens intersect the exclusion
/// set OR when any of its ingredients carries an excluded allergen tag.
/// Ingredient names that resolve to no record make the recipe unsafe as
/// soon as something is excluded.
pub struct SafetyFilter<'a> {
    ingredients: &'a IngredientIndex,
    may_contain: MayContainPolicy,
}

impl<'a> SafetyFilter<'a> {
    pub fn new(ingredients: &'a IngredientIndex) -> Self {
        Self {
            ingredients,
            may_contain: MayContainPolicy::default(),
        }
    }

    pub fn with_policy(mut self, may_contain: MayContainPolicy) -> Self {
        self.may_contain = may_contain;
        self
    }

    /// Full verdict with every reason a recipe is unsafe.
    pub fn inspect(
        &self,
        recipe: &Recipe,
        exclusion: &AllergenSet,
    ) -> Result<SafetyVerdict, CatalogError> {
        validate(recipe)?;

        let mut verdict = SafetyVerdict::default();

        for declared in recipe.allergens.iter() {
            if exclusion.contains(declared.allergen_id.trim()) {
                verdict.reasons.push(UnsafeReason::DeclaredAllergen {
                    allergen_id: declared.allergen_id.trim().to_owned(),
                });
            }
        }

        for ingredient in recipe.ingredients.iter() {
            let Some(record) = self.ingredients.get(&ingredient.name) else {
                if !exclusion.is_empty() {
                    verdict.reasons.push(UnsafeReason::UnknownIngredient {
                        ingredient: ingredient.name.trim().to_owned(),
                    });
                }

                continue;
            };

            for tag in record.allergens.iter() {
                if !exclusion.contains(&tag.allergen_id) {
                    continue;
                }

                match (tag.allergen_type, self.may_contain) {
                    (AllergenType::MayContain, MayContainPolicy::Warn) => {
                        verdict.warnings.push(SafetyWarning::MayContain {
                            ingredient: record.ingredient.name.to_owned(),
                            allergen_id: tag.allergen_id.to_owned(),
                        })
                    }
                    (allergen_type, _) => verdict.reasons.push(UnsafeReason::IngredientAllergen {
                        ingredient: record.ingredient.name.to_owned(),
                        allergen_id: tag.allergen_id.to_owned(),
                        allergen_type,
                    }),
                }
            }
        }

        if let Some(inconsistency) = self.inconsistency(recipe) {
            tracing::warn!(
                recipe_id = %inconsistency.recipe_id,
                declared = ?inconsistency.declared,
                derived = ?inconsistency.derived,
                "recipe allergens disagree with its ingredients"
            );
        }

        Ok(verdict)
    }

    /// Malformed recipes are never safe.
    pub fn is_safe(&self, recipe: &Recipe, exclusion: &AllergenSet) -> bool {
        self.inspect(recipe, exclusion)
            .map(|v| v.is_safe())
            .unwrap_or(false)
    }

    pub fn filter_safe<'r>(
        &self,
        recipes: impl IntoIterator<Item = &'r Recipe>,
        exclusion: &AllergenSet,
    ) -> Vec<&'r Recipe> {
        recipes
            .into_iter()
            .filter(|r| self.is_safe(r, exclusion))
            .collect()
    }

    /// Compares declared allergens with those derived from "contains" tags.
    /// Skipped when an ingredient cannot be resolved, since the derived set
    /// would be incomplete.
    pub fn inconsistency(&self, recipe: &Recipe) -> Option<DataInconsistency> {
        let mut derived = BTreeSet::new();

        for ingredient in recipe.ingredients.iter() {
            let record = self.ingredients.get(&ingredient.name)?;

            derived.extend(
                record
                    .allergens
                    .iter()
                    .filter(|t| t.allergen_type == AllergenType::Contains)
                    .map(|t| t.allergen_id.to_owned()),
            );
        }

        let declared = recipe
            .allergens
            .iter()
            .map(|a| a.allergen_id.trim().to_owned())
            .collect::<AllergenSet>();

        if declared == derived {
            return None;
        }

        Some(DataInconsistency {
            recipe_id: recipe.id.to_owned(),
            declared,
            derived,
        })
    }
}

fn validate(recipe: &Recipe) -> Result<(), CatalogError> {
    if recipe.servings == 0 {
        return Err(CatalogError::NoServings {
            recipe_id: recipe.id.to_owned(),
        });
    }

    for ingredient in recipe.ingredients.iter() {
        if ingredient.name.trim().is_empty() {
            return Err(CatalogError::UnnamedIngredient {
                recipe_id: recipe.id.to_owned(),
            });
        }

        if !ingredient.quantity.is_finite() || ingredient.quantity < 0.0 {
            return Err(CatalogError::InvalidQuantity {
                recipe_id: recipe.id.to_owned(),
                ingredient: ingredient.name.to_owned(),
            });
        }
    }

    if recipe.allergens.iter().any(|a| a.allergen_id.trim().is_empty()) {
        return Err(CatalogError::MissingAllergenReference {
            recipe_id: recipe.id.to_owned(),
        });
    }

    Ok(())
}

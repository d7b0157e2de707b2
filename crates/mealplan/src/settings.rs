use allersafe_allergen::MayContainPolicy;
use serde::{Deserialize, Serialize};

/// Weights of the soft score.
///
/// `score = cuisine * affinity + completion * completion_rate - variety * penalty + nutrition * fit`
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Weights {
    pub cuisine: f32,
    pub completion: f32,
    pub variety: f32,
    pub nutrition: f32,
}

impl Default for Weights {
    fn default() -> Self {
        Self {
            cuisine: 0.4,
            completion: 0.4,
            variety: 0.6,
            nutrition: 0.0,
        }
    }
}

/// Tunables of a generation run, loaded from the `generation` config section.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationSettings {
    /// Days ending at today, today included, whose recipes get the variety
    /// penalty.
    pub lookback_days: u16,
    /// Days ending at today used for cuisine affinity and completion rates.
    pub history_days: u16,
    pub weights: Weights,
    pub tie_epsilon: f32,
    pub may_contain: MayContainPolicy,
    /// When set, recipes whose servings differ from the requested servings
    /// by more than this are excluded instead of only losing ties.
    pub servings_tolerance: Option<u16>,
}

impl Default for GenerationSettings {
    fn default() -> Self {
        Self {
            lookback_days: 14,
            history_days: 90,
            weights: Weights::default(),
            tie_epsilon: 0.01,
            may_contain: MayContainPolicy::default(),
            servings_tolerance: None,
        }
    }
}

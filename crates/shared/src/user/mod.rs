use serde::{Deserialize, Serialize};
use strum::{AsRefStr, Display, EnumString, VariantArray};

use crate::recipe::CuisineType;

#[derive(
    EnumString,
    VariantArray,
    Display,
    AsRefStr,
    Clone,
    Copy,
    Debug,
    Default,
    PartialEq,
    Eq,
    PartialOrd,
    Ord,
    Serialize,
    Deserialize,
)]
pub enum Severity {
    Mild,
    #[default]
    Moderate,
    Severe,
    Anaphylactic,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct UserAllergy {
    pub user_id: String,
    pub allergen_id: String,
    #[serde(default)]
    pub severity: Severity,
    #[serde(default)]
    pub outgrown: bool,
}

impl UserAllergy {
    pub fn is_active(&self) -> bool {
        !self.outgrown
    }
}

/// Derived from meal history, never entered by the user.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct UserCuisinePreference {
    pub user_id: String,
    pub cuisine_type: CuisineType,
    pub affinity: f32,
}

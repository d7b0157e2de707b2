use allersafe_allergen::CatalogError;
use allersafe_shared::mealplan::MealType;
use serde::Serialize;
use time::Date;

/// Why a slot was left empty.
#[derive(Debug, Clone, PartialEq, Serialize, thiserror::Error)]
#[serde(tag = "kind", content = "detail", rename_all = "snake_case")]
pub enum SlotFailureReason {
    #[error("no recipe matches the meal type and constraints")]
    NoCandidates,

    #[error("no recipe is safe for the user's allergies")]
    NoSafeCandidates,

    #[error("catalog error: {0}")]
    Catalog(String),
}

impl From<CatalogError> for SlotFailureReason {
    fn from(value: CatalogError) -> Self {
        Self::Catalog(value.to_string())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SlotFailure {
    pub date: Date,
    pub meal_type: MealType,
    pub reason: SlotFailureReason,
}

#[derive(Debug, thiserror::Error)]
pub enum GenerationError {
    #[error("{0}")]
    Validation(String),

    #[error("no requested slot could be filled ({} unfilled)", unfilled.len())]
    NoCandidatesAtAll { unfilled: Vec<SlotFailure> },

    #[error("generation cancelled")]
    Cancelled,

    #[error(transparent)]
    Collaborator(allersafe_shared::Error),
}

impl From<allersafe_shared::Error> for GenerationError {
    fn from(value: allersafe_shared::Error) -> Self {
        match value {
            allersafe_shared::Error::Validation(message) => Self::Validation(message),
            allersafe_shared::Error::Validate(errors) => Self::Validation(errors.to_string()),
            other => Self::Collaborator(other),
        }
    }
}

impl From<validator::ValidationErrors> for GenerationError {
    fn from(value: validator::ValidationErrors) -> Self {
        Self::Validation(value.to_string())
    }
}

pub type Result<T> = std::result::Result<T, GenerationError>;

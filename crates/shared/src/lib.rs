pub mod allergen;
mod date;
mod error;
pub mod mealplan;
pub mod recipe;
pub mod user;

pub use date::*;
pub use error::*;

/// Generates a new sortable identifier for entities created by the engine.
pub fn new_id() -> String {
    ulid::Ulid::new().to_string()
}

/// Lookup key used for every name-based association (ingredient names,
/// shopping list lines): trimmed and lowercased.
pub fn name_key(name: &str) -> String {
    name.trim().to_lowercase()
}

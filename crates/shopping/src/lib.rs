pub mod aggregation;
pub mod categorization;
mod list;

pub use aggregation::{AggregatedIngredient, IngredientAggregationService, ShoppingItem};
pub use categorization::CategorizationService;
pub use list::*;

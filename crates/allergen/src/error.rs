use thiserror::Error;

/// A catalog row the engine cannot reason about.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum CatalogError {
    #[error("recipe {recipe_id} has an ingredient without a name")]
    UnnamedIngredient { recipe_id: String },

    #[error("recipe {recipe_id} has an invalid quantity for {ingredient}")]
    InvalidQuantity {
        recipe_id: String,
        ingredient: String,
    },

    #[error("recipe {recipe_id} declares an empty allergen reference")]
    MissingAllergenReference { recipe_id: String },

    #[error("recipe {recipe_id} serves nobody")]
    NoServings { recipe_id: String },

    #[error("recipe {recipe_id} could not be read: {detail}")]
    Unreadable { recipe_id: String, detail: String },
}

use std::collections::BTreeMap;

use allersafe_shared::recipe::IngredientCategory;
use serde::Serialize;

use crate::{IngredientAggregationService, ShoppingItem};

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ShoppingListLine {
    pub name: String,
    pub quantity: f32,
    pub unit: String,
    pub display: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ShoppingListSection {
    pub category: IngredientCategory,
    pub lines: Vec<ShoppingListLine>,
}

/// Aggregated ingredients of a generated plan, one section per aisle.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ShoppingList {
    pub sections: Vec<ShoppingListSection>,
}

impl ShoppingList {
    pub fn build(items: impl IntoIterator<Item = ShoppingItem>) -> Self {
        let mut sections: BTreeMap<IngredientCategory, Vec<ShoppingListLine>> = BTreeMap::new();

        for ingredient in IngredientAggregationService::aggregate(items) {
            let display = format!(
                "{}, {}",
                ingredient.name,
                IngredientAggregationService::format_quantity(ingredient.quantity, &ingredient.unit)
            );

            sections
                .entry(ingredient.category)
                .or_default()
                .push(ShoppingListLine {
                    name: ingredient.name,
                    quantity: ingredient.quantity,
                    unit: ingredient.unit,
                    display,
                });
        }

        let sections = sections
            .into_iter()
            .map(|(category, lines)| ShoppingListSection { category, lines })
            .collect::<Vec<_>>();

        tracing::debug!(sections = sections.len(), "shopping list built");

        Self { sections }
    }

    pub fn lines(&self) -> impl Iterator<Item = &ShoppingListLine> {
        self.sections.iter().flat_map(|s| s.lines.iter())
    }

    pub fn section(&self, category: IngredientCategory) -> Option<&ShoppingListSection> {
        self.sections.iter().find(|s| s.category == category)
    }

    pub fn is_empty(&self) -> bool {
        self.sections.is_empty()
    }
}

use std::collections::HashMap;

use allersafe_shared::name_key;
use allersafe_shared::recipe::IngredientCategory;

/// One ingredient line contributed by a planned meal, already scaled to the
/// servings of that meal.
#[derive(Debug, Clone, PartialEq)]
pub struct ShoppingItem {
    pub name: String,
    pub quantity: f32,
    pub unit: String,
    pub category: IngredientCategory,
}

#[derive(Debug, Clone, PartialEq)]
pub struct AggregatedIngredient {
    /// Name as first seen, trimmed.
    pub name: String,
    pub quantity: f32,
    /// Base unit after normalisation (`g`, `ml`, `item` or the unit as written).
    pub unit: String,
    pub category: IngredientCategory,
}

/// Ingredient Aggregation Service
///
/// Stateless domain service that normalizes ingredient names, converts units,
/// and sums quantities for shopping list generation.
///
/// - "Flour 200g" + "flour 100g" = "Flour 300 g"
/// - "milk 1 cup" + "milk 240ml" = "milk 480 ml"
/// - "onion 1 whole" + "onion 1 cup" = 2 separate lines (incompatible units)
pub struct IngredientAggregationService;

impl IngredientAggregationService {
    /// Groups by (normalized name, base unit) and sums quantities. Output is
    /// sorted by normalized name then unit.
    pub fn aggregate(items: impl IntoIterator<Item = ShoppingItem>) -> Vec<AggregatedIngredient> {
        let mut groups: HashMap<(String, String), AggregatedIngredient> = HashMap::new();

        for item in items {
            let (unit, quantity) = Self::normalize_unit(&item.unit, item.quantity);
            let key = (name_key(&item.name), unit.to_owned());

            let entry = groups
                .entry(key)
                .or_insert_with(|| AggregatedIngredient {
                    name: item.name.trim().to_owned(),
                    quantity: 0.0,
                    unit,
                    category: item.category,
                });

            entry.quantity += quantity;

            if entry.category == IngredientCategory::Other {
                entry.category = item.category;
            }
        }

        let mut result = groups.into_iter().collect::<Vec<_>>();
        result.sort_by(|(a, _), (b, _)| a.cmp(b));

        result.into_iter().map(|(_, v)| v).collect()
    }

    /// Normalize unit and convert quantity to base unit
    ///
    /// Base units:
    /// - Volume: ml
    /// - Weight: grams (g)
    /// - Count: item/whole/piece
    ///
    /// Unknown units are kept as written (lowercased) and only merge with
    /// themselves.
    pub fn normalize_unit(unit: &str, quantity: f32) -> (String, f32) {
        let normalized_unit = unit.trim().to_lowercase();

        match normalized_unit.as_str() {
            "cup" | "cups" => ("ml".to_owned(), quantity * 240.0),
            "tbsp" | "tablespoon" | "tablespoons" => ("ml".to_owned(), quantity * 15.0),
            "tsp" | "teaspoon" | "teaspoons" => ("ml".to_owned(), quantity * 5.0),
            "ml" | "milliliter" | "milliliters" => ("ml".to_owned(), quantity),
            "cl" => ("ml".to_owned(), quantity * 10.0),
            "l" | "liter" | "liters" => ("ml".to_owned(), quantity * 1000.0),

            "g" | "gram" | "grams" => ("g".to_owned(), quantity),
            "kg" | "kilogram" | "kilograms" => ("g".to_owned(), quantity * 1000.0),
            "oz" | "ounce" | "ounces" => ("g".to_owned(), quantity * 28.35),
            "lb" | "lbs" | "pound" | "pounds" => ("g".to_owned(), quantity * 453.59),

            "whole" | "item" | "items" | "piece" | "pieces" | "clove" | "cloves" | "" => {
                ("item".to_owned(), quantity)
            }

            _ => (normalized_unit, quantity),
        }
    }

    /// Human readable quantity, switching to kg / L from 1000 g / ml.
    pub fn format_quantity(quantity: f32, unit: &str) -> String {
        match unit {
            "g" if quantity >= 1000.0 => format!("{} kg", trim_number(quantity / 1000.0)),
            "ml" if quantity >= 1000.0 => format!("{} L", trim_number(quantity / 1000.0)),
            "item" => trim_number(quantity),
            unit => format!("{} {unit}", trim_number(quantity)),
        }
    }
}

fn trim_number(value: f32) -> String {
    let rounded = (value * 100.0).round() / 100.0;

    if rounded.fract() == 0.0 {
        return format!("{}", rounded as i64);
    }

    format!("{rounded}")
}

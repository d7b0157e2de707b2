use allersafe_shared::name_key;
use allersafe_shared::recipe::IngredientCategory;

/// Categorization Service
///
/// Maps ingredient names that have no catalog record to a grocery aisle
/// using a predefined keyword table. Unmatched names land in
/// [`IngredientCategory::Other`].
pub struct CategorizationService;

impl CategorizationService {
    pub fn categorize(ingredient_name: &str) -> IngredientCategory {
        let normalized = name_key(ingredient_name);
        let name = normalized.as_str();

        if Self::is_produce(name) {
            return IngredientCategory::FruitsAndVegetables;
        }

        if Self::is_seafood(name) {
            return IngredientCategory::Seafood;
        }

        if Self::is_meat(name) {
            return IngredientCategory::Butcher;
        }

        if Self::is_dairy(name) {
            return IngredientCategory::DairyAndEggs;
        }

        if Self::is_bakery(name) {
            return IngredientCategory::Bakery;
        }

        if Self::is_pantry(name) {
            return IngredientCategory::Grocery;
        }

        if name.starts_with("frozen ") {
            return IngredientCategory::Frozen;
        }

        IngredientCategory::Other
    }

    fn is_produce(name: &str) -> bool {
        matches!(
            name,
            "tomato" | "tomatoes"
                | "onion" | "onions"
                | "garlic"
                | "lettuce"
                | "carrot" | "carrots"
                | "celery"
                | "bell pepper" | "bell peppers"
                | "cucumber"
                | "zucchini"
                | "broccoli"
                | "spinach"
                | "potato" | "potatoes"
                | "mushroom" | "mushrooms"
                | "avocado"
                | "ginger"
                | "cilantro"
                | "basil"
                | "apple" | "apples"
                | "banana" | "bananas"
                | "lemon" | "lime"
                | "mango"
                | "strawberries" | "blueberries"
        )
    }

    fn is_seafood(name: &str) -> bool {
        matches!(
            name,
            "fish"
                | "salmon"
                | "tuna"
                | "cod"
                | "shrimp" | "prawns"
                | "lobster"
                | "crab"
                | "scallops"
                | "mussels"
                | "squid"
        )
    }

    fn is_meat(name: &str) -> bool {
        matches!(
            name,
            "chicken"
                | "chicken breast"
                | "chicken thigh"
                | "turkey"
                | "beef"
                | "ground beef"
                | "steak"
                | "pork"
                | "bacon"
                | "ham"
                | "sausage"
                | "lamb"
        )
    }

    fn is_dairy(name: &str) -> bool {
        matches!(
            name,
            "milk"
                | "cream"
                | "butter"
                | "cheese"
                | "mozzarella"
                | "parmesan"
                | "feta"
                | "yogurt"
                | "egg" | "eggs"
        )
    }

    fn is_bakery(name: &str) -> bool {
        matches!(
            name,
            "bread" | "baguette" | "tortilla" | "tortillas" | "pita" | "croissant" | "buns"
        )
    }

    fn is_pantry(name: &str) -> bool {
        matches!(
            name,
            "flour"
                | "rice"
                | "pasta"
                | "noodles"
                | "oats"
                | "sugar"
                | "salt"
                | "pepper"
                | "olive oil"
                | "vegetable oil"
                | "soy sauce"
                | "fish sauce"
                | "vinegar"
                | "honey"
                | "coconut milk"
                | "canned tomatoes"
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_categorize_known_names() {
        assert_eq!(
            CategorizationService::categorize("Tomatoes"),
            IngredientCategory::FruitsAndVegetables
        );
        assert_eq!(
            CategorizationService::categorize(" crab "),
            IngredientCategory::Seafood
        );
        assert_eq!(
            CategorizationService::categorize("Flour"),
            IngredientCategory::Grocery
        );
        assert_eq!(
            CategorizationService::categorize("frozen peas"),
            IngredientCategory::Frozen
        );
    }

    #[test]
    fn test_categorize_unknown_name() {
        assert_eq!(
            CategorizationService::categorize("dragon fruit jam"),
            IngredientCategory::Other
        );
    }
}

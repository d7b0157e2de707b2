use allersafe_shared::recipe::IngredientCategory;
use allersafe_shopping::{CategorizationService, ShoppingItem, ShoppingList};

fn item(name: &str, quantity: f32, unit: &str, category: IngredientCategory) -> ShoppingItem {
    ShoppingItem {
        name: name.to_owned(),
        quantity,
        unit: unit.to_owned(),
        category,
    }
}

#[test]
fn test_same_ingredient_and_unit_becomes_one_line() {
    let list = ShoppingList::build(vec![
        item("Flour", 200.0, "g", IngredientCategory::Grocery),
        item("Flour", 100.0, "g", IngredientCategory::Grocery),
    ]);

    let lines = list.lines().collect::<Vec<_>>();

    assert_eq!(lines.len(), 1);
    assert_eq!(lines[0].name, "Flour");
    assert_eq!(lines[0].quantity, 300.0);
    assert_eq!(lines[0].unit, "g");
    assert_eq!(lines[0].display, "Flour, 300 g");
}

#[test]
fn test_names_match_case_insensitively_and_units_normalise() {
    let list = ShoppingList::build(vec![
        item("Flour", 0.5, "kg", IngredientCategory::Grocery),
        item(" flour ", 700.0, "grams", IngredientCategory::Grocery),
    ]);

    let lines = list.lines().collect::<Vec<_>>();

    assert_eq!(lines.len(), 1);
    assert_eq!(lines[0].display, "Flour, 1.2 kg");
}

#[test]
fn test_lines_are_grouped_by_category() {
    let list = ShoppingList::build(vec![
        item("Rice", 200.0, "g", IngredientCategory::Grocery),
        item("Salmon", 300.0, "g", IngredientCategory::Seafood),
        item("Eggs", 2.0, "", IngredientCategory::DairyAndEggs),
        item("Soy Sauce", 2.0, "tbsp", IngredientCategory::Grocery),
    ]);

    let seafood = list.section(IngredientCategory::Seafood).unwrap();
    let grocery = list.section(IngredientCategory::Grocery).unwrap();

    assert_eq!(seafood.lines.len(), 1);
    assert_eq!(
        grocery
            .lines
            .iter()
            .map(|l| l.name.as_str())
            .collect::<Vec<_>>(),
        vec!["Rice", "Soy Sauce"]
    );
    assert_eq!(list.sections.len(), 3);
    assert!(list.section(IngredientCategory::Bakery).is_none());
}

#[test]
fn test_different_units_stay_on_separate_lines() {
    let list = ShoppingList::build(vec![
        item("Onion", 1.0, "whole", IngredientCategory::FruitsAndVegetables),
        item("Onion", 100.0, "g", IngredientCategory::FruitsAndVegetables),
    ]);

    assert_eq!(list.lines().count(), 2);
}

#[test]
fn test_empty_input_builds_empty_list() {
    assert!(ShoppingList::build(Vec::new()).is_empty());
}

#[test]
fn test_fallback_category_is_used_when_first_line_is_other() {
    let list = ShoppingList::build(vec![
        item("Crab", 100.0, "g", IngredientCategory::Other),
        item("Crab", 100.0, "g", CategorizationService::categorize("Crab")),
    ]);

    assert!(list.section(IngredientCategory::Seafood).is_some());
    assert!(list.section(IngredientCategory::Other).is_none());
}

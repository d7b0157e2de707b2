use std::sync::Arc;

use allersafe_mealplan::{
    Command, Dataset, GenerationError, GenerationSettings, MemoryStore, Outcome, RegenerateMode,
    SlotFailureReason,
};
use allersafe_shared::allergen::AllergenType;
use allersafe_shared::mealplan::{MealItem, MealType};
use allersafe_shared::recipe::{CuisineType, IngredientCategory};
use time::macros::date;
use tokio_util::sync::CancellationToken;

mod helpers;

use helpers::{entry, generate, plan, recipe, with_allergens, with_ingredients};

fn command(store: &MemoryStore) -> Command<MemoryStore, MemoryStore, MemoryStore> {
    Command::new(
        store.clone(),
        store.clone(),
        store.clone(),
        GenerationSettings::default(),
    )
}

#[tokio::test]
async fn test_variety_and_affinity_pick_the_fresh_favourite() -> anyhow::Result<()> {
    let history = "history";
    let store = MemoryStore::new(Dataset {
        recipes: vec![
            recipe("r1", MealType::Breakfast, CuisineType::Italian),
            recipe("r2", MealType::Breakfast, CuisineType::Italian),
            recipe("r3", MealType::Breakfast, CuisineType::Thai),
            recipe("italian-dinner", MealType::Dinner, CuisineType::Italian),
            recipe("thai-dinner", MealType::Dinner, CuisineType::Thai),
        ],
        meal_plans: vec![plan(history, date!(2025 - 04 - 01), date!(2025 - 05 - 10))],
        entries: vec![
            entry(history, date!(2025 - 04 - 10), MealType::Dinner, "italian-dinner"),
            entry(history, date!(2025 - 04 - 11), MealType::Dinner, "italian-dinner"),
            entry(history, date!(2025 - 04 - 12), MealType::Dinner, "italian-dinner"),
            entry(history, date!(2025 - 04 - 13), MealType::Dinner, "thai-dinner"),
            entry(history, date!(2025 - 05 - 04), MealType::Breakfast, "r2"),
        ],
        ..Default::default()
    });

    let generated = command(&store)
        .generate(
            generate(
                history,
                date!(2025 - 05 - 06),
                date!(2025 - 05 - 06),
                &[MealType::Breakfast],
            ),
            &CancellationToken::new(),
        )
        .await?;

    assert_eq!(generated.outcome, Outcome::Complete);
    assert_eq!(generated.assignments.len(), 1);

    let assignment = &generated.assignments[0];
    assert_eq!(assignment.recipe_id, "r1");
    assert_eq!(assignment.score.preference, 1.0);
    assert_eq!(assignment.score.variety_penalty, 0.0);
    assert!((assignment.score.score - 0.6).abs() < 1e-6);

    Ok(())
}

#[tokio::test]
async fn test_single_safe_dinner_repeats_with_penalty_recorded() -> anyhow::Result<()> {
    let store = MemoryStore::new(Dataset {
        recipes: vec![recipe("only-dinner", MealType::Dinner, CuisineType::Greek)],
        ..Default::default()
    });

    let generated = command(&store)
        .generate(
            generate(
                "week",
                date!(2025 - 05 - 06),
                date!(2025 - 05 - 08),
                &[MealType::Dinner],
            ),
            &CancellationToken::new(),
        )
        .await?;

    assert_eq!(generated.outcome, Outcome::Complete);
    assert!(generated.unfilled.is_empty());

    let ids = generated
        .assignments
        .iter()
        .map(|a| a.recipe_id.as_str())
        .collect::<Vec<_>>();
    assert_eq!(ids, vec!["only-dinner"; 3]);

    let penalties = generated
        .assignments
        .iter()
        .map(|a| a.score.variety_penalty)
        .collect::<Vec<_>>();
    assert_eq!(penalties, vec![0.0, 1.0, 1.0]);

    assert_eq!(store.entries_of("week").await.len(), 3);

    Ok(())
}

#[tokio::test]
async fn test_missing_meal_type_is_partial() -> anyhow::Result<()> {
    let store = MemoryStore::new(Dataset {
        recipes: vec![
            recipe("d1", MealType::Dinner, CuisineType::Mexican),
            recipe("d2", MealType::Dinner, CuisineType::Korean),
        ],
        ..Default::default()
    });

    let generated = command(&store)
        .generate(
            generate(
                "week",
                date!(2025 - 05 - 06),
                date!(2025 - 05 - 07),
                &[MealType::Breakfast, MealType::Dinner],
            ),
            &CancellationToken::new(),
        )
        .await?;

    assert_eq!(generated.outcome, Outcome::Partial);
    assert_eq!(generated.assignments.len(), 2);
    assert!(generated.assignments.iter().all(|a| a.meal_type == MealType::Dinner));
    assert_eq!(generated.unfilled.len(), 2);
    assert!(generated.unfilled.iter().all(|f| f.meal_type == MealType::Breakfast
        && f.reason == SlotFailureReason::NoCandidates));

    let stored = store.entries_of("week").await;
    assert_eq!(stored.len(), 2);
    assert!(stored.iter().all(|e| e.meal_type == MealType::Dinner));

    Ok(())
}

#[tokio::test]
async fn test_nothing_filled_is_an_error_and_writes_nothing() -> anyhow::Result<()> {
    let store = MemoryStore::new(Dataset {
        recipes: vec![recipe("b1", MealType::Breakfast, CuisineType::French)],
        ..Default::default()
    });

    let result = command(&store)
        .generate(
            generate(
                "week",
                date!(2025 - 05 - 06),
                date!(2025 - 05 - 07),
                &[MealType::Lunch],
            ),
            &CancellationToken::new(),
        )
        .await;

    let Err(GenerationError::NoCandidatesAtAll { unfilled }) = result else {
        panic!("expected NoCandidatesAtAll, got {result:?}");
    };
    assert_eq!(unfilled.len(), 2);

    let data = store.snapshot().await;
    assert!(data.meal_plans.is_empty());
    assert!(data.entries.is_empty());

    Ok(())
}

#[tokio::test]
async fn test_cross_reactive_allergen_is_excluded() -> anyhow::Result<()> {
    let store = MemoryStore::new(helpers::shellfish_dataset());

    let generated = command(&store)
        .generate(
            generate(
                "week",
                date!(2025 - 05 - 06),
                date!(2025 - 05 - 07),
                &[MealType::Dinner],
            ),
            &CancellationToken::new(),
        )
        .await?;

    assert!(generated.exclusion.contains("shrimp"));
    assert!(generated.exclusion.contains("crab"));
    assert!(generated.exclusion.contains("dust-mite"));
    assert!(
        generated
            .assignments
            .iter()
            .all(|a| a.recipe_id == "tomato-rice")
    );

    Ok(())
}

#[tokio::test]
async fn test_declared_allergen_alone_excludes_recipe() -> anyhow::Result<()> {
    let mut dataset = helpers::shellfish_dataset();
    dataset.recipes.push(with_allergens(
        recipe("mystery-soup", MealType::Dinner, CuisineType::Chinese),
        &["crab"],
    ));
    let store = MemoryStore::new(dataset);

    let generated = command(&store)
        .generate(
            generate(
                "week",
                date!(2025 - 05 - 06),
                date!(2025 - 05 - 08),
                &[MealType::Dinner],
            ),
            &CancellationToken::new(),
        )
        .await?;

    assert_eq!(generated.assignments.len(), 3);
    assert!(
        generated
            .assignments
            .iter()
            .all(|a| a.recipe_id == "tomato-rice")
    );

    Ok(())
}

#[tokio::test]
async fn test_duplicate_ingredient_records_keep_their_tags() -> anyhow::Result<()> {
    let mut dataset = helpers::shellfish_dataset();
    dataset.ingredients.push(helpers::ingredient(
        "tomato ",
        IngredientCategory::FruitsAndVegetables,
        &[("crab", AllergenType::MayContain)],
    ));
    let store = MemoryStore::new(dataset);

    let generated = command(&store)
        .generate(
            generate(
                "week",
                date!(2025 - 05 - 06),
                date!(2025 - 05 - 07),
                &[MealType::Breakfast, MealType::Dinner],
            ),
            &CancellationToken::new(),
        )
        .await?;

    assert_eq!(generated.outcome, Outcome::Partial);
    assert!(generated.assignments.iter().all(|a| a.recipe_id == "pancakes"));
    assert_eq!(generated.unfilled.len(), 2);
    assert!(generated.unfilled.iter().all(|f| f.meal_type == MealType::Dinner
        && f.reason == SlotFailureReason::NoSafeCandidates));

    Ok(())
}

#[tokio::test]
async fn test_request_exclusions_leave_slot_without_safe_candidates() -> anyhow::Result<()> {
    let store = MemoryStore::new(helpers::shellfish_dataset());
    let mut input = generate(
        "week",
        date!(2025 - 05 - 06),
        date!(2025 - 05 - 07),
        &[MealType::Breakfast, MealType::Dinner],
    );
    input.exclude_allergens = vec![" wheat ".to_owned()];

    let generated = command(&store)
        .generate(input, &CancellationToken::new())
        .await?;

    assert_eq!(generated.outcome, Outcome::Partial);
    assert!(generated.exclusion.contains("wheat"));
    assert!(generated.unfilled.iter().all(|f| f.meal_type == MealType::Breakfast
        && f.reason == SlotFailureReason::NoSafeCandidates));
    assert_eq!(generated.unfilled.len(), 2);

    Ok(())
}

#[tokio::test]
async fn test_shopping_list_merges_flour() -> anyhow::Result<()> {
    let store = MemoryStore::new(Dataset {
        recipes: vec![
            with_ingredients(
                recipe("bread", MealType::Breakfast, CuisineType::French),
                &[("Flour", 200.0, "g")],
            ),
            with_ingredients(
                recipe("crepes", MealType::Breakfast, CuisineType::French),
                &[("flour ", 100.0, "g")],
            ),
        ],
        ..Default::default()
    });

    let generated = command(&store)
        .generate(
            generate(
                "week",
                date!(2025 - 05 - 06),
                date!(2025 - 05 - 07),
                &[MealType::Breakfast],
            ),
            &CancellationToken::new(),
        )
        .await?;

    let ids = generated
        .assignments
        .iter()
        .map(|a| a.recipe_id.as_str())
        .collect::<Vec<_>>();
    assert_eq!(ids, vec!["bread", "crepes"]);

    let lines = generated.shopping_list.lines().collect::<Vec<_>>();
    assert_eq!(lines.len(), 1);
    assert_eq!(lines[0].display, "Flour, 300 g");

    Ok(())
}

#[tokio::test]
async fn test_shopping_list_scales_to_requested_servings() -> anyhow::Result<()> {
    let store = MemoryStore::new(Dataset {
        recipes: vec![with_ingredients(
            recipe("bread", MealType::Breakfast, CuisineType::French),
            &[("Flour", 200.0, "g")],
        )],
        ..Default::default()
    });

    let mut input = generate(
        "week",
        date!(2025 - 05 - 07),
        date!(2025 - 05 - 07),
        &[MealType::Breakfast],
    );
    input.servings = Some(4);

    // A new plan must span more than one day.
    let result = command(&store)
        .generate(input.clone(), &CancellationToken::new())
        .await;
    assert!(matches!(result, Err(GenerationError::Validation(_))));

    input.start = date!(2025 - 05 - 06);
    let generated = command(&store)
        .generate(input, &CancellationToken::new())
        .await?;

    assert!(generated.assignments.iter().all(|a| a.servings == 4));

    let lines = generated.shopping_list.lines().collect::<Vec<_>>();
    assert_eq!(lines.len(), 1);
    assert_eq!(lines[0].display, "Flour, 800 g");

    Ok(())
}

#[tokio::test]
async fn test_fill_gaps_keeps_planned_slots() -> anyhow::Result<()> {
    let store = MemoryStore::new(Dataset {
        recipes: vec![
            recipe("d1", MealType::Dinner, CuisineType::Mexican),
            recipe("d2", MealType::Dinner, CuisineType::Korean),
        ],
        meal_plans: vec![plan("week", date!(2025 - 05 - 01), date!(2025 - 05 - 10))],
        entries: vec![
            entry("week", date!(2025 - 05 - 06), MealType::Dinner, "old-dinner"),
            entry("week", date!(2025 - 05 - 09), MealType::Dinner, "outside"),
        ],
        ..Default::default()
    });

    let generated = command(&store)
        .generate(
            generate(
                "week",
                date!(2025 - 05 - 06),
                date!(2025 - 05 - 07),
                &[MealType::Dinner],
            ),
            &CancellationToken::new(),
        )
        .await?;

    assert_eq!(generated.assignments.len(), 1);
    assert_eq!(generated.assignments[0].date, date!(2025 - 05 - 07));
    assert!(generated.diff.create.is_none());
    assert!(generated.diff.remove.is_empty());

    let stored = store
        .entries_of("week")
        .await
        .into_iter()
        .map(|e| (e.meal_date, e.item))
        .collect::<Vec<_>>();

    assert_eq!(
        stored,
        vec![
            (date!(2025 - 05 - 06), MealItem::Recipe("old-dinner".to_owned())),
            (date!(2025 - 05 - 07), MealItem::Recipe("d1".to_owned())),
            (date!(2025 - 05 - 09), MealItem::Recipe("outside".to_owned())),
        ]
    );

    Ok(())
}

#[tokio::test]
async fn test_replace_only_touches_requested_range() -> anyhow::Result<()> {
    let store = MemoryStore::new(Dataset {
        recipes: vec![
            recipe("d1", MealType::Dinner, CuisineType::Mexican),
            recipe("d2", MealType::Dinner, CuisineType::Korean),
        ],
        meal_plans: vec![plan("week", date!(2025 - 05 - 01), date!(2025 - 05 - 10))],
        entries: vec![
            entry("week", date!(2025 - 05 - 06), MealType::Dinner, "old-dinner"),
            entry("week", date!(2025 - 05 - 06), MealType::Lunch, "old-lunch"),
            entry("week", date!(2025 - 05 - 09), MealType::Dinner, "outside"),
        ],
        ..Default::default()
    });

    let mut input = generate(
        "week",
        date!(2025 - 05 - 06),
        date!(2025 - 05 - 07),
        &[MealType::Dinner],
    );
    input.mode = RegenerateMode::Replace;

    let generated = command(&store)
        .generate(input, &CancellationToken::new())
        .await?;

    assert_eq!(generated.assignments.len(), 2);
    assert_eq!(
        generated.diff.remove,
        vec![(date!(2025 - 05 - 06), MealType::Dinner)]
    );

    let stored = store
        .entries_of("week")
        .await
        .into_iter()
        .map(|e| (e.meal_date, e.meal_type, e.item))
        .collect::<Vec<_>>();

    assert_eq!(stored.len(), 4);
    assert!(stored.contains(&(
        date!(2025 - 05 - 06),
        MealType::Lunch,
        MealItem::Recipe("old-lunch".to_owned())
    )));
    assert!(stored.contains(&(
        date!(2025 - 05 - 09),
        MealType::Dinner,
        MealItem::Recipe("outside".to_owned())
    )));
    assert!(
        !stored
            .iter()
            .any(|(_, _, item)| *item == MealItem::Recipe("old-dinner".to_owned()))
    );

    Ok(())
}

#[tokio::test]
async fn test_cancelled_run_writes_nothing() -> anyhow::Result<()> {
    let store = MemoryStore::new(Dataset {
        recipes: vec![recipe("d1", MealType::Dinner, CuisineType::Mexican)],
        ..Default::default()
    });

    let cancel = CancellationToken::new();
    cancel.cancel();

    let result = command(&store)
        .generate(
            generate(
                "week",
                date!(2025 - 05 - 06),
                date!(2025 - 05 - 07),
                &[MealType::Dinner],
            ),
            &cancel,
        )
        .await;

    assert!(matches!(result, Err(GenerationError::Cancelled)));

    let data = store.snapshot().await;
    assert!(data.meal_plans.is_empty());
    assert!(data.entries.is_empty());

    Ok(())
}

#[tokio::test]
async fn test_invalid_requests_are_rejected() -> anyhow::Result<()> {
    let store = MemoryStore::new(Dataset {
        recipes: vec![recipe("d1", MealType::Dinner, CuisineType::Mexican)],
        meal_plans: vec![plan("week", date!(2025 - 05 - 01), date!(2025 - 05 - 07))],
        ..Default::default()
    });
    let cmd = command(&store);
    let cancel = CancellationToken::new();

    let no_slots = generate("week", date!(2025 - 05 - 02), date!(2025 - 05 - 03), &[]);
    assert!(matches!(
        cmd.generate(no_slots, &cancel).await,
        Err(GenerationError::Validation(_))
    ));

    let reversed = generate(
        "week",
        date!(2025 - 05 - 03),
        date!(2025 - 05 - 02),
        &[MealType::Dinner],
    );
    assert!(matches!(
        cmd.generate(reversed, &cancel).await,
        Err(GenerationError::Validation(_))
    ));

    let outside = generate(
        "week",
        date!(2025 - 05 - 06),
        date!(2025 - 05 - 09),
        &[MealType::Dinner],
    );
    assert!(matches!(
        cmd.generate(outside, &cancel).await,
        Err(GenerationError::Validation(_))
    ));

    let mut other_user = generate(
        "week",
        date!(2025 - 05 - 02),
        date!(2025 - 05 - 03),
        &[MealType::Dinner],
    );
    other_user.user_id = "user-2".to_owned();
    assert!(matches!(
        cmd.generate(other_user, &cancel).await,
        Err(GenerationError::Validation(_))
    ));

    let mut zero_servings = generate(
        "week",
        date!(2025 - 05 - 02),
        date!(2025 - 05 - 03),
        &[MealType::Dinner],
    );
    zero_servings.servings = Some(0);
    assert!(matches!(
        cmd.generate(zero_servings, &cancel).await,
        Err(GenerationError::Validation(_))
    ));

    assert!(store.entries_of("week").await.is_empty());

    Ok(())
}

#[tokio::test]
async fn test_allergen_graph_is_cached_until_refreshed() -> anyhow::Result<()> {
    let store = MemoryStore::new(Dataset {
        groups: vec![helpers::shellfish_group()],
        ..Default::default()
    });
    let cmd = Arc::new(command(&store));

    let first = cmd.allergen_graph().await?;
    let second = cmd.allergen_graph().await?;
    assert!(Arc::ptr_eq(&first, &second));
    assert!(first.contains("crab"));

    let shared = cmd.clone();
    let refreshed = tokio::spawn(async move { shared.refresh_allergen_graph().await }).await??;
    assert!(!Arc::ptr_eq(&first, &refreshed));
    assert_eq!(refreshed.len(), first.len());

    let current = cmd.allergen_graph().await?;
    assert!(Arc::ptr_eq(&current, &refreshed));

    Ok(())
}

#[tokio::test]
async fn test_malformed_recipe_is_reported_as_catalog_error() -> anyhow::Result<()> {
    let mut broken = recipe("broken", MealType::Dinner, CuisineType::Thai);
    broken.servings = 0;

    let store = MemoryStore::new(Dataset {
        recipes: vec![broken, recipe("b1", MealType::Breakfast, CuisineType::Thai)],
        ..Default::default()
    });

    let generated = command(&store)
        .generate(
            generate(
                "week",
                date!(2025 - 05 - 06),
                date!(2025 - 05 - 07),
                &[MealType::Breakfast, MealType::Dinner],
            ),
            &CancellationToken::new(),
        )
        .await?;

    assert_eq!(generated.outcome, Outcome::Partial);
    assert!(
        generated
            .unfilled
            .iter()
            .all(|f| matches!(f.reason, SlotFailureReason::Catalog(_)))
    );

    Ok(())
}

//! Tests for configuration system

use allersafe::Config;
use allersafe_allergen::MayContainPolicy;
use temp_dir::TempDir;

#[test]
fn test_config_loads_from_default_toml() {
    let config = Config::load(None).expect("Failed to load config");

    assert_eq!(config.database.max_connections, 5);
    assert_eq!(config.observability.log_level, "info");
    assert_eq!(config.generation.lookback_days, 14);
    assert_eq!(config.generation.history_days, 90);
    assert_eq!(config.generation.weights.variety, 0.6);
    assert_eq!(config.generation.may_contain, MayContainPolicy::Exclude);
    assert!(config.validate().is_ok());
}

#[test]
fn test_config_reads_generation_section() {
    let dir = TempDir::new().unwrap();
    let path = dir.child("custom.toml");
    std::fs::write(
        &path,
        r#"
[database]
url = "sqlite:custom.db"
max_connections = 2

[generation]
lookback_days = 7
may_contain = "warn"
servings_tolerance = 1

[generation.weights]
variety = 1.0
"#,
    )
    .unwrap();

    let config = Config::load(Some(path.to_str().unwrap().to_owned())).expect("Failed to load config");

    assert_eq!(config.database.max_connections, 2);
    assert_eq!(config.generation.lookback_days, 7);
    assert_eq!(config.generation.history_days, 90);
    assert_eq!(config.generation.may_contain, MayContainPolicy::Warn);
    assert_eq!(config.generation.servings_tolerance, Some(1));
    assert_eq!(config.generation.weights.variety, 1.0);
    assert_eq!(config.generation.weights.cuisine, 0.4);
    assert_eq!(config.observability.log_level, "info");
}

#[test]
fn test_config_falls_back_to_defaults_without_file() {
    let dir = TempDir::new().unwrap();
    let missing = dir.child("missing.toml");

    let config = Config::load(Some(missing.to_str().unwrap().to_owned())).expect("Failed to load config");

    assert_eq!(config.database.max_connections, 5);
    assert_eq!(config.generation, allersafe_mealplan::GenerationSettings::default());
}

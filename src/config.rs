use allersafe_mealplan::GenerationSettings;
use config::{Config as ConfigBuilder, ConfigError, Environment, File};
use serde::Deserialize;
use std::env;

#[derive(Debug, Deserialize, Clone)]
pub struct Config {
    pub database: DatabaseConfig,
    #[serde(default)]
    pub observability: ObservabilityConfig,
    #[serde(default)]
    pub generation: GenerationSettings,
}

#[derive(Debug, Deserialize, Clone)]
pub struct ObservabilityConfig {
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

impl Default for ObservabilityConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    pub max_connections: u32,
}

impl Config {
    /// Load configuration from file and environment variables
    ///
    /// Priority (highest to lowest):
    /// 1. Environment variables (ALLERSAFE__DATABASE__URL, ALLERSAFE__GENERATION__LOOKBACK_DAYS, etc.)
    /// 2. Config file specified by path
    /// 3. Hardcoded defaults
    pub fn load(config_path: Option<String>) -> Result<Self, ConfigError> {
        let mut builder = ConfigBuilder::builder();

        builder = builder
            .set_default("database.url", "sqlite:allersafe.db")?
            .set_default("database.max_connections", 5)?;

        let config_file_path = config_path
            .or_else(|| env::var("CONFIG_PATH").ok())
            .unwrap_or_else(|| "config/default.toml".to_string());

        // Optional, defaults apply when the file is missing
        if std::path::Path::new(&config_file_path).exists() {
            builder = builder.add_source(File::with_name(&config_file_path));
        }

        builder = builder.add_source(
            Environment::with_prefix("ALLERSAFE")
                .separator("__")
                .try_parsing(true),
        );

        if let Ok(database_url) = env::var("DATABASE_URL") {
            builder = builder.set_override("database.url", database_url)?;
        }

        builder.build()?.try_deserialize()
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.database.max_connections < 1 {
            return Err("Database max_connections must be at least 1".to_string());
        }

        let generation = &self.generation;
        let weights = generation.weights;

        if [
            weights.cuisine,
            weights.completion,
            weights.variety,
            weights.nutrition,
        ]
        .iter()
        .any(|w| !w.is_finite() || *w < 0.0)
        {
            return Err("Generation weights must be finite and not negative".to_string());
        }

        if !(0.0..1.0).contains(&generation.tie_epsilon) {
            return Err("Generation tie_epsilon must be within [0, 1)".to_string());
        }

        if generation.lookback_days == 0 {
            return Err("Generation lookback_days must be at least 1".to_string());
        }

        if generation.history_days < generation.lookback_days {
            return Err("Generation history_days must cover lookback_days".to_string());
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use allersafe_mealplan::Weights;

    fn config() -> Config {
        Config {
            database: DatabaseConfig {
                url: "sqlite:test.db".to_string(),
                max_connections: 5,
            },
            observability: ObservabilityConfig::default(),
            generation: GenerationSettings::default(),
        }
    }

    #[test]
    fn test_validation_valid_config() {
        assert!(config().validate().is_ok());
    }

    #[test]
    fn test_validation_zero_connections() {
        let mut config = config();
        config.database.max_connections = 0;

        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validation_negative_weight() {
        let mut config = config();
        config.generation.weights = Weights {
            variety: -0.1,
            ..Weights::default()
        };

        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validation_tie_epsilon_range() {
        let mut config = config();
        config.generation.tie_epsilon = 1.0;
        assert!(config.validate().is_err());

        config.generation.tie_epsilon = 0.0;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validation_history_window() {
        let mut config = config();
        config.generation.lookback_days = 0;
        assert!(config.validate().is_err());

        config.generation.lookback_days = 30;
        config.generation.history_days = 14;
        assert!(config.validate().is_err());
    }
}

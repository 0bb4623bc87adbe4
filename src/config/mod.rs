//! Application configuration module
//!
//! This module provides type-safe configuration loading from environment variables
//! using the `config` and `dotenvy` crates. Configuration is loaded with the
//! `MDR_CLASSIFIER` prefix and nested values use double underscores as separators.
//!
//! # Example
//!
//! ```no_run
//! use mdr_classifier::config::AppConfig;
//!
//! let config = AppConfig::load().expect("Failed to load configuration");
//! config.validate().expect("Invalid configuration");
//!
//! println!("Rules file: {}", config.session.rules_path.display());
//! ```

mod ai;
mod error;
mod session;

pub use ai::{AiConfig, AiProvider, ANTHROPIC_API_KEY_ENV, OPENAI_API_KEY_ENV};
pub use error::{ConfigError, ValidationError};
pub use session::SessionConfig;

use serde::Deserialize;

/// Root application configuration
///
/// Every section has defaults; only the API key of the chosen provider
/// must be supplied. Load using [`AppConfig::load()`].
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// AI provider configuration (OpenAI-compatible/Anthropic)
    #[serde(default)]
    pub ai: AiConfig,

    /// Session configuration (rules file, status echo)
    #[serde(default)]
    pub session: SessionConfig,
}

impl AppConfig {
    /// Load configuration from environment variables
    ///
    /// This function:
    /// 1. Loads `.env` file if present (for development)
    /// 2. Reads environment variables with `MDR_CLASSIFIER` prefix
    /// 3. Uses `__` (double underscore) to separate nested values
    /// 4. Deserializes into typed configuration structs
    ///
    /// # Environment Variable Format
    ///
    /// - `MDR_CLASSIFIER__AI__PROVIDER=anthropic` -> `ai.provider = anthropic`
    /// - `MDR_CLASSIFIER__SESSION__RULES_PATH=...` -> `session.rules_path = ...`
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if values cannot be parsed into expected types.
    pub fn load() -> Result<Self, ConfigError> {
        // Load .env file if present (development)
        dotenvy::dotenv().ok();

        let config = config::Config::builder()
            .add_source(
                config::Environment::default()
                    .prefix("MDR_CLASSIFIER")
                    .separator("__"),
            )
            .build()?
            .try_deserialize()?;

        Ok(config)
    }

    /// Validate all configuration values
    ///
    /// # Errors
    ///
    /// Returns `ValidationError` if any configuration value is invalid.
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.ai.validate()?;
        self.session.validate()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;
    use std::path::PathBuf;
    use std::sync::Mutex;

    // Mutex to ensure tests don't run in parallel (env vars are global)
    static ENV_MUTEX: Mutex<()> = Mutex::new(());

    const VARS: &[&str] = &[
        "MDR_CLASSIFIER__AI__PROVIDER",
        OPENAI_API_KEY_ENV,
        ANTHROPIC_API_KEY_ENV,
        "MDR_CLASSIFIER__AI__MIN_CALL_INTERVAL_MS",
        "MDR_CLASSIFIER__SESSION__RULES_PATH",
        "MDR_CLASSIFIER__SESSION__ECHO_STATUS",
    ];

    fn clear_env() {
        for var in VARS {
            env::remove_var(var);
        }
    }

    #[test]
    fn test_load_from_environment() {
        let _guard = ENV_MUTEX.lock().unwrap();
        clear_env();
        env::set_var("MDR_CLASSIFIER__AI__PROVIDER", "anthropic");
        env::set_var(ANTHROPIC_API_KEY_ENV, "sk-ant-xxx");
        env::set_var("MDR_CLASSIFIER__AI__MIN_CALL_INTERVAL_MS", "250");
        env::set_var("MDR_CLASSIFIER__SESSION__RULES_PATH", "/tmp/rules.md");
        env::set_var("MDR_CLASSIFIER__SESSION__ECHO_STATUS", "false");
        let result = AppConfig::load();
        clear_env();

        let config = result.unwrap();
        assert_eq!(config.ai.provider, AiProvider::Anthropic);
        assert!(config.ai.has_anthropic());
        assert_eq!(config.ai.min_call_interval_ms, 250);
        assert_eq!(config.session.rules_path, PathBuf::from("/tmp/rules.md"));
        assert!(!config.session.echo_status);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_defaults_without_environment() {
        let _guard = ENV_MUTEX.lock().unwrap();
        clear_env();
        let result = AppConfig::load();

        let config = result.unwrap();
        assert_eq!(config.ai.provider, AiProvider::OpenAI);
        assert_eq!(config.ai.min_call_interval_ms, 1000);
        assert!(config.session.echo_status);
    }

    #[test]
    fn test_missing_key_fails_validation() {
        let _guard = ENV_MUTEX.lock().unwrap();
        clear_env();
        env::set_var("MDR_CLASSIFIER__AI__PROVIDER", "openai");
        let result = AppConfig::load();
        clear_env();

        let config = result.unwrap();
        let err = config.validate().unwrap_err();
        assert!(matches!(err, ValidationError::MissingRequired(OPENAI_API_KEY_ENV)));
        assert!(err.to_string().contains("MDR_CLASSIFIER__AI__OPENAI_API_KEY"));
    }

    #[test]
    fn test_missing_key_error_names_the_variable_that_fixes_it() {
        let _guard = ENV_MUTEX.lock().unwrap();
        clear_env();
        env::set_var("MDR_CLASSIFIER__AI__PROVIDER", "anthropic");
        let missing = match AppConfig::load().unwrap().validate() {
            Err(ValidationError::MissingRequired(var)) => var,
            other => panic!("expected a missing key, got {:?}", other),
        };

        env::set_var(missing, "sk-ant-xxx");
        let result = AppConfig::load();
        clear_env();

        assert!(result.unwrap().validate().is_ok());
    }
}

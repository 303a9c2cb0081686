//! Application configuration module
//!
//! Runtime settings come from environment variables through the `config` and
//! `dotenvy` crates. Variables use the `PB_ALLOCATOR` prefix and nested values
//! are separated with double underscores.
//!
//! Method parameters are configured per run, see [`MethodParameters`].
//!
//! # Example
//!
//! ```no_run
//! use pb_allocator::config::AppConfig;
//!
//! let config = AppConfig::load().expect("Failed to load configuration");
//! config.validate().expect("Invalid configuration");
//!
//! println!("Constraints are read from {}", config.paths.constraints_file);
//! ```

mod error;
mod logging;
mod parameters;
mod paths;

pub use error::{ConfigError, ValidationError};
pub use logging::{LogFormat, LoggingConfig};
pub use parameters::MethodParameters;
pub use paths::PathsConfig;

use serde::Deserialize;

/// Root application configuration
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// Log filter and output format
    #[serde(default)]
    pub logging: LoggingConfig,

    /// File names inside the data directory
    #[serde(default)]
    pub paths: PathsConfig,
}

impl AppConfig {
    /// Load configuration from environment variables
    ///
    /// # Environment Variable Format
    ///
    /// - `PB_ALLOCATOR__LOGGING__LEVEL=debug` -> `logging.level = "debug"`
    /// - `PB_ALLOCATOR__PATHS__CONSTRAINTS_FILE=bounds.json` -> `paths.constraints_file`
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if values cannot be parsed into expected types.
    pub fn load() -> Result<Self, ConfigError> {
        dotenvy::dotenv().ok();

        let config = config::Config::builder()
            .add_source(
                config::Environment::default()
                    .prefix("PB_ALLOCATOR")
                    .separator("__"),
            )
            .build()?
            .try_deserialize()?;

        Ok(config)
    }

    /// Validate all configuration values
    pub fn validate(&self) -> Result<(), ValidationError> {
        self.logging.validate()?;
        self.paths.validate()?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::env;
    use std::sync::Mutex;

    // Env vars are process-global
    static ENV_MUTEX: Mutex<()> = Mutex::new(());

    fn clear_env() {
        env::remove_var("PB_ALLOCATOR__LOGGING__LEVEL");
        env::remove_var("PB_ALLOCATOR__LOGGING__FORMAT");
        env::remove_var("PB_ALLOCATOR__PATHS__CONSTRAINTS_FILE");
    }

    #[test]
    fn test_defaults_without_environment() {
        let _guard = ENV_MUTEX.lock().unwrap();
        clear_env();
        let config = AppConfig::load().unwrap();

        assert_eq!(config.logging.level, "info");
        assert_eq!(config.logging.format, LogFormat::Text);
        assert_eq!(config.paths.constraints_file, "constraints.json");
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_load_from_environment() {
        let _guard = ENV_MUTEX.lock().unwrap();
        env::set_var("PB_ALLOCATOR__LOGGING__LEVEL", "debug");
        env::set_var("PB_ALLOCATOR__LOGGING__FORMAT", "json");
        env::set_var("PB_ALLOCATOR__PATHS__CONSTRAINTS_FILE", "bounds.json");
        let result = AppConfig::load();
        clear_env();

        let config = result.unwrap();
        assert_eq!(config.logging.level, "debug");
        assert_eq!(config.logging.format, LogFormat::Json);
        assert_eq!(config.paths.constraints_file, "bounds.json");
    }

    #[test]
    fn test_invalid_format_fails_to_load() {
        let _guard = ENV_MUTEX.lock().unwrap();
        env::set_var("PB_ALLOCATOR__LOGGING__FORMAT", "xml");
        let result = AppConfig::load();
        clear_env();

        assert!(result.is_err());
    }

    #[test]
    fn test_empty_constraints_file_fails_validation() {
        let config = AppConfig {
            paths: PathsConfig {
                constraints_file: String::new(),
            },
            ..Default::default()
        };
        assert!(matches!(
            config.validate(),
            Err(ValidationError::MissingRequired("paths.constraints_file"))
        ));
    }
}

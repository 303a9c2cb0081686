//! Configuration error types

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur during configuration loading
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Configuration loading failed: {0}")]
    LoadError(#[from] config::ConfigError),

    #[error("Validation failed: {0}")]
    ValidationFailed(#[from] ValidationError),

    #[error("Invalid parameter '{0}': expected group.name=value")]
    InvalidOverride(String),

    #[error("Unknown parameter group: {0}")]
    UnknownGroup(String),

    #[error("Unknown parameter: {group}.{name}")]
    UnknownParameter { group: String, name: String },

    #[error("Parameters file does not exist: {0}")]
    ParametersFileNotFound(PathBuf),

    #[error("Parameter serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),
}

/// Errors that can occur during configuration validation
#[derive(Debug, Error)]
pub enum ValidationError {
    #[error("Required configuration missing: {0}")]
    MissingRequired(&'static str),

    #[error("Invalid log filter '{0}'")]
    InvalidLogLevel(String),

    #[error("Invalid method parameter: {0}")]
    Parameter(#[from] crate::domain::foundation::ValidationError),
}

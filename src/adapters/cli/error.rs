//! CLI error types

use std::path::PathBuf;
use thiserror::Error;

use crate::application::RunError;
use crate::config::ConfigError;
use crate::domain::foundation::ErrorCode;
use crate::ports::{LoadError, StorageError};

/// CLI error type
#[derive(Error, Debug)]
pub enum CliError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error(transparent)]
    Run(#[from] RunError),

    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Load(#[from] LoadError),

    #[error(transparent)]
    Storage(#[from] StorageError),

    #[error("Not a directory: {0}")]
    NotADirectory(PathBuf),

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
}

impl CliError {
    /// Code reported when the process exits with this error.
    pub fn code(&self) -> ErrorCode {
        match self {
            CliError::Run(err) => err.code(),
            CliError::Config(ConfigError::ValidationFailed(_)) => ErrorCode::ValidationFailed,
            CliError::Config(_) | CliError::NotADirectory(_) | CliError::InvalidArgument(_) => {
                ErrorCode::ConfigurationInvalid
            }
            CliError::Load(_) => ErrorCode::LoadFailed,
            CliError::Storage(_) => ErrorCode::PersistenceFailed,
            CliError::Io(_) | CliError::Json(_) | CliError::Yaml(_) => ErrorCode::InternalError,
        }
    }
}

/// CLI result type
pub type CliResult<T> = Result<T, CliError>;

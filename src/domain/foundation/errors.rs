//! Error types for the domain layer.

use std::fmt;
use thiserror::Error;

/// Errors that occur during value object construction and parameter validation.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ValidationError {
    #[error("Field '{field}' cannot be empty")]
    EmptyField { field: String },

    #[error("Field '{field}' must be between {min} and {max}, got {actual}")]
    OutOfRange {
        field: String,
        min: f64,
        max: f64,
        actual: f64,
    },

    #[error("Field '{field}' has invalid format: {reason}")]
    InvalidFormat { field: String, reason: String },

    #[error("Duplicate {field}: {value}")]
    Duplicate { field: String, value: String },

    #[error("Unknown {field}: {value}")]
    UnknownReference { field: String, value: String },
}

impl ValidationError {
    /// Creates an empty field validation error.
    pub fn empty_field(field: impl Into<String>) -> Self {
        ValidationError::EmptyField { field: field.into() }
    }

    /// Creates an out of range validation error.
    pub fn out_of_range(field: impl Into<String>, min: f64, max: f64, actual: f64) -> Self {
        ValidationError::OutOfRange {
            field: field.into(),
            min,
            max,
            actual,
        }
    }

    /// Creates an invalid format validation error.
    pub fn invalid_format(field: impl Into<String>, reason: impl Into<String>) -> Self {
        ValidationError::InvalidFormat {
            field: field.into(),
            reason: reason.into(),
        }
    }

    /// Creates a duplicate value validation error.
    pub fn duplicate(field: impl Into<String>, value: impl ToString) -> Self {
        ValidationError::Duplicate {
            field: field.into(),
            value: value.to_string(),
        }
    }

    /// Creates an unknown reference validation error.
    pub fn unknown_reference(field: impl Into<String>, value: impl ToString) -> Self {
        ValidationError::UnknownReference {
            field: field.into(),
            value: value.to_string(),
        }
    }
}

/// Error codes for fatal run conditions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorCode {
    LoadFailed,
    ConfigurationInvalid,
    ValidationFailed,
    OracleFailed,
    BudgetExceeded,
    PersistenceFailed,
    InternalError,
}

impl ErrorCode {
    /// Process exit status reported for this code. Never zero.
    pub fn exit_code(&self) -> i32 {
        match self {
            ErrorCode::LoadFailed => 2,
            ErrorCode::ConfigurationInvalid => 3,
            ErrorCode::ValidationFailed => 4,
            ErrorCode::OracleFailed => 5,
            ErrorCode::BudgetExceeded => 6,
            ErrorCode::PersistenceFailed => 7,
            ErrorCode::InternalError => 1,
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            ErrorCode::LoadFailed => "LOAD_FAILED",
            ErrorCode::ConfigurationInvalid => "CONFIGURATION_INVALID",
            ErrorCode::ValidationFailed => "VALIDATION_FAILED",
            ErrorCode::OracleFailed => "ORACLE_FAILED",
            ErrorCode::BudgetExceeded => "BUDGET_EXCEEDED",
            ErrorCode::PersistenceFailed => "PERSISTENCE_FAILED",
            ErrorCode::InternalError => "INTERNAL_ERROR",
        };
        write!(f, "{}", s)
    }
}

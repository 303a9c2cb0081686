//! ElectionSource port - where groups, ballots and spending bounds come from.

use std::path::PathBuf;
use thiserror::Error;

use crate::domain::election::Election;
use crate::domain::foundation::{ProjectId, ValidationError};

/// Errors raised while loading an election. All of them abort the run.
#[derive(Debug, Error)]
pub enum LoadError {
    #[error("Cannot read {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("{path}: missing section {section}")]
    MissingSection { path: PathBuf, section: &'static str },

    #[error("{path}: missing column '{column}' in section {section}")]
    MissingColumn {
        path: PathBuf,
        section: &'static str,
        column: &'static str,
    },

    #[error("{path}:{line}: {reason}")]
    MalformedLine {
        path: PathBuf,
        line: usize,
        reason: String,
    },

    #[error("{path}: META does not declare a valid budget")]
    MissingBudget { path: PathBuf },

    #[error("{path}: vote for project {project} which is not listed in the file")]
    UnknownVotedProject { path: PathBuf, project: ProjectId },

    #[error("No citywide file found")]
    NoCitywide,

    #[error("Multiple citywide files found: {first} and {second}")]
    MultipleCitywide { first: PathBuf, second: PathBuf },

    #[error("Subunit '{0}' is declared by more than one file")]
    DuplicateSubunit(String),

    #[error("Constraints reference group '{0}' which is not in the data")]
    UnknownConstraintGroup(String),

    #[error("Malformed constraints file {path}: {source}")]
    MalformedConstraints {
        path: PathBuf,
        #[source]
        source: serde_json::Error,
    },

    #[error("Invalid election data: {0}")]
    Invalid(#[from] ValidationError),
}

/// Source of a fully loaded election.
pub trait ElectionSource {
    /// Loads every group with its ballots and applies any spending bounds.
    ///
    /// # Errors
    /// Returns `LoadError` if the data is missing, malformed or inconsistent.
    fn load(&self) -> Result<Election, LoadError>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn validation_errors_convert_into_load_errors() {
        let err: LoadError = ValidationError::duplicate("project id", 5).into();
        assert_eq!(err.to_string(), "Invalid election data: Duplicate project id: 5");
    }

    #[test]
    fn malformed_line_names_location() {
        let err = LoadError::MalformedLine {
            path: PathBuf::from("data/wola.pb"),
            line: 12,
            reason: "invalid cost 'abc'".to_string(),
        };
        assert_eq!(err.to_string(), "data/wola.pb:12: invalid cost 'abc'");
    }
}

//! ResultsStore port - persistence of a finished comparison run.

use std::path::PathBuf;
use thiserror::Error;

use crate::domain::results::RunResults;

/// Errors that can occur while persisting results
#[derive(Debug, Error)]
pub enum StorageError {
    #[error("IO error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Serialization failed: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error("Results directory already exists: {0}")]
    AlreadyExists(PathBuf),

    #[error("{0} exists and is not a symlink")]
    LatestNotSymlink(PathBuf),
}

/// Storage for run results
pub trait ResultsStore {
    /// Persists the results together with the captured execution log.
    ///
    /// Returns the location the bundle was written to.
    fn save(&self, results: &RunResults, logs: &str) -> Result<PathBuf, StorageError>;
}

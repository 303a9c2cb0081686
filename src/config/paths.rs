//! File locations

use serde::{Deserialize, Serialize};

use super::error::ValidationError;

/// File locations relative to the data directory
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PathsConfig {
    /// Name of the constraints file inside the data directory
    #[serde(default = "default_constraints_file")]
    pub constraints_file: String,
}

impl PathsConfig {
    /// Validate path configuration
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.constraints_file.trim().is_empty() {
            return Err(ValidationError::MissingRequired("paths.constraints_file"));
        }
        Ok(())
    }
}

impl Default for PathsConfig {
    fn default() -> Self {
        Self {
            constraints_file: default_constraints_file(),
        }
    }
}

fn default_constraints_file() -> String {
    "constraints.json".to_string()
}

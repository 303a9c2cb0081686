//! The constraints file: group key -> spending bounds, as JSON.

use serde::Deserialize;
use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use crate::domain::election::SpendingBounds;
use crate::domain::foundation::GroupKey;
use crate::ports::{LoadError, StorageError};

pub type Constraints = BTreeMap<GroupKey, SpendingBounds>;

/// Accepted shapes of one entry. A bare number is a lower bound.
#[derive(Deserialize)]
#[serde(untagged)]
enum ConstraintEntry {
    Bounds(SpendingBounds),
    Lower(u64),
}

impl From<ConstraintEntry> for SpendingBounds {
    fn from(entry: ConstraintEntry) -> Self {
        match entry {
            ConstraintEntry::Bounds(bounds) => bounds,
            ConstraintEntry::Lower(amount) => SpendingBounds::lower(amount),
        }
    }
}

/// Reads a constraints file.
pub fn read_constraints(path: &Path) -> Result<Constraints, LoadError> {
    let content = fs::read_to_string(path).map_err(|source| LoadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let raw: BTreeMap<GroupKey, ConstraintEntry> =
        serde_json::from_str(&content).map_err(|source| LoadError::MalformedConstraints {
            path: path.to_path_buf(),
            source,
        })?;
    Ok(raw.into_iter().map(|(key, entry)| (key, entry.into())).collect())
}

/// Writes a constraints file, pretty-printed.
pub fn write_constraints(path: &Path, constraints: &Constraints) -> Result<(), StorageError> {
    let json = serde_json::to_string_pretty(constraints)?;
    fs::write(path, json).map_err(|source| StorageError::Io {
        path: path.to_path_buf(),
        source,
    })
}

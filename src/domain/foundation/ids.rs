//! Strongly-typed identifier value objects.

use serde::{Deserialize, Serialize};
use std::borrow::Borrow;
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use super::ValidationError;

/// Identifier of a project. Unique across every group of an election.
pub type ProjectId = u64;

/// Identifier of a voter. Voters sharing an id across groups are the same person.
pub type VoterId = u64;

/// Key of the group holding the citywide project pool.
pub const CITYWIDE: &str = "citywide";

/// Key of the synthetic group holding every project of an election.
pub const MERGED_GROUP: &str = "all";

/// Key of a voter/project group (a district or the citywide pool).
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct GroupKey(String);

impl GroupKey {
    /// Creates a GroupKey, rejecting blank keys.
    pub fn new(key: impl Into<String>) -> Result<Self, ValidationError> {
        let key = key.into();
        if key.trim().is_empty() {
            return Err(ValidationError::empty_field("group_key"));
        }
        Ok(Self(key))
    }

    /// The citywide group key.
    pub fn citywide() -> Self {
        Self(CITYWIDE.to_string())
    }

    /// The key of the synthetic all-groups group.
    pub fn merged() -> Self {
        Self(MERGED_GROUP.to_string())
    }

    /// Returns the key as a string slice.
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns true if this is the citywide group.
    pub fn is_citywide(&self) -> bool {
        self.0 == CITYWIDE
    }
}

impl Borrow<str> for GroupKey {
    fn borrow(&self) -> &str {
        &self.0
    }
}

impl fmt::Display for GroupKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for GroupKey {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::new(s)
    }
}

/// Unique identifier for one comparison run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct RunId(Uuid);

impl RunId {
    /// Creates a new random RunId.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Returns the inner UUID.
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for RunId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for RunId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for RunId {
    type Err = uuid::Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Ok(Self(Uuid::parse_str(s)?))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::BTreeMap;

    #[test]
    fn group_key_rejects_blank() {
        assert!(GroupKey::new("").is_err());
        assert!(GroupKey::new("   ").is_err());
    }

    #[test]
    fn group_key_citywide_is_recognized() {
        assert!(GroupKey::citywide().is_citywide());
        assert!(!GroupKey::new("Bemowo").unwrap().is_citywide());
    }

    #[test]
    fn group_key_lookup_by_str() {
        let mut map = BTreeMap::new();
        map.insert(GroupKey::new("Wola").unwrap(), 7);
        assert_eq!(map.get("Wola"), Some(&7));
    }

    #[test]
    fn group_key_serializes_as_plain_string() {
        let key = GroupKey::new("Ochota").unwrap();
        assert_eq!(serde_json::to_string(&key).unwrap(), "\"Ochota\"");
    }

    #[test]
    fn run_id_round_trips_through_string() {
        let id = RunId::new();
        let parsed: RunId = id.to_string().parse().unwrap();
        assert_eq!(id, parsed);
    }

    #[test]
    fn run_ids_are_unique() {
        assert_ne!(RunId::new(), RunId::new());
    }
}

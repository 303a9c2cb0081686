//! Projects and approval ballots.

use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;

use crate::domain::foundation::{ProjectId, VoterId};

/// Set of chosen project ids. Order carries no meaning.
pub type Selection = BTreeSet<ProjectId>;

/// A proposed project with its nominal cost.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Project {
    pub id: ProjectId,
    pub cost: u64,
}

impl Project {
    /// Creates a new project.
    pub fn new(id: ProjectId, cost: u64) -> Self {
        Self { id, cost }
    }

    /// Returns a copy of this project priced at `cost`. The original is untouched.
    pub fn repriced(&self, cost: u64) -> Self {
        Self { id: self.id, cost }
    }
}

/// One voter's approval ballot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Ballot {
    pub voter_id: VoterId,
    pub approvals: BTreeSet<ProjectId>,
    /// District the voter declared. Informational only.
    pub district: Option<String>,
}

impl Ballot {
    /// Creates a ballot without a district tag.
    pub fn new(voter_id: VoterId, approvals: impl IntoIterator<Item = ProjectId>) -> Self {
        Self {
            voter_id,
            approvals: approvals.into_iter().collect(),
            district: None,
        }
    }

    /// Attaches a district tag.
    pub fn with_district(mut self, district: impl Into<String>) -> Self {
        self.district = Some(district.into());
        self
    }

    /// Returns true if the voter approves the project.
    pub fn approves(&self, project: ProjectId) -> bool {
        self.approvals.contains(&project)
    }

    /// Number of approved projects contained in the selection.
    pub fn overlap(&self, selection: &Selection) -> usize {
        self.approvals.intersection(selection).count()
    }

    /// Adds another ballot's approvals to this one.
    pub fn absorb(&mut self, other: &Ballot) {
        self.approvals.extend(other.approvals.iter().copied());
        if self.district.is_none() {
            self.district = other.district.clone();
        }
    }
}

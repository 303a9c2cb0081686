//! Groups: a district or the citywide pool with its own budget and bounds.

use serde::{Deserialize, Serialize};
use std::collections::HashSet;

use super::{Ballot, Project, Selection};
use crate::domain::foundation::{GroupKey, ValidationError};

/// Optional minimum and maximum spend for a group, in budget units.
///
/// A missing side means the group is unconstrained on that side.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct SpendingBounds {
    #[serde(default)]
    pub lower_bound: Option<u64>,
    #[serde(default)]
    pub upper_bound: Option<u64>,
}

impl SpendingBounds {
    /// No bound on either side.
    pub fn unconstrained() -> Self {
        Self::default()
    }

    /// Only a minimum spend.
    pub fn lower(amount: u64) -> Self {
        Self {
            lower_bound: Some(amount),
            upper_bound: None,
        }
    }

    /// Only a maximum spend.
    pub fn upper(amount: u64) -> Self {
        Self {
            lower_bound: None,
            upper_bound: Some(amount),
        }
    }

    /// Both sides bounded.
    pub fn between(lower: u64, upper: u64) -> Self {
        Self {
            lower_bound: Some(lower),
            upper_bound: Some(upper),
        }
    }

    /// Returns true if neither side is bounded.
    pub fn is_unconstrained(&self) -> bool {
        self.lower_bound.is_none() && self.upper_bound.is_none()
    }

    /// Bounds derived from fractions of a nominal budget, floored.
    pub fn from_budget_usage(budget: u64, lower: Option<f64>, upper: Option<f64>) -> Self {
        let scale = |fraction: f64| (budget as f64 * fraction).floor().max(0.0) as u64;
        Self {
            lower_bound: lower.map(scale),
            upper_bound: upper.map(scale),
        }
    }
}

/// A voter/project partition with its nominal budget.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Group {
    pub key: GroupKey,
    pub projects: Vec<Project>,
    pub ballots: Vec<Ballot>,
    pub budget: u64,
    #[serde(default)]
    pub bounds: SpendingBounds,
}

impl Group {
    /// Creates a group, validating the budget and project id uniqueness.
    pub fn new(
        key: GroupKey,
        projects: Vec<Project>,
        ballots: Vec<Ballot>,
        budget: u64,
    ) -> Result<Self, ValidationError> {
        if budget == 0 {
            return Err(ValidationError::out_of_range("budget", 1.0, u64::MAX as f64, 0.0));
        }
        let mut seen = HashSet::new();
        for project in &projects {
            if !seen.insert(project.id) {
                return Err(ValidationError::duplicate("project id", project.id));
            }
        }
        Ok(Self {
            key,
            projects,
            ballots,
            budget,
            bounds: SpendingBounds::unconstrained(),
        })
    }

    /// Replaces the spending bounds.
    pub fn with_bounds(mut self, bounds: SpendingBounds) -> Self {
        self.bounds = bounds;
        self
    }

    /// Nominal cost of this group's projects that are in the selection.
    pub fn cost_of(&self, selection: &Selection) -> u64 {
        self.projects
            .iter()
            .filter(|p| selection.contains(&p.id))
            .map(|p| p.cost)
            .sum()
    }

    /// Number of this group's projects that are in the selection.
    pub fn selected_count(&self, selection: &Selection) -> usize {
        self.projects
            .iter()
            .filter(|p| selection.contains(&p.id))
            .count()
    }
}

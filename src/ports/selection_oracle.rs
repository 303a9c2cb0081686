//! SelectionOracle port - the fair-allocation rule behind every MES-based method.
//!
//! Allocation methods treat the oracle as a pure function of
//! `(budget, projects, ballots)`. They rely on two properties only:
//! the returned selection fits the budget under the prices it was given,
//! and identical input yields identical output.

use thiserror::Error;

use crate::domain::election::{Ballot, Project, Selection};
use crate::domain::foundation::ProjectId;

/// Errors raised by a selection oracle. Always fatal for the calling method.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum OracleError {
    #[error("Ballot approves project {0} which is not part of the instance")]
    UnknownProject(ProjectId),

    #[error("Invalid oracle input: {0}")]
    InvalidInput(String),

    #[error("Oracle failed: {0}")]
    Failed(String),
}

/// Fair selection rule mapping an instance to a budget-feasible project set.
pub trait SelectionOracle: Send + Sync {
    /// Short rule name used in logs.
    fn name(&self) -> &str;

    /// Selects projects for the given instance.
    ///
    /// # Arguments
    /// * `budget` - Total money available
    /// * `projects` - Projects with the prices the oracle must respect
    /// * `ballots` - Approval ballots, one per voter
    ///
    /// # Errors
    /// Returns `OracleError` if the input is malformed or the rule fails.
    fn select(
        &self,
        budget: u64,
        projects: &[Project],
        ballots: &[Ballot],
    ) -> Result<Selection, OracleError>;
}

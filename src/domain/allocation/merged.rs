//! Plain oracle call on the merged instance.

use crate::domain::election::{Election, Selection};
use crate::ports::{OracleError, SelectionOracle};

/// Runs the oracle once over every project, the merged ballots and the total budget.
pub fn equal_shares_on_merged(
    oracle: &dyn SelectionOracle,
    election: &Election,
) -> Result<Selection, OracleError> {
    let projects: Vec<_> = election.projects().copied().collect();
    oracle.select(election.total_budget(), &projects, &election.merged_ballots())
}

//! Fixed-schedule discounting over a reduced budget.
//!
//! Every iteration lowers each group's prices by a constant share of its
//! budget and asks the oracle again, until the selection no longer fits the
//! reduced budget at nominal prices.

use std::collections::BTreeMap;
use tracing::{debug, warn};

use super::constrained::{AllocationError, AllocationOutcome, AllocationStatus};
use super::{discounted_cost, ModifiedMesParameters};
use crate::domain::election::{Election, Project, Selection};
use crate::domain::foundation::{GroupKey, StateMachine};
use crate::ports::SelectionOracle;

pub struct ModifiedAllocator<'a> {
    oracle: &'a dyn SelectionOracle,
    params: ModifiedMesParameters,
}

impl<'a> ModifiedAllocator<'a> {
    pub fn new(oracle: &'a dyn SelectionOracle, params: ModifiedMesParameters) -> Self {
        Self { oracle, params }
    }

    /// Budget the method may spend: `floor(total * part_of_initial_budget)`.
    pub fn reduced_budget(&self, election: &Election) -> u64 {
        (election.total_budget() as f64 * self.params.part_of_initial_budget).floor() as u64
    }

    /// Discount added per iteration for each group. The citywide group keeps its prices.
    pub fn discount_steps(&self, election: &Election) -> BTreeMap<GroupKey, f64> {
        let budget = self.reduced_budget(election).max(1) as f64;
        election
            .groups()
            .map(|group| {
                let step = if group.key.is_citywide() {
                    0.0
                } else {
                    group.budget as f64 * self.params.step / budget
                };
                (group.key.clone(), step)
            })
            .collect()
    }

    /// Runs the schedule and returns the last selection that fit the reduced budget.
    ///
    /// Stops early once prices stop changing, since the oracle would repeat itself.
    pub fn allocate(&self, election: &Election) -> Result<AllocationOutcome, AllocationError> {
        let budget = self.reduced_budget(election);
        let steps = self.discount_steps(election);
        let ballots = election.merged_ballots();

        let mut status = AllocationStatus::Running;
        let mut previous = Selection::new();
        let mut previous_prices: Vec<Project> = Vec::new();

        for iteration in 1..=self.params.max_iterations {
            let prices = reprice(election, &steps, iteration);
            if prices == previous_prices {
                status = status.transition_to(AllocationStatus::ConvergedStable)?;
                return Ok(AllocationOutcome::new(election, previous, status, iteration - 1));
            }

            let chosen = self.oracle.select(budget, &prices, &ballots)?;
            if let Some(unknown) = election.unknown_projects(&chosen).next() {
                return Err(AllocationError::UnknownProject(unknown));
            }
            let cost = election.cost_of(&chosen);
            debug!(
                oracle = self.oracle.name(),
                iteration,
                cost,
                budget,
                "modified allocation iteration"
            );

            if cost > budget {
                status = status.transition_to(AllocationStatus::InfeasibleRollback)?;
                return Ok(AllocationOutcome::new(election, previous, status, iteration));
            }
            previous = chosen;
            previous_prices = prices;
        }

        warn!(
            max_iterations = self.params.max_iterations,
            "modified allocation did not leave the reduced budget"
        );
        status = status.transition_to(AllocationStatus::IterationCapReached)?;
        Ok(AllocationOutcome::new(
            election,
            previous,
            status,
            self.params.max_iterations,
        ))
    }
}

fn reprice(election: &Election, steps: &BTreeMap<GroupKey, f64>, iteration: usize) -> Vec<Project> {
    election
        .groups()
        .flat_map(|group| {
            let discount = steps.get(&group.key).copied().unwrap_or(0.0) * iteration as f64;
            group
                .projects
                .iter()
                .map(move |p| p.repriced(discounted_cost(p.cost, discount)))
        })
        .collect()
}

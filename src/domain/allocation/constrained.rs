//! Constrained multi-group equal shares.
//!
//! Each iteration discounts every group's prices, hands the merged instance to
//! the selection oracle, measures what each group really spends at nominal
//! prices and feeds that back into the discount controller.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use thiserror::Error;
use tracing::{debug, warn};

use super::{ConstrainedMesParameters, DiscountController};
use crate::domain::election::{Election, Selection};
use crate::domain::foundation::{GroupKey, ProjectId, StateMachine, ValidationError};
use crate::ports::{OracleError, SelectionOracle};

/// Lifecycle of one allocation loop.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AllocationStatus {
    Running,
    /// The oracle returned the same selection twice in a row.
    ConvergedStable,
    /// Total cost moved by less than the configured threshold.
    ConvergedSmallDelta,
    /// The oracle overspent at nominal prices; the previous selection stands.
    InfeasibleRollback,
    /// The iteration cap was hit; the last feasible selection stands.
    IterationCapReached,
}

impl StateMachine for AllocationStatus {
    fn can_transition_to(&self, target: &Self) -> bool {
        self.valid_transitions().contains(target)
    }

    fn valid_transitions(&self) -> Vec<Self> {
        use AllocationStatus::*;
        match self {
            Running => vec![
                Running,
                ConvergedStable,
                ConvergedSmallDelta,
                InfeasibleRollback,
                IterationCapReached,
            ],
            _ => vec![],
        }
    }
}

impl fmt::Display for AllocationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            AllocationStatus::Running => "running",
            AllocationStatus::ConvergedStable => "converged_stable",
            AllocationStatus::ConvergedSmallDelta => "converged_small_delta",
            AllocationStatus::InfeasibleRollback => "infeasible_rollback",
            AllocationStatus::IterationCapReached => "iteration_cap_reached",
        };
        write!(f, "{}", s)
    }
}

/// Errors that abort an allocation run.
#[derive(Debug, Error)]
pub enum AllocationError {
    #[error("Selection oracle failed: {0}")]
    Oracle(#[from] OracleError),

    #[error("Oracle selected project {0} which is not part of the election")]
    UnknownProject(ProjectId),

    #[error("Invalid allocation state: {0}")]
    InvalidState(#[from] ValidationError),
}

/// Final result of an allocation loop.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct AllocationOutcome {
    pub selection: Selection,
    pub status: AllocationStatus,
    pub iterations: usize,
    /// Nominal spend per group of `selection`.
    pub group_costs: BTreeMap<GroupKey, u64>,
    /// Nominal cost of `selection`.
    pub total_cost: u64,
}

impl AllocationOutcome {
    /// Outcome for `selection`, with costs measured at nominal prices.
    pub fn new(
        election: &Election,
        selection: Selection,
        status: AllocationStatus,
        iterations: usize,
    ) -> Self {
        Self {
            group_costs: election.costs_per_group(&selection),
            total_cost: election.cost_of(&selection),
            selection,
            status,
            iterations,
        }
    }
}

/// Drives the discount controller and the oracle until the selection settles.
pub struct ConstrainedAllocator<'a> {
    oracle: &'a dyn SelectionOracle,
    params: ConstrainedMesParameters,
}

impl<'a> ConstrainedAllocator<'a> {
    pub fn new(oracle: &'a dyn SelectionOracle, params: ConstrainedMesParameters) -> Self {
        Self { oracle, params }
    }

    /// Runs the loop on the election and returns the final selection.
    ///
    /// # Termination
    /// Checked in order after every oracle call:
    /// 1. nominal cost above the total budget: previous selection (possibly empty)
    /// 2. same selection as the previous iteration: converged
    /// 3. cost change below `difference_threshold * total_budget`: converged
    ///    (from the second iteration on)
    ///
    /// After `max_iterations` the last feasible selection is returned.
    ///
    /// # Errors
    /// Oracle failures are propagated untouched, as are selections naming
    /// projects outside the election.
    pub fn allocate(&self, election: &Election) -> Result<AllocationOutcome, AllocationError> {
        let budget = election.total_budget();
        let ballots = election.merged_ballots();
        let bounds = election.bounds();
        let threshold = self.params.difference_threshold * budget as f64;

        let mut controller = DiscountController::from_parameters(election, &self.params);
        let mut status = AllocationStatus::Running;
        let mut previous = Selection::new();
        let mut previous_cost = 0u64;

        for iteration in 1..=self.params.max_iterations {
            let projects = controller.reprice(election);
            let chosen = self.oracle.select(budget, &projects, &ballots)?;
            if let Some(unknown) = election.unknown_projects(&chosen).next() {
                return Err(AllocationError::UnknownProject(unknown));
            }

            let cost = election.cost_of(&chosen);
            let group_costs = election.costs_per_group(&chosen);
            debug!(
                oracle = self.oracle.name(),
                iteration,
                cost,
                budget,
                group_costs = ?group_costs,
                discounts = ?controller.effective_discounts(),
                "constrained allocation iteration"
            );

            let next = if !election.can_afford(&chosen) {
                AllocationStatus::InfeasibleRollback
            } else if chosen == previous {
                AllocationStatus::ConvergedStable
            } else if iteration > 1 && (cost.abs_diff(previous_cost) as f64) < threshold {
                AllocationStatus::ConvergedSmallDelta
            } else {
                AllocationStatus::Running
            };
            status = status.transition_to(next)?;

            match status {
                AllocationStatus::Running => {
                    controller.advance(&group_costs, &bounds);
                    previous = chosen;
                    previous_cost = cost;
                }
                AllocationStatus::InfeasibleRollback => {
                    debug!(iteration, cost, budget, "selection over budget, rolling back");
                    return Ok(AllocationOutcome::new(election, previous, status, iteration));
                }
                _ => return Ok(AllocationOutcome::new(election, chosen, status, iteration)),
            }
        }

        warn!(
            max_iterations = self.params.max_iterations,
            "constrained allocation did not converge"
        );
        let status = status.transition_to(AllocationStatus::IterationCapReached)?;
        Ok(AllocationOutcome::new(
            election,
            previous,
            status,
            self.params.max_iterations,
        ))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::election::{Ballot, Group, Project, SpendingBounds};
    use proptest::prelude::*;
    use std::collections::VecDeque;
    use std::sync::Mutex;

    fn key(name: &str) -> GroupKey {
        GroupKey::new(name).unwrap()
    }

    fn selection(ids: &[ProjectId]) -> Selection {
        ids.iter().copied().collect()
    }

    /// Two groups of budget 100; projects 1 and 2 in `a`, 3 in `b`.
    fn election() -> Election {
        let a = Group::new(
            key("a"),
            vec![Project::new(1, 50), Project::new(2, 50)],
            vec![Ballot::new(1, [1, 2])],
            100,
        )
        .unwrap();
        let b = Group::new(key("b"), vec![Project::new(3, 100)], vec![Ballot::new(2, [3])], 100).unwrap();
        Election::new([a, b]).unwrap()
    }

    struct Constant(Selection);

    impl SelectionOracle for Constant {
        fn name(&self) -> &str {
            "constant"
        }

        fn select(&self, _: u64, _: &[Project], _: &[Ballot]) -> Result<Selection, OracleError> {
            Ok(self.0.clone())
        }
    }

    /// Replays a fixed list of selections, repeating the last one.
    struct Scripted {
        script: Mutex<VecDeque<Selection>>,
        last: Mutex<Selection>,
    }

    impl Scripted {
        fn new(script: Vec<Selection>) -> Self {
            Self {
                script: Mutex::new(script.into()),
                last: Mutex::new(Selection::new()),
            }
        }
    }

    impl SelectionOracle for Scripted {
        fn name(&self) -> &str {
            "scripted"
        }

        fn select(&self, _: u64, _: &[Project], _: &[Ballot]) -> Result<Selection, OracleError> {
            let mut last = self.last.lock().unwrap();
            if let Some(next) = self.script.lock().unwrap().pop_front() {
                *last = next;
            }
            Ok(last.clone())
        }
    }

    struct Failing;

    impl SelectionOracle for Failing {
        fn name(&self) -> &str {
            "failing"
        }

        fn select(&self, _: u64, _: &[Project], _: &[Ballot]) -> Result<Selection, OracleError> {
            Err(OracleError::Failed("boom".to_string()))
        }
    }

    #[test]
    fn constant_oracle_converges_stable_in_two_iterations() {
        let oracle = Constant(selection(&[1, 3]));
        let outcome = ConstrainedAllocator::new(&oracle, ConstrainedMesParameters::default())
            .allocate(&election())
            .unwrap();
        assert_eq!(outcome.status, AllocationStatus::ConvergedStable);
        assert_eq!(outcome.iterations, 2);
        assert_eq!(outcome.selection, selection(&[1, 3]));
        assert_eq!(outcome.total_cost, 150);
        assert_eq!(outcome.group_costs[&key("a")], 50);
        assert_eq!(outcome.group_costs[&key("b")], 100);
    }

    #[test]
    fn empty_first_selection_is_stable_immediately() {
        let oracle = Constant(Selection::new());
        let outcome = ConstrainedAllocator::new(&oracle, ConstrainedMesParameters::default())
            .allocate(&election())
            .unwrap();
        assert_eq!(outcome.status, AllocationStatus::ConvergedStable);
        assert_eq!(outcome.iterations, 1);
        assert!(outcome.selection.is_empty());
    }

    #[test]
    fn over_budget_selection_rolls_back_to_previous() {
        let oracle = Scripted::new(vec![selection(&[1]), selection(&[1, 2]), selection(&[1, 2, 3, 4])]);
        let big = Group::new(key("c"), vec![Project::new(4, 500)], vec![], 1).unwrap();
        let mut groups: Vec<Group> = election().groups().cloned().collect();
        groups.push(big);
        let election = Election::new(groups).unwrap();

        let outcome = ConstrainedAllocator::new(&oracle, ConstrainedMesParameters::default())
            .allocate(&election)
            .unwrap();
        assert_eq!(outcome.status, AllocationStatus::InfeasibleRollback);
        assert_eq!(outcome.iterations, 3);
        assert_eq!(outcome.selection, selection(&[1, 2]));
        assert_eq!(outcome.total_cost, 100);
    }

    #[test]
    fn over_budget_first_iteration_returns_empty_selection() {
        let a = Group::new(key("a"), vec![Project::new(1, 300)], vec![], 100).unwrap();
        let election = Election::new([a]).unwrap();
        let oracle = Constant(selection(&[1]));
        let outcome = ConstrainedAllocator::new(&oracle, ConstrainedMesParameters::default())
            .allocate(&election)
            .unwrap();
        assert_eq!(outcome.status, AllocationStatus::InfeasibleRollback);
        assert_eq!(outcome.iterations, 1);
        assert!(outcome.selection.is_empty());
        assert_eq!(outcome.total_cost, 0);
    }

    #[test]
    fn small_cost_change_counts_as_converged() {
        // {1} and {2} cost the same, so the delta is zero
        let oracle = Scripted::new(vec![selection(&[1]), selection(&[2])]);
        let outcome = ConstrainedAllocator::new(&oracle, ConstrainedMesParameters::default())
            .allocate(&election())
            .unwrap();
        assert_eq!(outcome.status, AllocationStatus::ConvergedSmallDelta);
        assert_eq!(outcome.iterations, 2);
        assert_eq!(outcome.selection, selection(&[2]));
    }

    #[test]
    fn oscillation_hits_iteration_cap_with_last_feasible_selection() {
        let script = (0..10)
            .map(|i| if i % 2 == 0 { selection(&[1]) } else { selection(&[1, 3]) })
            .collect();
        let oracle = Scripted::new(script);
        let params = ConstrainedMesParameters {
            max_iterations: 5,
            ..Default::default()
        };
        let outcome = ConstrainedAllocator::new(&oracle, params)
            .allocate(&election())
            .unwrap();
        assert_eq!(outcome.status, AllocationStatus::IterationCapReached);
        assert_eq!(outcome.iterations, 5);
        assert_eq!(outcome.selection, selection(&[1]));
    }

    #[test]
    fn oracle_failure_is_propagated() {
        let result = ConstrainedAllocator::new(&Failing, ConstrainedMesParameters::default())
            .allocate(&election());
        assert!(matches!(result, Err(AllocationError::Oracle(OracleError::Failed(_)))));
    }

    #[test]
    fn unknown_project_from_oracle_is_an_error() {
        let oracle = Constant(selection(&[99]));
        let result = ConstrainedAllocator::new(&oracle, ConstrainedMesParameters::default())
            .allocate(&election());
        assert!(matches!(result, Err(AllocationError::UnknownProject(99))));
    }

    #[test]
    fn bounds_reach_the_controller() {
        // picks project 2 only once its price drops under 75
        struct PriceGate;
        impl SelectionOracle for PriceGate {
            fn name(&self) -> &str {
                "price-gate"
            }
            fn select(&self, _: u64, projects: &[Project], _: &[Ballot]) -> Result<Selection, OracleError> {
                let mut chosen = Selection::from([1]);
                if projects.iter().any(|p| p.id == 2 && p.cost < 75) {
                    chosen.insert(2);
                }
                Ok(chosen)
            }
        }

        let bounds = BTreeMap::from([(key("a"), SpendingBounds::lower(100))]);
        let election = election().with_bounds(&bounds).unwrap();
        let outcome = ConstrainedAllocator::new(&PriceGate, ConstrainedMesParameters::default())
            .allocate(&election)
            .unwrap();
        assert!(outcome.selection.contains(&2));
        assert_eq!(outcome.group_costs[&key("a")], 100);
        assert_eq!(outcome.status, AllocationStatus::ConvergedStable);
        assert_eq!(outcome.iterations, 3);
    }

    #[test]
    fn upper_bound_pushes_overspending_group_back_under_it() {
        // keeps project 2 while its price stays at or under 85
        struct PriceCeiling;
        impl SelectionOracle for PriceCeiling {
            fn name(&self) -> &str {
                "price-ceiling"
            }
            fn select(&self, _: u64, projects: &[Project], _: &[Ballot]) -> Result<Selection, OracleError> {
                let mut chosen = Selection::from([1]);
                if projects.iter().any(|p| p.id == 2 && p.cost <= 85) {
                    chosen.insert(2);
                }
                Ok(chosen)
            }
        }

        let bounds = BTreeMap::from([(key("a"), SpendingBounds::upper(50))]);
        let election = election().with_bounds(&bounds).unwrap();
        let outcome = ConstrainedAllocator::new(&PriceCeiling, ConstrainedMesParameters::default())
            .allocate(&election)
            .unwrap();

        // first iteration spends 100 in `a`, the correction lifts project 2 to 92
        assert_eq!(outcome.selection, selection(&[1]));
        assert_eq!(outcome.group_costs[&key("a")], 50);
        assert_eq!(outcome.status, AllocationStatus::ConvergedStable);
        assert_eq!(outcome.iterations, 3);
    }

    #[test]
    fn terminal_statuses_have_no_transitions() {
        assert!(!AllocationStatus::Running.is_terminal());
        assert!(AllocationStatus::ConvergedStable.is_terminal());
        assert!(AllocationStatus::InfeasibleRollback.is_terminal());
        assert!(AllocationStatus::ConvergedStable
            .transition_to(AllocationStatus::Running)
            .is_err());
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(64))]
        #[test]
        fn returned_selection_always_fits_budget(
            script in prop::collection::vec(prop::collection::btree_set(1u64..=3, 0..=3), 1..12),
            step in 0.01f64..2.0,
            lower in proptest::option::of(0u64..150),
        ) {
            let bounds = BTreeMap::from([(key("a"), SpendingBounds { lower_bound: lower, upper_bound: None })]);
            let election = election().with_bounds(&bounds).unwrap();
            let oracle = Scripted::new(script);
            let params = ConstrainedMesParameters { step, max_iterations: 20, ..Default::default() };
            let outcome = ConstrainedAllocator::new(&oracle, params).allocate(&election).unwrap();
            prop_assert!(outcome.total_cost <= election.total_budget());
            prop_assert!(outcome.status.is_terminal());
        }
    }
}

//! Registry of the allocation methods a run can compare.

use thiserror::Error;

use crate::adapters::oracle::EqualShares;
use crate::config::MethodParameters;
use crate::domain::allocation::{
    equal_shares_on_merged, greedy, AllocationError, AllocationOutcome, AllocationStatus,
    ConstrainedAllocator, ModifiedAllocator,
};
use crate::domain::election::{Election, Selection};
use crate::ports::OracleError;

/// Errors raised while running a method
#[derive(Debug, Error)]
pub enum MethodError {
    #[error(transparent)]
    Allocation(#[from] AllocationError),

    #[error(transparent)]
    Oracle(#[from] OracleError),

    #[error("{method} selected projects costing {cost}, over the budget of {budget}")]
    BudgetExceeded {
        method: &'static str,
        cost: u64,
        budget: u64,
    },
}

/// Selection made by a method, with the terminal status of iterative ones.
#[derive(Debug, Clone, PartialEq)]
pub struct MethodRun {
    pub selection: Selection,
    pub status: Option<AllocationStatus>,
}

impl From<AllocationOutcome> for MethodRun {
    fn from(outcome: AllocationOutcome) -> Self {
        Self {
            selection: outcome.selection,
            status: Some(outcome.status),
        }
    }
}

impl From<Selection> for MethodRun {
    fn from(selection: Selection) -> Self {
        Self {
            selection,
            status: None,
        }
    }
}

type RunFn = fn(&Election, &MethodParameters) -> Result<MethodRun, MethodError>;

#[derive(Clone, Copy)]
pub struct Method {
    pub name: &'static str,
    pub description: &'static str,
    run: RunFn,
}

impl Method {
    /// Runs the method and checks the selection fits the total budget.
    pub fn run(
        &self,
        election: &Election,
        parameters: &MethodParameters,
    ) -> Result<MethodRun, MethodError> {
        let run = (self.run)(election, parameters)?;
        let cost = election.cost_of(&run.selection);
        let budget = election.total_budget();
        if cost > budget {
            return Err(MethodError::BudgetExceeded {
                method: self.name,
                cost,
                budget,
            });
        }
        Ok(run)
    }
}

impl std::fmt::Debug for Method {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Method").field("name", &self.name).finish()
    }
}

/// All methods, in the order a run executes them.
pub const METHODS: &[Method] = &[
    Method {
        name: "greedy",
        description: "Greedy algorithm",
        run: run_greedy,
    },
    Method {
        name: "mes_add_one",
        description: "Method of Equal Shares (AddOne)",
        run: run_mes_add_one,
    },
    Method {
        name: "modified_mes",
        description: "Modified Method of Equal Shares",
        run: run_modified_mes,
    },
    Method {
        name: "constrained_mes",
        description: "Constrained Method of Equal Shares",
        run: run_constrained_mes,
    },
];

pub fn find_method(name: &str) -> Option<&'static Method> {
    METHODS.iter().find(|m| m.name == name)
}

fn run_greedy(election: &Election, _: &MethodParameters) -> Result<MethodRun, MethodError> {
    Ok(greedy(election).into())
}

fn run_mes_add_one(
    election: &Election,
    parameters: &MethodParameters,
) -> Result<MethodRun, MethodError> {
    let oracle = EqualShares::with_add_one(parameters.mes_add_one.step);
    Ok(equal_shares_on_merged(&oracle, election)?.into())
}

fn run_modified_mes(
    election: &Election,
    parameters: &MethodParameters,
) -> Result<MethodRun, MethodError> {
    let oracle = EqualShares::new();
    let outcome = ModifiedAllocator::new(&oracle, parameters.modified_mes).allocate(election)?;
    Ok(outcome.into())
}

fn run_constrained_mes(
    election: &Election,
    parameters: &MethodParameters,
) -> Result<MethodRun, MethodError> {
    let oracle = EqualShares::new();
    let outcome =
        ConstrainedAllocator::new(&oracle, parameters.constrained_mes).allocate(election)?;
    Ok(outcome.into())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::election::{Ballot, Group, Project};
    use crate::domain::foundation::GroupKey;

    fn election() -> Election {
        let citywide = Group::new(
            GroupKey::citywide(),
            vec![Project::new(1, 60), Project::new(2, 50)],
            vec![Ballot::new(1, [1]), Ballot::new(2, [1, 2]), Ballot::new(3, [2])],
            100,
        )
        .unwrap();
        Election::new([citywide]).unwrap()
    }

    #[test]
    fn registry_order_is_fixed() {
        let names: Vec<_> = METHODS.iter().map(|m| m.name).collect();
        assert_eq!(
            names,
            ["greedy", "mes_add_one", "modified_mes", "constrained_mes"]
        );
    }

    #[test]
    fn find_method_by_name() {
        assert_eq!(find_method("greedy").unwrap().description, "Greedy algorithm");
        assert!(find_method("random").is_none());
    }

    #[test]
    fn every_method_stays_within_budget() {
        let election = election();
        let parameters = MethodParameters::default();
        for method in METHODS {
            let run = method.run(&election, &parameters).unwrap();
            assert!(election.cost_of(&run.selection) <= 100, "{}", method.name);
        }
    }

    #[test]
    fn iterative_methods_report_status() {
        let election = election();
        let parameters = MethodParameters::default();

        let greedy = find_method("greedy").unwrap().run(&election, &parameters).unwrap();
        assert!(greedy.status.is_none());

        let constrained = find_method("constrained_mes")
            .unwrap()
            .run(&election, &parameters)
            .unwrap();
        assert!(constrained.status.is_some());
    }

    #[test]
    fn over_budget_selection_is_rejected() {
        fn everything(election: &Election, _: &MethodParameters) -> Result<MethodRun, MethodError> {
            Ok(election.projects().map(|p| p.id).collect::<Selection>().into())
        }
        let method = Method {
            name: "everything",
            description: "Select every project",
            run: everything,
        };

        let result = method.run(&election(), &MethodParameters::default());
        assert!(matches!(
            result,
            Err(MethodError::BudgetExceeded { cost: 110, budget: 100, .. })
        ));
    }
}

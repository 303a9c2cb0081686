//! Method of Equal Shares with cost utilities.
//!
//! Every voter starts with an equal share of the budget. A project is bought
//! by its supporters, each paying `min(money, rho * cost)`; the project with
//! the smallest feasible `rho` is bought first. With cost utilities this
//! favours projects with many supporters who still have money left.

use std::collections::HashMap;

use crate::domain::election::{Ballot, Project, Selection};
use crate::domain::foundation::ProjectId;
use crate::ports::{OracleError, SelectionOracle};

/// Relative slack when checking whether supporters can cover a cost.
const AFFORDABILITY_TOLERANCE: f64 = 1e-9;

/// Equal Shares selection rule, optionally completed by raising voter money.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct EqualShares {
    voter_budget_increment: Option<u64>,
}

impl EqualShares {
    pub fn new() -> Self {
        Self::default()
    }

    /// Equal Shares with add-one completion.
    ///
    /// Voter money is raised by `increment` per round until the outcome would
    /// exceed the real budget or no further project fits.
    pub fn with_add_one(increment: u64) -> Self {
        Self {
            voter_budget_increment: Some(increment.max(1)),
        }
    }
}

impl SelectionOracle for EqualShares {
    fn name(&self) -> &str {
        match self.voter_budget_increment {
            Some(_) => "equal_shares_add_one",
            None => "equal_shares",
        }
    }

    fn select(
        &self,
        budget: u64,
        projects: &[Project],
        ballots: &[Ballot],
    ) -> Result<Selection, OracleError> {
        let instance = Instance::new(projects, ballots)?;
        if ballots.is_empty() {
            return Ok(Selection::new());
        }

        let share = budget as f64 / ballots.len() as f64;
        let mut outcome = instance.run(share, Some(budget));

        let Some(increment) = self.voter_budget_increment else {
            return Ok(outcome);
        };

        let mut share = share;
        while !instance.is_exhaustive(&outcome, budget) {
            share += increment as f64;
            let next = instance.run(share, None);
            if instance.cost_of(&next) > budget {
                break;
            }
            outcome = next;
        }
        Ok(outcome)
    }
}

struct Candidate {
    id: ProjectId,
    cost: u64,
    supporters: Vec<usize>,
}

impl Candidate {
    /// Per-supporter payment cap `q` with `sum(min(money_i, q)) == cost`, if
    /// the supporters can afford the project at all.
    fn payment_cap(&self, money: &[f64]) -> Option<f64> {
        if self.cost == 0 {
            return Some(0.0);
        }
        let mut budgets: Vec<f64> = self.supporters.iter().map(|&v| money[v]).collect();
        budgets.sort_by(f64::total_cmp);

        let cost = self.cost as f64;
        let mut paid = 0.0;
        for (j, b) in budgets.iter().enumerate() {
            let payers = (budgets.len() - j) as f64;
            let need = cost - paid;
            if b * payers >= need * (1.0 - AFFORDABILITY_TOLERANCE) {
                return Some(need / payers);
            }
            paid += b;
        }
        None
    }

    fn rho(&self, money: &[f64]) -> Option<f64> {
        let cap = self.payment_cap(money)?;
        Some(if self.cost == 0 { 0.0 } else { cap / self.cost as f64 })
    }
}

struct Instance {
    candidates: Vec<Candidate>,
    voters: usize,
}

impl Instance {
    fn new(projects: &[Project], ballots: &[Ballot]) -> Result<Self, OracleError> {
        let index: HashMap<ProjectId, usize> = projects
            .iter()
            .enumerate()
            .map(|(i, p)| (p.id, i))
            .collect();
        if index.len() != projects.len() {
            return Err(OracleError::InvalidInput(
                "duplicate project ids".to_string(),
            ));
        }

        let mut candidates: Vec<Candidate> = projects
            .iter()
            .map(|p| Candidate {
                id: p.id,
                cost: p.cost,
                supporters: Vec::new(),
            })
            .collect();
        for (voter, ballot) in ballots.iter().enumerate() {
            for approval in &ballot.approvals {
                let slot = index
                    .get(approval)
                    .ok_or(OracleError::UnknownProject(*approval))?;
                candidates[*slot].supporters.push(voter);
            }
        }
        candidates.retain(|c| !c.supporters.is_empty());

        Ok(Self {
            candidates,
            voters: ballots.len(),
        })
    }

    /// One Equal Shares pass with `share` money per voter. `cap` limits the
    /// nominal spend of the pass.
    fn run(&self, share: f64, cap: Option<u64>) -> Selection {
        let mut money = vec![share; self.voters];
        let mut remaining: Vec<&Candidate> = self.candidates.iter().collect();
        let mut left = cap;
        let mut chosen = Selection::new();

        loop {
            let mut best: Option<(f64, usize)> = None;
            for (i, candidate) in remaining.iter().enumerate() {
                if left.is_some_and(|l| candidate.cost > l) {
                    continue;
                }
                let Some(rho) = candidate.rho(&money) else {
                    continue;
                };
                let better = match best {
                    None => true,
                    Some((best_rho, j)) => {
                        rho < best_rho || (rho == best_rho && candidate.id < remaining[j].id)
                    }
                };
                if better {
                    best = Some((rho, i));
                }
            }

            let Some((rho, i)) = best else {
                break;
            };
            let bought = remaining.swap_remove(i);
            let payment = rho * bought.cost as f64;
            for &voter in &bought.supporters {
                money[voter] = (money[voter] - payment).max(0.0);
            }
            if let Some(l) = left.as_mut() {
                *l -= bought.cost;
            }
            chosen.insert(bought.id);
        }

        chosen
    }

    fn cost_of(&self, selection: &Selection) -> u64 {
        self.candidates
            .iter()
            .filter(|c| selection.contains(&c.id))
            .map(|c| c.cost)
            .sum()
    }

    /// True when no unselected supported project fits the budget left over.
    fn is_exhaustive(&self, selection: &Selection, budget: u64) -> bool {
        let left = budget.saturating_sub(self.cost_of(selection));
        self.candidates
            .iter()
            .all(|c| selection.contains(&c.id) || c.cost > left)
    }
}

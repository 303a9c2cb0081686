//! Results of a comparison run, shaped for the persisted bundle.

use chrono::{DateTime, Utc};
use serde::Serialize;
use std::collections::BTreeMap;

use super::allocation::AllocationStatus;
use super::election::{Election, Group, Selection};
use super::foundation::{GroupKey, ProjectId, RunId};
use super::metrics::{Evaluation, MetricsScores};

/// What one method selected and how long it took.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MethodOutcome {
    pub method: String,
    pub selected_projects: Selection,
    /// Nominal cost of the selection.
    pub cost: u64,
    pub time_seconds: f64,
    /// Terminal status of iterative methods.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<AllocationStatus>,
}

/// Budget and bounds of a group, bounds as fractions of the budget.
#[derive(Debug, Clone, Copy, PartialEq, Serialize)]
pub struct GroupSummary {
    pub budget: u64,
    pub lower_bound: Option<f64>,
    pub upper_bound: Option<f64>,
}

impl GroupSummary {
    pub fn from_group(group: &Group) -> Self {
        let fraction = |amount: u64| round2(amount as f64 / group.budget as f64);
        Self {
            budget: group.budget,
            lower_bound: group.bounds.lower_bound.map(fraction),
            upper_bound: group.bounds.upper_bound.map(fraction),
        }
    }
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Everything a comparison run produced.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct RunResults {
    pub run_id: RunId,
    pub started_at: DateTime<Utc>,
    pub outcomes: Vec<MethodOutcome>,
    pub evaluation: Evaluation,
    /// Effective method parameters.
    pub parameters: serde_json::Value,
    pub groups: BTreeMap<GroupKey, GroupSummary>,
}

impl RunResults {
    pub fn new(
        election: &Election,
        outcomes: Vec<MethodOutcome>,
        evaluation: Evaluation,
        parameters: serde_json::Value,
    ) -> Self {
        Self {
            run_id: RunId::new(),
            started_at: Utc::now(),
            outcomes,
            evaluation,
            parameters,
            groups: election
                .groups()
                .map(|g| (g.key.clone(), GroupSummary::from_group(g)))
                .collect(),
        }
    }

    /// Method -> sorted selected project ids.
    pub fn selections(&self) -> BTreeMap<&str, Vec<ProjectId>> {
        self.outcomes
            .iter()
            .map(|o| (o.method.as_str(), o.selected_projects.iter().copied().collect()))
            .collect()
    }

    /// Report written as `results.json`.
    pub fn report(&self) -> ResultsReport<'_> {
        ResultsReport {
            run_id: &self.run_id,
            execution_times: self
                .outcomes
                .iter()
                .map(|o| (o.method.as_str(), o.time_seconds))
                .collect(),
            results: &self.evaluation.overall,
            district_results: self
                .evaluation
                .per_group
                .iter()
                .map(|(key, scores)| (key, DistrictResults { results: scores }))
                .collect(),
            groups: &self.groups,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ResultsReport<'a> {
    pub run_id: &'a RunId,
    #[serde(rename = "execution time (in seconds)")]
    pub execution_times: BTreeMap<&'a str, f64>,
    pub results: &'a MetricsScores,
    pub district_results: BTreeMap<&'a GroupKey, DistrictResults<'a>>,
    pub groups: &'a BTreeMap<GroupKey, GroupSummary>,
}

#[derive(Debug, Serialize)]
pub struct DistrictResults<'a> {
    pub results: &'a MetricsScores,
}

//! Static registry of metrics, dispatched by name.

use super::{binary, unary, MetricValue};
use crate::domain::election::{Election, Group, Selection};

pub type GroupUnaryFn = fn(&Group, &Selection) -> MetricValue;
pub type ElectionUnaryFn = fn(&Election, &Selection) -> MetricValue;
pub type GroupBinaryFn = fn(&Group, &Selection, &Selection) -> MetricValue;

/// How a metric produces its election-wide score.
#[derive(Clone, Copy)]
pub enum Aggregate<F> {
    /// No election-wide score.
    None,
    /// The group-level function applied to the merged instance.
    Merged,
    /// A dedicated election-wide function.
    Custom(F),
}

/// Arity and functions of a metric.
#[derive(Clone, Copy)]
pub enum MetricKind {
    Unary {
        aggregate: Aggregate<ElectionUnaryFn>,
        per_group: GroupUnaryFn,
    },
    Binary {
        aggregate: Aggregate<fn(&Election, &Selection, &Selection) -> MetricValue>,
        per_group: GroupBinaryFn,
    },
}

#[derive(Clone, Copy)]
pub struct Metric {
    pub name: &'static str,
    pub description: &'static str,
    pub kind: MetricKind,
}

impl Metric {
    pub fn is_binary(&self) -> bool {
        matches!(self.kind, MetricKind::Binary { .. })
    }
}

const fn unary_metric(
    name: &'static str,
    description: &'static str,
    aggregate: Aggregate<ElectionUnaryFn>,
    per_group: GroupUnaryFn,
) -> Metric {
    Metric {
        name,
        description,
        kind: MetricKind::Unary {
            aggregate,
            per_group,
        },
    }
}

/// Every metric, in evaluation order.
pub const METRICS: &[Metric] = &[
    unary_metric(
        "average_satisfaction",
        "Average number of selected projects approved by a ballot",
        Aggregate::Merged,
        unary::average_satisfaction,
    ),
    unary_metric(
        "cost",
        "Total cost of selected projects",
        Aggregate::Merged,
        unary::cost,
    ),
    unary_metric(
        "budget_usage",
        "Total cost of selected projects divided by budget",
        Aggregate::Merged,
        unary::budget_usage,
    ),
    unary_metric(
        "number_of_selected_projects",
        "Number of selected projects",
        Aggregate::Merged,
        unary::number_of_selected_projects,
    ),
    unary_metric(
        "lower_constraint_satisfaction",
        "Total cost of selected projects divided by lower bound",
        Aggregate::None,
        unary::lower_constraint_satisfaction,
    ),
    unary_metric(
        "upper_constraint_satisfaction",
        "Total cost of selected projects divided by upper bound",
        Aggregate::None,
        unary::upper_constraint_satisfaction,
    ),
    unary_metric(
        "lower_bound_satisfied_constraints",
        "Share of groups with their lower bound satisfied",
        Aggregate::Custom(unary::lower_bound_satisfied_over_groups),
        unary::lower_bound_satisfied,
    ),
    unary_metric(
        "upper_bound_satisfied_constraints",
        "Share of groups with their upper bound satisfied",
        Aggregate::Custom(unary::upper_bound_satisfied_over_groups),
        unary::upper_bound_satisfied,
    ),
    unary_metric(
        "lower_bound_constraints_satisfaction",
        "Average lower bound satisfaction, capped at 1 when met",
        Aggregate::Custom(unary::lower_bound_satisfaction_over_groups),
        unary::lower_bound_satisfaction,
    ),
    unary_metric(
        "upper_bound_constraints_satisfaction",
        "Average upper bound satisfaction, 1 when met",
        Aggregate::Custom(unary::upper_bound_satisfaction_over_groups),
        unary::upper_bound_satisfaction,
    ),
    Metric {
        name: "better_than",
        description: "Share of ballots preferring the first method's selection over the second's",
        kind: MetricKind::Binary {
            aggregate: Aggregate::Merged,
            per_group: binary::better_than,
        },
    },
];

/// Looks a metric up by name.
pub fn find_metric(name: &str) -> Option<&'static Metric> {
    METRICS.iter().find(|m| m.name == name)
}

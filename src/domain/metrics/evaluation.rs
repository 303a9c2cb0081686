//! Evaluation of selected metrics over the outcomes of several methods.

use serde::Serialize;
use std::collections::BTreeMap;

use super::{Aggregate, Metric, MetricKind, MetricsScores};
use crate::domain::election::{Election, Selection};
use crate::domain::foundation::GroupKey;

/// Election-wide and per-group scores.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct Evaluation {
    pub overall: MetricsScores,
    pub per_group: BTreeMap<GroupKey, MetricsScores>,
}

/// Scores every metric against every outcome.
///
/// Binary metrics are evaluated for each ordered pair of distinct methods and
/// keyed `"<a> vs <b>"`.
pub fn evaluate(
    election: &Election,
    outcomes: &[(String, Selection)],
    metrics: &[&Metric],
) -> Evaluation {
    let merged = election.merged_group();
    let mut evaluation = Evaluation {
        overall: MetricsScores::new(),
        per_group: election
            .group_keys()
            .map(|key| (key.clone(), MetricsScores::new()))
            .collect(),
    };

    for metric in metrics {
        match metric.kind {
            MetricKind::Unary {
                aggregate,
                per_group,
            } => {
                for (method, selection) in outcomes {
                    let overall = match aggregate {
                        Aggregate::None => None,
                        Aggregate::Merged => Some(per_group(&merged, selection)),
                        Aggregate::Custom(f) => Some(f(election, selection)),
                    };
                    if let Some(value) = overall {
                        evaluation
                            .overall
                            .entry(metric.name.to_string())
                            .or_default()
                            .insert(method.clone(), value);
                    }
                    for group in election.groups() {
                        if let Some(scores) = evaluation.per_group.get_mut(&group.key) {
                            scores
                                .entry(metric.name.to_string())
                                .or_default()
                                .insert(method.clone(), per_group(group, selection));
                        }
                    }
                }
            }
            MetricKind::Binary {
                aggregate,
                per_group,
            } => {
                for (first_name, first) in outcomes {
                    for (second_name, second) in outcomes {
                        if first_name == second_name {
                            continue;
                        }
                        let entry = format!("{} vs {}", first_name, second_name);
                        let overall = match aggregate {
                            Aggregate::None => None,
                            Aggregate::Merged => Some(per_group(&merged, first, second)),
                            Aggregate::Custom(f) => Some(f(election, first, second)),
                        };
                        if let Some(value) = overall {
                            evaluation
                                .overall
                                .entry(metric.name.to_string())
                                .or_default()
                                .insert(entry.clone(), value);
                        }
                        for group in election.groups() {
                            if let Some(scores) = evaluation.per_group.get_mut(&group.key) {
                                scores
                                    .entry(metric.name.to_string())
                                    .or_default()
                                    .insert(entry.clone(), per_group(group, first, second));
                            }
                        }
                    }
                }
            }
        }
    }

    evaluation
}

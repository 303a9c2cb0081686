//! Metrics comparing two selections.

use super::MetricValue;
use crate::domain::election::{Group, Selection};

/// Share of ballots approving strictly more of `first` than of `second`.
pub fn better_than(group: &Group, first: &Selection, second: &Selection) -> MetricValue {
    if group.ballots.is_empty() {
        return MetricValue::Ratio(0.0);
    }
    let preferring = group
        .ballots
        .iter()
        .filter(|b| b.overlap(first) > b.overlap(second))
        .count();
    MetricValue::Ratio(preferring as f64 / group.ballots.len() as f64)
}

//! Metric values and score tables.

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;

/// Result of one metric for one method.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum MetricValue {
    Count(u64),
    Ratio(f64),
}

impl MetricValue {
    pub fn as_f64(&self) -> f64 {
        match self {
            MetricValue::Count(n) => *n as f64,
            MetricValue::Ratio(r) => *r,
        }
    }
}

impl fmt::Display for MetricValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MetricValue::Count(n) => write!(f, "{}", n),
            MetricValue::Ratio(r) => write!(f, "{:.4}", r),
        }
    }
}

/// Method (or `"a vs b"` pair) -> value.
pub type MetricScores = BTreeMap<String, MetricValue>;

/// Metric name -> scores.
pub type MetricsScores = BTreeMap<String, MetricScores>;

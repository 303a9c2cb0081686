//! Outcome metrics.
//!
//! Metrics are pure functions of (election data, selection). They are kept in
//! a static registry of tagged function variants so callers can list them and
//! select a subset by name.

mod binary;
mod evaluation;
mod registry;
mod unary;
mod value;

pub use evaluation::{evaluate, Evaluation};
pub use registry::{find_metric, Aggregate, Metric, MetricKind, METRICS};
pub use value::{MetricScores, MetricValue, MetricsScores};

//! Command handlers.

mod run_comparison;

pub use run_comparison::{
    resolve_methods, resolve_metrics, RunComparisonCommand, RunComparisonHandler,
    RunComparisonResult, RunError, ALL,
};

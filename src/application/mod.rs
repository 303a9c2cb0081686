//! Application layer - method registry and the comparison use case.
//!
//! This layer orchestrates domain operations and coordinates between ports.

pub mod handlers;
mod methods;

pub use handlers::{
    resolve_methods, resolve_metrics, RunComparisonCommand, RunComparisonHandler,
    RunComparisonResult, RunError, ALL,
};
pub use methods::{find_method, Method, MethodError, MethodRun, METHODS};

//! Domain layer containing allocation logic and domain types.
//!
//! # Module Organization
//!
//! - `foundation` - Shared domain primitives (IDs, errors, state machine)
//! - `election` - Projects, ballots, groups and the merged instance
//! - `allocation` - Discount controller and allocation methods
//! - `metrics` - Pure outcome metrics and their registry
//! - `results` - Results of a comparison run

pub mod allocation;
pub mod election;
pub mod foundation;
pub mod metrics;
pub mod results;

//! Foundation module - Shared domain primitives.
//!
//! Contains identifiers, error types and the state machine trait
//! that form the vocabulary of the allocation domain.

mod errors;
mod ids;
mod state_machine;

pub use errors::{ErrorCode, ValidationError};
pub use ids::{GroupKey, ProjectId, RunId, VoterId, CITYWIDE, MERGED_GROUP};
pub use state_machine::StateMachine;

//! Election module - the group data model.
//!
//! Groups are read-only inputs created once per run. The `Election` merges
//! them into the single universe every allocation method works on.

mod election;
mod group;
mod project;

pub use election::Election;
pub use group::{Group, SpendingBounds};
pub use project::{Ballot, Project, Selection};

//! pb-allocator - Participatory budgeting with per-district spending bounds
//!
//! This crate allocates a citywide budget across district projects with the
//! Method of Equal Shares, steering each district's spending into its bounds
//! through per-group price discounts, and compares the result with other
//! allocation methods.

pub mod adapters;
pub mod application;
pub mod config;
pub mod domain;
pub mod ports;

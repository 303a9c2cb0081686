//! Selection oracle implementations.

mod equal_shares;

pub use equal_shares::EqualShares;

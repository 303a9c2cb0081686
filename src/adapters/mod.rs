//! Adapters - Implementations of port interfaces.
//!
//! Adapters connect the domain to external systems:
//! - `oracle` - Method of Equal Shares selection oracle
//! - `pabulib` - `.pb` data directories and constraints files
//! - `results` - filesystem results bundle and log capture
//! - `cli` - command line surface

pub mod cli;
pub mod oracle;
pub mod pabulib;
pub mod results;

pub use oracle::EqualShares;
pub use pabulib::PabulibDirectory;
pub use results::{FsResultsStore, LogCapture};

//! Ports - Interfaces for external collaborators.
//!
//! Following hexagonal architecture, ports define the contracts between
//! the domain and the outside world. Adapters implement these ports.
//!
//! - `SelectionOracle` - fair selection rule invoked by allocation methods
//! - `ElectionSource` - loading of groups, ballots and spending bounds
//! - `ResultsStore` - persistence of a comparison run

mod election_source;
mod results_store;
mod selection_oracle;

pub use election_source::{ElectionSource, LoadError};
pub use results_store::{ResultsStore, StorageError};
pub use selection_oracle::{OracleError, SelectionOracle};

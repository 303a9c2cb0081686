//! Pabulib adapter - `.pb` data directories and the constraints file.

mod constraints;
mod loader;
mod parser;

pub use constraints::{read_constraints, write_constraints, Constraints};
pub use loader::PabulibDirectory;
pub use parser::{parse_meta, parse_pb, PbFile};

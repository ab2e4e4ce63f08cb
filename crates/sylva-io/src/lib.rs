//! Loading labeled categorical records for sylva.

mod error;
mod reader;

pub use error::IoError;
pub use reader::{DEFAULT_N_ATTRIBUTES, RecordReader};

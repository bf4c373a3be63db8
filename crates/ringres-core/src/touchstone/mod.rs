//! Touchstone file I/O module
//!
//! Provides reading and writing of Touchstone (.snp / .ts) files.

pub mod parser;
pub mod writer;

pub use parser::{ParameterType, SParamFormat, Touchstone};

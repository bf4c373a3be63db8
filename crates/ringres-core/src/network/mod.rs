//! Network module - N-port electrical network representation
//!
//! Holds S-parameter data read from Touchstone files and exposes the
//! single traces the extraction stages consume.

mod core;
mod derived;
mod io;

pub use core::Network;

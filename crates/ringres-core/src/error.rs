//! Error taxonomy
//!
//! - [`DataFormatError`]: unreadable or malformed input, fatal.
//! - [`BandwidthNotFoundError`]: per-mode, recovered by NaN fields.
//! - [`OutputWriteError`]: reporting stage, surfaced as a warning.
//! - [`ConfigError`]: invalid configuration, fatal.

use std::fmt;
use std::path::PathBuf;
use thiserror::Error;

/// Input file could not be turned into a [`crate::Spectrum`].
#[derive(Error, Debug)]
pub enum DataFormatError {
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Parse error at line {line}: {message}")]
    Parse { line: usize, message: String },

    #[error("Invalid option line: {0}")]
    InvalidOption(String),

    #[error("Invalid file extension: expected .sNp or .ts format")]
    InvalidExtension,

    #[error("Unsupported parameter type {0}: only S-parameters are accepted")]
    UnsupportedParameter(String),

    #[error("No data points found")]
    Empty,

    #[error("No S21 column: file has {nports} port(s)")]
    MissingS21 { nports: usize },

    #[error("Frequency not strictly increasing at point {index} ({previous} Hz -> {current} Hz)")]
    NonMonotonicFrequency {
        index: usize,
        previous: f64,
        current: f64,
    },

    #[error("Length mismatch: {frequencies} frequencies but {values} values")]
    LengthMismatch { frequencies: usize, values: usize },

    #[error("Non-finite frequency at point {0}")]
    NonFiniteFrequency(usize),
}

/// Side of a resonance on which the bandwidth search ran out of samples.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Edge {
    Lower,
    Upper,
}

impl fmt::Display for Edge {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Edge::Lower => write!(f, "lower"),
            Edge::Upper => write!(f, "upper"),
        }
    }
}

/// The spectrum edge was reached before the magnitude fell below the
/// bandwidth threshold.
#[derive(Error, Debug, Clone, PartialEq)]
#[error("mode {mode_index}: {edge} spectrum edge reached before the -{drop_db} dB point")]
pub struct BandwidthNotFoundError {
    pub mode_index: usize,
    pub edge: Edge,
    pub drop_db: f64,
}

/// A report artefact could not be written.
#[derive(Error, Debug)]
pub enum OutputWriteError {
    #[error("cannot create output directory {path}: {source}")]
    CreateDir {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("cannot write {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("cannot write CSV {path}: {source}")]
    Csv { path: PathBuf, source: csv::Error },

    #[error("cannot encode image {path}: {source}")]
    Image {
        path: PathBuf,
        source: image::ImageError,
    },
}

impl OutputWriteError {
    /// Path of the artefact that failed.
    pub fn path(&self) -> &std::path::Path {
        match self {
            OutputWriteError::CreateDir { path, .. }
            | OutputWriteError::Io { path, .. }
            | OutputWriteError::Csv { path, .. }
            | OutputWriteError::Image { path, .. } => path,
        }
    }
}

/// Configuration could not be read or failed validation.
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("cannot read config {path}: {source}")]
    Read {
        path: PathBuf,
        source: std::io::Error,
    },

    #[error("cannot parse config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("cannot serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),

    #[error("invalid value for {field}: {message}")]
    Invalid {
        field: &'static str,
        message: String,
    },
}

impl ConfigError {
    pub(crate) fn invalid(field: &'static str, message: impl Into<String>) -> Self {
        ConfigError::Invalid {
            field,
            message: message.into(),
        }
    }
}

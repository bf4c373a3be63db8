//! Core Network struct and constructors
//!
//! Contains the fundamental Network data structure and factory methods.

use std::path::Path;

use ndarray::{Array1, Array3};
use num_complex::Complex64;

use crate::error::DataFormatError;
use crate::frequency::Frequency;
use crate::touchstone::Touchstone;

/// An N-port electrical network
#[derive(Debug, Clone)]
pub struct Network {
    /// Frequency data
    pub frequency: Frequency,
    /// S-parameter data [nfreq, nports, nports]
    pub s: Array3<Complex64>,
    /// Reference impedance (per port)
    pub z0: Array1<Complex64>,
    /// Network name
    pub name: Option<String>,
    /// Comments
    pub comments: Vec<String>,
}

impl Network {
    /// Create a new Network from S-parameters
    pub fn new(frequency: Frequency, s: Array3<Complex64>, z0: Array1<Complex64>) -> Self {
        Self {
            frequency,
            s,
            z0,
            name: None,
            comments: Vec::new(),
        }
    }

    /// Create from a Touchstone file; the name is the file stem
    pub fn from_touchstone<P: AsRef<Path>>(path: P) -> Result<Self, DataFormatError> {
        let path = path.as_ref();
        let ts = Touchstone::from_file(path)?;
        let mut ntwk = Self::from_touchstone_data(ts);
        ntwk.name = path
            .file_stem()
            .and_then(|s| s.to_str())
            .map(str::to_string);
        Ok(ntwk)
    }

    /// Create from Touchstone content string
    ///
    /// # Arguments
    /// * `content` - Touchstone file content as string
    /// * `nports` - Number of ports (typically derived from file extension, e.g., .s2p = 2 ports)
    pub fn from_touchstone_content(content: &str, nports: usize) -> Result<Self, DataFormatError> {
        let ts = Touchstone::from_str(content, nports)?;
        Ok(Self::from_touchstone_data(ts))
    }

    fn from_touchstone_data(ts: Touchstone) -> Self {
        let nfreq = ts.nfreq();
        let nports = ts.nports;

        let s = Array3::from_shape_fn((nfreq, nports, nports), |(f, i, j)| ts.s[f][i][j]);
        let z0 = Array1::from_vec(ts.z0.iter().map(|&x| Complex64::new(x, 0.0)).collect());

        Self {
            frequency: ts.frequency,
            s,
            z0,
            name: None,
            comments: ts.comments,
        }
    }

    /// Get the number of ports
    #[inline]
    pub fn nports(&self) -> usize {
        self.s.shape()[1]
    }

    /// Get the number of frequency points
    #[inline]
    pub fn nfreq(&self) -> usize {
        self.s.shape()[0]
    }
}

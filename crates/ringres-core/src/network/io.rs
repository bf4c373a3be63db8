//! Network I/O functions
//!
//! Provides methods for writing Network to Touchstone files.

use std::path::Path;

use super::core::Network;
use crate::touchstone::{SParamFormat, Touchstone};

impl Network {
    /// Write the network to a Touchstone file
    ///
    /// # Example
    /// ```ignore
    /// let ntwk = Network::from_touchstone("input.s2p")?;
    /// ntwk.write_touchstone("output.s2p", SParamFormat::DB)?;
    /// ```
    pub fn write_touchstone<P: AsRef<Path>>(
        &self,
        path: P,
        format: SParamFormat,
    ) -> std::io::Result<()> {
        self.to_touchstone(format).write(path)
    }

    /// Convert Network to Touchstone form
    pub fn to_touchstone(&self, format: SParamFormat) -> Touchstone {
        let nports = self.nports();

        let s = self
            .s
            .outer_iter()
            .map(|m| m.rows().into_iter().map(|row| row.to_vec()).collect())
            .collect();

        Touchstone {
            nports,
            frequency: self.frequency.clone(),
            s,
            z0: self.z0.iter().map(|z| z.re).collect(),
            comments: self.comments.clone(),
            format,
            is_v2: false,
        }
    }
}

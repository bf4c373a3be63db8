//! Transmission spectrum
//!
//! A [`Spectrum`] is the |S21| trace of a two-port measurement in dB over a
//! strictly increasing frequency axis. It is built once and never mutated.

use std::path::Path;

use log::info;

use crate::error::DataFormatError;
use crate::frequency::{Frequency, FrequencyUnit};
use crate::network::Network;

/// |S21| in dB over frequency
#[derive(Debug, Clone, PartialEq)]
pub struct Spectrum {
    frequency: Frequency,
    s21_db: Vec<f64>,
}

impl Spectrum {
    /// Build from frequencies in Hz and matching S21 magnitudes in dB
    pub fn new(freq_hz: Vec<f64>, s21_db: Vec<f64>) -> Result<Self, DataFormatError> {
        Self::with_frequency(Frequency::from_hz(freq_hz, FrequencyUnit::GHz), s21_db)
    }

    fn with_frequency(frequency: Frequency, s21_db: Vec<f64>) -> Result<Self, DataFormatError> {
        if frequency.npoints() != s21_db.len() {
            return Err(DataFormatError::LengthMismatch {
                frequencies: frequency.npoints(),
                values: s21_db.len(),
            });
        }
        if s21_db.is_empty() {
            return Err(DataFormatError::Empty);
        }
        frequency.check_strictly_increasing()?;
        Ok(Self { frequency, s21_db })
    }

    /// Take S21 (port 2 from port 1) from a network
    pub fn from_network(ntwk: &Network) -> Result<Self, DataFormatError> {
        let s21 = ntwk.trace_db(1, 0).ok_or(DataFormatError::MissingS21 {
            nports: ntwk.nports(),
        })?;
        Self::with_frequency(ntwk.frequency.clone(), s21.to_vec())
    }

    /// Load S21 from a Touchstone file
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self, DataFormatError> {
        let path = path.as_ref();
        let ntwk = Network::from_touchstone(path)?;
        let spectrum = Self::from_network(&ntwk)?;
        info!(
            "loaded {} points from {} ({:.4} to {:.4} {})",
            spectrum.len(),
            path.display(),
            spectrum.frequency.start() / spectrum.frequency.unit().multiplier(),
            spectrum.frequency.stop() / spectrum.frequency.unit().multiplier(),
            spectrum.frequency.unit()
        );
        Ok(spectrum)
    }

    /// Frequencies in Hz
    #[inline]
    pub fn freq_hz(&self) -> &[f64] {
        self.frequency.f()
    }

    /// S21 magnitudes in dB
    #[inline]
    pub fn s21_db(&self) -> &[f64] {
        &self.s21_db
    }

    #[inline]
    pub fn frequency(&self) -> &Frequency {
        &self.frequency
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.s21_db.len()
    }

    /// True when the spectrum has no points
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.s21_db.is_empty()
    }

    /// (frequency_Hz, S21_dB) pairs in ascending frequency
    pub fn points(&self) -> impl Iterator<Item = (f64, f64)> + '_ {
        self.freq_hz().iter().copied().zip(self.s21_db.iter().copied())
    }

    /// Median of the finite S21 values
    pub fn median_db(&self) -> f64 {
        let mut values: Vec<f64> = self.s21_db.iter().copied().filter(|v| v.is_finite()).collect();
        if values.is_empty() {
            return f64::NAN;
        }
        values.sort_by(f64::total_cmp);
        let mid = values.len() / 2;
        if values.len() % 2 == 0 {
            (values[mid - 1] + values[mid]) / 2.0
        } else {
            values[mid]
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_new_validates() {
        assert!(Spectrum::new(vec![1.0, 2.0], vec![0.0, 1.0]).is_ok());
        assert!(matches!(
            Spectrum::new(vec![1.0, 2.0], vec![0.0]),
            Err(DataFormatError::LengthMismatch { .. })
        ));
        assert!(matches!(
            Spectrum::new(vec![], vec![]),
            Err(DataFormatError::Empty)
        ));
        assert!(matches!(
            Spectrum::new(vec![2.0, 1.0], vec![0.0, 0.0]),
            Err(DataFormatError::NonMonotonicFrequency { index: 1, .. })
        ));
    }

    #[test]
    fn test_median() {
        let s = Spectrum::new(vec![1.0, 2.0, 3.0, 4.0], vec![-10.0, -40.0, -20.0, -30.0]).unwrap();
        assert_relative_eq!(s.median_db(), -25.0);
        let s = Spectrum::new(vec![1.0, 2.0, 3.0], vec![-10.0, -40.0, -20.0]).unwrap();
        assert_relative_eq!(s.median_db(), -20.0);
    }

    #[test]
    fn test_one_port_has_no_s21() {
        let ntwk = Network::from_touchstone_content("# GHz S MA R 50\n1.0 0.5 0\n", 1).unwrap();
        assert!(matches!(
            Spectrum::from_network(&ntwk),
            Err(DataFormatError::MissingS21 { nports: 1 })
        ));
    }
}

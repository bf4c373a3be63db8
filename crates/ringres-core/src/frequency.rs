//! Frequency axis with display units
//!
//! Frequencies are stored in Hz; the unit only affects scaling for display
//! and Touchstone output.

use std::fmt;

use crate::error::DataFormatError;

/// Frequency unit enumeration
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FrequencyUnit {
    Hz,
    KHz,
    MHz,
    #[default]
    GHz,
    THz,
}

impl FrequencyUnit {
    /// Get the multiplier to convert to Hz
    pub fn multiplier(&self) -> f64 {
        match self {
            FrequencyUnit::Hz => 1.0,
            FrequencyUnit::KHz => 1e3,
            FrequencyUnit::MHz => 1e6,
            FrequencyUnit::GHz => 1e9,
            FrequencyUnit::THz => 1e12,
        }
    }

    /// Parse from string (case-insensitive)
    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "hz" => Some(FrequencyUnit::Hz),
            "khz" => Some(FrequencyUnit::KHz),
            "mhz" => Some(FrequencyUnit::MHz),
            "ghz" => Some(FrequencyUnit::GHz),
            "thz" => Some(FrequencyUnit::THz),
            _ => None,
        }
    }

    /// Upper-case keyword used on a Touchstone option line
    pub fn keyword(&self) -> &'static str {
        match self {
            FrequencyUnit::Hz => "HZ",
            FrequencyUnit::KHz => "KHZ",
            FrequencyUnit::MHz => "MHZ",
            FrequencyUnit::GHz => "GHZ",
            FrequencyUnit::THz => "THZ",
        }
    }
}

impl fmt::Display for FrequencyUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            FrequencyUnit::Hz => "Hz",
            FrequencyUnit::KHz => "kHz",
            FrequencyUnit::MHz => "MHz",
            FrequencyUnit::GHz => "GHz",
            FrequencyUnit::THz => "THz",
        };
        f.write_str(label)
    }
}

/// A frequency band representation
#[derive(Debug, Clone, PartialEq)]
pub struct Frequency {
    /// Frequency vector in Hz
    f: Vec<f64>,
    /// Display unit
    unit: FrequencyUnit,
}

impl Frequency {
    /// Create a linear sweep from start/stop/npoints given in `unit`
    ///
    /// # Example
    /// ```
    /// use ringres_core::frequency::{Frequency, FrequencyUnit};
    /// let freq = Frequency::new(1.0, 6.0, 11, FrequencyUnit::GHz);
    /// assert_eq!(freq.npoints(), 11);
    /// assert_eq!(freq.f()[1], 1.5e9);
    /// ```
    pub fn new(start: f64, stop: f64, npoints: usize, unit: FrequencyUnit) -> Self {
        let mult = unit.multiplier();
        let start_hz = start * mult;
        let stop_hz = stop * mult;

        let f = match npoints {
            0 => Vec::new(),
            1 => vec![start_hz],
            _ => {
                let step = (stop_hz - start_hz) / (npoints - 1) as f64;
                (0..npoints).map(|i| start_hz + i as f64 * step).collect()
            }
        };

        Self { f, unit }
    }

    /// Create from a frequency vector already in Hz
    pub fn from_hz(f: Vec<f64>, unit: FrequencyUnit) -> Self {
        Self { f, unit }
    }

    /// Get frequency vector in Hz
    #[inline]
    pub fn f(&self) -> &[f64] {
        &self.f
    }

    /// Get frequency vector in the current unit
    pub fn f_scaled(&self) -> Vec<f64> {
        let mult = self.unit.multiplier();
        self.f.iter().map(|&x| x / mult).collect()
    }

    /// Get the number of frequency points
    #[inline]
    pub fn npoints(&self) -> usize {
        self.f.len()
    }

    /// Get the start frequency in Hz
    #[inline]
    pub fn start(&self) -> f64 {
        *self.f.first().unwrap_or(&0.0)
    }

    /// Get the stop frequency in Hz
    #[inline]
    pub fn stop(&self) -> f64 {
        *self.f.last().unwrap_or(&0.0)
    }

    /// Get the current unit
    #[inline]
    pub fn unit(&self) -> FrequencyUnit {
        self.unit
    }

    /// Check that every point is finite and strictly above its predecessor.
    pub fn check_strictly_increasing(&self) -> Result<(), DataFormatError> {
        if let Some(index) = self.f.iter().position(|x| !x.is_finite()) {
            return Err(DataFormatError::NonFiniteFrequency(index));
        }
        for (i, w) in self.f.windows(2).enumerate() {
            if w[1] <= w[0] {
                return Err(DataFormatError::NonMonotonicFrequency {
                    index: i + 1,
                    previous: w[0],
                    current: w[1],
                });
            }
        }
        Ok(())
    }
}

//! Load → detect → analyze
//!
//! Runs the computational stages in order and returns plain data. Nothing
//! here writes files; see [`crate::report`] for output.

use log::{info, warn};

use crate::analysis::{ModeAnalyzer, ModeResult};
use crate::config::AnalysisConfig;
use crate::error::DataFormatError;
use crate::peaks::{PeakDetector, ResonancePeak};
use crate::spectrum::Spectrum;

/// Result of one extraction run
#[derive(Debug, Clone)]
pub struct Extraction {
    pub spectrum: Spectrum,
    pub peaks: Vec<ResonancePeak>,
    pub modes: Vec<ModeResult>,
    /// Ring length used for the permittivity, in metres
    pub ring_length_m: f64,
}

impl Extraction {
    /// Load the configured input file and run every stage
    pub fn run(config: &AnalysisConfig) -> Result<Self, DataFormatError> {
        let spectrum = Spectrum::load(&config.input)?;
        Ok(Self::from_spectrum(spectrum, config))
    }

    /// Run detection and analysis on an already loaded spectrum
    pub fn from_spectrum(spectrum: Spectrum, config: &AnalysisConfig) -> Self {
        let detector = PeakDetector::new(config.peaks.detection_config());
        let analyzer = ModeAnalyzer::from_config(config);
        if config.calibration.is_some() {
            info!(
                "using calibrated ring length {:.2} mm",
                analyzer.ring_length_m() * 1e3
            );
        }

        let peaks: Vec<ResonancePeak> = detector.detect(&spectrum).collect();
        if peaks.is_empty() {
            warn!("no resonance peaks detected; adjust the peak thresholds or check the data");
        }
        let modes = analyzer.analyze(&spectrum, peaks.iter().copied());

        Self {
            spectrum,
            peaks,
            modes,
            ring_length_m: analyzer.ring_length_m(),
        }
    }

    pub fn summary(&self) -> Summary {
        Summary::from_modes(&self.modes)
    }
}

/// Means over all modes, ignoring NaN entries
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Summary {
    pub modes: usize,
    pub mean_effective_permittivity: f64,
    pub mean_substrate_permittivity: f64,
    pub mean_loss_tangent: f64,
}

impl Summary {
    pub fn from_modes(modes: &[ModeResult]) -> Self {
        Self {
            modes: modes.len(),
            mean_effective_permittivity: nan_mean(modes.iter().map(|m| m.effective_permittivity)),
            mean_substrate_permittivity: nan_mean(modes.iter().map(|m| m.substrate_permittivity)),
            mean_loss_tangent: nan_mean(modes.iter().map(|m| m.loss_tangent)),
        }
    }
}

/// Mean of the non-NaN values, NaN when there are none
pub fn nan_mean(values: impl Iterator<Item = f64>) -> f64 {
    let (sum, count) = values
        .filter(|v| !v.is_nan())
        .fold((0.0, 0usize), |(s, n), v| (s + v, n + 1));
    if count == 0 {
        f64::NAN
    } else {
        sum / count as f64
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_nan_mean() {
        assert_relative_eq!(nan_mean([1.0, f64::NAN, 3.0].into_iter()), 2.0);
        assert!(nan_mean([f64::NAN].into_iter()).is_nan());
        assert!(nan_mean(std::iter::empty()).is_nan());
    }
}

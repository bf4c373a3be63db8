//! Per-mode resonance analysis
//!
//! For every detected peak: bandwidth, loaded Q, effective permittivity
//! from the ring standing-wave condition, substrate permittivity from the
//! microstrip relation, and loss tangent from the [`LossModel`].
//! Every peak produces exactly one [`ModeResult`]; values that cannot be
//! computed are NaN.

mod bandwidth;
mod loss;

pub use bandwidth::{estimate as estimate_bandwidth, Bandwidth};
pub use loss::LossModel;

use log::{debug, warn};

use crate::config::{AnalysisConfig, Geometry};
use crate::error::BandwidthNotFoundError;
use crate::microstrip::{ring_effective_permittivity, substrate_permittivity};
use crate::peaks::ResonancePeak;
use crate::spectrum::Spectrum;

/// Extracted material parameters for one resonance mode
#[derive(Debug, Clone, PartialEq)]
pub struct ModeResult {
    pub mode_index: usize,
    pub resonant_frequency_hz: f64,
    pub magnitude_db: f64,
    pub bandwidth_hz: f64,
    /// Loaded Q, f / bandwidth
    pub quality_factor: f64,
    pub unloaded_quality_factor: f64,
    pub effective_permittivity: f64,
    pub substrate_permittivity: f64,
    pub loss_tangent: f64,
    /// Set when the bandwidth could not be measured
    pub bandwidth_error: Option<BandwidthNotFoundError>,
}

impl ModeResult {
    /// True when every derived field is a number
    pub fn is_complete(&self) -> bool {
        self.bandwidth_error.is_none()
            && [
                self.quality_factor,
                self.effective_permittivity,
                self.substrate_permittivity,
                self.loss_tangent,
            ]
            .iter()
            .all(|v| v.is_finite())
    }
}

/// Turns resonance peaks into [`ModeResult`]s
#[derive(Debug, Clone, Copy)]
pub struct ModeAnalyzer {
    geometry: Geometry,
    ring_length_m: f64,
    bandwidth_drop_db: f64,
    loss: LossModel,
}

impl ModeAnalyzer {
    pub fn new(
        geometry: Geometry,
        ring_length_m: f64,
        bandwidth_drop_db: f64,
        loss: LossModel,
    ) -> Self {
        Self {
            geometry,
            ring_length_m,
            bandwidth_drop_db,
            loss,
        }
    }

    pub fn from_config(config: &AnalysisConfig) -> Self {
        Self::new(
            config.geometry,
            config.ring_length_m(),
            config.bandwidth_drop_db,
            config.loss,
        )
    }

    #[inline]
    pub fn ring_length_m(&self) -> f64 {
        self.ring_length_m
    }

    /// Analyze peaks in the order given
    pub fn analyze<I>(&self, spectrum: &Spectrum, peaks: I) -> Vec<ModeResult>
    where
        I: IntoIterator<Item = ResonancePeak>,
    {
        peaks
            .into_iter()
            .map(|peak| self.analyze_peak(spectrum, &peak))
            .collect()
    }

    pub fn analyze_peak(&self, spectrum: &Spectrum, peak: &ResonancePeak) -> ModeResult {
        let f0 = peak.frequency_hz;

        let (bandwidth_hz, bandwidth_error) =
            match estimate_bandwidth(spectrum, peak, self.bandwidth_drop_db) {
                Ok(bw) => (bw.width_hz(), None),
                Err(e) => {
                    warn!("{}; Q and loss tangent set to NaN", e);
                    (f64::NAN, Some(e))
                }
            };

        let quality_factor = if bandwidth_hz > 0.0 {
            f0 / bandwidth_hz
        } else {
            f64::NAN
        };

        let eps_eff = ring_effective_permittivity(peak.mode_index, f0, self.ring_length_m);
        let eps_r = substrate_permittivity(
            eps_eff,
            self.geometry.trace_width_mm,
            self.geometry.substrate_height_mm,
        );

        let unloaded = self.loss.unloaded_q(quality_factor, peak.magnitude_db);
        let loss_tangent = self
            .loss
            .loss_tangent(quality_factor, peak.magnitude_db, eps_eff, eps_r);
        if quality_factor.is_finite() && loss_tangent.is_nan() {
            warn!(
                "mode {}: loss model leaves no dielectric loss; loss tangent set to NaN",
                peak.mode_index
            );
        }

        debug!(
            "mode {}: Q = {:.1}, eps_eff = {:.4}, eps_r = {:.4}, tan_d = {:.3e}",
            peak.mode_index, quality_factor, eps_eff, eps_r, loss_tangent
        );

        ModeResult {
            mode_index: peak.mode_index,
            resonant_frequency_hz: f0,
            magnitude_db: peak.magnitude_db,
            bandwidth_hz,
            quality_factor,
            unloaded_quality_factor: unloaded,
            effective_permittivity: eps_eff,
            substrate_permittivity: eps_r,
            loss_tangent,
            bandwidth_error,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::constants::SPEED_OF_LIGHT;
    use approx::assert_relative_eq;

    fn geometry() -> Geometry {
        Geometry {
            ring_mean_circumference_mm: 100.0,
            substrate_height_mm: 1.5,
            trace_width_mm: 3.0,
        }
    }

    fn peak(mode_index: usize, sample_index: usize, s: &Spectrum) -> ResonancePeak {
        ResonancePeak {
            mode_index,
            sample_index,
            frequency_hz: s.freq_hz()[sample_index],
            magnitude_db: s.s21_db()[sample_index],
            prominence_db: 10.0,
        }
    }

    #[test]
    fn test_triangle_peak() {
        // 1 GHz peak, -1 dB per MHz: the 3 dB points are 6 MHz apart
        let f: Vec<f64> = (0..21).map(|i| 0.99e9 + i as f64 * 1e6).collect();
        let x: Vec<f64> = f.iter().map(|&v| -10.0 - (v - 1e9).abs() / 1e6).collect();
        let s = Spectrum::new(f, x).unwrap();

        let analyzer = ModeAnalyzer::new(geometry(), 0.1, 3.0, LossModel::default());
        let r = analyzer.analyze_peak(&s, &peak(1, 10, &s));

        assert_relative_eq!(r.bandwidth_hz, 6e6, epsilon = 1e-3);
        assert_relative_eq!(r.quality_factor, 1e9 / 6e6, epsilon = 1e-9);
        assert_relative_eq!(r.loss_tangent, 6e6 / 1e9, epsilon = 1e-12);
        assert_relative_eq!(
            r.effective_permittivity,
            (SPEED_OF_LIGHT / (1e9 * 0.1)).powi(2),
            epsilon = 1e-9
        );
        assert!(r.is_complete());
    }

    #[test]
    fn test_edge_mode_is_flagged_not_dropped() {
        let f: Vec<f64> = (0..5).map(|i| 1e9 + i as f64 * 1e6).collect();
        let x = vec![-30.0, -20.0, -10.0, -10.5, -11.0];
        let s = Spectrum::new(f, x).unwrap();

        let analyzer = ModeAnalyzer::new(geometry(), 0.1, 3.0, LossModel::default());
        let results = analyzer.analyze(&s, vec![peak(1, 2, &s)]);

        assert_eq!(results.len(), 1);
        let r = &results[0];
        assert!(r.quality_factor.is_nan());
        assert!(r.loss_tangent.is_nan());
        assert!(r.effective_permittivity.is_finite());
        assert!(r.substrate_permittivity.is_finite());
        assert!(!r.is_complete());
        assert_eq!(r.bandwidth_error.as_ref().map(|e| e.mode_index), Some(1));
    }

    #[test]
    fn test_null_sample_keeps_quality_factor_finite() {
        let f: Vec<f64> = (0..7).map(|i| 1e9 + i as f64 * 1e6).collect();
        let x = vec![-50.0, -40.0, f64::NEG_INFINITY, -10.0, -20.0, -30.0, -50.0];
        let s = Spectrum::new(f, x).unwrap();

        let analyzer = ModeAnalyzer::new(geometry(), 0.1, 3.0, LossModel::default());
        let r = analyzer.analyze_peak(&s, &peak(1, 3, &s));

        assert!(r.bandwidth_error.is_none());
        assert!(r.quality_factor.is_finite());
        assert_relative_eq!(r.bandwidth_hz, 0.3e6, max_relative = 1e-6);
        assert!(r.is_complete());
    }
}

//! Synthetic ring resonator measurements
//!
//! Generates a plausible two-port response of a microstrip ring on a
//! substrate of known permittivity: Lorentzian transmission peaks at the
//! ring modes over a flat coupling floor.

use ndarray::{Array1, Array3};
use num_complex::Complex64;

use crate::config::Geometry;
use crate::constants::DEFAULT_Z0;
use crate::error::DataFormatError;
use crate::frequency::{Frequency, FrequencyUnit};
use crate::microstrip::{effective_permittivity, ring_resonance_frequency};
use crate::network::Network;
use crate::spectrum::Spectrum;

/// Parameters of a synthetic ring measurement
#[derive(Debug, Clone, PartialEq)]
pub struct SyntheticRing {
    pub geometry: Geometry,
    pub substrate_permittivity: f64,
    /// Loaded Q applied to every mode
    pub quality_factor: f64,
    /// |S21| at resonance (dB)
    pub peak_db: f64,
    /// Off-resonance coupling floor (dB)
    pub floor_db: f64,
    /// Highest mode to include; `None` includes every mode in the sweep
    pub max_modes: Option<usize>,
    pub start_hz: f64,
    pub stop_hz: f64,
    pub npoints: usize,
}

impl SyntheticRing {
    /// 100 mm ring on 1.6 mm FR-4 with a 3 mm strip, swept 10 MHz to 6 GHz
    pub fn fr4() -> Self {
        Self {
            geometry: Geometry {
                ring_mean_circumference_mm: 100.0,
                substrate_height_mm: 1.6,
                trace_width_mm: 3.0,
            },
            substrate_permittivity: 4.4,
            quality_factor: 50.0,
            peak_db: -12.0,
            floor_db: -55.0,
            max_modes: None,
            start_hz: 10e6,
            stop_hz: 6e9,
            npoints: 6001,
        }
    }

    /// Sets the loaded Q so that the default loss model recovers `tan_d`
    pub fn with_loss_tangent(mut self, tan_d: f64) -> Self {
        self.quality_factor = 1.0 / tan_d;
        self
    }

    pub fn effective_permittivity(&self) -> f64 {
        effective_permittivity(
            self.substrate_permittivity,
            self.geometry.trace_width_mm,
            self.geometry.substrate_height_mm,
        )
    }

    /// Resonance frequencies of the modes inside the sweep
    pub fn mode_frequencies(&self) -> Vec<f64> {
        let eps_eff = self.effective_permittivity();
        let length = self.geometry.ring_length_m();
        (1..)
            .map(|n| ring_resonance_frequency(n, eps_eff, length))
            .take_while(|&f| f <= self.stop_hz)
            .take(self.max_modes.unwrap_or(usize::MAX))
            .filter(|&f| f >= self.start_hz)
            .collect()
    }

    /// Linear sweep, displayed in GHz
    pub fn frequency(&self) -> Frequency {
        let unit = FrequencyUnit::GHz;
        Frequency::new(
            self.start_hz / unit.multiplier(),
            self.stop_hz / unit.multiplier(),
            self.npoints,
            unit,
        )
    }

    /// Linear |S21| at `freq_hz` for the given mode frequencies
    fn transmission(&self, freq_hz: f64, modes: &[f64]) -> f64 {
        let amplitude = 10.0_f64.powf(self.peak_db / 20.0);
        let floor = 10.0_f64.powf(self.floor_db / 20.0);
        modes.iter().fold(floor, |acc, &fn_| {
            let x = 2.0 * self.quality_factor * (freq_hz - fn_) / fn_;
            acc + amplitude / (1.0 + x * x).sqrt()
        })
    }

    /// Two-port network with symmetric, reciprocal S-parameters
    pub fn network(&self) -> Network {
        let frequency = self.frequency();
        let modes = self.mode_frequencies();
        let nfreq = frequency.npoints();

        let mut s = Array3::<Complex64>::zeros((nfreq, 2, 2));
        for (k, &f) in frequency.f().iter().enumerate() {
            let s21 = self.transmission(f, &modes).min(1.0);
            let s11 = (1.0 - s21 * s21).sqrt();
            s[[k, 0, 0]] = Complex64::new(s11, 0.0);
            s[[k, 1, 1]] = Complex64::new(s11, 0.0);
            s[[k, 1, 0]] = Complex64::new(s21, 0.0);
            s[[k, 0, 1]] = Complex64::new(s21, 0.0);
        }

        let mut ntwk = Network::new(
            frequency,
            s,
            Array1::from_elem(2, Complex64::new(DEFAULT_Z0, 0.0)),
        );
        ntwk.comments = vec![
            "synthetic microstrip ring resonator".to_string(),
            format!(
                "eps_r = {}, Q = {}, L = {} mm, h = {} mm, w = {} mm",
                self.substrate_permittivity,
                self.quality_factor,
                self.geometry.ring_mean_circumference_mm,
                self.geometry.substrate_height_mm,
                self.geometry.trace_width_mm
            ),
        ];
        ntwk.name = Some("synthetic_ring".to_string());
        ntwk
    }

    pub fn spectrum(&self) -> Result<Spectrum, DataFormatError> {
        Spectrum::from_network(&self.network())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_fr4_modes_are_harmonic() {
        let ring = SyntheticRing::fr4();
        let modes = ring.mode_frequencies();
        assert!(modes.len() >= 3);
        for (n, f) in modes.iter().enumerate() {
            assert_relative_eq!(*f, (n + 1) as f64 * modes[0], epsilon = 1.0);
        }
        assert!(*modes.last().unwrap() <= ring.stop_hz);
    }

    #[test]
    fn test_with_loss_tangent() {
        let ring = SyntheticRing::fr4().with_loss_tangent(0.02);
        assert_relative_eq!(ring.quality_factor, 50.0, epsilon = 1e-9);
    }

    #[test]
    fn test_max_modes_limits_count() {
        let ring = SyntheticRing {
            max_modes: Some(2),
            ..SyntheticRing::fr4()
        };
        assert_eq!(ring.mode_frequencies().len(), 2);
    }

    #[test]
    fn test_network_shape_and_peak_level() {
        let ring = SyntheticRing {
            npoints: 601,
            ..SyntheticRing::fr4()
        };
        let ntwk = ring.network();
        assert_eq!(ntwk.nports(), 2);
        assert_eq!(ntwk.nfreq(), 601);

        let s = ring.spectrum().unwrap();
        let max = s.s21_db().iter().cloned().fold(f64::MIN, f64::max);
        assert!(max <= ring.peak_db + 0.5, "max {}", max);
        assert!(max > ring.peak_db - 3.0, "max {}", max);
    }
}

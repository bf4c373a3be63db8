//! Loss partition for the loss tangent
//!
//! The measured (loaded) Q lumps coupling, conductor, radiation and
//! dielectric loss together:
//!
//! ```text
//! Q0 = QL / (1 - 10^(IL/20))            unloaded Q, IL = peak |S21| in dB
//! 1/Qd = 1/Q0 - 1/Qc - 1/Qr             dielectric part
//! tan_d = K / Qd,  K = eps_eff (eps_r - 1) / (eps_r (eps_eff - 1))
//! ```
//!
//! Each term is switchable. With every term disabled, `tan_d = 1/QL`.

use serde::{Deserialize, Serialize};

use crate::microstrip::filling_factor;

/// Which loss contributions are removed before converting Q to tan δ
#[derive(Debug, Clone, Copy, PartialEq, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct LossModel {
    /// Convert loaded to unloaded Q using the insertion loss at resonance
    pub unloaded_q_correction: bool,
    /// Scale the dielectric loss by the microstrip filling factor
    pub filling_factor_correction: bool,
    /// Conductor Q, subtracted when present
    #[serde(skip_serializing_if = "Option::is_none")]
    pub conductor_q: Option<f64>,
    /// Radiation Q, subtracted when present
    #[serde(skip_serializing_if = "Option::is_none")]
    pub radiation_q: Option<f64>,
}

impl LossModel {
    /// Unloaded Q from loaded Q and the peak transmission in dB.
    pub fn unloaded_q(&self, loaded_q: f64, peak_db: f64) -> f64 {
        if !self.unloaded_q_correction {
            return loaded_q;
        }
        let coupling = 1.0 - 10.0_f64.powf(peak_db / 20.0);
        if coupling > 0.0 {
            loaded_q / coupling
        } else {
            f64::NAN
        }
    }

    /// Dielectric Q left after removing conductor and radiation loss.
    /// NaN when the remaining loss is not positive.
    pub fn dielectric_q(&self, unloaded_q: f64) -> f64 {
        let inverse = 1.0 / unloaded_q
            - self.conductor_q.map_or(0.0, |q| 1.0 / q)
            - self.radiation_q.map_or(0.0, |q| 1.0 / q);
        if inverse > 0.0 {
            1.0 / inverse
        } else {
            f64::NAN
        }
    }

    /// Ratio between substrate loss tangent and 1/Qd.
    pub fn filling_correction(&self, eps_eff: f64, eps_r: f64) -> f64 {
        if !self.filling_factor_correction {
            return 1.0;
        }
        if eps_eff <= 1.0 || eps_r <= 1.0 {
            return f64::NAN;
        }
        eps_eff / (eps_r * filling_factor(eps_eff, eps_r))
    }

    /// Loss tangent of the substrate. NaN propagates from any input.
    pub fn loss_tangent(&self, loaded_q: f64, peak_db: f64, eps_eff: f64, eps_r: f64) -> f64 {
        let qd = self.dielectric_q(self.unloaded_q(loaded_q, peak_db));
        self.filling_correction(eps_eff, eps_r) / qd
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use approx::assert_relative_eq;

    #[test]
    fn test_default_is_inverse_q() {
        let m = LossModel::default();
        assert_relative_eq!(m.loss_tangent(50.0, -10.0, 3.3, 4.4), 0.02);
        assert!(m.loss_tangent(f64::NAN, -10.0, 3.3, 4.4).is_nan());
    }

    #[test]
    fn test_unloaded_correction() {
        let m = LossModel {
            unloaded_q_correction: true,
            ..LossModel::default()
        };
        // -20 dB insertion loss: 1 - 0.1 = 0.9
        assert_relative_eq!(m.unloaded_q(90.0, -20.0), 100.0, epsilon = 1e-12);
        assert!(m.unloaded_q(90.0, 0.0).is_nan());
    }

    #[test]
    fn test_conductor_and_radiation_removed() {
        let m = LossModel {
            conductor_q: Some(200.0),
            radiation_q: Some(400.0),
            ..LossModel::default()
        };
        // 1/Qd = 1/100 - 1/200 - 1/400 = 1/400
        assert_relative_eq!(m.dielectric_q(100.0), 400.0, epsilon = 1e-9);
        // Q0 larger than Qc leaves no dielectric loss
        assert!(m.dielectric_q(500.0).is_nan());
    }

    #[test]
    fn test_filling_factor_correction() {
        let m = LossModel {
            filling_factor_correction: true,
            ..LossModel::default()
        };
        let k = 3.0 * 3.4 / (4.4 * 2.0);
        assert_relative_eq!(m.filling_correction(3.0, 4.4), k, epsilon = 1e-12);
        assert_relative_eq!(m.loss_tangent(100.0, -10.0, 3.0, 4.4), k / 100.0, epsilon = 1e-12);
        assert!(m.filling_correction(1.0, 4.4).is_nan());
    }
}

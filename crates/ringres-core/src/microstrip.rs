//! Microstrip and ring resonator relations
//!
//! Quasi-static Hammerstad model for the effective permittivity of a
//! microstrip line, its closed-form inverse, and the standing-wave
//! condition of a ring of mean circumference `L`:
//!
//! ```text
//! n * lambda_g = L   =>   eps_eff = (n * c / (f * L))^2
//! ```

use crate::constants::SPEED_OF_LIGHT;

/// Geometry-dependent term `F(w/h)` of
/// `eps_eff = (eps_r + 1)/2 + (eps_r - 1)/2 * F`.
pub fn filling_function(width: f64, height: f64) -> f64 {
    let u = width / height;
    let f = (1.0 + 12.0 / u).powf(-0.5);
    if u < 1.0 {
        f + 0.04 * (1.0 - u).powi(2)
    } else {
        f
    }
}

/// Effective permittivity of a microstrip line on a substrate of `eps_r`.
pub fn effective_permittivity(eps_r: f64, width: f64, height: f64) -> f64 {
    let f = filling_function(width, height);
    (eps_r + 1.0) / 2.0 + (eps_r - 1.0) / 2.0 * f
}

/// Substrate permittivity that yields `eps_eff` for the given strip.
///
/// Inverse of [`effective_permittivity`]; the relation is linear in
/// `eps_r`, so no iteration is needed.
pub fn substrate_permittivity(eps_eff: f64, width: f64, height: f64) -> f64 {
    let f = filling_function(width, height);
    (2.0 * eps_eff - 1.0 + f) / (1.0 + f)
}

/// Fraction of the field in the substrate, `q = (eps_eff - 1)/(eps_r - 1)`.
pub fn filling_factor(eps_eff: f64, eps_r: f64) -> f64 {
    (eps_eff - 1.0) / (eps_r - 1.0)
}

/// Effective permittivity from the resonance of mode `n` on a ring of
/// mean circumference `length_m`.
pub fn ring_effective_permittivity(mode: usize, freq_hz: f64, length_m: f64) -> f64 {
    (mode as f64 * SPEED_OF_LIGHT / (freq_hz * length_m)).powi(2)
}

/// Resonance frequency of mode `n` for a ring of mean circumference `length_m`.
pub fn ring_resonance_frequency(mode: usize, eps_eff: f64, length_m: f64) -> f64 {
    mode as f64 * SPEED_OF_LIGHT / (length_m * eps_eff.sqrt())
}

/// Electrical ring length implied by a known resonance.
///
/// `permittivity` is the effective permittivity seen by the mode; passing a
/// substrate value instead gives the length a homogeneous medium would need.
pub fn ring_length_from_resonance(mode: usize, freq_hz: f64, permittivity: f64) -> f64 {
    mode as f64 * SPEED_OF_LIGHT / (freq_hz * permittivity.sqrt())
}

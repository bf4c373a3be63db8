//! Resonance bandwidth by threshold crossing
//!
//! Walks outward from the peak sample until the magnitude falls to
//! `peak - drop_db`, interpolating linearly between the straddling samples.

use crate::error::{BandwidthNotFoundError, Edge};
use crate::peaks::ResonancePeak;
use crate::spectrum::Spectrum;

/// Frequencies where |S21| crosses the bandwidth threshold
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Bandwidth {
    pub lower_hz: f64,
    pub upper_hz: f64,
}

impl Bandwidth {
    #[inline]
    pub fn width_hz(&self) -> f64 {
        self.upper_hz - self.lower_hz
    }
}

/// Measure the bandwidth of `peak` at `drop_db` below its magnitude.
pub fn estimate(
    spectrum: &Spectrum,
    peak: &ResonancePeak,
    drop_db: f64,
) -> Result<Bandwidth, BandwidthNotFoundError> {
    let f = spectrum.freq_hz();
    let x = spectrum.s21_db();
    let level = peak.magnitude_db - drop_db;
    let not_found = |edge| BandwidthNotFoundError {
        mode_index: peak.mode_index,
        edge,
        drop_db,
    };

    let lower = (0..peak.sample_index)
        .rev()
        .find(|&i| x[i] <= level)
        .map(|i| crossing(f, x, i, i + 1, level))
        .ok_or_else(|| not_found(Edge::Lower))?;

    let upper = (peak.sample_index + 1..x.len())
        .find(|&i| x[i] <= level)
        .map(|i| crossing(f, x, i - 1, i, level))
        .ok_or_else(|| not_found(Edge::Upper))?;

    Ok(Bandwidth {
        lower_hz: lower,
        upper_hz: upper,
    })
}

/// Frequency where the segment between samples `a` and `b` meets `level`.
/// A non-finite sample (a -inf dB null) pins the edge to the other sample.
fn crossing(f: &[f64], x: &[f64], a: usize, b: usize, level: f64) -> f64 {
    if !x[a].is_finite() {
        return f[b];
    }
    if !x[b].is_finite() {
        return f[a];
    }
    let dx = x[b] - x[a];
    if dx == 0.0 {
        return f[a];
    }
    f[a] + (level - x[a]) * (f[b] - f[a]) / dx
}

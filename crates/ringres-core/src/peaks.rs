//! Resonance peak detection
//!
//! Local maxima of |S21| are filtered by height, prominence and spacing and
//! handed out lazily in ascending frequency, numbered as resonance modes.

use log::{debug, info};

use crate::constants::{
    DEFAULT_HEIGHT_ABOVE_MEDIAN_DB, DEFAULT_MIN_PROMINENCE_DB, DEFAULT_MIN_SPACING_HZ,
};
use crate::spectrum::Spectrum;

/// Minimum peak height
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum HeightThreshold {
    /// Absolute level in dB
    Absolute(f64),
    /// Level relative to the median of the spectrum, in dB
    AboveMedian(f64),
}

impl HeightThreshold {
    /// Resolve to an absolute level for `spectrum`
    pub fn level_db(&self, spectrum: &Spectrum) -> f64 {
        match *self {
            HeightThreshold::Absolute(db) => db,
            HeightThreshold::AboveMedian(db) => spectrum.median_db() + db,
        }
    }
}

/// Peak detection thresholds
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PeakDetectionConfig {
    pub height: HeightThreshold,
    pub min_prominence_db: f64,
    pub min_spacing_hz: f64,
}

impl Default for PeakDetectionConfig {
    fn default() -> Self {
        Self {
            height: HeightThreshold::AboveMedian(DEFAULT_HEIGHT_ABOVE_MEDIAN_DB),
            min_prominence_db: DEFAULT_MIN_PROMINENCE_DB,
            min_spacing_hz: DEFAULT_MIN_SPACING_HZ,
        }
    }
}

/// A detected resonance
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResonancePeak {
    /// 1-based mode number in ascending frequency order
    pub mode_index: usize,
    /// Index of the peak sample in the spectrum
    pub sample_index: usize,
    pub frequency_hz: f64,
    pub magnitude_db: f64,
    pub prominence_db: f64,
}

#[derive(Debug, Clone, Copy)]
struct Candidate {
    index: usize,
    prominence: f64,
}

/// Finds resonance peaks in a [`Spectrum`]
#[derive(Debug, Clone, Copy, Default)]
pub struct PeakDetector {
    config: PeakDetectionConfig,
}

impl PeakDetector {
    pub fn new(config: PeakDetectionConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &PeakDetectionConfig {
        &self.config
    }

    /// Detect peaks; the returned iterator yields them in ascending frequency.
    pub fn detect<'a>(&self, spectrum: &'a Spectrum) -> Peaks<'a> {
        let x = spectrum.s21_db();
        let f = spectrum.freq_hz();
        let threshold = self.config.height.level_db(spectrum);
        info!("peak detection threshold: {:.2} dB", threshold);

        let candidates: Vec<Candidate> = local_maxima(x)
            .into_iter()
            .filter(|&i| x[i] >= threshold)
            .map(|i| Candidate {
                index: i,
                prominence: prominence(x, i),
            })
            .filter(|c| c.prominence >= self.config.min_prominence_db)
            .collect();

        let kept = select_by_spacing(candidates, x, f, self.config.min_spacing_hz);
        info!("{} resonance peak(s) found", kept.len());

        Peaks {
            spectrum,
            candidates: kept.into_iter(),
            next_mode: 1,
        }
    }
}

/// Lazy sequence of [`ResonancePeak`]s in ascending frequency
#[derive(Debug)]
pub struct Peaks<'a> {
    spectrum: &'a Spectrum,
    candidates: std::vec::IntoIter<Candidate>,
    next_mode: usize,
}

impl Iterator for Peaks<'_> {
    type Item = ResonancePeak;

    fn next(&mut self) -> Option<ResonancePeak> {
        let c = self.candidates.next()?;
        let peak = ResonancePeak {
            mode_index: self.next_mode,
            sample_index: c.index,
            frequency_hz: self.spectrum.freq_hz()[c.index],
            magnitude_db: self.spectrum.s21_db()[c.index],
            prominence_db: c.prominence,
        };
        self.next_mode += 1;
        debug!(
            "mode {}: {:.6} GHz, {:.2} dB, prominence {:.2} dB",
            peak.mode_index,
            peak.frequency_hz / 1e9,
            peak.magnitude_db,
            peak.prominence_db
        );
        Some(peak)
    }

    fn size_hint(&self) -> (usize, Option<usize>) {
        self.candidates.size_hint()
    }
}

impl ExactSizeIterator for Peaks<'_> {}

/// Indices of local maxima. Flat tops resolve to the middle sample of the
/// plateau; the first and last samples are never maxima.
fn local_maxima(x: &[f64]) -> Vec<usize> {
    let mut peaks = Vec::new();
    if x.len() < 3 {
        return peaks;
    }
    let i_max = x.len() - 1;
    let mut i = 1;
    while i < i_max {
        if x[i - 1] < x[i] {
            let mut ahead = i + 1;
            while ahead < i_max && x[ahead] == x[i] {
                ahead += 1;
            }
            if x[ahead] < x[i] {
                peaks.push((i + ahead - 1) / 2);
                i = ahead;
            }
        }
        i += 1;
    }
    peaks
}

/// Height of `x[peak]` above the higher of the two bases, where each base
/// is the minimum reached before a strictly higher sample or the edge.
fn prominence(x: &[f64], peak: usize) -> f64 {
    let top = x[peak];
    let left = base_level(x[..=peak].iter().rev(), top);
    let right = base_level(x[peak..].iter(), top);
    top - left.max(right)
}

fn base_level<'a>(walk: impl Iterator<Item = &'a f64>, top: f64) -> f64 {
    walk.take_while(|&&v| v <= top).fold(top, |m, &v| m.min(v))
}

/// Drop candidates closer than `min_spacing_hz` to a higher kept candidate.
/// Ties in height favour the lower frequency.
fn select_by_spacing(
    candidates: Vec<Candidate>,
    x: &[f64],
    f: &[f64],
    min_spacing_hz: f64,
) -> Vec<Candidate> {
    if min_spacing_hz <= 0.0 || candidates.len() < 2 {
        return candidates;
    }

    let mut order: Vec<usize> = (0..candidates.len()).collect();
    order.sort_by(|&a, &b| {
        x[candidates[b].index]
            .total_cmp(&x[candidates[a].index])
            .then(a.cmp(&b))
    });

    let mut keep = vec![true; candidates.len()];
    for &k in &order {
        if !keep[k] {
            continue;
        }
        let fk = f[candidates[k].index];
        for j in (0..k).rev() {
            if fk - f[candidates[j].index] >= min_spacing_hz {
                break;
            }
            keep[j] = false;
        }
        for j in k + 1..candidates.len() {
            if f[candidates[j].index] - fk >= min_spacing_hz {
                break;
            }
            keep[j] = false;
        }
    }

    candidates
        .into_iter()
        .zip(keep)
        .filter_map(|(c, k)| k.then_some(c))
        .collect()
}

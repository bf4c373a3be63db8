//! PNG plot rendering
//!
//! Minimal raster plots: framed axes with a dotted grid at round tick
//! values, tick labels, a title, axis labels, a legend, polylines, filled
//! markers and dashed reference lines. Text uses the 8x8 bitmap glyphs from
//! `font8x8`, scaled by pixel replication.

use std::path::Path;

use font8x8::{UnicodeFonts, BASIC_FONTS};
use image::{ImageFormat, Rgb, RgbImage};
use palette::{Hsl, IntoColor, Srgb};

use crate::analysis::ModeResult;
use crate::constants::PLOT_SIZE;
use crate::error::OutputWriteError;
use crate::peaks::ResonancePeak;
use crate::pipeline::nan_mean;
use crate::spectrum::Spectrum;

const WHITE: Rgb<u8> = Rgb([255, 255, 255]);
const BLACK: Rgb<u8> = Rgb([0, 0, 0]);
const GRID: Rgb<u8> = Rgb([200, 200, 200]);

/// Glyph cell size in pixels before scaling
const GLYPH: i64 = 8;
const TITLE_SCALE: i64 = 3;
const LABEL_SCALE: i64 = 2;

/// `n` visually distinct colours with evenly spaced hues
pub fn series_colors(n: usize) -> Vec<Rgb<u8>> {
    (0..n)
        .map(|i| {
            let hue = 30.0 + (i as f32 / n as f32) * 360.0;
            let rgb: Srgb = Hsl::new(hue, 0.75, 0.45).into_color();
            Rgb([
                (rgb.red * 255.0) as u8,
                (rgb.green * 255.0) as u8,
                (rgb.blue * 255.0) as u8,
            ])
        })
        .collect()
}

/// |S21| against frequency (GHz) with the detected peaks marked
pub fn plot_s21(
    path: &Path,
    spectrum: &Spectrum,
    peaks: &[ResonancePeak],
) -> Result<(), OutputWriteError> {
    render_s21(spectrum, peaks).save(path)
}

/// Effective and substrate permittivity against resonance frequency (GHz),
/// each with a dashed line at its mean
pub fn plot_permittivity(path: &Path, modes: &[ModeResult]) -> Result<(), OutputWriteError> {
    render_permittivity(modes).save(path)
}

fn render_s21(spectrum: &Spectrum, peaks: &[ResonancePeak]) -> Canvas {
    let f_ghz: Vec<f64> = spectrum.freq_hz().iter().map(|f| f / 1e9).collect();
    let x_range = padded_range(f_ghz.iter().copied());
    let y_range = padded_range(spectrum.s21_db().iter().copied());
    let colors = series_colors(2);

    let mut canvas = Canvas::new(x_range, y_range);
    canvas.frame();
    let trace: Vec<(f64, f64)> = f_ghz
        .iter()
        .copied()
        .zip(spectrum.s21_db().iter().copied())
        .collect();
    canvas.polyline(&trace, colors[1], 2);
    for peak in peaks {
        canvas.marker(peak.frequency_hz / 1e9, peak.magnitude_db, 7, colors[0]);
    }
    canvas.title("Ring resonator |S21|");
    canvas.axis_labels("Frequency [GHz]", "|S21| [dB]");
    canvas.legend(&[
        ("|S21|", colors[1], Swatch::Line),
        ("peaks", colors[0], Swatch::Marker),
    ]);
    canvas
}

fn render_permittivity(modes: &[ModeResult]) -> Canvas {
    let f_ghz: Vec<f64> = modes.iter().map(|m| m.resonant_frequency_hz / 1e9).collect();
    let eps_eff: Vec<f64> = modes.iter().map(|m| m.effective_permittivity).collect();
    let eps_r: Vec<f64> = modes.iter().map(|m| m.substrate_permittivity).collect();

    let x_range = padded_range(f_ghz.iter().copied());
    let y_range = padded_range(eps_eff.iter().chain(&eps_r).copied());
    let colors = series_colors(2);

    let mut canvas = Canvas::new(x_range, y_range);
    canvas.frame();
    for (values, color) in [(&eps_eff, colors[0]), (&eps_r, colors[1])] {
        let points: Vec<(f64, f64)> = f_ghz.iter().copied().zip(values.iter().copied()).collect();
        let mean = nan_mean(values.iter().copied());
        if mean.is_finite() {
            canvas.hline_dashed(mean, color);
        }
        canvas.polyline(&points, color, 2);
        for &(x, y) in &points {
            canvas.marker(x, y, 5, color);
        }
    }
    canvas.title("Ring resonator permittivity");
    canvas.axis_labels("Frequency [GHz]", "Permittivity");
    canvas.legend(&[
        ("eps_eff", colors[0], Swatch::Line),
        ("eps_r", colors[1], Swatch::Line),
    ]);
    canvas
}

/// Finite min/max padded by 5%, with a unit span when degenerate
fn padded_range(values: impl Iterator<Item = f64>) -> (f64, f64) {
    let (lo, hi) = values
        .filter(|v| v.is_finite())
        .fold((f64::INFINITY, f64::NEG_INFINITY), |(lo, hi), v| {
            (lo.min(v), hi.max(v))
        });
    if lo > hi {
        return (0.0, 1.0);
    }
    if hi - lo < 1e-12 {
        return (lo - 0.5, hi + 0.5);
    }
    let pad = 0.05 * (hi - lo);
    (lo - pad, hi + pad)
}

/// Round tick values (1, 2, 5 x 10^k steps) inside `[lo, hi]`
fn nice_ticks(lo: f64, hi: f64, target: usize) -> Vec<f64> {
    let raw = (hi - lo) / target.max(1) as f64;
    if !(raw.is_finite() && raw > 0.0) {
        return Vec::new();
    }
    let magnitude = 10.0_f64.powf(raw.log10().floor());
    let step = [1.0, 2.0, 5.0, 10.0]
        .iter()
        .map(|m| m * magnitude)
        .find(|&s| s >= raw)
        .unwrap_or(10.0 * magnitude);
    let first = (lo / step).ceil() as i64;
    let last = (hi / step).floor() as i64;
    (first..=last).map(|k| k as f64 * step).collect()
}

/// Tick labels with just enough decimals to tell neighbours apart
fn tick_labels(ticks: &[f64]) -> Vec<String> {
    let decimals = match ticks {
        [a, b, ..] => (-(b - a).abs().log10().floor()).max(0.0) as usize,
        _ => 0,
    };
    ticks
        .iter()
        .map(|&v| format!("{:.*}", decimals, v + 0.0))
        .collect()
}

fn text_width(s: &str, scale: i64) -> i64 {
    s.chars().count() as i64 * GLYPH * scale
}

#[derive(Debug, Clone, Copy)]
enum Swatch {
    Line,
    Marker,
}

struct Canvas {
    img: RgbImage,
    left: f64,
    right: f64,
    top: f64,
    bottom: f64,
    x_range: (f64, f64),
    y_range: (f64, f64),
}

impl Canvas {
    fn new(x_range: (f64, f64), y_range: (f64, f64)) -> Self {
        let (w, h) = PLOT_SIZE;
        Self {
            img: RgbImage::from_pixel(w, h, WHITE),
            left: 0.10 * w as f64,
            right: 0.97 * w as f64,
            top: 0.08 * h as f64,
            bottom: 0.86 * h as f64,
            x_range,
            y_range,
        }
    }

    fn px(&self, x: f64, y: f64) -> (f64, f64) {
        let (x0, x1) = self.x_range;
        let (y0, y1) = self.y_range;
        (
            self.left + (x - x0) / (x1 - x0) * (self.right - self.left),
            self.bottom - (y - y0) / (y1 - y0) * (self.bottom - self.top),
        )
    }

    fn put(&mut self, x: i64, y: i64, color: Rgb<u8>) {
        let (w, h) = self.img.dimensions();
        if x >= 0 && y >= 0 && (x as u32) < w && (y as u32) < h {
            self.img.put_pixel(x as u32, y as u32, color);
        }
    }

    fn fill(&mut self, x: i64, y: i64, w: i64, h: i64, color: Rgb<u8>) {
        for dx in 0..w {
            for dy in 0..h {
                self.put(x + dx, y + dy, color);
            }
        }
    }

    fn frame(&mut self) {
        let (l, r, t, b) = (self.left, self.right, self.top, self.bottom);

        let x_ticks = nice_ticks(self.x_range.0, self.x_range.1, 10);
        for (x, label) in x_ticks.iter().zip(tick_labels(&x_ticks)) {
            let (px, _) = self.px(*x, 0.0);
            let px = px.round() as i64;
            for y in (t as i64..b as i64).step_by(4) {
                self.put(px, y, GRID);
            }
            for dy in 0..8 {
                self.put(px, b as i64 + dy, BLACK);
            }
            let w = text_width(&label, LABEL_SCALE);
            self.text(px - w / 2, b as i64 + 14, &label, LABEL_SCALE, BLACK);
        }

        let y_ticks = nice_ticks(self.y_range.0, self.y_range.1, 8);
        for (y, label) in y_ticks.iter().zip(tick_labels(&y_ticks)) {
            let (_, py) = self.px(0.0, *y);
            let py = py.round() as i64;
            for x in (l as i64..r as i64).step_by(4) {
                self.put(x, py, GRID);
            }
            for dx in 0..8 {
                self.put(l as i64 - dx, py, BLACK);
            }
            let w = text_width(&label, LABEL_SCALE);
            let half = GLYPH * LABEL_SCALE / 2;
            self.text(l as i64 - 14 - w, py - half, &label, LABEL_SCALE, BLACK);
        }

        self.segment((l, t), (r, t), BLACK, 2);
        self.segment((r, t), (r, b), BLACK, 2);
        self.segment((r, b), (l, b), BLACK, 2);
        self.segment((l, b), (l, t), BLACK, 2);
    }

    /// Horizontal text with its top-left corner at `(x, y)`
    fn text(&mut self, x: i64, y: i64, s: &str, scale: i64, color: Rgb<u8>) {
        for (i, c) in s.chars().enumerate() {
            let Some(glyph) = BASIC_FONTS.get(c) else {
                continue;
            };
            let x0 = x + i as i64 * GLYPH * scale;
            for (row, bits) in (0i64..).zip(glyph) {
                for col in 0..8u8 {
                    if (bits >> col) & 1 == 1 {
                        let gx = x0 + i64::from(col) * scale;
                        self.fill(gx, y + row * scale, scale, scale, color);
                    }
                }
            }
        }
    }

    /// Text rotated a quarter turn counter-clockwise, read bottom to top,
    /// with its bottom-left corner at `(x, y)`
    fn text_vertical(&mut self, x: i64, y: i64, s: &str, scale: i64, color: Rgb<u8>) {
        for (i, c) in s.chars().enumerate() {
            let Some(glyph) = BASIC_FONTS.get(c) else {
                continue;
            };
            let y0 = y - i as i64 * GLYPH * scale;
            for (row, bits) in (0i64..).zip(glyph) {
                for col in 0..8u8 {
                    if (bits >> col) & 1 == 1 {
                        let gy = y0 - (i64::from(col) + 1) * scale;
                        self.fill(x + row * scale, gy, scale, scale, color);
                    }
                }
            }
        }
    }

    fn title(&mut self, title: &str) {
        let w = text_width(title, TITLE_SCALE);
        let x = ((self.left + self.right) / 2.0) as i64 - w / 2;
        let y = (self.top as i64 - GLYPH * TITLE_SCALE) / 2;
        self.text(x, y, title, TITLE_SCALE, BLACK);
    }

    fn axis_labels(&mut self, x_label: &str, y_label: &str) {
        let w = text_width(x_label, LABEL_SCALE);
        let x = ((self.left + self.right) / 2.0) as i64 - w / 2;
        self.text(x, self.bottom as i64 + 56, x_label, LABEL_SCALE, BLACK);

        let h = text_width(y_label, LABEL_SCALE);
        let y = ((self.top + self.bottom) / 2.0) as i64 + h / 2;
        self.text_vertical(24, y, y_label, LABEL_SCALE, BLACK);
    }

    /// Boxed legend in the top-right corner of the plot area
    fn legend(&mut self, entries: &[(&str, Rgb<u8>, Swatch)]) {
        const SWATCH: i64 = 32;
        const ROW: i64 = 28;
        const PAD: i64 = 12;

        let label_w = entries
            .iter()
            .map(|(label, _, _)| text_width(label, LABEL_SCALE))
            .max()
            .unwrap_or(0);
        let w = PAD + SWATCH + PAD + label_w + PAD;
        let h = PAD + ROW * entries.len() as i64;
        let x = self.right as i64 - PAD - w;
        let y = self.top as i64 + PAD;

        self.fill(x, y, w, h, WHITE);
        let (x0, y0, x1, y1) = (x as f64, y as f64, (x + w) as f64, (y + h) as f64);
        self.segment((x0, y0), (x1, y0), BLACK, 1);
        self.segment((x1, y0), (x1, y1), BLACK, 1);
        self.segment((x1, y1), (x0, y1), BLACK, 1);
        self.segment((x0, y1), (x0, y0), BLACK, 1);

        for (k, &(label, color, swatch)) in (0i64..).zip(entries) {
            let row_top = y + PAD + k * ROW;
            let mid = row_top + GLYPH * LABEL_SCALE / 2;
            match swatch {
                Swatch::Line => self.fill(x + PAD, mid - 1, SWATCH, 3, color),
                Swatch::Marker => {
                    let cx = x + PAD + SWATCH / 2;
                    for dx in -6..=6_i64 {
                        for dy in -6..=6_i64 {
                            if dx * dx + dy * dy <= 36 {
                                self.put(cx + dx, mid + dy, color);
                            }
                        }
                    }
                }
            }
            self.text(x + PAD + SWATCH + PAD, row_top, label, LABEL_SCALE, BLACK);
        }
    }

    /// Straight segment in pixel coordinates
    fn segment(&mut self, a: (f64, f64), b: (f64, f64), color: Rgb<u8>, thickness: i64) {
        let steps = (b.0 - a.0).abs().max((b.1 - a.1).abs()).ceil().max(1.0) as usize;
        let half = thickness / 2;
        for k in 0..=steps {
            let t = k as f64 / steps as f64;
            let x = (a.0 + t * (b.0 - a.0)).round() as i64;
            let y = (a.1 + t * (b.1 - a.1)).round() as i64;
            for dx in -half..thickness - half {
                for dy in -half..thickness - half {
                    self.put(x + dx, y + dy, color);
                }
            }
        }
    }

    /// Connected line through data points; non-finite points break the line
    fn polyline(&mut self, points: &[(f64, f64)], color: Rgb<u8>, thickness: i64) {
        for w in points.windows(2) {
            let (a, b) = (w[0], w[1]);
            if [a.0, a.1, b.0, b.1].iter().all(|v| v.is_finite()) {
                let pa = self.px(a.0, a.1);
                let pb = self.px(b.0, b.1);
                self.segment(pa, pb, color, thickness);
            }
        }
    }

    fn marker(&mut self, x: f64, y: f64, radius: i64, color: Rgb<u8>) {
        if !(x.is_finite() && y.is_finite()) {
            return;
        }
        let (cx, cy) = self.px(x, y);
        let (cx, cy) = (cx.round() as i64, cy.round() as i64);
        for dx in -radius..=radius {
            for dy in -radius..=radius {
                if dx * dx + dy * dy <= radius * radius {
                    self.put(cx + dx, cy + dy, color);
                }
            }
        }
    }

    fn hline_dashed(&mut self, y: f64, color: Rgb<u8>) {
        let (_, py) = self.px(self.x_range.0, y);
        let mut x = self.left;
        while x < self.right {
            let end = (x + 12.0).min(self.right);
            self.segment((x, py), (end, py), color, 1);
            x += 20.0;
        }
    }

    fn save(self, path: &Path) -> Result<(), OutputWriteError> {
        self.img
            .save_with_format(path, ImageFormat::Png)
            .map_err(|source| OutputWriteError::Image {
                path: path.to_path_buf(),
                source,
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::synth::SyntheticRing;
    use approx::assert_relative_eq;

    /// Pixels in `[x0, x1) x [y0, y1)` that differ from white
    fn inked(img: &RgbImage, x0: u32, y0: u32, x1: u32, y1: u32) -> usize {
        (x0..x1)
            .flat_map(|x| (y0..y1).map(move |y| (x, y)))
            .filter(|&(x, y)| *img.get_pixel(x, y) != WHITE)
            .count()
    }

    fn contains_color(img: &RgbImage, x0: u32, y0: u32, x1: u32, y1: u32, c: Rgb<u8>) -> bool {
        (x0..x1).any(|x| (y0..y1).any(|y| *img.get_pixel(x, y) == c))
    }

    #[test]
    fn test_nice_ticks() {
        assert_eq!(nice_ticks(0.0, 10.0, 5), vec![0.0, 2.0, 4.0, 6.0, 8.0, 10.0]);
        let ticks = nice_ticks(-63.0, -7.0, 8);
        assert_eq!(ticks.first().copied(), Some(-60.0));
        assert_eq!(ticks.last().copied(), Some(-10.0));
        assert!(nice_ticks(1.0, 1.0, 5).is_empty());
    }

    #[test]
    fn test_tick_labels() {
        assert_eq!(tick_labels(&[-20.0, -10.0, 0.0]), vec!["-20", "-10", "0"]);
        assert_eq!(tick_labels(&[0.5, 1.0, 1.5]), vec!["0.5", "1.0", "1.5"]);
        assert_eq!(tick_labels(&[4.38, 4.4]), vec!["4.38", "4.40"]);
        assert_eq!(tick_labels(&[-0.0]), vec!["0"]);
        assert!(tick_labels(&[]).is_empty());
    }

    #[test]
    fn test_padded_range() {
        let (lo, hi) = padded_range([1.0, f64::NAN, 3.0].into_iter());
        assert_relative_eq!(lo, 0.9);
        assert_relative_eq!(hi, 3.1);
        assert_eq!(padded_range(std::iter::empty()), (0.0, 1.0));
        assert_eq!(padded_range([2.0].into_iter()), (1.5, 2.5));
    }

    #[test]
    fn test_series_colors_distinct() {
        let colors = series_colors(2);
        assert_eq!(colors.len(), 2);
        assert_ne!(colors[0], colors[1]);
    }

    #[test]
    fn test_canvas_maps_corners() {
        let canvas = Canvas::new((0.0, 1.0), (0.0, 1.0));
        let (x, y) = canvas.px(0.0, 0.0);
        assert_relative_eq!(x, canvas.left);
        assert_relative_eq!(y, canvas.bottom);
        let (x, y) = canvas.px(1.0, 1.0);
        assert_relative_eq!(x, canvas.right);
        assert_relative_eq!(y, canvas.top);
    }

    #[test]
    fn test_text_stays_in_its_cell() {
        let mut canvas = Canvas::new((0.0, 1.0), (0.0, 1.0));
        canvas.text(10, 10, "A", 2, BLACK);
        assert!(inked(&canvas.img, 10, 10, 26, 26) > 0);
        assert_eq!(inked(&canvas.img, 26, 0, 60, 40), 0);
        assert_eq!(inked(&canvas.img, 0, 26, 40, 40), 0);

        canvas.text(100, 10, " ", 2, BLACK);
        assert_eq!(inked(&canvas.img, 100, 10, 116, 26), 0);
        assert_eq!(text_width("Permittivity", 2), 12 * 16);
    }

    #[test]
    fn test_vertical_text_runs_upward() {
        let mut canvas = Canvas::new((0.0, 1.0), (0.0, 1.0));
        canvas.text_vertical(10, 100, "dB", 1, BLACK);
        assert!(inked(&canvas.img, 10, 92, 18, 100) > 0);
        assert!(inked(&canvas.img, 10, 84, 18, 92) > 0);
        assert_eq!(inked(&canvas.img, 0, 100, 40, 120), 0);
        assert_eq!(inked(&canvas.img, 18, 0, 40, 120), 0);
    }

    #[test]
    fn test_s21_plot_is_annotated() {
        let spectrum = SyntheticRing::fr4().spectrum().unwrap();
        let canvas = render_s21(&spectrum, &[]);
        let img = &canvas.img;
        let (w, h) = img.dimensions();
        let (l, r, t, b) = (
            canvas.left as u32,
            canvas.right as u32,
            canvas.top as u32,
            canvas.bottom as u32,
        );

        assert!(inked(img, 0, 0, w, t - 2) > 0, "title");
        assert!(inked(img, l, b + 40, r, h) > 0, "x label");
        assert!(inked(img, 0, t, 48, b) > 0, "y label");
        assert!(inked(img, 48, t, l - 10, b) > 0, "y tick labels");
        assert!(inked(img, l, b + 10, r, b + 34) > 0, "x tick labels");

        let colors = series_colors(2);
        let legend = (r - 300, t, r, t + 100);
        assert!(contains_color(img, legend.0, legend.1, legend.2, legend.3, colors[0]));
        assert!(contains_color(img, legend.0, legend.1, legend.2, legend.3, colors[1]));
    }

    #[test]
    fn test_permittivity_plot_legend_without_modes() {
        let canvas = render_permittivity(&[]);
        let (r, t) = (canvas.right as u32, canvas.top as u32);
        let colors = series_colors(2);
        assert!(contains_color(&canvas.img, r - 300, t, r, t + 100, colors[0]));
        assert!(contains_color(&canvas.img, r - 300, t, r, t + 100, colors[1]));
    }
}

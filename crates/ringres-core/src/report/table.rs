//! Plain-text result table

use std::fmt::Write;

use crate::analysis::ModeResult;
use crate::pipeline::Summary;

/// Table of all modes followed by the averaged values.
///
/// NaN entries are printed as `NaN`. An empty result set gets the header
/// and an explanatory line instead of rows.
pub fn render_table(modes: &[ModeResult]) -> String {
    let mut out = String::new();
    let _ = writeln!(
        out,
        "{:>4}  {:>12}  {:>10}  {:>8}  {:>8}  {:>8}  {:>10}",
        "mode", "f [GHz]", "BW [MHz]", "Q", "eps_eff", "eps_r", "tan_d"
    );
    if modes.is_empty() {
        out.push_str("no resonances detected\n");
        return out;
    }
    for m in modes {
        let _ = writeln!(
            out,
            "{:>4}  {:>12.6}  {:>10.3}  {:>8.1}  {:>8.4}  {:>8.4}  {:>10.3e}",
            m.mode_index,
            m.resonant_frequency_hz / 1e9,
            m.bandwidth_hz / 1e6,
            m.quality_factor,
            m.effective_permittivity,
            m.substrate_permittivity,
            m.loss_tangent,
        );
    }

    let summary = Summary::from_modes(modes);
    let _ = writeln!(out);
    let _ = writeln!(
        out,
        "average eps_eff = {:.4}",
        summary.mean_effective_permittivity
    );
    let _ = writeln!(
        out,
        "average eps_r   = {:.4}",
        summary.mean_substrate_permittivity
    );
    let _ = writeln!(out, "average tan_d   = {:.3e}", summary.mean_loss_tangent);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn mode(index: usize, q: f64) -> ModeResult {
        ModeResult {
            mode_index: index,
            resonant_frequency_hz: index as f64 * 1.6e9,
            magnitude_db: -12.0,
            bandwidth_hz: index as f64 * 1.6e9 / q,
            quality_factor: q,
            unloaded_quality_factor: q,
            effective_permittivity: 3.3,
            substrate_permittivity: 4.4,
            loss_tangent: 1.0 / q,
            bandwidth_error: None,
        }
    }

    #[test]
    fn test_empty_table() {
        let table = render_table(&[]);
        assert_eq!(table.lines().count(), 2);
        assert!(table.contains("eps_eff"));
        assert!(table.ends_with("no resonances detected\n"));
        assert!(!table.contains("average"));
    }

    #[test]
    fn test_rows_and_averages() {
        let table = render_table(&[mode(1, 50.0), mode(2, f64::NAN)]);
        let lines: Vec<&str> = table.lines().collect();
        assert!(lines[0].contains("eps_r"));
        assert!(lines[1].trim_start().starts_with('1'));
        assert!(lines[2].contains("NaN"));
        assert!(table.contains("average eps_r   = 4.4000"));
        assert!(table.contains("average tan_d   = 2.000e-2"));
    }
}

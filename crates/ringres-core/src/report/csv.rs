//! Per-mode CSV export

use std::path::Path;

use serde::Serialize;

use crate::analysis::ModeResult;
use crate::error::OutputWriteError;

/// Header written even when there are no modes
pub const CSV_COLUMNS: [&str; 6] = [
    "mode_index",
    "frequency_Hz",
    "quality_factor",
    "effective_permittivity",
    "substrate_permittivity",
    "loss_tangent",
];

#[derive(Debug, Serialize)]
struct CsvRow {
    mode_index: usize,
    #[serde(rename = "frequency_Hz")]
    frequency_hz: f64,
    quality_factor: f64,
    effective_permittivity: f64,
    substrate_permittivity: f64,
    loss_tangent: f64,
}

impl From<&ModeResult> for CsvRow {
    fn from(m: &ModeResult) -> Self {
        Self {
            mode_index: m.mode_index,
            frequency_hz: m.resonant_frequency_hz,
            quality_factor: m.quality_factor,
            effective_permittivity: m.effective_permittivity,
            substrate_permittivity: m.substrate_permittivity,
            loss_tangent: m.loss_tangent,
        }
    }
}

/// One row per mode in ascending mode order. NaN fields are written as `NaN`.
pub fn write_csv(path: &Path, modes: &[ModeResult]) -> Result<(), OutputWriteError> {
    let err = |source| OutputWriteError::Csv {
        path: path.to_path_buf(),
        source,
    };

    let mut writer = csv::WriterBuilder::new()
        .has_headers(false)
        .from_path(path)
        .map_err(err)?;
    writer.write_record(CSV_COLUMNS).map_err(err)?;
    for mode in modes {
        writer.serialize(CsvRow::from(mode)).map_err(err)?;
    }
    writer.flush().map_err(|source| OutputWriteError::Io {
        path: path.to_path_buf(),
        source,
    })
}

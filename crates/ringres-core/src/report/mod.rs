//! Output of an extraction: console table, CSV and PNG plots
//!
//! Writing never aborts the run. Each failed artefact is collected as an
//! [`OutputWriteError`] in the [`ReportOutcome`] and the remaining outputs
//! are still attempted.

mod csv;
mod plot;
mod table;

pub use self::csv::{write_csv, CSV_COLUMNS};
pub use plot::{plot_permittivity, plot_s21, series_colors};
pub use table::render_table;

use std::fs;
use std::path::{Path, PathBuf};

use log::{info, warn};

use crate::config::OutputConfig;
use crate::constants::{PERMITTIVITY_PLOT_FILE, S21_PLOT_FILE};
use crate::error::OutputWriteError;
use crate::pipeline::Extraction;

/// Files written and failures collected by [`Reporter::emit`]
#[derive(Debug, Default)]
pub struct ReportOutcome {
    pub written: Vec<PathBuf>,
    pub warnings: Vec<OutputWriteError>,
}

impl ReportOutcome {
    pub fn is_clean(&self) -> bool {
        self.warnings.is_empty()
    }

    fn record(&mut self, path: PathBuf, result: Result<(), OutputWriteError>) {
        match result {
            Ok(()) => {
                info!("wrote {}", path.display());
                self.written.push(path);
            }
            Err(e) => {
                warn!("{}", e);
                self.warnings.push(e);
            }
        }
    }
}

/// Writes the file outputs selected by an [`OutputConfig`]
#[derive(Debug, Clone)]
pub struct Reporter {
    output: OutputConfig,
}

impl Reporter {
    pub fn new(output: OutputConfig) -> Self {
        Self { output }
    }

    pub fn emit(&self, extraction: &Extraction) -> ReportOutcome {
        let mut outcome = ReportOutcome::default();

        if let Some(path) = &self.output.csv {
            let result = ensure_parent(path).and_then(|()| write_csv(path, &extraction.modes));
            outcome.record(path.clone(), result);
        }

        if self.output.plots {
            let dir = &self.output.plot_dir;
            if let Err(e) = ensure_dir(dir) {
                warn!("{}", e);
                outcome.warnings.push(e);
                return outcome;
            }

            let s21 = dir.join(S21_PLOT_FILE);
            let result = plot_s21(&s21, &extraction.spectrum, &extraction.peaks);
            outcome.record(s21, result);

            let eps = dir.join(PERMITTIVITY_PLOT_FILE);
            let result = plot_permittivity(&eps, &extraction.modes);
            outcome.record(eps, result);
        }

        outcome
    }
}

fn ensure_dir(dir: &Path) -> Result<(), OutputWriteError> {
    if dir.as_os_str().is_empty() {
        return Ok(());
    }
    fs::create_dir_all(dir).map_err(|source| OutputWriteError::CreateDir {
        path: dir.to_path_buf(),
        source,
    })
}

fn ensure_parent(path: &Path) -> Result<(), OutputWriteError> {
    match path.parent() {
        Some(parent) => ensure_dir(parent),
        None => Ok(()),
    }
}

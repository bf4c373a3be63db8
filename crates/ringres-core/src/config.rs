//! Run configuration
//!
//! [`AnalysisConfig`] is read from TOML, checked once by
//! [`AnalysisConfig::validate`], and then only shared by reference.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::analysis::LossModel;
use crate::constants::{
    DEFAULT_BANDWIDTH_DROP_DB, DEFAULT_HEIGHT_ABOVE_MEDIAN_DB, DEFAULT_MIN_PROMINENCE_DB,
    DEFAULT_MIN_SPACING_HZ, MM_PER_M,
};
use crate::error::ConfigError;
use crate::microstrip::ring_length_from_resonance;
use crate::peaks::{HeightThreshold, PeakDetectionConfig};

/// Ring and microstrip dimensions in millimetres
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Geometry {
    pub ring_mean_circumference_mm: f64,
    pub substrate_height_mm: f64,
    pub trace_width_mm: f64,
}

impl Geometry {
    pub fn ring_length_m(&self) -> f64 {
        self.ring_mean_circumference_mm / MM_PER_M
    }

    fn validate(&self) -> Result<(), ConfigError> {
        positive("geometry.ring_mean_circumference_mm", self.ring_mean_circumference_mm)?;
        positive("geometry.substrate_height_mm", self.substrate_height_mm)?;
        positive("geometry.trace_width_mm", self.trace_width_mm)
    }
}

/// `[peaks]` section. At most one of the two height keys may be set; with
/// neither, the median-relative default applies.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct PeakSettings {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_height_db: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub min_height_above_median_db: Option<f64>,
    pub min_prominence_db: f64,
    pub min_spacing_hz: f64,
}

impl Default for PeakSettings {
    fn default() -> Self {
        Self {
            min_height_db: None,
            min_height_above_median_db: None,
            min_prominence_db: DEFAULT_MIN_PROMINENCE_DB,
            min_spacing_hz: DEFAULT_MIN_SPACING_HZ,
        }
    }
}

impl PeakSettings {
    pub fn height(&self) -> HeightThreshold {
        match (self.min_height_db, self.min_height_above_median_db) {
            (Some(db), _) => HeightThreshold::Absolute(db),
            (None, Some(db)) => HeightThreshold::AboveMedian(db),
            (None, None) => HeightThreshold::AboveMedian(DEFAULT_HEIGHT_ABOVE_MEDIAN_DB),
        }
    }

    pub fn detection_config(&self) -> PeakDetectionConfig {
        PeakDetectionConfig {
            height: self.height(),
            min_prominence_db: self.min_prominence_db,
            min_spacing_hz: self.min_spacing_hz,
        }
    }

    fn validate(&self) -> Result<(), ConfigError> {
        if self.min_height_db.is_some() && self.min_height_above_median_db.is_some() {
            return Err(ConfigError::invalid(
                "peaks.min_height_db",
                "set either min_height_db or min_height_above_median_db, not both",
            ));
        }
        if let Some(db) = self.min_height_db {
            finite("peaks.min_height_db", db)?;
        }
        if let Some(db) = self.min_height_above_median_db {
            finite("peaks.min_height_above_median_db", db)?;
        }
        non_negative("peaks.min_prominence_db", self.min_prominence_db)?;
        non_negative("peaks.min_spacing_hz", self.min_spacing_hz)
    }
}

/// A resonance of known permittivity used to fix the electrical ring length
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Calibration {
    pub frequency_hz: f64,
    pub permittivity: f64,
    #[serde(default = "default_calibration_mode")]
    pub mode: usize,
}

fn default_calibration_mode() -> usize {
    1
}

impl Calibration {
    pub fn ring_length_m(&self) -> f64 {
        ring_length_from_resonance(self.mode, self.frequency_hz, self.permittivity)
    }

    fn validate(&self) -> Result<(), ConfigError> {
        positive("calibration.frequency_hz", self.frequency_hz)?;
        if !(self.permittivity.is_finite() && self.permittivity >= 1.0) {
            return Err(ConfigError::invalid(
                "calibration.permittivity",
                format!("must be >= 1, got {}", self.permittivity),
            ));
        }
        if self.mode == 0 {
            return Err(ConfigError::invalid("calibration.mode", "modes start at 1"));
        }
        Ok(())
    }
}

/// `[output]` section
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct OutputConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub csv: Option<PathBuf>,
    pub plot_dir: PathBuf,
    pub plots: bool,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            csv: None,
            plot_dir: PathBuf::from("."),
            plots: true,
        }
    }
}

/// Everything a run needs besides the measurement itself
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct AnalysisConfig {
    /// Touchstone file with the ring measurement
    pub input: PathBuf,
    #[serde(default = "default_bandwidth_drop_db")]
    pub bandwidth_drop_db: f64,
    pub geometry: Geometry,
    #[serde(default)]
    pub peaks: PeakSettings,
    #[serde(default)]
    pub loss: LossModel,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub calibration: Option<Calibration>,
    #[serde(default)]
    pub output: OutputConfig,
}

fn default_bandwidth_drop_db() -> f64 {
    DEFAULT_BANDWIDTH_DROP_DB
}

impl AnalysisConfig {
    /// Defaults for everything except the input file and geometry.
    pub fn new(input: impl Into<PathBuf>, geometry: Geometry) -> Result<Self, ConfigError> {
        let config = Self {
            input: input.into(),
            bandwidth_drop_db: DEFAULT_BANDWIDTH_DROP_DB,
            geometry,
            peaks: PeakSettings::default(),
            loss: LossModel::default(),
            calibration: None,
            output: OutputConfig::default(),
        };
        config.validate()?;
        Ok(config)
    }

    /// Starting point written by `ringres init-config`
    pub fn template() -> Self {
        Self {
            input: PathBuf::from("measurement.s2p"),
            bandwidth_drop_db: DEFAULT_BANDWIDTH_DROP_DB,
            geometry: Geometry {
                ring_mean_circumference_mm: 100.0,
                substrate_height_mm: 1.6,
                trace_width_mm: 3.0,
            },
            peaks: PeakSettings {
                min_height_above_median_db: Some(DEFAULT_HEIGHT_ABOVE_MEDIAN_DB),
                ..PeakSettings::default()
            },
            loss: LossModel::default(),
            calibration: None,
            output: OutputConfig {
                csv: Some(PathBuf::from("results.csv")),
                ..OutputConfig::default()
            },
        }
    }

    /// Parse and validate TOML text
    pub fn from_toml_str(text: &str) -> Result<Self, ConfigError> {
        let config: Self = toml::from_str(text)?;
        config.validate()?;
        Ok(config)
    }

    /// Read, parse and validate a TOML file. Relative paths (`input`,
    /// `output.csv`, `output.plot_dir`) are resolved against the directory
    /// of the config file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_path_buf(),
            source,
        })?;
        let mut config = Self::from_toml_str(&text)?;
        if let Some(dir) = path.parent() {
            rebase(dir, &mut config.input);
            rebase(dir, &mut config.output.plot_dir);
            if let Some(csv) = config.output.csv.as_mut() {
                rebase(dir, csv);
            }
        }
        Ok(config)
    }

    pub fn to_toml_string(&self) -> Result<String, ConfigError> {
        Ok(toml::to_string_pretty(self)?)
    }

    /// Check every range constraint
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.input.as_os_str().is_empty() {
            return Err(ConfigError::invalid("input", "path is empty"));
        }
        positive("bandwidth_drop_db", self.bandwidth_drop_db)?;
        self.geometry.validate()?;
        self.peaks.validate()?;
        if let Some(q) = self.loss.conductor_q {
            positive("loss.conductor_q", q)?;
        }
        if let Some(q) = self.loss.radiation_q {
            positive("loss.radiation_q", q)?;
        }
        if let Some(cal) = &self.calibration {
            cal.validate()?;
        }
        Ok(())
    }

    /// Electrical ring length in metres, calibrated when configured
    pub fn ring_length_m(&self) -> f64 {
        self.calibration
            .as_ref()
            .map_or_else(|| self.geometry.ring_length_m(), Calibration::ring_length_m)
    }
}

fn finite(field: &'static str, value: f64) -> Result<(), ConfigError> {
    if value.is_finite() {
        Ok(())
    } else {
        Err(ConfigError::invalid(field, format!("must be finite, got {}", value)))
    }
}

fn positive(field: &'static str, value: f64) -> Result<(), ConfigError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::invalid(field, format!("must be > 0, got {}", value)))
    }
}

fn non_negative(field: &'static str, value: f64) -> Result<(), ConfigError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(ConfigError::invalid(field, format!("must be >= 0, got {}", value)))
    }
}

fn rebase(dir: &Path, path: &mut PathBuf) {
    if path.is_relative() {
        *path = dir.join(&*path);
    }
}

//! ringres-core: microstrip ring resonator material extraction
//!
//! Reads a two-port Touchstone measurement of a ring resonator, finds the
//! resonance peaks in |S21| and derives per-mode quality factor, effective
//! permittivity, substrate permittivity and loss tangent.
//!
//! ## Modules
//!
//! - `touchstone` - Touchstone v1/v2 file I/O
//! - `network` - N-port S-parameter container
//! - `spectrum` - |S21| in dB against frequency
//! - `peaks` - Resonance peak detection
//! - `microstrip` - Closed-form microstrip relations
//! - `analysis` - Per-mode bandwidth, Q, permittivity and loss tangent
//! - `pipeline` - Load, detect and analyze in one call
//! - `report` - Console table, CSV and PNG plots
//! - `synth` - Synthetic ring measurements
//!
//! ## Example
//!
//! ```no_run
//! use ringres_core::{AnalysisConfig, Extraction, Reporter};
//!
//! let config = AnalysisConfig::from_file("ring.toml").unwrap();
//! let extraction = Extraction::run(&config).unwrap();
//! print!("{}", ringres_core::report::render_table(&extraction.modes));
//! let outcome = Reporter::new(config.output.clone()).emit(&extraction);
//! assert!(outcome.is_clean());
//! ```

pub mod analysis;
pub mod config;
pub mod constants;
pub mod error;
pub mod frequency;
pub mod microstrip;
pub mod network;
pub mod peaks;
pub mod pipeline;
pub mod report;
pub mod spectrum;
pub mod synth;
pub mod touchstone;

pub use analysis::{LossModel, ModeAnalyzer, ModeResult};
pub use config::{AnalysisConfig, Calibration, Geometry, OutputConfig, PeakSettings};
pub use error::{BandwidthNotFoundError, ConfigError, DataFormatError, OutputWriteError};
pub use frequency::Frequency;
pub use network::Network;
pub use peaks::{HeightThreshold, PeakDetectionConfig, PeakDetector, ResonancePeak};
pub use pipeline::{Extraction, Summary};
pub use report::{ReportOutcome, Reporter};
pub use spectrum::Spectrum;
pub use synth::SyntheticRing;

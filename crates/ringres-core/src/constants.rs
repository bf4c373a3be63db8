//! Physical and numerical constants
//!
//! Read-only values shared by the extraction stages. Defaults for the
//! configuration surface live here so the TOML layer and the CLI agree.

/// Speed of light in vacuum (m/s).
pub const SPEED_OF_LIGHT: f64 = 299_792_458.0;

/// Millimetres per metre.
pub const MM_PER_M: f64 = 1e3;

/// Default drop below the peak used to measure resonance bandwidth (dB).
pub const DEFAULT_BANDWIDTH_DROP_DB: f64 = 3.0;

/// Default peak height threshold above the spectrum median (dB).
pub const DEFAULT_HEIGHT_ABOVE_MEDIAN_DB: f64 = 16.0;

/// Default minimum peak prominence (dB).
pub const DEFAULT_MIN_PROMINENCE_DB: f64 = 3.0;

/// Default minimum spacing between neighbouring resonances (Hz).
pub const DEFAULT_MIN_SPACING_HZ: f64 = 0.0;

/// Default reference impedance when a Touchstone file does not declare one.
pub const DEFAULT_Z0: f64 = 50.0;

/// File name of the |S21| plot inside the plot directory.
pub const S21_PLOT_FILE: &str = "ring_resonator_S21.png";

/// File name of the permittivity plot inside the plot directory.
pub const PERMITTIVITY_PLOT_FILE: &str = "ring_resonator_permittivity.png";

/// Rendered plot size in pixels (width, height).
pub const PLOT_SIZE: (u32, u32) = (1600, 800);

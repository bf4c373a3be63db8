use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};

#[derive(Parser, Debug)]
#[command(
    name = "ringres",
    version,
    about = "Substrate permittivity and loss tangent from ring resonator measurements"
)]
pub struct Cli {
    #[arg(
        short,
        long,
        global = true,
        action = clap::ArgAction::Count,
        help = "More log output (-vv for trace)"
    )]
    pub verbose: u8,
    #[arg(
        short,
        long,
        global = true,
        action = clap::ArgAction::Count,
        help = "Less log output (-qq for errors only)"
    )]
    pub quiet: u8,
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Detect resonances in a Touchstone file and extract material parameters
    Extract(ExtractArgs),
    /// Write a synthetic ring resonator measurement
    Synth(SynthArgs),
    /// Write a default configuration file
    InitConfig {
        #[arg(long, short, help = "Destination file (stdout when omitted)")]
        output: Option<PathBuf>,
    },
}

/// Ring geometry in millimetres
#[derive(Args, Debug, Clone, Default)]
pub struct GeometryArgs {
    #[arg(long = "ring-mm", help = "Mean ring circumference (mm)")]
    pub ring_mm: Option<f64>,
    #[arg(long = "height-mm", help = "Substrate height (mm)")]
    pub height_mm: Option<f64>,
    #[arg(long = "width-mm", help = "Trace width (mm)")]
    pub width_mm: Option<f64>,
}

#[derive(Args, Debug)]
pub struct ExtractArgs {
    #[arg(long, short, help = "TOML configuration file")]
    pub config: Option<PathBuf>,
    #[arg(long, short, help = "Touchstone file (overrides the config)")]
    pub input: Option<PathBuf>,
    #[command(flatten)]
    pub geometry: GeometryArgs,
    #[arg(long, help = "Write per-mode results to this CSV file")]
    pub csv: Option<PathBuf>,
    #[arg(long, help = "Directory for the PNG plots")]
    pub plot_dir: Option<PathBuf>,
    #[arg(long, default_value_t = false, help = "Skip the PNG plots")]
    pub no_plots: bool,
}

#[derive(Args, Debug)]
pub struct SynthArgs {
    #[arg(long, short, help = "Destination Touchstone file (.s2p)")]
    pub output: PathBuf,
    #[command(flatten)]
    pub geometry: GeometryArgs,
    #[arg(long, default_value_t = 4.4)]
    pub eps_r: f64,
    #[arg(long, default_value_t = 0.02)]
    pub loss_tangent: f64,
    #[arg(long, help = "Number of modes to include (all in the sweep when omitted)")]
    pub modes: Option<usize>,
    #[arg(long, default_value_t = 0.01)]
    pub start_ghz: f64,
    #[arg(long, default_value_t = 6.0)]
    pub stop_ghz: f64,
    #[arg(long, default_value_t = 6001)]
    pub points: usize,
}

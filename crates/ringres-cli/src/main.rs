use std::fs;
use std::path::Path;
use std::process::ExitCode;

use anyhow::{bail, Context};
use clap::Parser;
use log::{info, warn};

use ringres_core::report::render_table;
use ringres_core::touchstone::SParamFormat;
use ringres_core::{AnalysisConfig, Extraction, Geometry, Reporter, SyntheticRing};

mod cli;

use cli::{Cli, Commands, ExtractArgs, GeometryArgs, SynthArgs};

const CONFIG_HEADER: &str = "\
# ringres extraction settings
#
# Paths are relative to this file. Peak height is either absolute
# (min_height_db) or relative to the spectrum median
# (min_height_above_median_db), not both.
#
# Optional [loss] keys: conductor_q = 250.0, radiation_q = 2000.0
#
# Optional section to derive the ring length from a reference material:
#
# [calibration]
# frequency_hz = 1.0e9
# permittivity = 4.2
# mode = 1

";

fn main() -> ExitCode {
    let cli = Cli::parse();
    init_logging(cli.verbose, cli.quiet);

    match run(cli.command) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            eprintln!("error: {:#}", e);
            ExitCode::FAILURE
        }
    }
}

fn init_logging(verbose: u8, quiet: u8) {
    let level = match i16::from(verbose) - i16::from(quiet) {
        i16::MIN..=-2 => "error",
        -1 => "warn",
        0 => "info",
        1 => "debug",
        _ => "trace",
    };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(level))
        .format_timestamp(None)
        .init();
}

fn run(command: Commands) -> anyhow::Result<()> {
    match command {
        Commands::Extract(args) => extract(args),
        Commands::Synth(args) => synth(args),
        Commands::InitConfig { output } => init_config(output.as_deref()),
    }
}

fn extract(args: ExtractArgs) -> anyhow::Result<()> {
    let config = build_config(&args)?;

    let extraction = Extraction::run(&config)
        .with_context(|| format!("failed to load {}", config.input.display()))?;
    print!("{}", render_table(&extraction.modes));

    let outcome = Reporter::new(config.output.clone()).emit(&extraction);
    if !outcome.is_clean() {
        warn!(
            "{} output(s) could not be written",
            outcome.warnings.len()
        );
    }
    Ok(())
}

/// Config file (when given) with command-line overrides applied
fn build_config(args: &ExtractArgs) -> anyhow::Result<AnalysisConfig> {
    let mut config = match &args.config {
        Some(path) => AnalysisConfig::from_file(path)
            .with_context(|| format!("invalid configuration {}", path.display()))?,
        None => {
            let Some(input) = &args.input else {
                bail!("no input file: pass --input or --config");
            };
            let geometry = required_geometry(&args.geometry)?;
            AnalysisConfig::new(input, geometry).context("invalid arguments")?
        }
    };

    if let Some(input) = &args.input {
        config.input = input.clone();
    }
    let g = &args.geometry;
    if let Some(v) = g.ring_mm {
        config.geometry.ring_mean_circumference_mm = v;
    }
    if let Some(v) = g.height_mm {
        config.geometry.substrate_height_mm = v;
    }
    if let Some(v) = g.width_mm {
        config.geometry.trace_width_mm = v;
    }
    if let Some(csv) = &args.csv {
        config.output.csv = Some(csv.clone());
    }
    if let Some(dir) = &args.plot_dir {
        config.output.plot_dir = dir.clone();
    }
    if args.no_plots {
        config.output.plots = false;
    }

    config.validate().context("invalid arguments")?;
    Ok(config)
}

fn required_geometry(g: &GeometryArgs) -> anyhow::Result<Geometry> {
    match (g.ring_mm, g.height_mm, g.width_mm) {
        (Some(ring), Some(height), Some(width)) => Ok(Geometry {
            ring_mean_circumference_mm: ring,
            substrate_height_mm: height,
            trace_width_mm: width,
        }),
        _ => bail!("without --config, --ring-mm, --height-mm and --width-mm are required"),
    }
}

fn synth(args: SynthArgs) -> anyhow::Result<()> {
    if !(args.loss_tangent.is_finite() && args.loss_tangent > 0.0) {
        bail!("--loss-tangent must be > 0, got {}", args.loss_tangent);
    }
    if !(args.start_ghz > 0.0 && args.stop_ghz > args.start_ghz) {
        bail!("sweep must satisfy 0 < --start-ghz < --stop-ghz");
    }
    if args.points < 2 {
        bail!("--points must be at least 2");
    }

    let defaults = SyntheticRing::fr4();
    let g = &args.geometry;
    let ring = SyntheticRing {
        geometry: Geometry {
            ring_mean_circumference_mm: g
                .ring_mm
                .unwrap_or(defaults.geometry.ring_mean_circumference_mm),
            substrate_height_mm: g.height_mm.unwrap_or(defaults.geometry.substrate_height_mm),
            trace_width_mm: g.width_mm.unwrap_or(defaults.geometry.trace_width_mm),
        },
        substrate_permittivity: args.eps_r,
        max_modes: args.modes,
        start_hz: args.start_ghz * 1e9,
        stop_hz: args.stop_ghz * 1e9,
        npoints: args.points,
        ..defaults
    }
    .with_loss_tangent(args.loss_tangent);

    let modes = ring.mode_frequencies();
    ring.network()
        .write_touchstone(&args.output, SParamFormat::DB)
        .with_context(|| format!("failed to write {}", args.output.display()))?;
    info!(
        "wrote {} with {} mode(s), eps_eff = {:.4}",
        args.output.display(),
        modes.len(),
        ring.effective_permittivity()
    );
    Ok(())
}

fn init_config(output: Option<&Path>) -> anyhow::Result<()> {
    let body = AnalysisConfig::template()
        .to_toml_string()
        .context("failed to serialize the default configuration")?;
    let text = format!("{}{}", CONFIG_HEADER, body);

    match output {
        Some(path) => {
            if path.exists() {
                bail!("{} already exists", path.display());
            }
            fs::write(path, text).with_context(|| format!("failed to write {}", path.display()))?;
            info!("wrote {}", path.display());
        }
        None => print!("{}", text),
    }
    Ok(())
}

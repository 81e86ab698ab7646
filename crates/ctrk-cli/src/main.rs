//! # ctrk CLI entry point
//!
//! Parses command-line arguments, loads tracker configuration, and dispatches
//! to subcommand handlers.

use std::io;
use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use clap::{Parser, Subcommand};
use tracing_subscriber::EnvFilter;

use ctrk_cli::compare::{run_compare, CompareArgs};
use ctrk_cli::generate::{run_generate, GenerateArgs};
use ctrk_cli::inspect::{run_inspect, InspectArgs};
use ctrk_context::TrackerConfig;

/// Correlation identifier toolkit.
///
/// Generates random and time-ordered identifiers, decodes their structure,
/// and orders them the way the tracking library does.
#[derive(Parser, Debug)]
#[command(name = "ctrk", version, about, long_about = None)]
struct Cli {
    /// Enable verbose output. Repeat for more verbosity (-v, -vv, -vvv).
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,

    /// Path to a YAML tracker configuration. Defaults to `CTRK_*` environment variables.
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand, Debug)]
enum Commands {
    /// Print freshly generated identifiers.
    Generate(GenerateArgs),

    /// Decode version, variant, and timestamp of an identifier.
    Inspect(InspectArgs),

    /// Order two identifiers.
    Compare(CompareArgs),
}

fn main() -> ExitCode {
    let cli = Cli::parse();

    // Initialize tracing based on verbosity level.
    let filter = match cli.verbose {
        0 => EnvFilter::new("warn"),
        1 => EnvFilter::new("info"),
        2 => EnvFilter::new("debug"),
        _ => EnvFilter::new("trace"),
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(io::stderr)
        .init();

    match run(&cli) {
        Ok(code) => ExitCode::from(code),
        Err(e) => {
            tracing::error!("{e:#}");
            ExitCode::from(1)
        }
    }
}

fn run(cli: &Cli) -> anyhow::Result<u8> {
    let config = load_config(cli.config.as_ref())?;
    tracing::debug!(?config, "loaded tracker configuration");

    let mut stdout = io::stdout().lock();
    match &cli.command {
        Commands::Generate(args) => run_generate(args, &config, &mut stdout),
        Commands::Inspect(args) => run_inspect(args, &mut stdout),
        Commands::Compare(args) => run_compare(args, &mut stdout),
    }
}

fn load_config(path: Option<&PathBuf>) -> anyhow::Result<TrackerConfig> {
    match path {
        Some(path) => TrackerConfig::from_yaml_file(path)
            .with_context(|| format!("loading {}", path.display())),
        None => TrackerConfig::from_env().context("reading CTRK_* environment"),
    }
}

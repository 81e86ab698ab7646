//! # Generate Subcommand
//!
//! Prints freshly minted identifiers, one per line. The family defaults to the
//! one in the loaded [`TrackerConfig`].

use std::io::Write;

use anyhow::{Context, Result};
use clap::Args;

use ctrk_context::TrackerConfig;
use ctrk_core::{Family, IdentifierGenerator};

/// Arguments for the `ctrk generate` subcommand.
#[derive(Args, Debug)]
pub struct GenerateArgs {
    /// Identifier family: `random` (4) or `time-ordered` (7).
    #[arg(long, short)]
    pub family: Option<Family>,

    /// How many identifiers to print.
    #[arg(
        long,
        short = 'n',
        default_value_t = 1,
        value_parser = clap::value_parser!(u32).range(1..)
    )]
    pub count: u32,
}

/// Execute the generate subcommand.
///
/// Returns exit code 0. A failing random source is an error.
pub fn run_generate(
    args: &GenerateArgs,
    config: &TrackerConfig,
    out: &mut impl Write,
) -> Result<u8> {
    let family = args.family.unwrap_or(config.family);
    let mut generator = IdentifierGenerator::system();
    tracing::info!(%family, count = args.count, "generating identifiers");

    for _ in 0..args.count {
        let id = generator
            .generate(family)
            .context("identifier generation failed")?;
        writeln!(out, "{id}")?;
    }
    Ok(0)
}

//! # Inspect Subcommand
//!
//! Decodes an identifier's version, variant, family, and (for the
//! time-ordered family) its embedded timestamp.

use std::io::Write;

use anyhow::Result;
use clap::Args;

use ctrk_core::validate::{inspect, Inspection};
use ctrk_core::Identifier;

/// Arguments for the `ctrk inspect` subcommand.
#[derive(Args, Debug)]
pub struct InspectArgs {
    /// The identifier to decode (any hex case).
    #[arg(value_name = "ID")]
    pub id: String,

    /// Emit JSON instead of aligned text.
    #[arg(long)]
    pub json: bool,
}

/// Execute the inspect subcommand.
///
/// Returns exit code: 0 when decoded, 1 when the input is malformed.
pub fn run_inspect(args: &InspectArgs, out: &mut impl Write) -> Result<u8> {
    let Some(report) = inspect(args.id.trim()) else {
        // Re-parse only to explain the rejection.
        if let Err(e) = Identifier::parse(args.id.trim()) {
            writeln!(out, "{e}")?;
        }
        return Ok(1);
    };

    if args.json {
        writeln!(out, "{}", serde_json::to_string_pretty(&report)?)?;
    } else {
        write_text(&report, out)?;
    }
    Ok(0)
}

fn write_text(report: &Inspection, out: &mut impl Write) -> Result<()> {
    writeln!(out, "canonical:     {}", report.canonical)?;
    writeln!(out, "version:       {}", report.version)?;
    writeln!(out, "variant:       {:?}", report.variant)?;
    match report.family {
        Some(family) => writeln!(out, "family:        {family}")?,
        None => writeln!(out, "family:        -")?,
    }
    writeln!(out, "time_ordered:  {}", report.time_ordered)?;
    if let (Some(ts), Some(ms)) = (report.timestamp, report.timestamp_ms) {
        writeln!(
            out,
            "timestamp:     {} ({ms} ms)",
            ts.to_rfc3339_opts(chrono::SecondsFormat::Millis, true)
        )?;
    }
    Ok(())
}

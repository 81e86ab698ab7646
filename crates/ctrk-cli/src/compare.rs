//! # Compare Subcommand
//!
//! Orders two identifiers. Time-ordered pairs compare by embedded timestamp
//! first; every other pair compares by canonical text.

use std::cmp::Ordering;
use std::io::Write;

use anyhow::Result;
use clap::Args;

use ctrk_core::validate::compare;

/// Arguments for the `ctrk compare` subcommand.
#[derive(Args, Debug)]
pub struct CompareArgs {
    #[arg(value_name = "A")]
    pub a: String,

    #[arg(value_name = "B")]
    pub b: String,
}

/// Execute the compare subcommand.
///
/// Prints `<`, `=`, or `>` and returns 0, or prints `incomparable` and
/// returns 2 when either input is malformed.
pub fn run_compare(args: &CompareArgs, out: &mut impl Write) -> Result<u8> {
    let (symbol, code) = match compare(args.a.trim(), args.b.trim()) {
        Some(Ordering::Less) => ("<", 0),
        Some(Ordering::Equal) => ("=", 0),
        Some(Ordering::Greater) => (">", 0),
        None => ("incomparable", 2),
    };
    writeln!(out, "{symbol}")?;
    Ok(code)
}

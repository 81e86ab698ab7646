//! # ctrk-cli — Correlation Identifier Command-Line Interface
//!
//! Thin clap front end over `ctrk-core` for operators working with
//! correlation identifiers pulled from logs and headers.
//!
//! ## Subcommands
//!
//! - `generate`: mint one or more identifiers of a family
//! - `inspect`: decode version, variant, and embedded timestamp
//! - `compare`: order two identifiers
//!
//! ## Crate Policy
//!
//! - Argument parsing is separated from handler logic.
//! - Handlers write to a caller-supplied `Write` and return an exit code, so
//!   they can be tested without a process.

pub mod compare;
pub mod generate;
pub mod inspect;

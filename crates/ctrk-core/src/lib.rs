//! # ctrk-core — Identifier Primitives for Correlation Tracking
//!
//! This crate owns everything about the 128-bit correlation identifier itself:
//! its bit layout, how fresh values are minted, and how inbound text is checked
//! and decoded. It has no notion of execution context; that lives in
//! `ctrk-context`, which depends on this crate and nothing else internal.
//!
//! ## Key Design Principles
//!
//! 1. **One place for bit placement.** The version nibble, variant bits, and
//!    48-bit timestamp field are read and written only through [`layout`].
//!
//! 2. **Newtype for parsed values.** [`Identifier`] always renders in canonical
//!    lowercase form. Text that made it into an `Identifier` needs no further
//!    checks.
//!
//! 3. **Total validators.** Every function in [`validate`] answers `false` or
//!    `None` on bad input instead of erroring, so header parsing never has to
//!    handle a `Result`.
//!
//! 4. **Injectable sources.** [`IdentifierGenerator`] takes its random source
//!    and [`Clock`] as type parameters. Production uses the OS CSPRNG and the
//!    system clock.
//!
//! ## Crate Policy
//!
//! - No dependencies on other `ctrk-*` crates.
//! - No `unsafe` code.
//! - No `panic!()` or `.unwrap()` outside tests.

pub mod clock;
pub mod error;
pub mod generator;
pub mod identifier;
pub mod layout;
pub mod validate;

// Re-export primary types for ergonomic imports.
pub use clock::{Clock, FixedClock, SystemClock};
pub use error::IdentifierError;
pub use generator::{generate, IdentifierGenerator};
pub use identifier::{Family, Identifier, Variant};
pub use validate::{inspect, Inspection};

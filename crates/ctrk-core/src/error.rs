//! # Error Types — Identifier Failures
//!
//! Structured error type for identifier parsing and generation, built with
//! `thiserror`. No `Box<dyn Error>`, no `.unwrap()` outside tests.
//!
//! ## Recovery Classes
//!
//! - [`IdentifierError::Malformed`] is recoverable: the caller discards the
//!   input and generates a fresh identifier.
//! - [`IdentifierError::UnsupportedFamily`] is a programmer error and should
//!   surface at the call site.
//! - [`IdentifierError::RandomSourceExhausted`] is fatal. Propagate it; never
//!   retry silently.
//!
//! Validation predicates in [`crate::validate`] never return these errors.
//! They answer `false` / `None` so they can sit on header-parsing hot paths.

use thiserror::Error;

/// Errors raised while parsing, encoding, or generating identifiers.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum IdentifierError {
    /// The input does not have the 8-4-4-4-12 hyphenated hex shape.
    #[error("malformed identifier \"{input}\": {reason}")]
    Malformed {
        /// The rejected input.
        input: String,
        /// Which structural rule failed.
        reason: String,
    },

    /// A family other than random (4) or time-ordered (7) was requested.
    #[error("unsupported identifier family: \"{0}\" (expected 4/random or 7/time_ordered)")]
    UnsupportedFamily(String),

    /// The random byte source could not supply entropy.
    #[error("random source exhausted: {0}")]
    RandomSourceExhausted(String),

    /// A millisecond timestamp does not fit the 48-bit field.
    #[error("timestamp {0} ms exceeds the 48-bit field (max 2^48-1)")]
    TimestampOutOfRange(u64),

    /// The clock reported an instant before the Unix epoch.
    #[error("clock reported an instant before the Unix epoch")]
    ClockBeforeEpoch,
}

impl IdentifierError {
    pub(crate) fn malformed(input: &str, reason: impl Into<String>) -> Self {
        Self::Malformed {
            input: input.to_string(),
            reason: reason.into(),
        }
    }

    /// Whether the caller can recover by generating a fresh identifier.
    pub fn is_recoverable(&self) -> bool {
        matches!(self, Self::Malformed { .. })
    }
}

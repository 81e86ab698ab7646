//! # Error Types — Context Failures
//!
//! The context store itself has no failure modes: reads, writes, snapshots,
//! and restores are plain in-memory copies. Errors arise only at the
//! boundaries, when a caller names a field that does not exist or when
//! identifier generation fails underneath [`crate::Tracker`].

use ctrk_core::IdentifierError;
use thiserror::Error;

/// Errors raised by the context facade.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ContextError {
    /// A field name outside the closed [`crate::Field`] set.
    ///
    /// Open-ended keys belong in metadata, not in named fields.
    #[error("unknown context field \"{0}\" (use metadata for open-ended keys)")]
    UnknownField(String),

    /// Identifier generation failed while establishing context.
    #[error("identifier error: {0}")]
    Identifier(#[from] IdentifierError),
}

//! # Inbound Acceptance
//!
//! Decides whether an identifier received from outside (a header value, a job
//! payload field, a queue record header) may be adopted. Extraction from the
//! transport is the adapter's job; this module only sees the raw string.
//!
//! A rejected value is treated as absent. The caller then generates a fresh
//! identifier, which [`crate::Tracker::resolve_inbound`] does in one step.

use ctrk_core::Identifier;

/// Accept or reject one raw inbound value.
///
/// - `None`, empty, or whitespace-only: rejected.
/// - `strict`: only well-formed identifiers pass, returned in canonical
///   lowercase form.
/// - lenient: any non-blank value passes, trimmed.
pub fn accept(raw: Option<&str>, strict: bool) -> Option<String> {
    let value = raw?.trim();
    if value.is_empty() {
        return None;
    }
    if !strict {
        return Some(value.to_string());
    }
    match Identifier::parse(value) {
        Ok(id) => Some(id.to_string()),
        Err(err) => {
            tracing::warn!(error = %err, "rejected inbound correlation identifier");
            None
        }
    }
}

/// The first candidate that [`accept`] admits.
///
/// Candidates are tried in order, so put the primary source first and its
/// fallbacks after it.
pub fn first_accepted<'a, I>(candidates: I, strict: bool) -> Option<String>
where
    I: IntoIterator<Item = Option<&'a str>>,
{
    candidates
        .into_iter()
        .find_map(|candidate| accept(candidate, strict))
}

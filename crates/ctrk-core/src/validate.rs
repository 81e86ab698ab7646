//! # Identifier Validation
//!
//! String-level predicates and decoders used on inbound values. Every function
//! here is total: malformed input yields `false` or `None`, never an error and
//! never a panic, so the checks can run on hot paths such as header parsing.
//!
//! ## Recognised versions
//!
//! Generation only emits versions 4 and 7, but version detection tolerates
//! every RFC family found in the wild (1, 2, 3, 5, 6, 8) for read-only
//! inspection. [`is_time_ordered`] recognises all time-based versions
//! (1, 6, 7); [`extract_timestamp`] is defined for version 7 only because the
//! other time-based layouts encode their clocks differently.

use std::cmp::Ordering;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::identifier::{Family, Identifier, Variant};

/// Versions whose leading bits carry a timestamp.
pub const TIME_BASED_VERSIONS: [u8; 3] = [1, 6, 7];

fn parsed(s: &str) -> Option<Identifier> {
    Identifier::parse(s).ok()
}

/// Whether `s` has the 8-4-4-4-12 hex-with-hyphens shape (any case).
pub fn is_well_formed(s: &str) -> bool {
    parsed(s).is_some()
}

/// Well-formed, carries the family's version nibble, and has variant `10xx`.
pub fn is_family(s: &str, family: Family) -> bool {
    parsed(s).is_some_and(|id| id.family() == Some(family))
}

/// Basic validity check.
///
/// With `strict` set, only the generatable families (4 and 7) pass; without
/// it, any well-formed identifier passes.
pub fn is_valid(s: &str, strict: bool) -> bool {
    if strict {
        is_family(s, Family::Random) || is_family(s, Family::TimeOrdered)
    } else {
        is_well_formed(s)
    }
}

/// The raw version nibble of any well-formed identifier, regardless of variant.
pub fn version(s: &str) -> Option<u8> {
    parsed(s).map(|id| id.version())
}

/// The decoded variant of any well-formed identifier.
pub fn variant(s: &str) -> Option<Variant> {
    parsed(s).map(|id| id.variant())
}

/// Whether the version is one of the time-based RFC layouts (1, 6, 7).
pub fn is_time_ordered(s: &str) -> bool {
    version(s).is_some_and(|v| TIME_BASED_VERSIONS.contains(&v))
}

/// Milliseconds since the epoch carried by a version-7 identifier.
pub fn extract_timestamp_ms(s: &str) -> Option<u64> {
    parsed(s)?.timestamp_ms()
}

/// The instant carried by a version-7 identifier; `None` for every other version.
pub fn extract_timestamp(s: &str) -> Option<DateTime<Utc>> {
    parsed(s)?.timestamp()
}

/// `version(s) == n`, restricted to the defined versions 1 through 8.
pub fn validate_exact_version(s: &str, n: u8) -> bool {
    (1..=8).contains(&n) && version(s) == Some(n)
}

/// Order two identifiers.
///
/// Returns `None` ("incomparable") if either input is malformed. Two version-7
/// identifiers compare by timestamp, then by the remaining 80 bits as unsigned
/// big-endian bytes. Anything else compares by canonical byte order, which is
/// case-insensitive lexicographic order of the text.
pub fn compare(a: &str, b: &str) -> Option<Ordering> {
    let left = parsed(a)?;
    let right = parsed(b)?;
    match (left.timestamp_ms(), right.timestamp_ms()) {
        (Some(ta), Some(tb)) => Some(ta.cmp(&tb).then_with(|| left.tail().cmp(right.tail()))),
        _ => Some(left.cmp(&right)),
    }
}

/// Everything that can be decoded from an identifier string.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Inspection {
    /// Canonical lowercase form.
    pub canonical: String,
    /// Raw version nibble.
    pub version: u8,
    /// Decoded variant.
    pub variant: Variant,
    /// Generatable family, if the identifier belongs to one.
    pub family: Option<Family>,
    /// Version is 1, 6, or 7.
    pub time_ordered: bool,
    /// Embedded timestamp (version 7 only).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp: Option<DateTime<Utc>>,
    /// Embedded timestamp in milliseconds (version 7 only).
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timestamp_ms: Option<u64>,
}

/// Decode every field at once; `None` for malformed input.
pub fn inspect(s: &str) -> Option<Inspection> {
    let id = parsed(s)?;
    Some(Inspection {
        canonical: id.to_string(),
        version: id.version(),
        variant: id.variant(),
        family: id.family(),
        time_ordered: TIME_BASED_VERSIONS.contains(&id.version()),
        timestamp: id.timestamp(),
        timestamp_ms: id.timestamp_ms(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const V4: &str = "550e8400-e29b-41d4-a716-446655440000";
    const V7: &str = "01809424-3e59-7c05-9219-566f82fff672";
    const V1: &str = "6ba7b810-9dad-11d1-80b4-00c04fd430c8";
    const V6: &str = "1ec9414c-232a-6b00-b3c8-9e6bdeced846";

    #[test]
    fn test_well_formed_shapes() {
        assert!(is_well_formed(V4));
        assert!(is_well_formed(&V4.to_uppercase()));
        assert!(!is_well_formed("not-a-uuid"));
        assert!(!is_well_formed(""));
        assert!(!is_well_formed("550e8400e29b41d4a716446655440000"));
        assert!(!is_well_formed("{550e8400-e29b-41d4-a716-446655440000}"));
    }

    #[test]
    fn test_known_v4_sample() {
        assert!(is_well_formed(V4));
        assert_eq!(version(V4), Some(4));
        assert!(is_family(V4, Family::Random));
        assert!(!is_family(V4, Family::TimeOrdered));
    }

    #[test]
    fn test_family_requires_rfc_variant() {
        // Version nibble 4, variant nibble c (Microsoft).
        let ms_variant = "550e8400-e29b-41d4-c716-446655440000";
        assert_eq!(version(ms_variant), Some(4));
        assert!(!is_family(ms_variant, Family::Random));
        assert_eq!(variant(ms_variant), Some(Variant::Microsoft));
    }

    #[test]
    fn test_strict_validity() {
        assert!(is_valid(V4, true));
        assert!(is_valid(V7, true));
        assert!(!is_valid(V1, true));
        assert!(is_valid(V1, false));
        assert!(!is_valid("garbage", false));
    }

    #[test]
    fn test_version_tolerates_all_rfc_versions() {
        assert_eq!(version(V1), Some(1));
        assert_eq!(version(V6), Some(6));
        assert_eq!(version("00000000-0000-0000-0000-000000000000"), Some(0));
        assert_eq!(version("6ba7b810-9dad-81d1-80b4-00c04fd430c8"), Some(8));
    }

    #[test]
    fn test_time_ordered_detection() {
        assert!(is_time_ordered(V1));
        assert!(is_time_ordered(V6));
        assert!(is_time_ordered(V7));
        assert!(!is_time_ordered(V4));
        assert!(!is_time_ordered("nope"));
    }

    #[test]
    fn test_timestamp_only_for_v7() {
        assert_eq!(extract_timestamp_ms(V7), Some(0x0180_9424_3e59));
        assert!(extract_timestamp(V7).is_some());
        assert_eq!(extract_timestamp(V1), None);
        assert_eq!(extract_timestamp(V6), None);
        assert_eq!(extract_timestamp(V4), None);
    }

    #[test]
    fn test_exact_version() {
        assert!(validate_exact_version(V4, 4));
        assert!(!validate_exact_version(V4, 7));
        assert!(!validate_exact_version("00000000-0000-0000-0000-000000000000", 0));
        assert!(!validate_exact_version(V4, 9));
    }

    #[test]
    fn test_malformed_input_everywhere_absent() {
        let bad = "not-a-uuid";
        assert!(!is_well_formed(bad));
        assert_eq!(version(bad), None);
        assert_eq!(extract_timestamp(bad), None);
        assert_eq!(compare(bad, V4), None);
        assert_eq!(compare(V4, bad), None);
        assert_eq!(inspect(bad), None);
    }

    #[test]
    fn test_compare_v7_by_timestamp_then_tail() {
        let early = "01809424-3e59-7fff-bfff-ffffffffffff";
        let late = "01809424-3e5a-7000-8000-000000000000";
        assert_eq!(compare(early, late), Some(Ordering::Less));
        assert_eq!(compare(late, early), Some(Ordering::Greater));

        let same_ms_a = "01809424-3e59-7000-8000-000000000001";
        let same_ms_b = "01809424-3e59-7000-8000-000000000002";
        assert_eq!(compare(same_ms_a, same_ms_b), Some(Ordering::Less));
        assert_eq!(compare(same_ms_a, same_ms_a), Some(Ordering::Equal));
    }

    #[test]
    fn test_compare_fallback_is_case_insensitive_lexicographic() {
        assert_eq!(compare(V4, &V4.to_uppercase()), Some(Ordering::Equal));
        assert_eq!(compare(V1, V4), Some(V1.cmp(V4)));
    }

    #[test]
    fn test_inspect_v7() {
        let report = inspect(&V7.to_uppercase()).unwrap();
        assert_eq!(report.canonical, V7);
        assert_eq!(report.version, 7);
        assert_eq!(report.variant, Variant::Rfc4122);
        assert_eq!(report.family, Some(Family::TimeOrdered));
        assert!(report.time_ordered);
        assert_eq!(report.timestamp_ms, Some(0x0180_9424_3e59));
    }
}

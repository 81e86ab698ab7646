//! # Identifier Newtype
//!
//! [`Identifier`] wraps the 16 raw bytes of a correlation identifier. Its text
//! form is always the canonical 36-character lowercase hyphenated string, so a
//! value that made it into an `Identifier` can be propagated without further
//! checks.
//!
//! ## Ordering
//!
//! `Ord` is unsigned byte order, which equals lexicographic order of the
//! canonical strings. For two time-ordered identifiers this sorts by the
//! millisecond timestamp first and the random tail second.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use uuid::Uuid;

use crate::error::IdentifierError;
use crate::layout;

// ─── Family ──────────────────────────────────────────────────────────

/// The identifier families this system generates.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Family {
    /// Version 4: 122 random bits.
    #[default]
    Random,
    /// Version 7: 48-bit millisecond timestamp followed by 74 random bits.
    TimeOrdered,
}

impl Family {
    /// The version nibble written for this family.
    pub fn version(&self) -> u8 {
        match self {
            Self::Random => 4,
            Self::TimeOrdered => 7,
        }
    }

    /// Map a version number to a generatable family.
    ///
    /// # Errors
    ///
    /// Returns [`IdentifierError::UnsupportedFamily`] for anything but 4 or 7.
    pub fn from_version(version: u8) -> Result<Self, IdentifierError> {
        match version {
            4 => Ok(Self::Random),
            7 => Ok(Self::TimeOrdered),
            other => Err(IdentifierError::UnsupportedFamily(other.to_string())),
        }
    }

    /// Stable lowercase name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Random => "random",
            Self::TimeOrdered => "time_ordered",
        }
    }
}

impl fmt::Display for Family {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Family {
    type Err = IdentifierError;

    /// Accepts `4`, `v4`, `random`, `7`, `v7`, `time_ordered`, `time-ordered`.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "4" | "v4" | "random" => Ok(Self::Random),
            "7" | "v7" | "time_ordered" | "time-ordered" => Ok(Self::TimeOrdered),
            _ => Err(IdentifierError::UnsupportedFamily(s.to_string())),
        }
    }
}

// ─── Variant ─────────────────────────────────────────────────────────

/// Variant field decoded from the top bits of byte 8.
///
/// Generation always emits [`Variant::Rfc4122`]. The others are recognised so
/// that identifiers seen in the wild can be inspected.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Variant {
    /// `0xx`: NCS backward compatibility.
    Ncs,
    /// `10x`: the RFC 4122 / RFC 9562 layout.
    Rfc4122,
    /// `110`: Microsoft GUID.
    Microsoft,
    /// `111`: reserved for future definition.
    Reserved,
}

impl Variant {
    /// Decode from the top three bits of byte 8.
    pub fn from_high_bits(bits: u8) -> Self {
        match bits & 0b111 {
            0b000..=0b011 => Self::Ncs,
            0b100 | 0b101 => Self::Rfc4122,
            0b110 => Self::Microsoft,
            _ => Self::Reserved,
        }
    }
}

// ─── Identifier ──────────────────────────────────────────────────────

/// A 128-bit correlation identifier in canonical form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Identifier([u8; 16]);

impl Identifier {
    /// Wrap raw bytes. No version or variant checks are applied.
    pub fn from_bytes(bytes: [u8; 16]) -> Self {
        Self(bytes)
    }

    /// Parse the 8-4-4-4-12 hyphenated form, any hex case.
    ///
    /// # Errors
    ///
    /// Returns [`IdentifierError::Malformed`] if the text is not well-formed.
    pub fn parse(s: &str) -> Result<Self, IdentifierError> {
        layout::parse(s).map(Self)
    }

    /// Access the raw bytes.
    pub fn as_bytes(&self) -> &[u8; 16] {
        &self.0
    }

    /// The 4-bit version nibble.
    pub fn version(&self) -> u8 {
        layout::version_nibble(&self.0)
    }

    /// The decoded variant.
    pub fn variant(&self) -> Variant {
        Variant::from_high_bits(layout::variant_high_bits(&self.0))
    }

    /// Whether the variant bits are `10`.
    pub fn has_rfc_variant(&self) -> bool {
        layout::variant_bits(&self.0) == layout::RFC_VARIANT_BITS
    }

    /// The generatable family this identifier belongs to, if any.
    pub fn family(&self) -> Option<Family> {
        if !self.has_rfc_variant() {
            return None;
        }
        Family::from_version(self.version()).ok()
    }

    /// Milliseconds since the Unix epoch, for time-ordered identifiers only.
    pub fn timestamp_ms(&self) -> Option<u64> {
        match self.family() {
            Some(Family::TimeOrdered) => {
                Some(layout::decode_timestamp_ms(&layout::timestamp_field(&self.0)))
            }
            _ => None,
        }
    }

    /// The embedded timestamp as a UTC instant, for time-ordered identifiers only.
    pub fn timestamp(&self) -> Option<DateTime<Utc>> {
        let ms = self.timestamp_ms()?;
        let secs = i64::try_from(ms / 1000).ok()?;
        let nanos = u32::try_from((ms % 1000) * 1_000_000).ok()?;
        DateTime::from_timestamp(secs, nanos)
    }

    /// The bits after the timestamp field, used to break timestamp ties.
    pub fn tail(&self) -> &[u8] {
        &self.0[6..]
    }
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&layout::format(&self.0))
    }
}

impl FromStr for Identifier {
    type Err = IdentifierError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl From<Uuid> for Identifier {
    fn from(uuid: Uuid) -> Self {
        Self(*uuid.as_bytes())
    }
}

impl From<Identifier> for Uuid {
    fn from(id: Identifier) -> Self {
        Uuid::from_bytes(id.0)
    }
}

impl Serialize for Identifier {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

impl<'de> Deserialize<'de> for Identifier {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let s = String::deserialize(deserializer)?;
        Self::parse(&s).map_err(serde::de::Error::custom)
    }
}

//! # Bit Layout — 128-bit Identifier Encoding
//!
//! Pure, stateless functions over the 16-byte identifier layout and its
//! 36-character canonical text form.
//!
//! ## Field and bit layout (time-ordered family)
//!
//! ```text
//!  0                   1                   2                   3
//!  0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1
//! +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
//! |                          unix_ts_ms                           |
//! +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
//! |          unix_ts_ms           |  ver  |        rand_a         |
//! +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
//! |var|                        rand_b                             |
//! +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
//! |                            rand_b                             |
//! +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
//! ```
//!
//! In text form the version nibble is hex character 14 (first digit of the
//! third group) and the variant bits are the top two bits of hex character 19
//! (first digit of the fourth group). The 48-bit timestamp is the first 12 hex
//! digits once hyphens are stripped.
//!
//! ## Failure Mode
//!
//! Malformed text yields [`IdentifierError::Malformed`]. Nothing here panics.

use crate::error::IdentifierError;

/// Length of the canonical hyphenated form.
pub const CANONICAL_LEN: usize = 36;

/// Character positions that must hold `-` in the canonical form.
pub const HYPHEN_POSITIONS: [usize; 4] = [8, 13, 18, 23];

/// Largest millisecond value the 48-bit timestamp field can carry.
pub const MAX_TIMESTAMP_MS: u64 = (1 << 48) - 1;

/// Hex-character index of the version nibble in the canonical form.
pub const VERSION_CHAR_INDEX: usize = 14;

/// Hex-character index of the variant nibble in the canonical form.
pub const VARIANT_CHAR_INDEX: usize = 19;

/// The `10` variant bit pattern emitted for every generated identifier.
pub const RFC_VARIANT_BITS: u8 = 0b10;

const HEX_LOWER: &[u8; 16] = b"0123456789abcdef";

/// Parse the canonical 8-4-4-4-12 form (any hex case) into 16 bytes.
///
/// # Errors
///
/// Returns [`IdentifierError::Malformed`] on wrong length, a missing hyphen,
/// or a non-hex character.
pub fn parse(s: &str) -> Result<[u8; 16], IdentifierError> {
    let raw = s.as_bytes();
    if raw.len() != CANONICAL_LEN {
        return Err(IdentifierError::malformed(
            s,
            format!("expected {CANONICAL_LEN} characters, got {}", raw.len()),
        ));
    }

    let mut out = [0u8; 16];
    let mut nibble = 0usize;
    for (pos, &c) in raw.iter().enumerate() {
        if HYPHEN_POSITIONS.contains(&pos) {
            if c != b'-' {
                return Err(IdentifierError::malformed(
                    s,
                    format!("expected '-' at position {pos}"),
                ));
            }
            continue;
        }
        let value = hex_value(c).ok_or_else(|| {
            IdentifierError::malformed(s, format!("non-hex character at position {pos}"))
        })?;
        if nibble % 2 == 0 {
            out[nibble / 2] = value << 4;
        } else {
            out[nibble / 2] |= value;
        }
        nibble += 1;
    }
    Ok(out)
}

/// Render 16 bytes in canonical lowercase hyphenated form.
pub fn format(bytes: &[u8; 16]) -> String {
    let mut out = String::with_capacity(CANONICAL_LEN);
    for (i, byte) in bytes.iter().enumerate() {
        if matches!(i, 4 | 6 | 8 | 10) {
            out.push('-');
        }
        out.push(HEX_LOWER[(byte >> 4) as usize] as char);
        out.push(HEX_LOWER[(byte & 0x0f) as usize] as char);
    }
    out
}

fn hex_value(c: u8) -> Option<u8> {
    match c {
        b'0'..=b'9' => Some(c - b'0'),
        b'a'..=b'f' => Some(c - b'a' + 10),
        b'A'..=b'F' => Some(c - b'A' + 10),
        _ => None,
    }
}

// ─── Timestamp field ─────────────────────────────────────────────────

/// Encode a millisecond count into the 6 big-endian bytes of the timestamp field.
///
/// # Errors
///
/// Values above [`MAX_TIMESTAMP_MS`] are rejected with
/// [`IdentifierError::TimestampOutOfRange`] rather than truncated.
pub fn encode_timestamp_ms(ms: u64) -> Result<[u8; 6], IdentifierError> {
    if ms > MAX_TIMESTAMP_MS {
        return Err(IdentifierError::TimestampOutOfRange(ms));
    }
    let be = ms.to_be_bytes();
    Ok([be[2], be[3], be[4], be[5], be[6], be[7]])
}

/// Decode the 6-byte big-endian timestamp field into milliseconds.
pub fn decode_timestamp_ms(bytes: &[u8; 6]) -> u64 {
    bytes.iter().fold(0u64, |acc, &b| (acc << 8) | u64::from(b))
}

/// The leading 48 bits of an identifier.
pub fn timestamp_field(id: &[u8; 16]) -> [u8; 6] {
    [id[0], id[1], id[2], id[3], id[4], id[5]]
}

// ─── Version and variant ─────────────────────────────────────────────

/// The 4-bit version field (high nibble of byte 6).
pub fn version_nibble(id: &[u8; 16]) -> u8 {
    id[6] >> 4
}

/// The top two bits of byte 8.
pub fn variant_bits(id: &[u8; 16]) -> u8 {
    id[8] >> 6
}

/// The top three bits of byte 8, enough to tell every variant family apart.
pub fn variant_high_bits(id: &[u8; 16]) -> u8 {
    id[8] >> 5
}

/// Overwrite the version nibble, keeping the low nibble of byte 6.
pub fn set_version(id: &mut [u8; 16], version: u8) {
    id[6] = (id[6] & 0x0f) | ((version & 0x0f) << 4);
}

/// Force the variant bits to `10`, keeping the low six bits of byte 8.
pub fn set_rfc_variant(id: &mut [u8; 16]) {
    id[8] = (id[8] & 0x3f) | (RFC_VARIANT_BITS << 6);
}

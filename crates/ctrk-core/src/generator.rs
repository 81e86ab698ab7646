//! # Identifier Generator
//!
//! Produces fresh identifiers of a requested [`Family`] from a random byte
//! source and a clock. All bit placement goes through [`crate::layout`].
//!
//! ## Randomness
//!
//! Production code uses the operating system CSPRNG (`rand::rngs::OsRng`).
//! Any `rand::RngCore` can be supplied instead. A failing source surfaces as
//! [`IdentifierError::RandomSourceExhausted`] and is never retried.
//!
//! ## Ordering precision
//!
//! Time-ordered identifiers minted within the same millisecond share the
//! timestamp field and differ only in their random tail, so they are not
//! guaranteed to sort in generation order. Only the millisecond field is
//! monotonic non-decreasing with the wall clock.

use rand::rngs::OsRng;
use rand::RngCore;

use crate::clock::{Clock, SystemClock};
use crate::error::IdentifierError;
use crate::identifier::{Family, Identifier};
use crate::layout;

/// Identifier factory parameterised over its entropy and time sources.
#[derive(Debug, Clone)]
pub struct IdentifierGenerator<R = OsRng, C = SystemClock> {
    rng: R,
    clock: C,
}

impl IdentifierGenerator {
    /// Generator backed by the OS CSPRNG and the system clock.
    pub fn system() -> Self {
        Self {
            rng: OsRng,
            clock: SystemClock,
        }
    }
}

impl Default for IdentifierGenerator {
    fn default() -> Self {
        Self::system()
    }
}

impl<R: RngCore, C: Clock> IdentifierGenerator<R, C> {
    /// Build a generator from explicit sources.
    pub fn new(rng: R, clock: C) -> Self {
        Self { rng, clock }
    }

    /// Generate an identifier of the requested family.
    ///
    /// # Errors
    ///
    /// Returns [`IdentifierError::RandomSourceExhausted`] if the random source
    /// fails, or a clock error for time-ordered generation.
    pub fn generate(&mut self, family: Family) -> Result<Identifier, IdentifierError> {
        let id = match family {
            Family::Random => self.random()?,
            Family::TimeOrdered => self.time_ordered()?,
        };
        tracing::debug!(family = %family, id = %id, "generated identifier");
        Ok(id)
    }

    /// Version 4: fill all 16 bytes, then stamp version and variant.
    pub fn random(&mut self) -> Result<Identifier, IdentifierError> {
        let mut bytes = [0u8; 16];
        self.fill(&mut bytes)?;
        layout::set_version(&mut bytes, Family::Random.version());
        layout::set_rfc_variant(&mut bytes);
        Ok(Identifier::from_bytes(bytes))
    }

    /// Version 7 at the clock's current millisecond.
    pub fn time_ordered(&mut self) -> Result<Identifier, IdentifierError> {
        let ms = self.clock.now_ms()?;
        self.time_ordered_at(ms)
    }

    /// Version 7 at an explicit millisecond.
    ///
    /// # Errors
    ///
    /// Returns [`IdentifierError::TimestampOutOfRange`] for `ms` above 2^48-1.
    pub fn time_ordered_at(&mut self, ms: u64) -> Result<Identifier, IdentifierError> {
        let timestamp = layout::encode_timestamp_ms(ms)?;
        let mut bytes = [0u8; 16];
        bytes[..6].copy_from_slice(&timestamp);
        // rand_a (12 bits) and rand_b (62 bits) plus the bits overwritten below.
        self.fill(&mut bytes[6..])?;
        layout::set_version(&mut bytes, Family::TimeOrdered.version());
        layout::set_rfc_variant(&mut bytes);
        Ok(Identifier::from_bytes(bytes))
    }

    fn fill(&mut self, buf: &mut [u8]) -> Result<(), IdentifierError> {
        self.rng
            .try_fill_bytes(buf)
            .map_err(|e| IdentifierError::RandomSourceExhausted(e.to_string()))
    }
}

/// Generate one identifier with the system sources.
///
/// # Errors
///
/// See [`IdentifierGenerator::generate`].
pub fn generate(family: Family) -> Result<Identifier, IdentifierError> {
    IdentifierGenerator::system().generate(family)
}

//! # Clock Sources
//!
//! Wall-clock readings in whole milliseconds since the Unix epoch. The
//! generator takes the clock as a type parameter so tests and replay tools can
//! pin time.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use chrono::Utc;

use crate::error::IdentifierError;

/// A source of "now" in milliseconds since the Unix epoch.
pub trait Clock {
    /// Current time, truncated to whole milliseconds.
    ///
    /// # Errors
    ///
    /// Returns [`IdentifierError::ClockBeforeEpoch`] if the reading predates 1970.
    fn now_ms(&self) -> Result<u64, IdentifierError>;
}

/// The system wall clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now_ms(&self) -> Result<u64, IdentifierError> {
        u64::try_from(Utc::now().timestamp_millis()).map_err(|_| IdentifierError::ClockBeforeEpoch)
    }
}

/// A manually driven clock.
#[derive(Debug, Default)]
pub struct FixedClock {
    ms: AtomicU64,
}

impl FixedClock {
    /// Start the clock at `ms`.
    pub fn new(ms: u64) -> Self {
        Self {
            ms: AtomicU64::new(ms),
        }
    }

    /// Move the clock forward by `delta_ms`.
    pub fn advance(&self, delta_ms: u64) {
        self.ms.fetch_add(delta_ms, Ordering::Relaxed);
    }

    /// Jump to an absolute reading.
    pub fn set(&self, ms: u64) {
        self.ms.store(ms, Ordering::Relaxed);
    }
}

impl Clock for FixedClock {
    fn now_ms(&self) -> Result<u64, IdentifierError> {
        Ok(self.ms.load(Ordering::Relaxed))
    }
}

impl<C: Clock + ?Sized> Clock for &C {
    fn now_ms(&self) -> Result<u64, IdentifierError> {
        (**self).now_ms()
    }
}

impl<C: Clock + ?Sized> Clock for Arc<C> {
    fn now_ms(&self) -> Result<u64, IdentifierError> {
        (**self).now_ms()
    }
}

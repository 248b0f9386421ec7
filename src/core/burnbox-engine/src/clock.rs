//! Injected time source.
//!
//! Business logic never reads wall-clock time directly; every operation takes
//! its notion of "now" from the clock it was constructed with, which keeps
//! expiration checks deterministic under test.

use std::time::{SystemTime, UNIX_EPOCH};

/// UTC time source, in unix seconds.
pub trait Clock: Send + Sync {
    /// The current instant.
    fn now(&self) -> u64;
}

/// System wall clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> u64 {
        SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_secs())
            .unwrap_or(0)
    }
}

/// Clock pinned to a fixed instant, for tests.
#[derive(Debug, Clone, Copy)]
pub struct FixedClock(pub u64);

impl Clock for FixedClock {
    fn now(&self) -> u64 {
        self.0
    }
}

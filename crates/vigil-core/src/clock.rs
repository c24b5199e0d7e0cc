//! Time sources

use std::time::Instant;

use chrono::{DateTime, Utc};

/// Source of the current time
///
/// Idle deadlines are measured on the monotonic clock; token expiry claims
/// are wall-clock seconds since the epoch, so both readings are exposed.
pub trait Clock: Send + Sync {
    /// Monotonic instant used for idle deadlines
    fn now(&self) -> Instant;

    /// Wall-clock time used for token expiry checks
    fn wall(&self) -> DateTime<Utc>;
}

/// The operating system clock
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }

    fn wall(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

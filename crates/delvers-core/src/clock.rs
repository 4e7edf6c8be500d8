//! Wall-clock port.
//!
//! The orchestrator stamps elections with the time they open; the session
//! compares that stamp against `now()` when applying the election timeout.
//! Tests swap in a fixed or manually advanced clock.

use chrono::{DateTime, Utc};

/// Source of the current time.
pub trait Clock: Send + Sync {
    /// The current instant in UTC.
    fn now(&self) -> DateTime<Utc>;
}

/// Reads the operating-system clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> DateTime<Utc> {
        Utc::now()
    }
}

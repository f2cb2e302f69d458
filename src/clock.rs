//! Time source used for mirror staleness checks.

use std::time::SystemTime;

/// Provides the current time. Injected so staleness can be tested without
/// sleeping.
pub trait Clock: Send + Sync {
    fn now(&self) -> SystemTime;
}

/// The wall clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> SystemTime {
        SystemTime::now()
    }
}

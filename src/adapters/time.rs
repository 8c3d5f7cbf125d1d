//! Time adapters.
//!
//! Provides monotonic time for the decision components.
//!
//! - [`SystemClock`]: wraps `std::time::Instant`; immune to wall-clock
//!   adjustments.
//! - [`ManualClock`]: simulated time that only moves when told to, for
//!   tests and deterministic replay.  Clones share the same time.

use core::cell::Cell;
use core::time::Duration;
use std::rc::Rc;
use std::time::Instant;

use crate::app::ports::Clock;

/// Monotonic clock anchored at construction.  Copies share the origin.
#[derive(Debug, Clone, Copy)]
pub struct SystemClock {
    start: Instant,
}

impl Default for SystemClock {
    fn default() -> Self {
        Self::new()
    }
}

impl SystemClock {
    pub fn new() -> Self {
        Self {
            start: Instant::now(),
        }
    }

    /// Seconds since start (monotonic).
    pub fn uptime_secs(&self) -> u64 {
        self.start.elapsed().as_secs()
    }
}

impl Clock for SystemClock {
    fn now(&self) -> Duration {
        self.start.elapsed()
    }
}

/// Simulated clock starting at zero.
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    now: Rc<Cell<Duration>>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn advance(&self, by: Duration) {
        self.now.set(self.now.get() + by);
    }

    /// Convenience for tests.  Negative or non-finite input is ignored.
    pub fn advance_secs(&self, secs: f32) {
        if let Ok(by) = Duration::try_from_secs_f32(secs) {
            self.advance(by);
        }
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Duration {
        self.now.get()
    }
}

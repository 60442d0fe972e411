use std::cell::Cell;
use std::rc::Rc;
use std::time::{Duration, Instant};

/// A monotonic time source. Readings are offsets from an arbitrary origin
/// fixed when the clock was created.
pub trait Clock {
    fn now(&self) -> Duration;
}

/// Wall-clock time backed by `Instant`.
#[derive(Debug, Clone, Copy)]
pub struct MonotonicClock {
    origin: Instant,
}

impl MonotonicClock {
    pub fn new() -> Self {
        Self {
            origin: Instant::now(),
        }
    }
}

impl Default for MonotonicClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for MonotonicClock {
    fn now(&self) -> Duration {
        self.origin.elapsed()
    }
}

/// Hand-driven clock for tests and headless runs.
///
/// Clones share the same reading, so a test can keep one handle and give
/// another to the scheduler.
#[derive(Debug, Clone, Default)]
pub struct ManualClock {
    now: Rc<Cell<Duration>>,
}

impl ManualClock {
    pub fn new() -> Self {
        Self::default()
    }

    /// Jump to an absolute reading in seconds.
    pub fn set_secs(&self, secs: f32) {
        self.now.set(Duration::from_secs_f32(secs.max(0.0)));
    }

    pub fn advance_secs(&self, secs: f32) {
        self.now
            .set(self.now.get() + Duration::from_secs_f32(secs.max(0.0)));
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Duration {
        self.now.get()
    }
}

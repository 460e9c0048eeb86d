//! Clock implementations.

use core::cell::Cell;
use core::time::Duration;

use crate::BackendClock;

/// Wall-clock monotonic time, measured from construction.
#[derive(Debug, Clone, Copy)]
pub struct MonotonicClock {
    start: web_time::Instant,
}

impl MonotonicClock {
    #[must_use]
    pub fn new() -> Self {
        Self {
            start: web_time::Instant::now(),
        }
    }
}

impl Default for MonotonicClock {
    fn default() -> Self {
        Self::new()
    }
}

impl BackendClock for MonotonicClock {
    fn now_mono(&self) -> Duration {
        self.start.elapsed()
    }
}

/// Deterministic clock that advances by a fixed step on every read.
///
/// Reads return `0, step, 2 * step, ...`, so timing code under test sees
/// exactly one step between consecutive samples.
#[derive(Debug, Clone)]
pub struct StepClock {
    step: Duration,
    reads: Cell<u32>,
}

impl StepClock {
    #[must_use]
    pub const fn new(step: Duration) -> Self {
        Self {
            step,
            reads: Cell::new(0),
        }
    }
}

impl BackendClock for StepClock {
    fn now_mono(&self) -> Duration {
        let n = self.reads.get();
        self.reads.set(n.saturating_add(1));
        self.step.saturating_mul(n)
    }
}

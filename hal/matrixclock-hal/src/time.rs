//! Monotonic time source
//!
//! The square-wave probe and the long-cycle detector both need a bounded
//! wall-clock measurement that does not depend on the RTC under test.

/// Millisecond monotonic clock
pub trait Monotonic {
    /// Milliseconds since an arbitrary fixed origin (boot)
    fn now_ms(&self) -> u64;
}

/// Fixed-step fake clock for host tests
///
/// Every call to [`Monotonic::now_ms`] advances the reported time by the
/// configured step, so polling loops with a deadline terminate.
pub struct StepClock {
    now: core::cell::Cell<u64>,
    step: u64,
}

impl StepClock {
    pub fn new(step_ms: u64) -> Self {
        Self {
            now: core::cell::Cell::new(0),
            step: step_ms,
        }
    }
}

impl Monotonic for StepClock {
    fn now_ms(&self) -> u64 {
        let t = self.now.get();
        self.now.set(t + self.step);
        t
    }
}

//! Square-wave pin detection and edge latching
//!
//! The RTC board's SQW output can be wired to any of the A0-A4 header
//! pins, so startup scans them for a toggling level instead of requiring
//! configuration. The output is open drain, which is why each candidate
//! gets a pull-up before sampling.

use matrixclock_core::traits::{Edge, EdgeSource};
use matrixclock_hal::{InputPin, Monotonic, Pull};

/// Candidate header pins for the square-wave input
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum PinId {
    A0,
    A1,
    A2,
    A3,
    A4,
}

impl PinId {
    pub fn name(&self) -> &'static str {
        match self {
            Self::A0 => "A0",
            Self::A1 => "A1",
            Self::A2 => "A2",
            Self::A3 => "A3",
            Self::A4 => "A4",
        }
    }
}

/// Scan order; A0 last because it doubles as the board's speaker output
pub const SCAN_ORDER: [PinId; 5] = [PinId::A1, PinId::A2, PinId::A3, PinId::A4, PinId::A0];

/// How long to watch a candidate pin for a level change; the 1 Hz wave
/// changes level every 500 ms, so two seconds is comfortably enough
pub const TOGGLE_WINDOW_MS: u64 = 2000;

/// Access to the five candidate pins by id
pub trait CandidatePins {
    fn pin(&mut self, id: PinId) -> &mut dyn InputPin;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SqwError {
    /// No candidate pin toggled within the detection window
    NotFound,
}

/// Find which candidate pin carries the square wave
pub fn find_square_wave<P, M>(pins: &mut P, clock: &M) -> Result<PinId, SqwError>
where
    P: CandidatePins,
    M: Monotonic,
{
    for id in SCAN_ORDER {
        let pin = pins.pin(id);
        pin.set_pull(Pull::Up);
        if has_square_wave(pin, clock) {
            return Ok(id);
        }
    }
    Err(SqwError::NotFound)
}

fn has_square_wave<M: Monotonic>(pin: &mut dyn InputPin, clock: &M) -> bool {
    let deadline = clock.now_ms() + TOGGLE_WINDOW_MS;
    let level = pin.is_high();
    while clock.now_ms() < deadline {
        if pin.is_high() != level {
            return true;
        }
    }
    false
}

/// Level-change detector over the detected pin
///
/// Each call compares the pin against the last observed level, so every
/// transition is reported exactly once no matter how often the loop polls.
pub struct EdgeLatch<P> {
    pin: P,
    level: bool,
}

impl<P: InputPin> EdgeLatch<P> {
    pub fn new(pin: P) -> Self {
        let level = pin.is_high();
        Self { pin, level }
    }
}

impl<P: InputPin> EdgeSource for EdgeLatch<P> {
    fn take_edge(&mut self) -> Option<Edge> {
        let level = self.pin.is_high();
        if level == self.level {
            return None;
        }
        self.level = level;
        Some(if level { Edge::Rising } else { Edge::Falling })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use core::cell::Cell;
    use matrixclock_hal::time::StepClock;

    /// Pin that toggles every `period` samples (0 = never)
    struct TestPin {
        level: Cell<bool>,
        period: u32,
        samples: Cell<u32>,
        pull: Cell<Option<Pull>>,
    }

    impl TestPin {
        fn steady() -> Self {
            Self {
                level: Cell::new(true),
                period: 0,
                samples: Cell::new(0),
                pull: Cell::new(None),
            }
        }

        fn toggling(period: u32) -> Self {
            Self {
                period,
                ..Self::steady()
            }
        }
    }

    impl InputPin for TestPin {
        fn is_high(&self) -> bool {
            if self.period > 0 {
                let n = self.samples.get() + 1;
                self.samples.set(n);
                if n % self.period == 0 {
                    self.level.set(!self.level.get());
                }
            }
            self.level.get()
        }

        fn set_pull(&mut self, pull: Pull) {
            self.pull.set(Some(pull));
        }
    }

    struct TestPins {
        pins: [TestPin; 5],
    }

    impl TestPins {
        fn with_wave_on(id: PinId) -> Self {
            let mut pins = TestPins {
                pins: [
                    TestPin::steady(),
                    TestPin::steady(),
                    TestPin::steady(),
                    TestPin::steady(),
                    TestPin::steady(),
                ],
            };
            pins.pins[id as usize] = TestPin::toggling(3);
            pins
        }
    }

    impl CandidatePins for TestPins {
        fn pin(&mut self, id: PinId) -> &mut dyn InputPin {
            &mut self.pins[id as usize]
        }
    }

    #[test]
    fn test_finds_wave_on_each_candidate() {
        for id in SCAN_ORDER {
            let mut pins = TestPins::with_wave_on(id);
            let clock = StepClock::new(100);
            assert_eq!(find_square_wave(&mut pins, &clock), Ok(id));
        }
    }

    #[test]
    fn test_candidates_get_pull_ups() {
        let mut pins = TestPins::with_wave_on(PinId::A0);
        let clock = StepClock::new(100);
        find_square_wave(&mut pins, &clock).unwrap();
        for pin in &pins.pins {
            assert_eq!(pin.pull.get(), Some(Pull::Up));
        }
    }

    #[test]
    fn test_scan_reports_missing_wave() {
        let mut pins = TestPins {
            pins: [
                TestPin::steady(),
                TestPin::steady(),
                TestPin::steady(),
                TestPin::steady(),
                TestPin::steady(),
            ],
        };
        let clock = StepClock::new(100);
        assert_eq!(find_square_wave(&mut pins, &clock), Err(SqwError::NotFound));
    }

    #[test]
    fn test_edge_latch_reports_each_transition_once() {
        let latch_pin = TestPin::steady();
        let mut latch = EdgeLatch::new(latch_pin);

        assert_eq!(latch.take_edge(), None);
        latch.pin.level.set(false);
        assert_eq!(latch.take_edge(), Some(Edge::Falling));
        assert_eq!(latch.take_edge(), None);
        latch.pin.level.set(true);
        assert_eq!(latch.take_edge(), Some(Edge::Rising));
        assert_eq!(latch.take_edge(), None);
    }
}

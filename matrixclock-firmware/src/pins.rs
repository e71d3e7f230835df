//! Header pin plumbing for the square-wave scan
//!
//! The scan needs to reconfigure pull resistors at runtime, so the five
//! candidate pins are held as [`Flex`] and adapted to the HAL input trait.

use embassy_rp::gpio::{Flex, Pull as RpPull};
use matrixclock_drivers::{CandidatePins, PinId};
use matrixclock_hal::{InputPin, Pull};

/// A [`Flex`] pin as a HAL input
pub struct FlexInput {
    pin: Flex<'static>,
}

impl FlexInput {
    pub fn new(mut pin: Flex<'static>) -> Self {
        pin.set_as_input();
        Self { pin }
    }
}

impl InputPin for FlexInput {
    fn is_high(&self) -> bool {
        self.pin.is_high()
    }

    fn set_pull(&mut self, pull: Pull) {
        self.pin.set_pull(match pull {
            Pull::None => RpPull::None,
            Pull::Up => RpPull::Up,
            Pull::Down => RpPull::Down,
        });
    }
}

/// The A0-A4 header pins, addressable by candidate id
pub struct HeaderPins {
    pins: [FlexInput; 5],
}

impl HeaderPins {
    /// Order: A0, A1, A2, A3, A4
    pub fn new(pins: [FlexInput; 5]) -> Self {
        Self { pins }
    }

    /// Give up the winning pin for the edge latch
    pub fn into_pin(self, id: PinId) -> FlexInput {
        let [a0, a1, a2, a3, a4] = self.pins;
        match id {
            PinId::A0 => a0,
            PinId::A1 => a1,
            PinId::A2 => a2,
            PinId::A3 => a3,
            PinId::A4 => a4,
        }
    }
}

impl CandidatePins for HeaderPins {
    fn pin(&mut self, id: PinId) -> &mut dyn InputPin {
        &mut self.pins[id as usize]
    }
}

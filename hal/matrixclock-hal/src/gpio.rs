//! GPIO pin abstractions
//!
//! Provides the digital input trait the square-wave scan and the
//! write-protect button are read through.

/// Input pull configuration
///
/// The RTC square-wave output is open drain, so the probing code asks for
/// an internal pull-up on each candidate pin.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Pull {
    None,
    Up,
    Down,
}

/// Digital input pin
///
/// Implementations should handle the actual hardware register reading
/// for the specific chip.
pub trait InputPin {
    /// Check if the pin reads high (logic 1)
    fn is_high(&self) -> bool;

    /// Check if the pin reads low (logic 0)
    fn is_low(&self) -> bool {
        !self.is_high()
    }

    /// Reconfigure the pin's pull resistor
    fn set_pull(&mut self, pull: Pull);
}

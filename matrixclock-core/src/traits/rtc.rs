//! The authoritative time source.

use crate::datetime::DateTime;

/// Read and adjust the hardware clock
///
/// Implemented by the RTC adapter in the drivers crate over whichever chip
/// the startup probe identified.
pub trait TimeSource {
    type Error;

    /// Current chip time
    fn now(&mut self) -> Result<DateTime, Self::Error>;

    /// Current chip time, sampled immediately after a seconds rollover
    ///
    /// Used when the read seeds a counter that must not be half a second
    /// stale on average.
    fn now_at_second_boundary(&mut self) -> Result<DateTime, Self::Error>;

    /// Set the chip to a new date and time
    fn set(&mut self, dt: &DateTime) -> Result<(), Self::Error>;

    /// Shift the chip time by a signed number of seconds, returning the
    /// resulting time
    fn adjust(&mut self, delta_secs: i32) -> Result<DateTime, Self::Error>;

    /// Round the chip time to the nearest whole minute (over 30 seconds
    /// rounds up), returning the resulting time
    fn round_to_nearest_minute(&mut self) -> Result<DateTime, Self::Error>;

    /// Zero the seconds onto the next minute boundary, returning the
    /// resulting time
    fn sync_to_next_minute(&mut self) -> Result<DateTime, Self::Error>;

    /// Stop the square-wave output (used on restart/shutdown)
    fn disable_square_wave(&mut self) -> Result<(), Self::Error>;
}

//! [`TimeSource`] adapter over the identified chip
//!
//! The chip drivers expose raw register operations; this adapter adds the
//! timing discipline the clock needs:
//!
//! - Small relative adjustments are written immediately after a seconds
//!   rollover. Writing the time registers resets the chip's countdown
//!   chain, so a write at a random moment loses half a second on average.
//! - Absolute sets and minute rounding stop the oscillator first so the
//!   divider chain restarts on a whole second. The DS chips do this on
//!   their own when the time is written, the PCF8523 does not.

use matrixclock_core::datetime::DateTime;
use matrixclock_core::traits::TimeSource;
use matrixclock_hal::I2cBus;

use super::identify::ChipKind;
use super::{RtcChip, RtcError};

pub struct RtcAdapter<B> {
    chip: RtcChip<B>,
}

impl<B: I2cBus> RtcAdapter<B> {
    pub fn new(chip: RtcChip<B>) -> Self {
        Self { chip }
    }

    pub fn kind(&self) -> ChipKind {
        self.chip.kind()
    }

    /// Make sure the oscillator runs and the pin carries the 1 Hz wave
    pub fn start(&mut self) -> Result<bool, RtcError<B::Error>> {
        let was_stopped = self.chip.oscillator_stopped()?;
        if was_stopped {
            self.chip.set_oscillator_stopped(false)?;
        }
        self.chip.enable_square_wave_1hz()?;
        Ok(was_stopped)
    }

    pub fn lost_power(&mut self) -> Result<bool, RtcError<B::Error>> {
        self.chip.lost_power()
    }

    fn write_boundary_aligned(&mut self, dt: &DateTime) -> Result<(), RtcError<B::Error>> {
        self.chip.set_oscillator_stopped(true)?;
        self.chip.set_datetime(dt)
    }
}

impl<B: I2cBus> TimeSource for RtcAdapter<B> {
    type Error = RtcError<B::Error>;

    fn now(&mut self) -> Result<DateTime, Self::Error> {
        self.chip.datetime()
    }

    fn now_at_second_boundary(&mut self) -> Result<DateTime, Self::Error> {
        let first = self.chip.datetime()?;
        loop {
            let dt = self.chip.datetime()?;
            if dt.second != first.second {
                return Ok(dt);
            }
        }
    }

    fn set(&mut self, dt: &DateTime) -> Result<(), Self::Error> {
        self.write_boundary_aligned(dt)
    }

    fn adjust(&mut self, delta_secs: i32) -> Result<DateTime, Self::Error> {
        let dt = self.now_at_second_boundary()?;
        let secs = (dt.to_secs() as i64 + delta_secs as i64).clamp(0, u32::MAX as i64);
        let dt = DateTime::from_secs(secs as u32);
        self.chip.set_datetime(&dt)?;
        Ok(dt)
    }

    fn round_to_nearest_minute(&mut self) -> Result<DateTime, Self::Error> {
        let dt = self.chip.datetime()?;
        let mut secs = dt.to_secs() - dt.second as u32;
        if dt.second > 30 {
            secs += 60;
        }
        let dt = DateTime::from_secs(secs);
        self.write_boundary_aligned(&dt)?;
        Ok(dt)
    }

    fn sync_to_next_minute(&mut self) -> Result<DateTime, Self::Error> {
        let dt = self.chip.datetime()?;
        let mut secs = dt.to_secs();
        if dt.second != 0 {
            secs += 60 - dt.second as u32;
        }
        let dt = DateTime::from_secs(secs);
        self.write_boundary_aligned(&dt)?;
        Ok(dt)
    }

    fn disable_square_wave(&mut self) -> Result<(), Self::Error> {
        self.chip.disable_square_wave()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rtc::testbus::FakeBus;

    fn adapter_at(dt: DateTime) -> RtcAdapter<FakeBus> {
        let mut chip = RtcChip::probe(FakeBus::ds3231()).unwrap();
        chip.set_datetime(&dt).unwrap();
        RtcAdapter::new(chip)
    }

    fn dt(text: &str) -> DateTime {
        DateTime::parse(text).unwrap()
    }

    #[test]
    fn test_boundary_read_waits_for_rollover() {
        let mut rtc = adapter_at(dt("4/20/2021 8:04:30"));
        match &mut rtc.chip {
            RtcChip::Ds3231(chip) => chip.bus_mut().reads_until_tick = Some(3),
            _ => unreachable!(),
        }
        let read = rtc.now_at_second_boundary().unwrap();
        assert_eq!(read, dt("4/20/2021 8:04:31"));
    }

    #[test]
    fn test_adjust_shifts_by_signed_seconds() {
        let mut rtc = adapter_at(dt("4/20/2021 8:04:30"));
        match &mut rtc.chip {
            RtcChip::Ds3231(chip) => chip.bus_mut().reads_until_tick = Some(1),
            _ => unreachable!(),
        }
        // Boundary read lands on :31, then the hour is subtracted
        let new = rtc.adjust(-3600).unwrap();
        assert_eq!(new, dt("4/20/2021 7:04:31"));
        assert_eq!(rtc.now().unwrap(), new);
    }

    #[test]
    fn test_nearest_rounds_down_at_thirty() {
        let mut rtc = adapter_at(dt("4/20/2021 8:04:30"));
        assert_eq!(
            rtc.round_to_nearest_minute().unwrap(),
            dt("4/20/2021 8:04:00")
        );
    }

    #[test]
    fn test_nearest_rounds_up_past_thirty() {
        let mut rtc = adapter_at(dt("4/20/2021 8:04:31"));
        assert_eq!(
            rtc.round_to_nearest_minute().unwrap(),
            dt("4/20/2021 8:05:00")
        );
    }

    #[test]
    fn test_sync_lands_on_next_minute() {
        let mut rtc = adapter_at(dt("4/20/2021 8:04:05"));
        assert_eq!(rtc.sync_to_next_minute().unwrap(), dt("4/20/2021 8:05:00"));

        let mut rtc = adapter_at(dt("4/20/2021 9:00:00"));
        assert_eq!(rtc.sync_to_next_minute().unwrap(), dt("4/20/2021 9:00:00"));
    }

    #[test]
    fn test_start_reports_stopped_oscillator() {
        let dt0 = dt("4/20/2021 8:04:30");
        let mut rtc = adapter_at(dt0);
        match &mut rtc.chip {
            RtcChip::Ds3231(chip) => chip.set_oscillator_stopped(true).unwrap(),
            _ => unreachable!(),
        }
        assert!(rtc.start().unwrap());
        // Second call finds it already running
        assert!(!rtc.start().unwrap());
    }
}

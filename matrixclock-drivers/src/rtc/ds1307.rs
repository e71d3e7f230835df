//! DS1307 RTC driver
//!
//! The oldest of the supported chips. The clock-halt bit lives in bit 7
//! of the seconds register, and the square wave is controlled from the
//! register right after the time block (SQWE enables the output, RS 00
//! selects 1 Hz).

use matrixclock_core::datetime::DateTime;
use matrixclock_hal::I2cBus;

use super::{bcd_to_bin, bin_to_bcd, RtcError, I2C_ADDR};

/// DS1307 register addresses
pub mod reg {
    /// Seconds in BCD, clock-halt flag in bit 7
    pub const SECONDS: u8 = 0x00;
    /// OUT (bit 7), SQWE (bit 4), RS1:RS0 (bits 1:0)
    pub const CONTROL: u8 = 0x07;
}

const CH: u8 = 1 << 7;
const SQWE: u8 = 1 << 4;

pub struct Ds1307<B> {
    bus: B,
}

impl<B: I2cBus> Ds1307<B> {
    pub fn new(bus: B) -> Self {
        Self { bus }
    }

    fn read_reg(&mut self, reg: u8) -> Result<u8, RtcError<B::Error>> {
        let mut buf = [0u8; 1];
        self.bus
            .write_read(I2C_ADDR, &[reg], &mut buf)
            .map_err(RtcError::Bus)?;
        Ok(buf[0])
    }

    fn write_reg(&mut self, reg: u8, value: u8) -> Result<(), RtcError<B::Error>> {
        self.bus
            .write(I2C_ADDR, &[reg, value])
            .map_err(RtcError::Bus)
    }

    pub fn datetime(&mut self) -> Result<DateTime, RtcError<B::Error>> {
        let mut regs = [0u8; 7];
        self.bus
            .write_read(I2C_ADDR, &[reg::SECONDS], &mut regs)
            .map_err(RtcError::Bus)?;
        DateTime {
            second: bcd_to_bin(regs[0] & 0x7F),
            minute: bcd_to_bin(regs[1] & 0x7F),
            hour: bcd_to_bin(regs[2] & 0x3F),
            day: bcd_to_bin(regs[4] & 0x3F),
            month: bcd_to_bin(regs[5] & 0x1F),
            year: 2000 + bcd_to_bin(regs[6]) as u16,
        }
        .validated()
        .map_err(|_| RtcError::InvalidTime)
    }

    /// Writing the seconds register with CH clear also starts the clock
    pub fn set_datetime(&mut self, dt: &DateTime) -> Result<(), RtcError<B::Error>> {
        let buf = [
            reg::SECONDS,
            bin_to_bcd(dt.second),
            bin_to_bcd(dt.minute),
            bin_to_bcd(dt.hour),
            dt.weekday_index() as u8 + 1,
            bin_to_bcd(dt.day),
            bin_to_bcd(dt.month),
            bin_to_bcd((dt.year - 2000) as u8),
        ];
        self.bus.write(I2C_ADDR, &buf).map_err(RtcError::Bus)
    }

    pub fn oscillator_stopped(&mut self) -> Result<bool, RtcError<B::Error>> {
        Ok(self.read_reg(reg::SECONDS)? & CH != 0)
    }

    pub fn set_oscillator_stopped(&mut self, stopped: bool) -> Result<(), RtcError<B::Error>> {
        let seconds = self.read_reg(reg::SECONDS)?;
        let seconds = if stopped { seconds | CH } else { seconds & !CH };
        self.write_reg(reg::SECONDS, seconds)
    }

    pub fn enable_square_wave_1hz(&mut self) -> Result<(), RtcError<B::Error>> {
        self.write_reg(reg::CONTROL, SQWE)
    }

    pub fn disable_square_wave(&mut self) -> Result<(), RtcError<B::Error>> {
        self.write_reg(reg::CONTROL, 0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rtc::testbus::FakeBus;

    fn chip() -> Ds1307<FakeBus> {
        Ds1307::new(FakeBus::ds1307())
    }

    #[test]
    fn test_datetime_round_trip() {
        let mut chip = chip();
        let dt = DateTime {
            year: 2026,
            month: 8,
            day: 30,
            hour: 23,
            minute: 15,
            second: 7,
        };
        chip.set_datetime(&dt).unwrap();
        assert_eq!(chip.datetime().unwrap(), dt);
    }

    #[test]
    fn test_weekday_register_is_one_based() {
        let mut chip = chip();
        chip.set_datetime(&DateTime {
            year: 2026,
            month: 8,
            day: 31, // a Monday
            hour: 0,
            minute: 0,
            second: 0,
        })
        .unwrap();
        assert_eq!(chip.bus.regs[0x03], 2);
    }

    #[test]
    fn test_set_clears_clock_halt() {
        let mut chip = chip();
        chip.bus.regs[0x00] = CH | 0x30;
        assert!(chip.oscillator_stopped().unwrap());
        chip.set_datetime(&DateTime {
            year: 2021,
            month: 1,
            day: 1,
            hour: 0,
            minute: 0,
            second: 0,
        })
        .unwrap();
        assert!(!chip.oscillator_stopped().unwrap());
    }

    #[test]
    fn test_square_wave_control() {
        let mut chip = chip();
        chip.enable_square_wave_1hz().unwrap();
        assert_eq!(chip.bus.regs[reg::CONTROL as usize], 0x10);
        chip.disable_square_wave().unwrap();
        assert_eq!(chip.bus.regs[reg::CONTROL as usize], 0x00);
    }

    #[test]
    fn test_halt_bit_does_not_corrupt_seconds() {
        let mut chip = chip();
        chip.bus.regs[0x00] = 0x42;
        chip.set_oscillator_stopped(true).unwrap();
        chip.set_oscillator_stopped(false).unwrap();
        assert_eq!(chip.bus.regs[0x00], 0x42);
    }
}

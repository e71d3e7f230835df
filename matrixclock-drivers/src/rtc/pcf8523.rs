//! PCF8523 RTC driver
//!
//! NXP chip with a different register layout from the Dallas parts: the
//! time block starts at 0x03 and stores the day before the weekday. The
//! square wave comes out of the CLKOUT pin, picked by the COF bits of the
//! CLKOUT control register.
//!
//! Unlike the DS chips, writing the time does not restart the divider
//! chain on its own; the oscillator STOP bit must be set first so the
//! first tick after the write is a full second.

use matrixclock_core::datetime::DateTime;
use matrixclock_hal::I2cBus;

use super::{bcd_to_bin, bin_to_bcd, RtcError, I2C_ADDR};

/// PCF8523 register addresses
pub mod reg {
    /// STOP flag in bit 5
    pub const CONTROL_1: u8 = 0x00;
    /// Battery switchover PM bits in bits 7:5
    pub const CONTROL_3: u8 = 0x02;
    /// Seconds in BCD, oscillator-stop OS flag in bit 7
    pub const SECONDS: u8 = 0x03;
    /// COF clockout frequency selection in bits 5:3
    pub const TMR_CLKOUT_CTRL: u8 = 0x0F;
}

const STOP: u8 = 1 << 5;
const OS: u8 = 1 << 7;
const COF_MASK: u8 = 0b111 << 3;
/// COF code for a 1 Hz clockout
const COF_1HZ: u8 = 0b110 << 3;
/// COF code disabling the clockout (pin high-Z)
const COF_OFF: u8 = 0b111 << 3;
/// Standard battery switchover with low-battery detection
const PM_STANDARD: u8 = 0b000;

pub struct Pcf8523<B> {
    bus: B,
}

impl<B: I2cBus> Pcf8523<B> {
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
            day: bcd_to_bin(regs[3] & 0x3F),
            month: bcd_to_bin(regs[5] & 0x1F),
            year: 2000 + bcd_to_bin(regs[6]) as u16,
        }
        .validated()
        .map_err(|_| RtcError::InvalidTime)
    }

    /// Write a new time, enable battery switchover and restart the
    /// oscillator; writing the seconds clears the OS flag as well
    pub fn set_datetime(&mut self, dt: &DateTime) -> Result<(), RtcError<B::Error>> {
        let control3 = self.read_reg(reg::CONTROL_3)?;
        self.write_reg(reg::CONTROL_3, (control3 & 0x1F) | (PM_STANDARD << 5))?;
        let buf = [
            reg::SECONDS,
            bin_to_bcd(dt.second),
            bin_to_bcd(dt.minute),
            bin_to_bcd(dt.hour),
            bin_to_bcd(dt.day),
            dt.weekday_index() as u8,
            bin_to_bcd(dt.month),
            bin_to_bcd((dt.year - 2000) as u8),
        ];
        self.bus.write(I2C_ADDR, &buf).map_err(RtcError::Bus)?;
        self.set_oscillator_stopped(false)
    }

    pub fn oscillator_stopped(&mut self) -> Result<bool, RtcError<B::Error>> {
        Ok(self.read_reg(reg::CONTROL_1)? & STOP != 0)
    }

    pub fn set_oscillator_stopped(&mut self, stopped: bool) -> Result<(), RtcError<B::Error>> {
        let control = self.read_reg(reg::CONTROL_1)?;
        let control = if stopped { control | STOP } else { control & !STOP };
        self.write_reg(reg::CONTROL_1, control)
    }

    pub fn enable_square_wave_1hz(&mut self) -> Result<(), RtcError<B::Error>> {
        let ctrl = self.read_reg(reg::TMR_CLKOUT_CTRL)?;
        self.write_reg(reg::TMR_CLKOUT_CTRL, (ctrl & !COF_MASK) | COF_1HZ)
    }

    pub fn disable_square_wave(&mut self) -> Result<(), RtcError<B::Error>> {
        let ctrl = self.read_reg(reg::TMR_CLKOUT_CTRL)?;
        self.write_reg(reg::TMR_CLKOUT_CTRL, ctrl | COF_OFF)
    }

    pub fn lost_power(&mut self) -> Result<bool, RtcError<B::Error>> {
        Ok(self.read_reg(reg::SECONDS)? & OS != 0)
    }
}

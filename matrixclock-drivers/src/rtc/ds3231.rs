//! DS3231 RTC driver
//!
//! Temperature-compensated chip with the time in BCD registers 0x00-0x06.
//! The square-wave output is controlled from the control register: INTCN
//! low routes the oscillator output to the pin, and the RS bits pick the
//! frequency (00 selects 1 Hz).

use matrixclock_core::datetime::DateTime;
use matrixclock_hal::I2cBus;

use super::{bcd_to_bin, bin_to_bcd, RtcError, I2C_ADDR};

/// DS3231 register addresses
pub mod reg {
    pub const SECONDS: u8 = 0x00;
    /// Month in BCD, century flag in bit 7
    pub const MONTH: u8 = 0x05;
    /// EOSC (bit 7), RS2:RS1 (bits 4:3), INTCN (bit 2)
    pub const CONTROL: u8 = 0x0E;
    /// OSF oscillator-stop flag in bit 7
    pub const STATUS: u8 = 0x0F;
}

const EOSC: u8 = 1 << 7;
const INTCN: u8 = 1 << 2;
const RS_MASK: u8 = 0b11 << 3;
const OSF: u8 = 1 << 7;

pub struct Ds3231<B> {
    bus: B,
}

impl<B: I2cBus> Ds3231<B> {
    pub fn new(bus: B) -> Self {
        Self { bus }
    }

    #[cfg(test)]
    pub(crate) fn bus_mut(&mut self) -> &mut B {
        &mut self.bus
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

    /// Writing the time restarts the seconds chain on a whole second, so
    /// the caller controls exactly when the next tick lands
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
        self.bus.write(I2C_ADDR, &buf).map_err(RtcError::Bus)?;
        self.set_oscillator_stopped(false)?;
        // A fresh time is trustworthy again
        let status = self.read_reg(reg::STATUS)?;
        self.write_reg(reg::STATUS, status & !OSF)
    }

    pub fn oscillator_stopped(&mut self) -> Result<bool, RtcError<B::Error>> {
        Ok(self.read_reg(reg::CONTROL)? & EOSC != 0)
    }

    pub fn set_oscillator_stopped(&mut self, stopped: bool) -> Result<(), RtcError<B::Error>> {
        let control = self.read_reg(reg::CONTROL)?;
        let control = if stopped { control | EOSC } else { control & !EOSC };
        self.write_reg(reg::CONTROL, control)
    }

    pub fn enable_square_wave_1hz(&mut self) -> Result<(), RtcError<B::Error>> {
        let control = self.read_reg(reg::CONTROL)?;
        self.write_reg(reg::CONTROL, control & !(INTCN | RS_MASK))
    }

    pub fn disable_square_wave(&mut self) -> Result<(), RtcError<B::Error>> {
        let control = self.read_reg(reg::CONTROL)?;
        self.write_reg(reg::CONTROL, control | INTCN)
    }

    pub fn lost_power(&mut self) -> Result<bool, RtcError<B::Error>> {
        Ok(self.read_reg(reg::STATUS)? & OSF != 0)
    }
}

//! Chip identity probe
//!
//! All three supported chips answer at 0x68, so the chip is identified by
//! which register bits actually hold a written value:
//!
//! - Register 0x05 bit 7 is the century flag on the DS3231 and
//!   unimplemented on the other two
//! - Register 0x10 bit 7 is user RAM on the DS1307 and unimplemented on
//!   the PCF8523
//! - Register 0x12 bit 0 is TimerB frequency control on the PCF8523
//!
//! Every tested bit is restored to its original value, so probing a
//! running clock does not disturb it.

use matrixclock_hal::I2cBus;

use super::I2C_ADDR;

/// Which RTC chip the probe found
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ChipKind {
    Ds3231,
    Ds1307,
    Pcf8523,
}

impl ChipKind {
    pub fn name(&self) -> &'static str {
        match self {
            Self::Ds3231 => "DS3231",
            Self::Ds1307 => "DS1307",
            Self::Pcf8523 => "PCF8523",
        }
    }
}

/// Probe failures
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ProbeError<E> {
    /// The I2C transaction failed (typically: nothing at 0x68)
    Bus(E),
    /// A device answered but matched none of the known registers
    NoChip,
}

fn read_reg<B: I2cBus>(bus: &mut B, reg: u8) -> Result<u8, B::Error> {
    let mut buf = [0u8; 1];
    bus.write_read(I2C_ADDR, &[reg], &mut buf)?;
    Ok(buf[0])
}

fn write_reg<B: I2cBus>(bus: &mut B, reg: u8, value: u8) -> Result<(), B::Error> {
    bus.write(I2C_ADDR, &[reg, value])
}

/// Set the masked bit and see whether it reads back, then restore
fn bit_sticks<B: I2cBus>(bus: &mut B, reg: u8, mask: u8) -> Result<bool, B::Error> {
    let original = read_reg(bus, reg)?;
    write_reg(bus, reg, original | mask)?;
    let stuck = read_reg(bus, reg)? & mask != 0;
    write_reg(bus, reg, original)?;
    Ok(stuck)
}

/// Flip the masked bit and see whether the new value reads back, then
/// restore; works whichever way the bit currently leans
fn bit_toggles<B: I2cBus>(bus: &mut B, reg: u8, mask: u8) -> Result<bool, B::Error> {
    let original = read_reg(bus, reg)?;
    write_reg(bus, reg, original ^ mask)?;
    let toggled = (read_reg(bus, reg)? ^ original) & mask != 0;
    write_reg(bus, reg, original)?;
    Ok(toggled)
}

/// Identify the RTC chip at address 0x68
pub fn identify<B: I2cBus>(bus: &mut B) -> Result<ChipKind, ProbeError<B::Error>> {
    if bit_sticks(bus, 0x05, 0x80).map_err(ProbeError::Bus)? {
        return Ok(ChipKind::Ds3231);
    }
    if bit_sticks(bus, 0x10, 0x80).map_err(ProbeError::Bus)? {
        return Ok(ChipKind::Ds1307);
    }
    if bit_toggles(bus, 0x12, 0x01).map_err(ProbeError::Bus)? {
        return Ok(ChipKind::Pcf8523);
    }
    Err(ProbeError::NoChip)
}

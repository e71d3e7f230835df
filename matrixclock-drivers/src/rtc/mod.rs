//! RTC chip drivers
//!
//! All three supported chips sit at I2C address 0x68 and keep their time
//! in BCD registers, but differ in register layout, square-wave control
//! and oscillator handling. Each driver owns the bus and exposes the same
//! small operation set; [`RtcChip`] dispatches over whichever one the
//! probe identified.

pub mod adapter;
pub mod ds1307;
pub mod ds3231;
pub mod identify;
pub mod pcf8523;

use matrixclock_core::datetime::DateTime;
use matrixclock_hal::I2cBus;

use ds1307::Ds1307;
use ds3231::Ds3231;
use identify::{identify, ChipKind, ProbeError};
use pcf8523::Pcf8523;

/// The one I2C address all supported chips answer on
pub const I2C_ADDR: u8 = 0x68;

/// Errors from RTC register access
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum RtcError<E> {
    /// The I2C transaction failed
    Bus(E),
    /// Register contents do not decode to a valid date and time
    InvalidTime,
}

pub(crate) fn bcd_to_bin(value: u8) -> u8 {
    (value >> 4) * 10 + (value & 0x0F)
}

pub(crate) fn bin_to_bcd(value: u8) -> u8 {
    ((value / 10) << 4) | (value % 10)
}

/// The identified chip, driving dispatch for every clock operation
pub enum RtcChip<B> {
    Ds3231(Ds3231<B>),
    Ds1307(Ds1307<B>),
    Pcf8523(Pcf8523<B>),
}

impl<B: I2cBus> RtcChip<B> {
    /// Probe the device at 0x68 and wrap the matching driver
    pub fn probe(mut bus: B) -> Result<Self, ProbeError<B::Error>> {
        match identify(&mut bus)? {
            ChipKind::Ds3231 => Ok(Self::Ds3231(Ds3231::new(bus))),
            ChipKind::Ds1307 => Ok(Self::Ds1307(Ds1307::new(bus))),
            ChipKind::Pcf8523 => Ok(Self::Pcf8523(Pcf8523::new(bus))),
        }
    }

    pub fn kind(&self) -> ChipKind {
        match self {
            Self::Ds3231(_) => ChipKind::Ds3231,
            Self::Ds1307(_) => ChipKind::Ds1307,
            Self::Pcf8523(_) => ChipKind::Pcf8523,
        }
    }

    pub fn datetime(&mut self) -> Result<DateTime, RtcError<B::Error>> {
        match self {
            Self::Ds3231(chip) => chip.datetime(),
            Self::Ds1307(chip) => chip.datetime(),
            Self::Pcf8523(chip) => chip.datetime(),
        }
    }

    /// Write a new date and time; the chip's seconds chain restarts on a
    /// whole second and the oscillator is left running
    pub fn set_datetime(&mut self, dt: &DateTime) -> Result<(), RtcError<B::Error>> {
        match self {
            Self::Ds3231(chip) => chip.set_datetime(dt),
            Self::Ds1307(chip) => chip.set_datetime(dt),
            Self::Pcf8523(chip) => chip.set_datetime(dt),
        }
    }

    pub fn oscillator_stopped(&mut self) -> Result<bool, RtcError<B::Error>> {
        match self {
            Self::Ds3231(chip) => chip.oscillator_stopped(),
            Self::Ds1307(chip) => chip.oscillator_stopped(),
            Self::Pcf8523(chip) => chip.oscillator_stopped(),
        }
    }

    pub fn set_oscillator_stopped(&mut self, stopped: bool) -> Result<(), RtcError<B::Error>> {
        match self {
            Self::Ds3231(chip) => chip.set_oscillator_stopped(stopped),
            Self::Ds1307(chip) => chip.set_oscillator_stopped(stopped),
            Self::Pcf8523(chip) => chip.set_oscillator_stopped(stopped),
        }
    }

    /// Route the 1 Hz square wave to the chip's output pin
    pub fn enable_square_wave_1hz(&mut self) -> Result<(), RtcError<B::Error>> {
        match self {
            Self::Ds3231(chip) => chip.enable_square_wave_1hz(),
            Self::Ds1307(chip) => chip.enable_square_wave_1hz(),
            Self::Pcf8523(chip) => chip.enable_square_wave_1hz(),
        }
    }

    pub fn disable_square_wave(&mut self) -> Result<(), RtcError<B::Error>> {
        match self {
            Self::Ds3231(chip) => chip.disable_square_wave(),
            Self::Ds1307(chip) => chip.disable_square_wave(),
            Self::Pcf8523(chip) => chip.disable_square_wave(),
        }
    }

    /// True when the chip reports its time is no longer trustworthy
    pub fn lost_power(&mut self) -> Result<bool, RtcError<B::Error>> {
        match self {
            Self::Ds3231(chip) => chip.lost_power(),
            Self::Ds1307(chip) => chip.oscillator_stopped(),
            Self::Pcf8523(chip) => chip.lost_power(),
        }
    }
}

#[cfg(test)]
pub(crate) mod testbus {
    use super::I2C_ADDR;
    use matrixclock_hal::I2cBus;

    /// Register-level I2C fake for one device at 0x68
    ///
    /// Each register carries a writable-bits mask, so unimplemented bits
    /// read back as zero the way they do on the real chips. That is what
    /// the identity probe keys on.
    pub struct FakeBus {
        pub regs: [u8; 0x40],
        pub writable: [u8; 0x40],
        /// Register holding the (BCD) seconds, for tick simulation
        pub seconds_reg: usize,
        /// Bump the seconds after this many reads of the time registers
        pub reads_until_tick: Option<u8>,
    }

    impl FakeBus {
        fn blank(seconds_reg: usize) -> Self {
            Self {
                regs: [0; 0x40],
                writable: [0; 0x40],
                seconds_reg,
                reads_until_tick: None,
            }
        }

        /// Writable-bit layout of a DS3231 (registers 0x00-0x12)
        pub fn ds3231() -> Self {
            let mut bus = Self::blank(0x00);
            bus.writable[0x00] = 0x7F; // seconds
            bus.writable[0x01] = 0x7F; // minutes
            bus.writable[0x02] = 0x7F; // hours
            bus.writable[0x03] = 0x07; // weekday
            bus.writable[0x04] = 0x3F; // day
            bus.writable[0x05] = 0x9F; // month, century bit implemented
            bus.writable[0x06] = 0xFF; // year
            bus.writable[0x0E] = 0xFF; // control
            bus.writable[0x0F] = 0xFF; // status
            bus.writable[0x10] = 0xFF; // aging offset
            bus
        }

        /// Writable-bit layout of a DS1307 (time regs plus 56 bytes RAM)
        pub fn ds1307() -> Self {
            let mut bus = Self::blank(0x00);
            bus.writable[0x00] = 0xFF; // seconds, CH in bit 7
            bus.writable[0x01] = 0x7F;
            bus.writable[0x02] = 0x7F;
            bus.writable[0x03] = 0x07;
            bus.writable[0x04] = 0x3F;
            bus.writable[0x05] = 0x1F; // month, bit 7 unimplemented
            bus.writable[0x06] = 0xFF;
            bus.writable[0x07] = 0x93; // control: OUT, SQWE, RS1:0
            for reg in 0x08..0x40 {
                bus.writable[reg] = 0xFF; // user RAM
            }
            bus
        }

        /// Writable-bit layout of a PCF8523
        pub fn pcf8523() -> Self {
            let mut bus = Self::blank(0x03);
            bus.writable[0x00] = 0xFF; // control 1
            bus.writable[0x01] = 0xFF; // control 2
            bus.writable[0x02] = 0xE7; // control 3
            bus.writable[0x03] = 0xFF; // seconds, OS in bit 7
            bus.writable[0x04] = 0x7F;
            bus.writable[0x05] = 0x3F; // hours, bit 7 unimplemented
            bus.writable[0x06] = 0x3F; // day
            bus.writable[0x07] = 0x07; // weekday
            bus.writable[0x08] = 0x1F; // month
            bus.writable[0x09] = 0xFF; // year
            bus.writable[0x0F] = 0xFF; // Tmr_CLKOUT control
            bus.writable[0x10] = 0x07; // Tmr_A frequency, bit 7 unimplemented
            bus.writable[0x12] = 0x07; // Tmr_B frequency
            bus
        }

        /// A device that answers but holds no writable bits at all
        pub fn unidentifiable() -> Self {
            Self::blank(0x00)
        }

        fn maybe_tick(&mut self, start: usize) {
            if start != self.seconds_reg {
                return;
            }
            self.reads_until_tick = match self.reads_until_tick {
                Some(0) => {
                    let sec = super::bcd_to_bin(self.regs[self.seconds_reg] & 0x7F);
                    self.regs[self.seconds_reg] = super::bin_to_bcd((sec + 1) % 60);
                    None
                }
                Some(n) => Some(n - 1),
                None => None,
            };
        }
    }

    impl I2cBus for FakeBus {
        type Error = ();

        fn write(&mut self, address: u8, data: &[u8]) -> Result<(), ()> {
            assert_eq!(address, I2C_ADDR);
            let start = data[0] as usize;
            for (i, &byte) in data[1..].iter().enumerate() {
                let reg = start + i;
                self.regs[reg] = byte & self.writable[reg];
            }
            Ok(())
        }

        fn read(&mut self, address: u8, buf: &mut [u8]) -> Result<(), ()> {
            assert_eq!(address, I2C_ADDR);
            buf.copy_from_slice(&self.regs[..buf.len()]);
            Ok(())
        }

        fn write_read(
            &mut self,
            address: u8,
            write_data: &[u8],
            read_buf: &mut [u8],
        ) -> Result<(), ()> {
            assert_eq!(address, I2C_ADDR);
            let start = write_data[0] as usize;
            self.maybe_tick(start);
            read_buf.copy_from_slice(&self.regs[start..start + read_buf.len()]);
            Ok(())
        }
    }
}

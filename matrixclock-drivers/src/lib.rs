//! Hardware driver implementations
//!
//! This crate provides the hardware-facing pieces the clock core is
//! generic over:
//!
//! - Register drivers for the three supported RTC chips (DS3231, DS1307,
//!   PCF8523), all at I2C address 0x68
//! - A write-test probe that identifies which chip is actually connected
//! - The square-wave pin scan and edge latch feeding the second counter
//! - An adapter exposing whichever chip was found as the core's
//!   [`TimeSource`](matrixclock_core::traits::TimeSource)

#![no_std]
#![deny(unsafe_code)]

pub mod rtc;
pub mod sqw;

pub use rtc::adapter::RtcAdapter;
pub use rtc::identify::{identify, ChipKind, ProbeError};
pub use rtc::{RtcChip, RtcError};
pub use sqw::{find_square_wave, CandidatePins, EdgeLatch, PinId, SqwError};

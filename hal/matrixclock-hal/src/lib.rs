//! MatrixClock Hardware Abstraction Layer
//!
//! This crate defines the hardware traits the clock core and the RTC chip
//! drivers are written against. The firmware binary implements them with
//! the real peripherals; host tests implement them with fakes.
//!
//! # Traits
//!
//! - [`gpio::InputPin`] - Digital input
//! - [`i2c::I2cBus`] - I2C bus operations
//! - [`time::Monotonic`] - Millisecond time source for bounded waits
//! - [`storage::DocumentStorage`] - Named flat-document persistence

#![no_std]
#![deny(unsafe_code)]

pub mod gpio;
pub mod i2c;
pub mod storage;
pub mod time;

// Re-export key traits at crate root for convenience
pub use gpio::{InputPin, Pull};
pub use i2c::I2cBus;
pub use storage::{DocumentStorage, StorageError};
pub use time::Monotonic;

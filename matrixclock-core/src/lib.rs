//! Board-agnostic core logic for the matrix clock firmware
//!
//! This crate contains all application logic that does not depend on
//! specific hardware implementations:
//!
//! - Calendar math on seconds-since-2000 timestamps
//! - The validated, persistable option registry
//! - The console command interpreter
//! - Console arbitration (serial plus at most one network client)
//! - The clock/display state machine driven by the RTC square wave
//! - Collaborator traits (time source, edge source, display face, network)

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_code)]

pub mod clock;
pub mod command;
pub mod console;
pub mod datetime;
pub mod logger;
pub mod options;
pub mod traits;

/// Firmware version reported by the `version` option
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

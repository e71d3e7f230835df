//! 64x32 matrix rendering for MatrixClock
//!
//! This crate turns a [`ClockFrame`](matrixclock_core::clock::ClockFrame)
//! into pixels:
//! - `MatrixBackend` trait the vendor panel driver implements
//! - Packed panel colors and the day/night selection rules
//! - The scaled digit font and the AM/PM indicator bitmap
//! - Frame layout (centered or left-anchored, AM/PM nudge)
//! - `MatrixFace`, the [`ClockFace`](matrixclock_core::traits::ClockFace)
//!   implementation the clock loop renders through
//!
//! Everything here is `no_std` and runs against an in-memory framebuffer
//! in host tests.

#![no_std]
#![deny(unsafe_code)]

pub mod backend;
pub mod color;
pub mod face;
pub mod font;
pub mod layout;

pub use backend::{Framebuffer, MatrixBackend, PANEL_HEIGHT, PANEL_WIDTH};
pub use color::Rgb;
pub use face::MatrixFace;

//! Console wire protocols for the matrix clock.
//!
//! Two byte-level state machines shared by the serial and telnet consoles:
//!
//! - [`telnet::TelnetCodec`] strips and answers telnet option negotiation so
//!   the layers above only ever see plain text
//! - [`line::LineBuffer`] accumulates bytes into edited command lines,
//!   handling backspace and line endings
//!
//! Both are `no_std` and allocation-free (heapless), so they run unchanged
//! on the target and in host tests.

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_code)]

pub mod line;
pub mod telnet;

pub use line::{LineBuffer, LineEvent, MAX_LINE_LEN};
pub use telnet::{TelnetCodec, TelnetStep};

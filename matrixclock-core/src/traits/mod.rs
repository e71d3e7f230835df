//! Hardware and collaborator traits
//!
//! The clock loop is written entirely against these traits. The drivers,
//! display and firmware crates supply the real implementations; tests use
//! the fakes defined alongside each consumer.

mod edge;
mod face;
mod net;
mod rtc;
mod serial;

pub use edge::{Edge, EdgeSource};
pub use face::ClockFace;
pub use net::{NetError, NetLink};
pub use rtc::TimeSource;
pub use serial::SerialIo;

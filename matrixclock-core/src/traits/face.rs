//! The display face boundary.

use crate::clock::ClockFrame;

/// Something that can paint a complete clock frame
///
/// The display crate implements this over the matrix panel; rendering is
/// full-frame (clear and redraw), called only when the frame actually
/// changed.
pub trait ClockFace {
    type Error;

    fn render(&mut self, frame: &ClockFrame) -> Result<(), Self::Error>;
}

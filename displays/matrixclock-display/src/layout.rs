//! Frame layout
//!
//! Pixel positions for the hour, colon and minute fields. A single-digit
//! hour can either be centered with the rest of the time or left-anchored
//! where the tens digit would sit. Showing the AM/PM indicator nudges the
//! whole time up two rows to make room underneath.

use crate::font::GLYPH_HEIGHT;

/// Horizontal advance from one digit to the next
pub const DIGIT_ADVANCE: u8 = 14;

/// Colon glyph width (two stacked dots)
pub const COLON_WIDTH: u8 = 4;

/// AM/PM indicator position
pub const AMPM_X: u8 = 48;
pub const AMPM_Y: u8 = 26;

/// Vertical centers, matching the original face
const DIGITS_CENTER_Y: u8 = 16;
const COLON_CENTER_Y: u8 = 14;

/// Resolved pixel positions for one frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Layout {
    /// Left edge of the hour field
    pub hour_x: u8,
    pub colon_x: u8,
    pub minute_x: u8,
    /// Top row of the digit glyphs
    pub digits_top: u8,
    /// Top row of the colon glyph (rides slightly high)
    pub colon_top: u8,
}

/// Position the time fields
pub fn place(center: bool, two_digit_hour: bool, show_ampm: bool) -> Layout {
    let (hour_x, colon_x, minute_x) = if center && !two_digit_hour {
        (6, 21, 29)
    } else if two_digit_hour {
        (0, 28, 36)
    } else {
        (13, 28, 36)
    };
    let nudge = if show_ampm { 2 } else { 0 };
    Layout {
        hour_x,
        colon_x,
        minute_x,
        digits_top: DIGITS_CENTER_Y - GLYPH_HEIGHT / 2 - nudge,
        colon_top: COLON_CENTER_Y - GLYPH_HEIGHT / 2 - nudge,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::font::GLYPH_WIDTH;
    use crate::backend::PANEL_WIDTH;

    #[test]
    fn test_centered_single_digit_hour() {
        let layout = place(true, false, false);
        assert_eq!(layout.hour_x, 6);
        assert_eq!(layout.colon_x, 21);
        assert_eq!(layout.minute_x, 29);
    }

    #[test]
    fn test_left_anchored_hours() {
        // Single digit sits where the tens digit would end
        assert_eq!(place(false, false, false).hour_x, 13);
        // Two digits start at the panel edge, centering wins nothing
        assert_eq!(place(true, true, false).hour_x, 0);
        assert_eq!(place(false, true, false).hour_x, 0);
    }

    #[test]
    fn test_ampm_nudges_time_up() {
        let plain = place(true, false, false);
        let nudged = place(true, false, true);
        assert_eq!(nudged.digits_top + 2, plain.digits_top);
        assert_eq!(nudged.colon_top + 2, plain.colon_top);
    }

    #[test]
    fn test_colon_rides_above_digit_center() {
        let layout = place(false, true, false);
        assert_eq!(layout.colon_top + 2, layout.digits_top);
    }

    #[test]
    fn test_widest_frame_fits_the_panel() {
        let layout = place(false, true, false);
        let right_edge = layout.minute_x + DIGIT_ADVANCE + GLYPH_WIDTH;
        assert!(right_edge <= PANEL_WIDTH);
    }
}

//! Panel colors
//!
//! The component values look odd for "red" and "green" but are tuned for
//! the LED panel, where full-scale channels wash out badly. The dim
//! variants are for lights-out rooms, not a gamma curve.

use matrixclock_core::options::ColorChoice;

/// One panel color, 8 bits per channel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Packed 0x00RRGGBB, the form the panel driver wants
    pub fn packed(&self) -> u32 {
        ((self.r as u32) << 16) | ((self.g as u32) << 8) | self.b as u32
    }

    pub fn is_black(&self) -> bool {
        *self == BLACK
    }
}

pub const BLACK: Rgb = Rgb::new(0, 0, 0);

pub const BRITE_RED: Rgb = Rgb::new(90, 0, 0);
pub const BRITE_GREEN: Rgb = Rgb::new(45, 90, 0);
pub const BRITE_AMBER: Rgb = Rgb::new(90, 45, 0);

pub const DIM_RED: Rgb = Rgb::new(8, 0, 0);
pub const DIM_GREEN: Rgb = Rgb::new(8, 16, 0);
pub const DIM_AMBER: Rgb = Rgb::new(16, 8, 0);

/// Resolve the configured color to a panel color
///
/// `auto` tracks the day/night band: red at night (easier on dark-adapted
/// eyes), green during the day.
pub fn resolve(choice: ColorChoice, dim: bool, night: bool) -> Rgb {
    let red = if dim { DIM_RED } else { BRITE_RED };
    let green = if dim { DIM_GREEN } else { BRITE_GREEN };
    match choice {
        ColorChoice::Red => red,
        ColorChoice::Green => green,
        ColorChoice::Auto => {
            if night {
                red
            } else {
                green
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_packed_layout() {
        assert_eq!(BRITE_AMBER.packed(), 0x005A2D00);
        assert_eq!(BLACK.packed(), 0);
    }

    #[test]
    fn test_auto_tracks_day_and_night() {
        assert_eq!(resolve(ColorChoice::Auto, false, true), BRITE_RED);
        assert_eq!(resolve(ColorChoice::Auto, false, false), BRITE_GREEN);
        assert_eq!(resolve(ColorChoice::Auto, true, true), DIM_RED);
    }

    #[test]
    fn test_fixed_colors_only_follow_dim() {
        assert_eq!(resolve(ColorChoice::Red, false, false), BRITE_RED);
        assert_eq!(resolve(ColorChoice::Red, true, true), DIM_RED);
        assert_eq!(resolve(ColorChoice::Green, true, false), DIM_GREEN);
    }
}

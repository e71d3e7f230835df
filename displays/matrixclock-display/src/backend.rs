//! Matrix panel backend trait

use crate::color::{Rgb, BLACK};

/// Panel width in pixels
pub const PANEL_WIDTH: u8 = 64;
/// Panel height in pixels
pub const PANEL_HEIGHT: u8 = 32;

/// Backend errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum DisplayError {
    /// Communication error with the panel
    Communication,
    /// Coordinates outside the panel
    InvalidCoordinates,
}

/// A 64x32 RGB matrix panel
///
/// The vendor HUB75 driver implements this in the firmware crate; host
/// tests use [`Framebuffer`]. Rendering draws into a back buffer and
/// `flush` makes it visible, so a slow panel never shows half a frame.
pub trait MatrixBackend {
    /// Fill the back buffer with black
    fn clear(&mut self) -> Result<(), DisplayError>;

    /// Set one back-buffer pixel
    fn set_pixel(&mut self, x: u8, y: u8, color: Rgb) -> Result<(), DisplayError>;

    /// Present the back buffer
    fn flush(&mut self) -> Result<(), DisplayError>;
}

/// In-memory backend for host tests and simulators
pub struct Framebuffer {
    pixels: [[Rgb; PANEL_WIDTH as usize]; PANEL_HEIGHT as usize],
    /// Number of completed flushes
    pub flushes: u32,
}

impl Default for Framebuffer {
    fn default() -> Self {
        Self::new()
    }
}

impl Framebuffer {
    pub fn new() -> Self {
        Self {
            pixels: [[BLACK; PANEL_WIDTH as usize]; PANEL_HEIGHT as usize],
            flushes: 0,
        }
    }

    pub fn pixel(&self, x: u8, y: u8) -> Rgb {
        self.pixels[y as usize][x as usize]
    }

    /// Count of lit pixels inside the given rectangle
    pub fn lit_in(&self, x: u8, y: u8, width: u8, height: u8) -> usize {
        let mut count = 0;
        for row in y..y + height {
            for col in x..x + width {
                if !self.pixel(col, row).is_black() {
                    count += 1;
                }
            }
        }
        count
    }

    pub fn lit_total(&self) -> usize {
        self.lit_in(0, 0, PANEL_WIDTH, PANEL_HEIGHT)
    }
}

impl MatrixBackend for Framebuffer {
    fn clear(&mut self) -> Result<(), DisplayError> {
        self.pixels = [[BLACK; PANEL_WIDTH as usize]; PANEL_HEIGHT as usize];
        Ok(())
    }

    fn set_pixel(&mut self, x: u8, y: u8, color: Rgb) -> Result<(), DisplayError> {
        if x >= PANEL_WIDTH || y >= PANEL_HEIGHT {
            return Err(DisplayError::InvalidCoordinates);
        }
        self.pixels[y as usize][x as usize] = color;
        Ok(())
    }

    fn flush(&mut self) -> Result<(), DisplayError> {
        self.flushes += 1;
        Ok(())
    }
}

//! The clock face renderer

use matrixclock_core::clock::ClockFrame;
use matrixclock_core::options::Rotation;
use matrixclock_core::traits::ClockFace;

use crate::backend::{DisplayError, MatrixBackend, PANEL_HEIGHT, PANEL_WIDTH};
use crate::color::{self, Rgb};
use crate::font::{self, SCALE, SEED_HEIGHT, SEED_WIDTH};
use crate::layout::{self, AMPM_X, AMPM_Y, DIGIT_ADVANCE};

/// Renders [`ClockFrame`]s onto a [`MatrixBackend`]
pub struct MatrixFace<B> {
    backend: B,
    auto_flipped: bool,
}

impl<B: MatrixBackend> MatrixFace<B> {
    pub fn new(backend: B) -> Self {
        Self {
            backend,
            auto_flipped: false,
        }
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    /// Orientation to use while the rotation option is `auto`. Nothing
    /// calls this yet, so `auto` renders upright until an orientation
    /// sensor is wired in.
    pub fn set_auto_flipped(&mut self, flipped: bool) {
        self.auto_flipped = flipped;
    }

    fn plot(&mut self, flipped: bool, x: u8, y: u8, color: Rgb) -> Result<(), DisplayError> {
        if flipped {
            self.backend
                .set_pixel(PANEL_WIDTH - 1 - x, PANEL_HEIGHT - 1 - y, color)
        } else {
            self.backend.set_pixel(x, y, color)
        }
    }

    fn fill_block(
        &mut self,
        flipped: bool,
        x: u8,
        y: u8,
        size: u8,
        color: Rgb,
    ) -> Result<(), DisplayError> {
        for dy in 0..size {
            for dx in 0..size {
                self.plot(flipped, x + dx, y + dy, color)?;
            }
        }
        Ok(())
    }

    fn draw_digit(
        &mut self,
        flipped: bool,
        digit: u8,
        x: u8,
        top: u8,
        color: Rgb,
    ) -> Result<(), DisplayError> {
        for row in 0..SEED_HEIGHT {
            for col in 0..SEED_WIDTH {
                if font::seed_lit(digit, col, row) {
                    self.fill_block(
                        flipped,
                        x + col as u8 * SCALE,
                        top + row as u8 * SCALE,
                        SCALE,
                        color,
                    )?;
                }
            }
        }
        Ok(())
    }

    fn draw_colon(
        &mut self,
        flipped: bool,
        x: u8,
        top: u8,
        color: Rgb,
    ) -> Result<(), DisplayError> {
        // Two dots at a third and two thirds of the glyph height
        self.fill_block(flipped, x, top + SCALE, SCALE, color)?;
        self.fill_block(flipped, x, top + 3 * SCALE, SCALE, color)
    }

    fn draw_ampm(&mut self, flipped: bool, pm: bool, color: Rgb) -> Result<(), DisplayError> {
        let letter = if pm { &font::P_PIXELS } else { &font::A_PIXELS };
        for &(dx, dy) in letter.iter().chain(&font::M_PIXELS) {
            self.plot(flipped, AMPM_X + dx, AMPM_Y + dy, color)?;
        }
        Ok(())
    }
}

/// Map an hour of day onto the 12-hour dial
fn twelve_hour(hour: u8) -> (u8, bool) {
    let pm = hour >= 12;
    match hour % 12 {
        0 => (12, pm),
        h => (h, pm),
    }
}

impl<B: MatrixBackend> ClockFace for MatrixFace<B> {
    type Error = DisplayError;

    fn render(&mut self, frame: &ClockFrame) -> Result<(), DisplayError> {
        let s = &frame.settings;

        let night = frame.hour >= s.night || frame.hour < s.day;
        let rgb = color::resolve(s.color, s.dim, night);

        let (hour, pm) = if s.h24 {
            (frame.hour, false)
        } else {
            twelve_hour(frame.hour)
        };
        let show_ampm = s.ampm && !s.h24;
        let two_digit = hour >= 10;
        let flipped = match s.rotation {
            Rotation::Normal => false,
            Rotation::Flipped => true,
            Rotation::Auto => self.auto_flipped,
        };
        let at = layout::place(s.center, two_digit, show_ampm);

        self.backend.clear()?;

        let mut x = at.hour_x;
        if two_digit {
            self.draw_digit(flipped, hour / 10, x, at.digits_top, rgb)?;
            x += DIGIT_ADVANCE;
        }
        self.draw_digit(flipped, hour % 10, x, at.digits_top, rgb)?;

        if frame.colon_visible {
            self.draw_colon(flipped, at.colon_x, at.colon_top, rgb)?;
        }

        self.draw_digit(flipped, frame.minute / 10, at.minute_x, at.digits_top, rgb)?;
        self.draw_digit(
            flipped,
            frame.minute % 10,
            at.minute_x + DIGIT_ADVANCE,
            at.digits_top,
            rgb,
        )?;

        if show_ampm {
            self.draw_ampm(flipped, pm, rgb)?;
        }

        self.backend.flush()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::Framebuffer;
    use crate::color::{BRITE_GREEN, BRITE_RED, DIM_RED};
    use crate::font::{AMPM_HEIGHT, AMPM_WIDTH, GLYPH_HEIGHT, GLYPH_WIDTH};
    use matrixclock_core::clock::RenderSettings;
    use matrixclock_core::options::ColorChoice;

    fn settings() -> RenderSettings {
        RenderSettings {
            h24: false,
            blink: true,
            center: true,
            dim: false,
            ampm: true,
            color: ColorChoice::Auto,
            night: 22,
            day: 6,
            rotation: Rotation::Normal,
        }
    }

    fn frame(hour: u8, minute: u8) -> ClockFrame {
        ClockFrame {
            hour,
            minute,
            colon_visible: true,
            settings: settings(),
        }
    }

    fn render(frame: &ClockFrame) -> MatrixFace<Framebuffer> {
        let mut face = MatrixFace::new(Framebuffer::new());
        face.render(frame).unwrap();
        face
    }

    #[test]
    fn test_twelve_hour_mapping() {
        assert_eq!(twelve_hour(0), (12, false));
        assert_eq!(twelve_hour(8), (8, false));
        assert_eq!(twelve_hour(12), (12, true));
        assert_eq!(twelve_hour(13), (1, true));
        assert_eq!(twelve_hour(23), (11, true));
    }

    #[test]
    fn test_centered_single_digit_layout() {
        let face = render(&frame(8, 4));
        let fb = face.backend();
        // Hour glyph inside its centered cell, nothing to its left
        assert!(fb.lit_in(6, 4, GLYPH_WIDTH, GLYPH_HEIGHT) > 0);
        assert_eq!(fb.lit_in(0, 0, 6, PANEL_HEIGHT), 0);
        // Minutes land in their own field
        assert!(fb.lit_in(29, 4, GLYPH_WIDTH, GLYPH_HEIGHT) > 0);
    }

    #[test]
    fn test_colon_blanks_when_hidden() {
        let mut f = frame(8, 4);
        let lit = render(&f).backend().lit_in(21, 0, 4, PANEL_HEIGHT);
        assert!(lit > 0);

        f.colon_visible = false;
        assert_eq!(render(&f).backend().lit_in(21, 0, 4, PANEL_HEIGHT), 0);
    }

    #[test]
    fn test_auto_color_band() {
        // 8 am is day, 23 is inside the night band
        let day = render(&frame(8, 0));
        assert_eq!(day.backend().pixel(29, 4), BRITE_GREEN);

        let night = render(&frame(23, 0));
        assert!(night.backend().lit_total() > 0);
        // Find any lit pixel and check the band color
        let fb = night.backend();
        let mut seen = None;
        for y in 0..PANEL_HEIGHT {
            for x in 0..PANEL_WIDTH {
                if !fb.pixel(x, y).is_black() {
                    seen = Some(fb.pixel(x, y));
                }
            }
        }
        assert_eq!(seen, Some(BRITE_RED));
    }

    #[test]
    fn test_dim_uses_dim_variants() {
        let mut f = frame(23, 0);
        f.settings.dim = true;
        f.settings.color = ColorChoice::Red;
        let face = render(&f);
        let fb = face.backend();
        let mut seen = None;
        for y in 0..PANEL_HEIGHT {
            for x in 0..PANEL_WIDTH {
                if !fb.pixel(x, y).is_black() {
                    seen = Some(fb.pixel(x, y));
                }
            }
        }
        assert_eq!(seen, Some(DIM_RED));
    }

    #[test]
    fn test_ampm_indicator_follows_mode() {
        // 12-hour mode with the option on: indicator lit
        let face = render(&frame(15, 30));
        assert!(face.backend().lit_in(AMPM_X, AMPM_Y, AMPM_WIDTH, AMPM_HEIGHT) > 0);

        // 24-hour mode suppresses it regardless of the option
        let mut f = frame(15, 30);
        f.settings.h24 = true;
        assert_eq!(
            render(&f)
                .backend()
                .lit_in(AMPM_X, AMPM_Y, AMPM_WIDTH, AMPM_HEIGHT),
            0
        );

        // Option off hides it in 12-hour mode too
        let mut f = frame(15, 30);
        f.settings.ampm = false;
        assert_eq!(
            render(&f)
                .backend()
                .lit_in(AMPM_X, AMPM_Y, AMPM_WIDTH, AMPM_HEIGHT),
            0
        );
    }

    #[test]
    fn test_am_and_pm_draw_different_letters() {
        let am = render(&frame(8, 0));
        let pm = render(&frame(20, 0));
        // The P fills the tile's top-left corner, the A leaves it dark
        assert!(am.backend().pixel(AMPM_X, AMPM_Y).is_black());
        assert!(!pm.backend().pixel(AMPM_X, AMPM_Y).is_black());
    }

    #[test]
    fn test_midnight_shows_twelve() {
        let face = render(&frame(0, 0));
        // 12 is two digits, so the hour starts at the panel edge
        assert!(face.backend().lit_in(0, 0, GLYPH_WIDTH, PANEL_HEIGHT) > 0);
    }

    #[test]
    fn test_flipped_rotation_mirrors_pixels() {
        let normal = render(&frame(8, 4));
        let mut f = frame(8, 4);
        f.settings.rotation = Rotation::Flipped;
        let flipped = render(&f);

        for y in 0..PANEL_HEIGHT {
            for x in 0..PANEL_WIDTH {
                assert_eq!(
                    normal.backend().pixel(x, y),
                    flipped
                        .backend()
                        .pixel(PANEL_WIDTH - 1 - x, PANEL_HEIGHT - 1 - y)
                );
            }
        }
    }

    #[test]
    fn test_auto_rotation_follows_latched_orientation() {
        let mut f = frame(8, 4);
        f.settings.rotation = Rotation::Auto;

        let mut face = MatrixFace::new(Framebuffer::new());
        face.set_auto_flipped(true);
        face.render(&f).unwrap();

        let mut reference = frame(8, 4);
        reference.settings.rotation = Rotation::Flipped;
        let expected = render(&reference);

        for y in 0..PANEL_HEIGHT {
            for x in 0..PANEL_WIDTH {
                assert_eq!(face.backend().pixel(x, y), expected.backend().pixel(x, y));
            }
        }
    }

    #[test]
    fn test_render_flushes_backend() {
        let face = render(&frame(8, 4));
        assert_eq!(face.backend().flushes, 1);
    }
}

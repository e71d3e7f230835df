//! Digit font and the AM/PM indicator bitmap
//!
//! The digits are 3x5 seed glyphs scaled by 4 at draw time, giving 12x20
//! characters that fill the panel height nicely. The AM/PM letters are
//! hand-placed pixels at native resolution.

/// Seed glyph width in cells
pub const SEED_WIDTH: usize = 3;
/// Seed glyph height in cells
pub const SEED_HEIGHT: usize = 5;
/// Scale factor applied when drawing
pub const SCALE: u8 = 4;

/// Scaled glyph width in pixels
pub const GLYPH_WIDTH: u8 = SEED_WIDTH as u8 * SCALE;
/// Scaled glyph height in pixels
pub const GLYPH_HEIGHT: u8 = SEED_HEIGHT as u8 * SCALE;

/// Digit seeds, one row per byte, leftmost cell in bit 2
pub const DIGITS: [[u8; SEED_HEIGHT]; 10] = [
    [0b111, 0b101, 0b101, 0b101, 0b111], // 0
    [0b010, 0b110, 0b010, 0b010, 0b111], // 1
    [0b111, 0b001, 0b111, 0b100, 0b111], // 2
    [0b111, 0b001, 0b111, 0b001, 0b111], // 3
    [0b101, 0b101, 0b111, 0b001, 0b001], // 4
    [0b111, 0b100, 0b111, 0b001, 0b111], // 5
    [0b111, 0b100, 0b111, 0b101, 0b111], // 6
    [0b111, 0b001, 0b001, 0b010, 0b010], // 7
    [0b111, 0b101, 0b111, 0b101, 0b111], // 8
    [0b111, 0b101, 0b111, 0b001, 0b111], // 9
];

/// True when the seed cell at (col, row) is lit
pub fn seed_lit(digit: u8, col: usize, row: usize) -> bool {
    DIGITS[digit as usize][row] & (1 << (SEED_WIDTH - 1 - col)) != 0
}

/// AM/PM indicator tile size in pixels
pub const AMPM_WIDTH: u8 = 10;
pub const AMPM_HEIGHT: u8 = 5;

/// The letter A, lit pixels as (x, y) within the tile
pub const A_PIXELS: [(u8, u8); 12] = [
    (0, 1),
    (0, 2),
    (0, 3),
    (0, 4),
    (1, 0),
    (1, 2),
    (2, 0),
    (2, 2),
    (3, 1),
    (3, 2),
    (3, 3),
    (3, 4),
];

/// The letter P
pub const P_PIXELS: [(u8, u8); 12] = [
    (0, 0),
    (0, 1),
    (0, 2),
    (0, 3),
    (0, 4),
    (1, 0),
    (1, 2),
    (2, 0),
    (2, 2),
    (3, 0),
    (3, 1),
    (3, 2),
];

/// The letter M, shared by both tiles
pub const M_PIXELS: [(u8, u8); 13] = [
    (5, 0),
    (5, 1),
    (5, 2),
    (5, 3),
    (5, 4),
    (6, 1),
    (7, 2),
    (8, 1),
    (9, 0),
    (9, 1),
    (9, 2),
    (9, 3),
    (9, 4),
];

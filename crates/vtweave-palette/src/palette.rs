//! The 256-entry reference palette.
//!
//! Layout follows the xterm indexed-color convention:
//!
//! | Range | Content |
//! |-------|---------|
//! | 0..=15 | base ANSI colors |
//! | 16..=231 | 6×6×6 color cube, levels 0/95/135/175/215/255 |
//! | 232..=255 | 24-step gray ramp, `8 + 10·i` |
//!
//! The base 16 use the classic half-intensity values (red = `128,0,0`)
//! with full-intensity brights (bright red = `255,0,0`), so pure primaries
//! resolve to the bright entries and quantized indices map cleanly onto
//! the 30/90 and 40/100 SGR code ranges.

/// RGB color (opaque).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Rgb {
    /// Red channel (0–255).
    pub r: u8,
    /// Green channel (0–255).
    pub g: u8,
    /// Blue channel (0–255).
    pub b: u8,
}

impl Rgb {
    /// Create a new RGB color.
    #[must_use]
    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }
}

/// Number of entries in the reference palette.
pub const PALETTE_SIZE: usize = 256;

/// Base ANSI colors, indices 0–15.
const BASE_16: [Rgb; 16] = [
    Rgb::new(0, 0, 0),       // Black
    Rgb::new(128, 0, 0),     // Red
    Rgb::new(0, 128, 0),     // Green
    Rgb::new(128, 128, 0),   // Yellow
    Rgb::new(0, 0, 128),     // Blue
    Rgb::new(128, 0, 128),   // Magenta
    Rgb::new(0, 128, 128),   // Cyan
    Rgb::new(192, 192, 192), // White
    Rgb::new(128, 128, 128), // Bright Black
    Rgb::new(255, 0, 0),     // Bright Red
    Rgb::new(0, 255, 0),     // Bright Green
    Rgb::new(255, 255, 0),   // Bright Yellow
    Rgb::new(0, 0, 255),     // Bright Blue
    Rgb::new(255, 0, 255),   // Bright Magenta
    Rgb::new(0, 255, 255),   // Bright Cyan
    Rgb::new(255, 255, 255), // Bright White
];

/// Cube channel levels for indices 16..=231.
const CUBE_LEVELS: [u8; 6] = [0, 95, 135, 175, 215, 255];

const fn build_reference_palette() -> [Rgb; PALETTE_SIZE] {
    let mut table = [Rgb::new(0, 0, 0); PALETTE_SIZE];
    let mut i = 0;
    while i < 16 {
        table[i] = BASE_16[i];
        i += 1;
    }
    while i < 232 {
        let idx = i - 16;
        table[i] = Rgb::new(
            CUBE_LEVELS[idx / 36],
            CUBE_LEVELS[(idx / 6) % 6],
            CUBE_LEVELS[idx % 6],
        );
        i += 1;
    }
    while i < PALETTE_SIZE {
        let gray = 8 + 10 * (i - 232) as u8;
        table[i] = Rgb::new(gray, gray, gray);
        i += 1;
    }
    table
}

/// The process-wide immutable reference palette.
pub static REFERENCE_PALETTE: [Rgb; PALETTE_SIZE] = build_reference_palette();

/// Resolve a palette index to its RGB value.
#[must_use]
pub fn palette_rgb(index: u8) -> Rgb {
    REFERENCE_PALETTE[index as usize]
}

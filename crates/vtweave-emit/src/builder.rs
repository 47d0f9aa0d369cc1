//! Fluent escape-sequence builder.
//!
//! [`SequenceBuilder`] accumulates display attributes as *pending* SGR
//! parameters and only serializes them when literal content is appended (or
//! the builder is finalized). Consecutive attribute calls therefore
//! coalesce into a single `CSI … m` sequence emitted immediately before the
//! text they style.
//!
//! Movement, erase and scroll operations flush pending attributes first and
//! then write one complete CSI sequence each. Cursor coordinates are
//! 1-based; values below 1 clamp to 1. Negative magnitudes invert
//! direction (`cursor_up(-3)` behaves as `cursor_down(3)`), with `i32::MIN`
//! inverting to `i32::MAX` to avoid overflow on negation.

use std::fmt;
use std::fmt::Write as _;

use smallvec::SmallVec;

use crate::error::ParamError;

/// SGR display attributes by wire code.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u16)]
pub enum Attribute {
    /// Reset all attributes (0).
    Reset = 0,
    /// Bold / increased intensity (1).
    IntensityBold = 1,
    /// Faint / decreased intensity (2).
    IntensityFaint = 2,
    /// Italic (3).
    Italic = 3,
    /// Single underline (4).
    Underline = 4,
    /// Slow blink (5).
    BlinkSlow = 5,
    /// Rapid blink (6).
    BlinkFast = 6,
    /// Negative / reverse video (7).
    NegativeOn = 7,
    /// Concealed text (8).
    ConcealOn = 8,
    /// Strikethrough (9).
    StrikethroughOn = 9,
    /// Double underline (21).
    UnderlineDouble = 21,
    /// Normal intensity — bold and faint off (22).
    IntensityBoldOff = 22,
    /// Italic off (23).
    ItalicOff = 23,
    /// Underline off (24).
    UnderlineOff = 24,
    /// Blink off (25).
    BlinkOff = 25,
    /// Negative off (27).
    NegativeOff = 27,
    /// Conceal off (28).
    ConcealOff = 28,
    /// Strikethrough off (29).
    StrikethroughOff = 29,
}

impl Attribute {
    /// The numeric SGR parameter for this attribute.
    #[must_use]
    pub const fn code(self) -> u16 {
        self as u16
    }

    /// Convert a numeric SGR code to an `Attribute`, returning `None` for
    /// codes with no defined attribute.
    #[must_use]
    pub const fn from_code(code: u16) -> Option<Self> {
        match code {
            0 => Some(Self::Reset),
            1 => Some(Self::IntensityBold),
            2 => Some(Self::IntensityFaint),
            3 => Some(Self::Italic),
            4 => Some(Self::Underline),
            5 => Some(Self::BlinkSlow),
            6 => Some(Self::BlinkFast),
            7 => Some(Self::NegativeOn),
            8 => Some(Self::ConcealOn),
            9 => Some(Self::StrikethroughOn),
            21 => Some(Self::UnderlineDouble),
            22 => Some(Self::IntensityBoldOff),
            23 => Some(Self::ItalicOff),
            24 => Some(Self::UnderlineOff),
            25 => Some(Self::BlinkOff),
            27 => Some(Self::NegativeOff),
            28 => Some(Self::ConcealOff),
            29 => Some(Self::StrikethroughOff),
            _ => None,
        }
    }
}

/// Basic ANSI color selection for the 16-color SGR codes.
///
/// `Default` (9) selects the terminal's configured default color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum BasicColor {
    /// Black (0).
    Black = 0,
    /// Red (1).
    Red = 1,
    /// Green (2).
    Green = 2,
    /// Yellow (3).
    Yellow = 3,
    /// Blue (4).
    Blue = 4,
    /// Magenta (5).
    Magenta = 5,
    /// Cyan (6).
    Cyan = 6,
    /// White (7).
    White = 7,
    /// Terminal default (9).
    Default = 9,
}

impl BasicColor {
    /// Convert a numeric index to a `BasicColor`.
    ///
    /// Only `0..=7` and `9` are valid; `8` is a hole in the SGR encoding.
    #[must_use]
    pub const fn from_index(index: u8) -> Option<Self> {
        match index {
            0 => Some(Self::Black),
            1 => Some(Self::Red),
            2 => Some(Self::Green),
            3 => Some(Self::Yellow),
            4 => Some(Self::Blue),
            5 => Some(Self::Magenta),
            6 => Some(Self::Cyan),
            7 => Some(Self::White),
            9 => Some(Self::Default),
            _ => None,
        }
    }

    const fn value(self) -> u16 {
        self as u16
    }
}

/// Erase extent for screen/line erase operations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum Erase {
    /// From the cursor forward (0).
    Forward = 0,
    /// From the cursor backward (1).
    Backward = 1,
    /// Everything (2).
    All = 2,
}

/// A mutable, chainable escape-sequence builder.
///
/// # Example
///
/// ```
/// use vtweave_emit::{Attribute, BasicColor, SequenceBuilder};
///
/// let mut seq = SequenceBuilder::new();
/// seq.attribute(Attribute::IntensityBold)
///     .fg(BasicColor::Red)
///     .append("Warning!")
///     .reset();
/// assert_eq!(seq.render(), "\x1b[1;31mWarning!\x1b[m");
/// ```
#[derive(Debug, Default)]
pub struct SequenceBuilder {
    out: String,
    pending: SmallVec<[u16; 8]>,
}

impl SequenceBuilder {
    /// Create an empty builder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a builder with a pre-sized text buffer.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            out: String::with_capacity(capacity),
            pending: SmallVec::new(),
        }
    }

    // ── Attributes and colors (pending, no direct output) ──────────

    /// Queue a display attribute.
    pub fn attribute(&mut self, attr: Attribute) -> &mut Self {
        self.pending.push(attr.code());
        self
    }

    /// Queue a display attribute by numeric SGR code.
    ///
    /// # Errors
    ///
    /// Returns [`ParamError::AttributeCode`] for codes with no defined
    /// attribute.
    pub fn attribute_code(&mut self, code: u16) -> Result<&mut Self, ParamError> {
        let attr = Attribute::from_code(code).ok_or(ParamError::AttributeCode(code))?;
        Ok(self.attribute(attr))
    }

    /// Queue a reset of all attributes. Shorthand for
    /// `attribute(Attribute::Reset)`.
    pub fn reset(&mut self) -> &mut Self {
        self.attribute(Attribute::Reset)
    }

    /// Queue a basic foreground color (SGR 30–37, 39).
    pub fn fg(&mut self, color: BasicColor) -> &mut Self {
        self.pending.push(30 + color.value());
        self
    }

    /// Queue a basic background color (SGR 40–47, 49).
    pub fn bg(&mut self, color: BasicColor) -> &mut Self {
        self.pending.push(40 + color.value());
        self
    }

    /// Queue a bright foreground color (SGR 90–97, 99).
    pub fn fg_bright(&mut self, color: BasicColor) -> &mut Self {
        self.pending.push(90 + color.value());
        self
    }

    /// Queue a bright background color (SGR 100–107, 109).
    pub fn bg_bright(&mut self, color: BasicColor) -> &mut Self {
        self.pending.push(100 + color.value());
        self
    }

    /// Queue a basic foreground color by index (`0..=7` or `9`).
    ///
    /// # Errors
    ///
    /// Returns [`ParamError::ColorIndex`] outside that domain.
    pub fn fg_index(&mut self, index: u8) -> Result<&mut Self, ParamError> {
        let color = BasicColor::from_index(index).ok_or(ParamError::ColorIndex(index))?;
        Ok(self.fg(color))
    }

    /// Queue a basic background color by index (`0..=7` or `9`).
    ///
    /// # Errors
    ///
    /// Returns [`ParamError::ColorIndex`] outside that domain.
    pub fn bg_index(&mut self, index: u8) -> Result<&mut Self, ParamError> {
        let color = BasicColor::from_index(index).ok_or(ParamError::ColorIndex(index))?;
        Ok(self.bg(color))
    }

    /// Queue a bright foreground color by index (`0..=7` or `9`).
    ///
    /// # Errors
    ///
    /// Returns [`ParamError::ColorIndex`] outside that domain.
    pub fn fg_bright_index(&mut self, index: u8) -> Result<&mut Self, ParamError> {
        let color = BasicColor::from_index(index).ok_or(ParamError::ColorIndex(index))?;
        Ok(self.fg_bright(color))
    }

    /// Queue a bright background color by index (`0..=7` or `9`).
    ///
    /// # Errors
    ///
    /// Returns [`ParamError::ColorIndex`] outside that domain.
    pub fn bg_bright_index(&mut self, index: u8) -> Result<&mut Self, ParamError> {
        let color = BasicColor::from_index(index).ok_or(ParamError::ColorIndex(index))?;
        Ok(self.bg_bright(color))
    }

    /// Queue a 256-color foreground (`38;5;n`).
    pub fn fg256(&mut self, index: u8) -> &mut Self {
        self.pending.extend_from_slice(&[38, 5, u16::from(index)]);
        self
    }

    /// Queue a 256-color background (`48;5;n`).
    pub fn bg256(&mut self, index: u8) -> &mut Self {
        self.pending.extend_from_slice(&[48, 5, u16::from(index)]);
        self
    }

    /// Queue a truecolor foreground (`38;2;r;g;b`).
    pub fn fg_rgb(&mut self, r: u8, g: u8, b: u8) -> &mut Self {
        self.pending
            .extend_from_slice(&[38, 2, u16::from(r), u16::from(g), u16::from(b)]);
        self
    }

    /// Queue a truecolor background (`48;2;r;g;b`).
    pub fn bg_rgb(&mut self, r: u8, g: u8, b: u8) -> &mut Self {
        self.pending
            .extend_from_slice(&[48, 2, u16::from(r), u16::from(g), u16::from(b)]);
        self
    }

    // ── Movement / erase / scroll (flush, then emit) ───────────────

    /// CUP: move the cursor to an absolute 1-based row/column. Values
    /// below 1 clamp to 1.
    pub fn cursor(&mut self, row: i32, col: i32) -> &mut Self {
        self.flush_pending();
        let _ = write!(self.out, "\x1b[{};{}H", row.max(1), col.max(1));
        self
    }

    /// CUU: move the cursor up `n` rows (down for negative `n`).
    pub fn cursor_up(&mut self, n: i32) -> &mut Self {
        if n < 0 {
            return self.cursor_down(invert(n));
        }
        self.emit_count('A', n)
    }

    /// CUD: move the cursor down `n` rows (up for negative `n`).
    pub fn cursor_down(&mut self, n: i32) -> &mut Self {
        if n < 0 {
            return self.cursor_up(invert(n));
        }
        self.emit_count('B', n)
    }

    /// CUF: move the cursor right `n` columns (left for negative `n`).
    pub fn cursor_right(&mut self, n: i32) -> &mut Self {
        if n < 0 {
            return self.cursor_left(invert(n));
        }
        self.emit_count('C', n)
    }

    /// CUB: move the cursor left `n` columns (right for negative `n`).
    pub fn cursor_left(&mut self, n: i32) -> &mut Self {
        if n < 0 {
            return self.cursor_right(invert(n));
        }
        self.emit_count('D', n)
    }

    /// CNL: move the cursor down `n` lines, to column 1.
    pub fn cursor_down_line(&mut self, n: i32) -> &mut Self {
        if n < 0 {
            return self.cursor_up_line(invert(n));
        }
        self.emit_count('E', n)
    }

    /// CPL: move the cursor up `n` lines, to column 1.
    pub fn cursor_up_line(&mut self, n: i32) -> &mut Self {
        if n < 0 {
            return self.cursor_down_line(invert(n));
        }
        self.emit_count('F', n)
    }

    /// ED: erase (part of) the screen.
    pub fn erase_screen(&mut self, kind: Erase) -> &mut Self {
        self.flush_pending();
        let _ = write!(self.out, "\x1b[{}J", kind as u8);
        self
    }

    /// EL: erase (part of) the current line.
    pub fn erase_line(&mut self, kind: Erase) -> &mut Self {
        self.flush_pending();
        let _ = write!(self.out, "\x1b[{}K", kind as u8);
        self
    }

    /// SU: scroll the page up `n` lines (down for negative `n`).
    pub fn scroll_up(&mut self, n: i32) -> &mut Self {
        if n < 0 {
            return self.scroll_down(invert(n));
        }
        self.emit_count('S', n)
    }

    /// SD: scroll the page down `n` lines (up for negative `n`).
    pub fn scroll_down(&mut self, n: i32) -> &mut Self {
        if n < 0 {
            return self.scroll_up(invert(n));
        }
        self.emit_count('T', n)
    }

    /// Save the cursor position, emitting both the SCO (`CSI s`) and DEC
    /// (`ESC 7`) variants for terminal compatibility.
    pub fn save_cursor_position(&mut self) -> &mut Self {
        self.flush_pending();
        self.out.push_str("\x1b[s\x1b7");
        self
    }

    /// Restore the cursor position, emitting both the SCO (`CSI u`) and
    /// DEC (`ESC 8`) variants.
    pub fn restore_cursor_position(&mut self) -> &mut Self {
        self.flush_pending();
        self.out.push_str("\x1b[u\x1b8");
        self
    }

    // ── Literal content ────────────────────────────────────────────

    /// Append literal text, applying any pending attributes first.
    pub fn append(&mut self, text: &str) -> &mut Self {
        self.flush_pending();
        self.out.push_str(text);
        self
    }

    /// Append a single character, applying any pending attributes first.
    pub fn append_char(&mut self, ch: char) -> &mut Self {
        self.flush_pending();
        self.out.push(ch);
        self
    }

    /// Append any `Display` value, applying any pending attributes first.
    pub fn append_display<T: fmt::Display>(&mut self, value: &T) -> &mut Self {
        self.flush_pending();
        let _ = write!(self.out, "{value}");
        self
    }

    // ── Finalization ───────────────────────────────────────────────

    /// Flush any remaining pending attributes and return the accumulated
    /// text. Idempotent: calling twice returns the same content.
    pub fn render(&mut self) -> &str {
        self.flush_pending();
        &self.out
    }

    /// Flush and consume the builder, returning the accumulated text.
    #[must_use]
    pub fn into_string(mut self) -> String {
        self.flush_pending();
        self.out
    }

    fn emit_count(&mut self, final_byte: char, n: i32) -> &mut Self {
        self.flush_pending();
        let _ = write!(self.out, "\x1b[{n}{final_byte}");
        self
    }

    /// Serialize pending attributes as one `CSI … m` sequence.
    ///
    /// A lone reset collapses to the minimal `ESC [ m` form.
    fn flush_pending(&mut self) {
        if self.pending.is_empty() {
            return;
        }
        if self.pending.len() == 1 && self.pending[0] == 0 {
            self.out.push_str("\x1b[m");
        } else {
            self.out.push_str("\x1b[");
            for (i, param) in self.pending.iter().enumerate() {
                if i > 0 {
                    self.out.push(';');
                }
                let _ = write!(self.out, "{param}");
            }
            self.out.push('m');
        }
        self.pending.clear();
    }
}

/// Overflow-safe direction inversion: `i32::MIN` maps to `i32::MAX`.
const fn invert(n: i32) -> i32 {
    match n.checked_neg() {
        Some(v) => v,
        None => i32::MAX,
    }
}

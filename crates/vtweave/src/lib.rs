#![forbid(unsafe_code)]

//! Public facade crate.
//!
//! Re-exports the common types from the member crates and offers a
//! lightweight prelude for day-to-day usage.
//!
//! ```
//! use vtweave::prelude::*;
//!
//! let mut seq = SequenceBuilder::new();
//! seq.attribute(Attribute::IntensityBold)
//!     .fg(BasicColor::Red)
//!     .append("Warning!")
//!     .reset();
//! assert_eq!(seq.render(), "\x1b[1;31mWarning!\x1b[m");
//! ```

use std::fmt;

// --- Emit re-exports -------------------------------------------------------

pub use vtweave_emit::{
    Attribute, BasicColor, Erase, MarkupError, ParamError, SequenceBuilder, render,
};

// --- Palette re-exports ----------------------------------------------------

pub use vtweave_palette::{
    PALETTE_SIZE, REFERENCE_PALETTE, Rgb, palette_rgb, quantize_index, quantize_rgb,
};

// --- Stream re-exports -----------------------------------------------------

pub use vtweave_stream::{
    AnsiFilter, CapabilityType, ColorDepth, MAX_SEQUENCE_LEN, Mode, Param,
};

// --- Errors ---------------------------------------------------------------

/// Top-level error type.
#[derive(Debug)]
pub enum Error {
    /// I/O failure while writing to a sink.
    Io(std::io::Error),
    /// Markup rendering failure.
    Markup(MarkupError),
    /// Out-of-domain builder parameter.
    Param(ParamError),
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Io(err) => write!(f, "{err}"),
            Self::Markup(err) => write!(f, "{err}"),
            Self::Param(err) => write!(f, "{err}"),
        }
    }
}

impl std::error::Error for Error {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            Self::Io(err) => Some(err),
            Self::Markup(err) => Some(err),
            Self::Param(err) => Some(err),
        }
    }
}

impl From<std::io::Error> for Error {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err)
    }
}

impl From<MarkupError> for Error {
    fn from(err: MarkupError) -> Self {
        Self::Markup(err)
    }
}

impl From<ParamError> for Error {
    fn from(err: ParamError) -> Self {
        Self::Param(err)
    }
}

/// Convenience result alias for [`Error`].
pub type Result<T> = std::result::Result<T, Error>;

// --- Prelude ---------------------------------------------------------------

/// Common imports for typical usage.
pub mod prelude {
    pub use crate::{
        AnsiFilter, Attribute, BasicColor, CapabilityType, ColorDepth, Erase, Mode, Rgb,
        SequenceBuilder, render,
    };
}

//! Builder input errors.

use std::fmt;

/// An out-of-domain numeric argument to a [`SequenceBuilder`] call.
///
/// These are caller errors surfaced synchronously; the builder state is
/// unchanged when one is returned.
///
/// [`SequenceBuilder`]: crate::builder::SequenceBuilder
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ParamError {
    /// Basic color index outside `0..=7` or the default marker `9`.
    ColorIndex(u8),
    /// Numeric SGR code with no defined attribute.
    AttributeCode(u16),
}

impl fmt::Display for ParamError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::ColorIndex(idx) => {
                write!(f, "invalid basic color index {idx} (expected 0..=7 or 9)")
            }
            Self::AttributeCode(code) => write!(f, "unknown SGR attribute code {code}"),
        }
    }
}

impl std::error::Error for ParamError {}

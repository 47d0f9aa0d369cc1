//! Sink capability, processing mode, and color depth.
//!
//! Detection is environment-based and deterministic: given the same
//! environment variables the same result is always produced. The
//! `CapabilityType` of a filter is fixed at construction; the processing
//! `Mode` may change at runtime.

use std::env;

/// Processing mode for an [`AnsiFilter`].
///
/// [`AnsiFilter`]: crate::filter::AnsiFilter
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Mode {
    /// Defer to the sink's capability: strip for unsupported/redirected
    /// sinks, otherwise pass or rewrite.
    #[default]
    Auto,
    /// Always remove recognized sequences.
    Strip,
    /// Always apply capability-aware rewriting, even on non-interactive
    /// sinks.
    Force,
}

impl Mode {
    /// Choose a default mode from the environment.
    ///
    /// `NO_COLOR` (the de-facto standard for disabling styled output)
    /// selects [`Mode::Strip`]; otherwise [`Mode::Auto`].
    #[must_use]
    pub fn detect() -> Self {
        Self::from_no_color(env::var_os("NO_COLOR").is_some())
    }

    #[must_use]
    pub(crate) const fn from_no_color(no_color: bool) -> Self {
        if no_color { Self::Strip } else { Self::Auto }
    }
}

/// Classification of the sink's ability to render ANSI sequences, fixed at
/// filter construction.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CapabilityType {
    /// The sink cannot render sequences at all.
    Unsupported,
    /// An interactive terminal with native sequence support.
    Native,
    /// Sequence support provided by an emulation layer.
    Emulation,
    /// Output is redirected (file, pipe); `Mode::Auto` behaves as
    /// `Mode::Strip`.
    Redirected,
}

impl CapabilityType {
    /// Classify a sink from its interactivity: `Native` for a terminal,
    /// `Redirected` otherwise.
    #[must_use]
    pub const fn for_terminal(is_terminal: bool) -> Self {
        if is_terminal {
            Self::Native
        } else {
            Self::Redirected
        }
    }

    /// Whether `Mode::Auto` strips for this capability.
    #[must_use]
    pub const fn strips_by_default(self) -> bool {
        matches!(self, Self::Unsupported | Self::Redirected)
    }
}

/// Maximum color count the downstream sink can render.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ColorDepth {
    /// Standard 16 ANSI colors.
    Ansi16,
    /// Extended 256-color palette.
    Ansi256,
    /// Full 24-bit RGB.
    TrueColor,
}

impl ColorDepth {
    /// The number of renderable colors.
    #[must_use]
    pub const fn max_colors(self) -> u32 {
        match self {
            Self::Ansi16 => 16,
            Self::Ansi256 => 256,
            Self::TrueColor => 16_777_216,
        }
    }

    /// Candidate count for the nearest-color search when rewriting to
    /// this depth.
    #[must_use]
    pub const fn candidates(self) -> usize {
        match self {
            Self::Ansi16 => 16,
            Self::Ansi256 | Self::TrueColor => 256,
        }
    }

    /// Detect the sink's color depth from the environment.
    ///
    /// `COLORTERM` = `truecolor`/`24bit` wins; a `TERM` containing
    /// `256color` selects the 256-color palette; everything else falls
    /// back to 16 colors.
    #[must_use]
    pub fn detect() -> Self {
        Self::from_env_vars(
            env::var("COLORTERM").unwrap_or_default().as_str(),
            env::var("TERM").unwrap_or_default().as_str(),
        )
    }

    fn from_env_vars(colorterm: &str, term: &str) -> Self {
        let colorterm = colorterm.to_ascii_lowercase();
        if colorterm == "truecolor" || colorterm == "24bit" {
            return Self::TrueColor;
        }
        if term.contains("256color") {
            return Self::Ansi256;
        }
        Self::Ansi16
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn auto_strips_only_for_incapable_sinks() {
        assert!(CapabilityType::Unsupported.strips_by_default());
        assert!(CapabilityType::Redirected.strips_by_default());
        assert!(!CapabilityType::Native.strips_by_default());
        assert!(!CapabilityType::Emulation.strips_by_default());
    }

    #[test]
    fn terminal_classification() {
        assert_eq!(CapabilityType::for_terminal(true), CapabilityType::Native);
        assert_eq!(
            CapabilityType::for_terminal(false),
            CapabilityType::Redirected
        );
    }

    #[test]
    fn depth_detection_precedence() {
        assert_eq!(
            ColorDepth::from_env_vars("truecolor", "xterm"),
            ColorDepth::TrueColor
        );
        assert_eq!(
            ColorDepth::from_env_vars("24BIT", "xterm"),
            ColorDepth::TrueColor
        );
        assert_eq!(
            ColorDepth::from_env_vars("", "xterm-256color"),
            ColorDepth::Ansi256
        );
        assert_eq!(ColorDepth::from_env_vars("", "vt100"), ColorDepth::Ansi16);
        assert_eq!(ColorDepth::from_env_vars("", ""), ColorDepth::Ansi16);
    }

    #[test]
    fn depth_constants() {
        assert_eq!(ColorDepth::Ansi16.max_colors(), 16);
        assert_eq!(ColorDepth::Ansi256.max_colors(), 256);
        assert_eq!(ColorDepth::TrueColor.max_colors(), 16_777_216);
        assert_eq!(ColorDepth::Ansi16.candidates(), 16);
        assert_eq!(ColorDepth::Ansi256.candidates(), 256);
    }

    #[test]
    fn no_color_selects_strip() {
        assert_eq!(Mode::from_no_color(true), Mode::Strip);
        assert_eq!(Mode::from_no_color(false), Mode::Auto);
    }
}

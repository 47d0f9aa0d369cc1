//! Inline style-markup rendering.
//!
//! Translates spans of the form `@|codeList text|@` into styled text via
//! [`SequenceBuilder`], leaving ordinary text untouched. The token strings
//! (`@|`, `|@`, the single space separating the code list from the text,
//! and the `,` between codes) are part of the format contract and must stay
//! byte-exact.
//!
//! # Syntax
//!
//! | Span | Output |
//! |------|--------|
//! | `@|bold Hi|@` | bold "Hi", then reset |
//! | `@|red,underline x|@` | red underlined "x", then reset |
//! | `@|bg_blue,white x|@` | white-on-blue "x", then reset |
//!
//! Code names are case-insensitive: color names select the foreground,
//! `fg_*`/`bg_*` select explicitly, attribute names apply attributes, and
//! `bold`/`faint` alias the intensity attributes.
//!
//! # Fail-safe policy
//!
//! Unmodified output is preferred over partial or incorrect translation.
//! A span opener without a matching terminator aborts translation and
//! emits the remaining input verbatim; a span with no text portion
//! returns the entire original input, discarding any spans already
//! rendered. Only a degenerate terminator overlapping the opener or an
//! unresolvable code name surfaces an error.

use std::fmt;

use crate::builder::{Attribute, BasicColor, SequenceBuilder};

/// Span opener token.
pub const SPAN_BEGIN: &str = "@|";
/// Span terminator token.
pub const SPAN_END: &str = "|@";

/// Errors that can occur during markup rendering.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MarkupError {
    /// The span terminator overlaps the opener (e.g. `@|@`).
    MalformedSpan {
        /// Byte offset of the span opener.
        position: usize,
    },
    /// A code name that resolves to nothing.
    UnknownStyleToken {
        /// The unresolvable code name, as written.
        token: String,
        /// Byte offset of the span opener containing it.
        position: usize,
    },
}

impl fmt::Display for MarkupError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MalformedSpan { position } => {
                write!(f, "malformed markup span at byte {position}")
            }
            Self::UnknownStyleToken { token, position } => {
                write!(f, "unknown style token '{token}' in span at byte {position}")
            }
        }
    }
}

impl std::error::Error for MarkupError {}

/// A resolved code-list entry.
#[derive(Debug, Clone, Copy)]
enum StyleOp {
    Fg(BasicColor),
    Bg(BasicColor),
    Attr(Attribute),
}

/// Render markup spans in `input` into escape sequences.
///
/// # Errors
///
/// [`MarkupError::MalformedSpan`] for a terminator overlapping its opener;
/// [`MarkupError::UnknownStyleToken`] for an unresolvable code name. All
/// other irregularities fall back to verbatim output (see module docs).
pub fn render(input: &str) -> Result<String, MarkupError> {
    let mut out = String::with_capacity(input.len());
    let mut pos = 0;

    loop {
        let Some(found) = input[pos..].find(SPAN_BEGIN) else {
            out.push_str(&input[pos..]);
            return Ok(out);
        };
        let begin = pos + found;
        out.push_str(&input[pos..begin]);

        // A missing terminator aborts all further translation.
        let Some(found_end) = input[begin..].find(SPAN_END) else {
            out.push_str(&input[begin..]);
            return Ok(out);
        };
        let end = begin + found_end;
        if end < begin + SPAN_BEGIN.len() {
            return Err(MarkupError::MalformedSpan { position: begin });
        }

        let content = &input[begin + SPAN_BEGIN.len()..end];
        // No text portion: give back the whole input untouched, including
        // any spans already rendered in this call.
        let Some(space) = content.find(' ') else {
            return Ok(input.to_string());
        };

        let mut seq = SequenceBuilder::new();
        for token in content[..space].split(',') {
            match resolve(token) {
                Some(StyleOp::Fg(color)) => seq.fg(color),
                Some(StyleOp::Bg(color)) => seq.bg(color),
                Some(StyleOp::Attr(attr)) => seq.attribute(attr),
                None => {
                    return Err(MarkupError::UnknownStyleToken {
                        token: token.to_string(),
                        position: begin,
                    });
                }
            };
        }
        seq.append(&content[space + 1..]).reset();
        out.push_str(seq.render());

        pos = end + SPAN_END.len();
    }
}

/// Resolve one code name, case-insensitively.
fn resolve(token: &str) -> Option<StyleOp> {
    let upper = token.to_ascii_uppercase();
    if let Some(name) = upper.strip_prefix("FG_") {
        return color_by_name(name).map(StyleOp::Fg);
    }
    if let Some(name) = upper.strip_prefix("BG_") {
        return color_by_name(name).map(StyleOp::Bg);
    }
    if let Some(color) = color_by_name(&upper) {
        // A bare color name selects the foreground.
        return Some(StyleOp::Fg(color));
    }
    attribute_by_name(&upper).map(StyleOp::Attr)
}

fn color_by_name(name: &str) -> Option<BasicColor> {
    match name {
        "BLACK" => Some(BasicColor::Black),
        "RED" => Some(BasicColor::Red),
        "GREEN" => Some(BasicColor::Green),
        "YELLOW" => Some(BasicColor::Yellow),
        "BLUE" => Some(BasicColor::Blue),
        "MAGENTA" => Some(BasicColor::Magenta),
        "CYAN" => Some(BasicColor::Cyan),
        "WHITE" => Some(BasicColor::White),
        "DEFAULT" => Some(BasicColor::Default),
        _ => None,
    }
}

fn attribute_by_name(name: &str) -> Option<Attribute> {
    match name {
        "RESET" => Some(Attribute::Reset),
        "INTENSITY_BOLD" | "BOLD" => Some(Attribute::IntensityBold),
        "INTENSITY_FAINT" | "FAINT" => Some(Attribute::IntensityFaint),
        "ITALIC" => Some(Attribute::Italic),
        "UNDERLINE" => Some(Attribute::Underline),
        "BLINK_SLOW" => Some(Attribute::BlinkSlow),
        "BLINK_FAST" => Some(Attribute::BlinkFast),
        "NEGATIVE_ON" => Some(Attribute::NegativeOn),
        "CONCEAL_ON" => Some(Attribute::ConcealOn),
        "STRIKETHROUGH_ON" => Some(Attribute::StrikethroughOn),
        "UNDERLINE_DOUBLE" => Some(Attribute::UnderlineDouble),
        "INTENSITY_BOLD_OFF" => Some(Attribute::IntensityBoldOff),
        "ITALIC_OFF" => Some(Attribute::ItalicOff),
        "UNDERLINE_OFF" => Some(Attribute::UnderlineOff),
        "BLINK_OFF" => Some(Attribute::BlinkOff),
        "NEGATIVE_OFF" => Some(Attribute::NegativeOff),
        "CONCEAL_OFF" => Some(Attribute::ConcealOff),
        "STRIKETHROUGH_OFF" => Some(Attribute::StrikethroughOff),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // ── Plain text ─────────────────────────────────────────────────

    #[test]
    fn text_without_spans_is_untouched() {
        assert_eq!(render("hello world").unwrap(), "hello world");
        assert_eq!(render("").unwrap(), "");
    }

    #[test]
    fn end_token_without_begin_is_literal() {
        assert_eq!(render("a |@ b").unwrap(), "a |@ b");
    }

    // ── Span rendering ─────────────────────────────────────────────

    #[test]
    fn bold_red_span_matches_manual_build() {
        let rendered = render("@|bold,red Warning!|@").unwrap();

        let mut seq = SequenceBuilder::new();
        seq.attribute(Attribute::IntensityBold)
            .fg(BasicColor::Red)
            .append("Warning!")
            .reset();
        assert_eq!(rendered, seq.render());
        assert_eq!(rendered, "\x1b[1;31mWarning!\x1b[m");
    }

    #[test]
    fn surrounding_text_is_preserved() {
        assert_eq!(
            render("pre @|green ok|@ post").unwrap(),
            "pre \x1b[32mok\x1b[m post"
        );
    }

    #[test]
    fn multiple_spans_render_independently() {
        assert_eq!(
            render("@|bold a|@-@|red b|@").unwrap(),
            "\x1b[1ma\x1b[m-\x1b[31mb\x1b[m"
        );
    }

    #[test]
    fn names_are_case_insensitive() {
        assert_eq!(render("@|BoLd,RED x|@").unwrap(), render("@|bold,red x|@").unwrap());
    }

    #[test]
    fn fg_bg_prefixes_and_aliases() {
        assert_eq!(
            render("@|bg_blue,fg_white,faint x|@").unwrap(),
            "\x1b[44;37;2mx\x1b[m"
        );
    }

    #[test]
    fn span_text_may_contain_spaces_and_tokens() {
        assert_eq!(
            render("@|underline two words|@").unwrap(),
            "\x1b[4mtwo words\x1b[m"
        );
    }

    // ── Fail-safe verbatim paths ───────────────────────────────────

    #[test]
    fn missing_terminator_returns_input_unchanged() {
        let input = "before @|bold never closed";
        assert_eq!(render(input).unwrap(), input);
    }

    #[test]
    fn span_without_text_portion_returns_input_verbatim() {
        let input = "x @|bold|@ y";
        assert_eq!(render(input).unwrap(), input);
    }

    #[test]
    fn span_without_text_discards_earlier_rendered_spans() {
        // The whole original input comes back, not a half-translated mix.
        let input = "@|red a|@ then @|bold|@";
        assert_eq!(render(input).unwrap(), input);
    }

    // ── Errors ─────────────────────────────────────────────────────

    #[test]
    fn overlapping_terminator_is_malformed() {
        assert_eq!(
            render("@|@ rest"),
            Err(MarkupError::MalformedSpan { position: 0 })
        );
    }

    #[test]
    fn unknown_code_name_errors() {
        assert_eq!(
            render("@|sparkly text|@"),
            Err(MarkupError::UnknownStyleToken {
                token: "sparkly".to_string(),
                position: 0,
            })
        );
    }

    #[test]
    fn unknown_name_reports_span_position() {
        let err = render("abc @|bogus text|@").unwrap_err();
        assert_eq!(
            err,
            MarkupError::UnknownStyleToken {
                token: "bogus".to_string(),
                position: 4,
            }
        );
    }
}

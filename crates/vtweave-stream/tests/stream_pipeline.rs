//! End-to-end checks: styled output produced by `vtweave-emit` fed
//! through the stream filter.

use vtweave_emit::{Attribute, BasicColor, SequenceBuilder, render};
use vtweave_stream::{AnsiFilter, CapabilityType, ColorDepth, Mode};

fn run(mode: Mode, depth: ColorDepth, input: &str) -> Vec<u8> {
    let filter = AnsiFilter::with_mode(Vec::new(), CapabilityType::Native, depth, mode);
    filter.write_bytes(input.as_bytes()).unwrap();
    filter.finish().unwrap();
    filter.into_inner()
}

#[test]
fn builder_output_strips_to_plain_text() {
    let mut seq = SequenceBuilder::new();
    seq.attribute(Attribute::IntensityBold)
        .fg(BasicColor::Red)
        .append("alert: ")
        .reset()
        .append("disk full")
        .cursor_down_line(1);
    let styled = seq.into_string();

    assert_eq!(
        run(Mode::Strip, ColorDepth::TrueColor, &styled),
        b"alert: disk full"
    );
}

#[test]
fn markup_output_strips_to_plain_text() {
    let styled = render("@|bold,red Error:|@ see @|underline details|@").unwrap();
    assert_eq!(
        run(Mode::Strip, ColorDepth::TrueColor, &styled),
        b"Error: see details"
    );
}

#[test]
fn builder_truecolor_downgrades_to_16() {
    let mut seq = SequenceBuilder::new();
    seq.fg_rgb(255, 0, 0).append("hot");
    let styled = seq.into_string();

    assert_eq!(run(Mode::Force, ColorDepth::Ansi16, &styled), b"\x1b[91mhot");
}

#[test]
fn builder_indexed_colors_downgrade_to_16() {
    // 196 = pure red, 21 = pure blue in the 256-color cube.
    let mut seq = SequenceBuilder::new();
    seq.fg256(196).bg256(21).append("x");
    let styled = seq.into_string();

    assert_eq!(
        run(Mode::Force, ColorDepth::Ansi16, &styled),
        b"\x1b[91;104mx"
    );
}

#[test]
fn builder_output_passes_untouched_at_truecolor() {
    let mut seq = SequenceBuilder::new();
    seq.fg_rgb(10, 20, 30)
        .bg256(100)
        .append("styled")
        .reset()
        .cursor(5, 1)
        .save_cursor_position()
        .restore_cursor_position();
    let styled = seq.into_string();

    assert_eq!(
        run(Mode::Force, ColorDepth::TrueColor, &styled),
        styled.as_bytes()
    );
}

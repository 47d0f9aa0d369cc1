#![forbid(unsafe_code)]

//! Fixed terminal reference palette and perceptual color quantization.
//!
//! `vtweave-palette` is the dependency-free leaf of the vtweave workspace.
//! It owns the immutable 256-entry reference palette (16 base ANSI colors,
//! the 6×6×6 color cube, the 24-step gray ramp) and the nearest-color
//! search used when rewriting truecolor/256-color SGR sequences down to a
//! smaller color depth.
//!
//! # Design principles
//!
//! - **Pure data + pure functions**: no I/O, no mutable state, safe for
//!   unsynchronized concurrent use.
//! - **Perceptual distance**: candidates are compared by squared Euclidean
//!   distance in CIE L\*a\*b\* space (CIE76), not raw RGB distance.
//! - **Deterministic ties**: on an exact distance tie the lowest palette
//!   index wins, so the canonical ANSI entries are preferred over cube
//!   duplicates.

pub mod palette;
pub mod quantize;

pub use palette::{PALETTE_SIZE, REFERENCE_PALETTE, Rgb, palette_rgb};
pub use quantize::{quantize_index, quantize_rgb};

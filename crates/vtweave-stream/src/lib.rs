#![forbid(unsafe_code)]

//! Streaming ANSI/VT interpreter.
//!
//! [`AnsiFilter`] sits between a producer of console output and a byte
//! sink. It scans the outgoing stream, recognizes escape sequences (cursor,
//! erase and scroll commands, SGR attributes and colors, OSC payloads,
//! charset designators) and applies a policy per sequence:
//!
//! - **pass** it through unchanged,
//! - **strip** it (non-capable or redirected sinks), or
//! - **rewrite** truecolor/256-color SGR parameters down to a smaller
//!   color depth using the perceptual quantizer from `vtweave-palette`.
//!
//! # Fail-open contract
//!
//! Malformed or unrecognized input is never an error: unknown two-byte
//! escapes, sequences that fail validation, and oversized/unterminated
//! sequences are forwarded verbatim (or, where classification succeeded in
//! a strip context, silently dropped). Only sink I/O errors propagate. A
//! console pipeline must never abort a program over foreign control bytes.
//!
//! # Concurrency
//!
//! One mutex serializes every byte write and mode change; the filter is
//! safe to share across threads by reference.

pub mod capability;
pub mod filter;
pub mod logging;

pub use capability::{CapabilityType, ColorDepth, Mode};
pub use filter::{AnsiFilter, MAX_SEQUENCE_LEN, Param};

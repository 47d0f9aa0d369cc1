//! The streaming escape-sequence filter.
//!
//! [`AnsiFilter`] wraps a byte sink and incrementally parses the bytes
//! written through it. Plain text is forwarded as-is; once an `ESC` is
//! seen the filter buffers the sequence until its terminator, classifies
//! it, and either forwards it verbatim, drops it, or rewrites it.
//!
//! The parser is a byte-at-a-time state machine. A sequence is never held
//! longer than [`MAX_SEQUENCE_LEN`] bytes: past that bound the buffer is
//! flushed verbatim and parsing restarts, so a missing terminator cannot
//! grow memory or swallow output.

use std::io::{self, Write};
use std::sync::{Mutex, MutexGuard, PoisonError};

use memchr::memchr;
use smallvec::SmallVec;
use vtweave_palette::{Rgb, quantize_index, quantize_rgb};

use crate::capability::{CapabilityType, ColorDepth, Mode};
use crate::logging::{debug, trace};

/// Longest escape sequence the filter will buffer before giving up and
/// flushing it verbatim.
pub const MAX_SEQUENCE_LEN: usize = 100;

const ESC: u8 = 0x1b;
const BEL: u8 = 0x07;

/// One parsed sequence parameter.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Param {
    /// Omitted position (`ESC[;5H`).
    Empty,
    /// Decimal integer argument.
    Int(i64),
    /// Quoted string argument or OSC payload.
    Str(String),
    /// Non-numeric marker byte (`?`, `=`, a charset designator, ...).
    Marker(char),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Text,
    EscSeen,
    CsiArgs,
    IntArg,
    StrArg,
    OscCommand,
    OscCommandEnd,
    OscParam,
    OscStSeen,
    CharsetDesignator,
}

struct Shared<W> {
    sink: W,
    mode: Mode,
    capability: CapabilityType,
    depth: ColorDepth,
    state: State,
    buf: Vec<u8>,
    params: SmallVec<[Param; 8]>,
    /// Offset into `buf` where the value being accumulated starts.
    value_start: usize,
}

/// A capability-aware ANSI/VT escape-sequence filter over a byte sink.
///
/// All writes go through one internal mutex, so a filter can be shared by
/// reference across threads; bytes of a single `write_bytes` call are
/// processed atomically with respect to other writers.
///
/// Dropping the filter mid-sequence discards the buffered prefix; call
/// [`finish`](Self::finish) first to flush it.
pub struct AnsiFilter<W: io::Write> {
    shared: Mutex<Shared<W>>,
}

impl<W: io::Write> AnsiFilter<W> {
    /// Create a filter in [`Mode::Auto`].
    pub fn new(sink: W, capability: CapabilityType, depth: ColorDepth) -> Self {
        Self::with_mode(sink, capability, depth, Mode::default())
    }

    /// Create a filter with an explicit processing mode.
    pub fn with_mode(
        sink: W,
        capability: CapabilityType,
        depth: ColorDepth,
        mode: Mode,
    ) -> Self {
        Self {
            shared: Mutex::new(Shared {
                sink,
                mode,
                capability,
                depth,
                state: State::Text,
                buf: Vec::with_capacity(MAX_SEQUENCE_LEN),
                params: SmallVec::new(),
                value_start: 0,
            }),
        }
    }

    /// Create a filter with capability, depth and mode detected from the
    /// sink's interactivity and the environment.
    pub fn detect(sink: W, is_terminal: bool) -> Self {
        Self::with_mode(
            sink,
            CapabilityType::for_terminal(is_terminal),
            ColorDepth::detect(),
            Mode::detect(),
        )
    }

    fn lock(&self) -> MutexGuard<'_, Shared<W>> {
        // A poisoned lock means a panic mid-write; the parser state is
        // still coherent (every transition completes before returning).
        self.shared.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Current processing mode.
    pub fn mode(&self) -> Mode {
        self.lock().mode
    }

    /// Change the processing mode. Takes effect at the next sequence
    /// dispatch; a sequence already buffered is classified under the new
    /// mode.
    pub fn set_mode(&self, mode: Mode) {
        debug!(?mode, "processing mode changed");
        self.lock().mode = mode;
    }

    /// The sink capability fixed at construction.
    pub fn capability(&self) -> CapabilityType {
        self.lock().capability
    }

    /// The color depth fixed at construction.
    pub fn color_depth(&self) -> ColorDepth {
        self.lock().depth
    }

    /// Process a slice of bytes.
    pub fn write_bytes(&self, data: &[u8]) -> io::Result<()> {
        self.lock().feed(data)
    }

    /// Flush any partially buffered sequence verbatim, then flush the sink.
    pub fn finish(&self) -> io::Result<()> {
        let mut shared = self.lock();
        if shared.state != State::Text {
            trace!("flushing unterminated sequence");
            shared.flush_raw()?;
        }
        shared.sink.flush()
    }

    /// Consume the filter and return the sink. Any partially buffered
    /// sequence is dropped; call [`finish`](Self::finish) first to keep it.
    pub fn into_inner(self) -> W {
        self.shared
            .into_inner()
            .unwrap_or_else(PoisonError::into_inner)
            .sink
    }
}

impl<W: io::Write> io::Write for AnsiFilter<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.write_bytes(buf)?;
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        self.lock().sink.flush()
    }
}

impl<W: io::Write> io::Write for &AnsiFilter<W> {
    fn write(&mut self, buf: &[u8]) -> io::Result<usize> {
        self.write_bytes(buf)?;
        Ok(buf.len())
    }

    fn flush(&mut self) -> io::Result<()> {
        self.lock().sink.flush()
    }
}

impl<W: io::Write> Shared<W> {
    fn feed(&mut self, data: &[u8]) -> io::Result<()> {
        let mut rest = data;
        while !rest.is_empty() {
            if self.state == State::Text {
                // Fast path: forward everything up to the next ESC in one
                // sink write.
                match memchr(ESC, rest) {
                    None => {
                        self.sink.write_all(rest)?;
                        return Ok(());
                    }
                    Some(at) => {
                        if at > 0 {
                            self.sink.write_all(&rest[..at])?;
                        }
                        self.begin_sequence();
                        rest = &rest[at + 1..];
                    }
                }
            } else {
                self.advance(rest[0])?;
                rest = &rest[1..];
            }
        }
        Ok(())
    }

    /// Feed one byte while inside a sequence (`state != Text`).
    fn advance(&mut self, b: u8) -> io::Result<()> {
        if self.buf.len() >= MAX_SEQUENCE_LEN {
            trace!(len = self.buf.len(), "sequence exceeds bound, flushing");
            self.flush_raw()?;
            if b == ESC {
                self.begin_sequence();
                return Ok(());
            }
            return self.sink.write_all(&[b]);
        }
        self.buf.push(b);
        match self.state {
            State::EscSeen => self.on_escape(b),
            State::CsiArgs => self.on_csi_args(b),
            State::IntArg => self.on_int_arg(b),
            State::StrArg => self.on_str_arg(b),
            State::OscCommand => self.on_osc_command(b),
            State::OscCommandEnd => self.on_osc_command_end(b),
            State::OscParam => self.on_osc_param(b),
            State::OscStSeen => self.on_osc_st_seen(b),
            State::CharsetDesignator => self.on_charset(b),
            // Text bytes never reach advance().
            State::Text => Ok(()),
        }
    }

    fn begin_sequence(&mut self) {
        self.buf.clear();
        self.buf.push(ESC);
        self.params.clear();
        self.value_start = 0;
        self.state = State::EscSeen;
    }

    fn on_escape(&mut self, b: u8) -> io::Result<()> {
        match b {
            b'[' => {
                self.state = State::CsiArgs;
                Ok(())
            }
            b']' => {
                self.state = State::OscCommand;
                Ok(())
            }
            // Charset designation; record the target slot (G0 / G1).
            b'(' => {
                self.params.push(Param::Marker('0'));
                self.state = State::CharsetDesignator;
                Ok(())
            }
            b')' => {
                self.params.push(Param::Marker('1'));
                self.state = State::CharsetDesignator;
                Ok(())
            }
            // Two-byte escapes (ESC 7, ESC 8, ESC M, ...) are not
            // interpreted; forward them untouched.
            _ => self.flush_raw(),
        }
    }

    fn on_csi_args(&mut self, b: u8) -> io::Result<()> {
        match b {
            b'0'..=b'9' => {
                self.value_start = self.buf.len() - 1;
                self.state = State::IntArg;
                Ok(())
            }
            b'"' => {
                self.value_start = self.buf.len();
                self.state = State::StrArg;
                Ok(())
            }
            b';' => {
                self.params.push(Param::Empty);
                Ok(())
            }
            b'?' | b'=' => {
                self.params.push(Param::Marker(b as char));
                Ok(())
            }
            _ => self.dispatch_csi(b),
        }
    }

    fn on_int_arg(&mut self, b: u8) -> io::Result<()> {
        match b {
            b'0'..=b'9' => Ok(()),
            _ => {
                let Some(v) = self.pending_int() else {
                    return self.flush_raw();
                };
                self.params.push(Param::Int(v));
                if b == b';' {
                    self.state = State::CsiArgs;
                    Ok(())
                } else {
                    self.dispatch_csi(b)
                }
            }
        }
    }

    fn on_str_arg(&mut self, b: u8) -> io::Result<()> {
        if b == b'"' {
            let text = String::from_utf8_lossy(
                &self.buf[self.value_start..self.buf.len() - 1],
            )
            .into_owned();
            self.params.push(Param::Str(text));
            // The closing quote is the sequence final. It is not a
            // letter, so string-carrying sequences never strip.
            self.dispatch_csi(b)
        } else {
            Ok(())
        }
    }

    fn on_osc_command(&mut self, b: u8) -> io::Result<()> {
        match b {
            b'0'..=b'9' => {
                self.value_start = self.buf.len() - 1;
                self.state = State::OscCommandEnd;
                Ok(())
            }
            // No numeric command identifier; not an OSC we understand.
            _ => self.flush_raw(),
        }
    }

    fn on_osc_command_end(&mut self, b: u8) -> io::Result<()> {
        match b {
            b'0'..=b'9' => Ok(()),
            b';' => {
                let Some(v) = self.pending_int() else {
                    return self.flush_raw();
                };
                self.params.push(Param::Int(v));
                self.value_start = self.buf.len();
                self.state = State::OscParam;
                Ok(())
            }
            _ => self.flush_raw(),
        }
    }

    fn on_osc_param(&mut self, b: u8) -> io::Result<()> {
        match b {
            BEL => {
                let text = String::from_utf8_lossy(
                    &self.buf[self.value_start..self.buf.len() - 1],
                )
                .into_owned();
                self.params.push(Param::Str(text));
                self.dispatch_osc()
            }
            ESC => {
                self.state = State::OscStSeen;
                Ok(())
            }
            _ => Ok(()),
        }
    }

    fn on_osc_st_seen(&mut self, b: u8) -> io::Result<()> {
        if b == b'\\' {
            let text = String::from_utf8_lossy(
                &self.buf[self.value_start..self.buf.len() - 2],
            )
            .into_owned();
            self.params.push(Param::Str(text));
            self.dispatch_osc()
        } else {
            // Lone ESC inside the payload; keep accumulating.
            self.state = State::OscParam;
            Ok(())
        }
    }

    fn on_charset(&mut self, b: u8) -> io::Result<()> {
        self.params.push(Param::Marker(b as char));
        if self.stripping() {
            trace!(designator = b, "stripping charset designation");
            self.discard();
            Ok(())
        } else {
            self.flush_raw()
        }
    }

    // ── Dispatch ───────────────────────────────────────────────────

    fn stripping(&self) -> bool {
        match self.mode {
            Mode::Strip => true,
            Mode::Force => false,
            Mode::Auto => self.capability.strips_by_default(),
        }
    }

    fn dispatch_csi(&mut self, cmd: u8) -> io::Result<()> {
        if self.stripping() {
            if self.is_strippable(cmd) {
                trace!(cmd, "stripping control sequence");
                self.discard();
                return Ok(());
            }
            // Not confidently classified; forward rather than eat bytes
            // we do not understand.
            return self.flush_raw();
        }
        if cmd == b'm'
            && self.depth != ColorDepth::TrueColor
            && self.has_extended_color()
        {
            if let Some(rewritten) = self.rewrite_sgr() {
                trace!(depth = ?self.depth, "rewriting extended colors");
                let result = self.sink.write_all(&rewritten);
                self.discard();
                return result;
            }
            // Malformed extended-color arguments; forward verbatim.
            return self.flush_raw();
        }
        self.flush_raw()
    }

    fn dispatch_osc(&mut self) -> io::Result<()> {
        if self.stripping() {
            trace!("stripping operating system command");
            self.discard();
            Ok(())
        } else {
            self.flush_raw()
        }
    }

    /// Whether a complete CSI sequence may be dropped in a strip context.
    ///
    /// Any alphabetic final byte marks a recognized command shape; SGR
    /// additionally requires well-formed parameters so that a malformed
    /// color sequence passes through instead of vanishing.
    fn is_strippable(&self, cmd: u8) -> bool {
        match cmd {
            b'm' => self.valid_sgr(),
            c if c.is_ascii_alphabetic() => true,
            _ => false,
        }
    }

    fn valid_sgr(&self) -> bool {
        let mut i = 0;
        while i < self.params.len() {
            let Param::Int(v) = self.params[i] else {
                return false;
            };
            if v == 38 || v == 48 {
                match self.params.get(i + 1) {
                    Some(Param::Int(5)) => {
                        if channel(self.params.get(i + 2)).is_none() {
                            return false;
                        }
                        i += 3;
                    }
                    Some(Param::Int(2)) => {
                        if channel(self.params.get(i + 2)).is_none()
                            || channel(self.params.get(i + 3)).is_none()
                            || channel(self.params.get(i + 4)).is_none()
                        {
                            return false;
                        }
                        i += 5;
                    }
                    _ => return false,
                }
            } else {
                i += 1;
            }
        }
        true
    }

    fn has_extended_color(&self) -> bool {
        self.params
            .iter()
            .any(|p| matches!(p, Param::Int(38 | 48)))
    }

    /// Rebuild the buffered SGR sequence with every extended-color group
    /// quantized to the sink's depth. `None` means the parameters do not
    /// form valid color groups and the sequence should pass unmodified.
    fn rewrite_sgr(&self) -> Option<Vec<u8>> {
        let mut out = Vec::with_capacity(self.buf.len());
        out.extend_from_slice(b"\x1b[");
        let mut first = true;
        let mut i = 0;
        while i < self.params.len() {
            let Param::Int(v) = self.params[i] else {
                return None;
            };
            if v == 38 || v == 48 {
                let quantized = match self.params.get(i + 1) {
                    Some(Param::Int(5)) => {
                        let idx = channel(self.params.get(i + 2))?;
                        i += 3;
                        quantize_index(idx, self.depth.candidates())
                    }
                    Some(Param::Int(2)) => {
                        let r = channel(self.params.get(i + 2))?;
                        let g = channel(self.params.get(i + 3))?;
                        let b = channel(self.params.get(i + 4))?;
                        i += 5;
                        quantize_rgb(Rgb::new(r, g, b), self.depth.candidates())
                    }
                    _ => return None,
                };
                match self.depth {
                    ColorDepth::Ansi256 => {
                        push_param(&mut out, &mut first, v);
                        let _ = write!(out, ";5;{quantized}");
                    }
                    ColorDepth::Ansi16 => {
                        let (normal, bright) =
                            if v == 38 { (30, 90) } else { (40, 100) };
                        let code = if quantized < 8 {
                            normal + i64::from(quantized)
                        } else {
                            bright + i64::from(quantized) - 8
                        };
                        push_param(&mut out, &mut first, code);
                    }
                    ColorDepth::TrueColor => return None,
                }
            } else {
                push_param(&mut out, &mut first, v);
                i += 1;
            }
        }
        out.push(b'm');
        Some(out)
    }

    fn pending_int(&self) -> Option<i64> {
        let digits = &self.buf[self.value_start..self.buf.len() - 1];
        std::str::from_utf8(digits).ok()?.parse().ok()
    }

    /// Forward the buffered sequence verbatim and return to text mode.
    fn flush_raw(&mut self) -> io::Result<()> {
        let result = self.sink.write_all(&self.buf);
        self.discard();
        result
    }

    /// Drop the buffered sequence and return to text mode.
    fn discard(&mut self) {
        self.buf.clear();
        self.params.clear();
        self.value_start = 0;
        self.state = State::Text;
    }
}

/// Validate a parameter as a color channel / palette index (0..=255).
fn channel(param: Option<&Param>) -> Option<u8> {
    match param {
        Some(Param::Int(v)) if (0..=255).contains(v) => Some(*v as u8),
        _ => None,
    }
}

fn push_param(out: &mut Vec<u8>, first: &mut bool, v: i64) {
    if *first {
        *first = false;
    } else {
        out.push(b';');
    }
    // Writing into a Vec cannot fail.
    let _ = write!(out, "{v}");
}

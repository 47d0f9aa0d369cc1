#![forbid(unsafe_code)]

//! Fluent ANSI/VT sequence emission.
//!
//! `vtweave-emit` produces well-formed escape sequences for callers that
//! know their sink understands them:
//!
//! - [`SequenceBuilder`]: a chainable builder that accumulates pending SGR
//!   parameters and coalesces them into a single `CSI … m` sequence
//!   immediately before the text they style.
//! - [`markup`]: a small inline-markup translator (`@|bold,red text|@`)
//!   layered on top of the builder.
//!
//! Output destined for a sink of *unknown* capability should instead be
//! routed through `vtweave-stream`, which adapts sequences downstream.

pub mod builder;
pub mod error;
pub mod markup;

pub use builder::{Attribute, BasicColor, Erase, SequenceBuilder};
pub use error::ParamError;
pub use markup::{MarkupError, render};

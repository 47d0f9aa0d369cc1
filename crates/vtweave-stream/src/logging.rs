//! Logging support.
//!
//! Re-exports the tracing macros used by this crate when the `tracing`
//! feature is enabled; otherwise provides no-op shims so call sites
//! compile away.

#[cfg(feature = "tracing")]
pub use tracing::{debug, trace};

#[cfg(not(feature = "tracing"))]
mod noop_macros {
    /// No-op trace macro when tracing is disabled.
    #[macro_export]
    macro_rules! trace {
        ($($arg:tt)*) => {};
    }

    /// No-op debug macro when tracing is disabled.
    #[macro_export]
    macro_rules! debug {
        ($($arg:tt)*) => {};
    }
}

#[cfg(not(feature = "tracing"))]
pub use crate::{debug, trace};

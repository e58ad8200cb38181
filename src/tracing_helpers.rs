//! Zero-cost logging helpers.
//!
//! With the `tracing` feature enabled these forward to the `tracing` crate.
//! Without it they expand to nothing, so the hot paths carry no cost.
//!
//! ```bash
//! cargo test --features tracing
//! ```

#![allow(unused_macros, unused_imports)]

/// Trace-level logging. No-op without the `tracing` feature.
#[cfg(feature = "tracing")]
macro_rules! trace_log {
    ($($arg:tt)*) => {
        tracing::trace!($($arg)*)
    };
}

#[cfg(not(feature = "tracing"))]
macro_rules! trace_log {
    ($($arg:tt)*) => {};
}

/// Debug-level logging. No-op without the `tracing` feature.
#[cfg(feature = "tracing")]
macro_rules! debug_log {
    ($($arg:tt)*) => {
        tracing::debug!($($arg)*)
    };
}

#[cfg(not(feature = "tracing"))]
macro_rules! debug_log {
    ($($arg:tt)*) => {};
}

pub(crate) use debug_log;
pub(crate) use trace_log;

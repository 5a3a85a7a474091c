//! Logging macros that cost nothing unless the `tracing` feature is on.
//!
//! The hot paths (search restarts, publish retries, claim races, the push
//! gate) want trace-level visibility when something misbehaves, but must
//! compile to nothing in normal builds. Each macro forwards to the matching
//! `tracing` macro when the feature is enabled and expands to an empty block
//! otherwise, so call sites stay in place at zero runtime cost.
//!
//! ```bash
//! # Watch claim races and gate stalls in a test run
//! RUST_LOG=spire=trace cargo test --features tracing producers_and_consumers
//! ```

/// Forward to [`tracing::trace!`]. Most verbose; retry and restart paths.
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

/// Forward to [`tracing::debug!`]. Completed operations worth surfacing.
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

/// Forward to [`tracing::warn!`]. Conditions a deployment should notice,
/// such as a capacity gate spinning with no consumer draining the queue.
#[cfg(feature = "tracing")]
macro_rules! warn_log {
    ($($arg:tt)*) => {
        tracing::warn!($($arg)*)
    };
}

#[cfg(not(feature = "tracing"))]
macro_rules! warn_log {
    ($($arg:tt)*) => {};
}

pub(crate) use debug_log;
pub(crate) use trace_log;
pub(crate) use warn_log;

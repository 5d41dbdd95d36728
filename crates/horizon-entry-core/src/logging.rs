//! Logging facilities for Horizon Entry.
//!
//! Horizon Entry uses the `tracing` crate for instrumentation. Nothing is
//! printed unless the application installs a subscriber:
//!
//! ```ignore
//! tracing_subscriber::fmt()
//!     .with_env_filter("horizon_entry=debug")
//!     .init();
//! ```
//!
//! Keystroke decisions are logged at `trace`, state transitions at `debug`,
//! and clamped or refused configuration requests at `warn`.

/// Target names for log filtering.
///
/// Use these with `tracing` directives to filter logs by subsystem.
pub mod targets {
    /// Core systems target.
    pub const CORE: &str = "horizon_entry_core";
    /// Listener signal target.
    pub const SIGNAL: &str = "horizon_entry_core::signal";
    /// Feedback timer target.
    pub const TIMER: &str = "horizon_entry_core::timer";
    /// Mask target.
    pub const MASK: &str = "horizon_entry::mask";
    /// Constrained buffer target.
    pub const BUFFER: &str = "horizon_entry::buffer";
    /// Field state machine target.
    pub const FIELD: &str = "horizon_entry::field";
    /// Numeric field target.
    pub const NUMBER: &str = "horizon_entry::number";
    /// Time editor target.
    pub const TIME: &str = "horizon_entry::time";
}

/// A guard that keeps a tracing span entered until dropped.
///
/// Useful for grouping everything logged while handling one user action.
#[derive(Debug)]
pub struct ActionSpan {
    #[allow(dead_code)]
    span: tracing::span::EnteredSpan,
}

impl ActionSpan {
    /// Enter a span for the named action.
    pub fn new(action: &'static str) -> Self {
        let span = tracing::debug_span!(target: "horizon_entry::field", "action", action);
        Self {
            span: span.entered(),
        }
    }
}

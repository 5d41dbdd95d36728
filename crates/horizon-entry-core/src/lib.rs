//! Core systems for Horizon Entry.
//!
//! This crate provides the pieces the entry engine builds on:
//!
//! - **Signals**: ordered listener lists for committed values and error messages
//! - **Timers**: the clock abstraction and the debounced feedback timer
//! - **Errors**: construction and configuration error types
//! - **Logging**: `tracing` targets for filtering by subsystem
//!
//! # Signal Example
//!
//! ```
//! use std::sync::Arc;
//! use std::sync::atomic::{AtomicI32, Ordering};
//! use horizon_entry_core::Signal;
//!
//! let value_committed = Signal::<i32>::new();
//! let last = Arc::new(AtomicI32::new(0));
//!
//! let last_clone = last.clone();
//! let conn_id = value_committed.connect(move |value| {
//!     last_clone.store(*value, Ordering::SeqCst);
//! });
//!
//! value_committed.emit(42);
//! assert_eq!(last.load(Ordering::SeqCst), 42);
//! value_committed.disconnect(conn_id);
//! ```
//!
//! # Debounce Example
//!
//! ```
//! use std::time::Duration;
//! use horizon_entry_core::{Clock, FeedbackTimer, ManualClock};
//!
//! let clock = ManualClock::new();
//! let mut timer = FeedbackTimer::new();
//! timer.restart(clock.now(), Duration::from_millis(150), ());
//!
//! clock.advance(Duration::from_millis(150));
//! assert_eq!(timer.take_expired(clock.now()), Some(()));
//! ```

mod error;
pub mod logging;
pub mod signal;
mod timer;

pub use error::{ConfigError, EntryError, MaskError, NumberError, Result};
pub use logging::ActionSpan;
pub use signal::{ConnectionId, Signal};
pub use timer::{Clock, FeedbackTimer, ManualClock, SystemClock, TimerId};

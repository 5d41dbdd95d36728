//! Timer system for Horizon Entry.
//!
//! Provides the clock abstraction and the single-shot feedback timer that
//! fields use to debounce error feedback. Scheduling a new shot always
//! supersedes the pending one ("latest write wins"); a superseded shot never
//! fires.
//!
//! Nothing here spawns threads or sleeps. The owner polls the timer with the
//! current instant from its [`Clock`], typically from its event loop.

use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};

use parking_lot::Mutex;
use slotmap::{SlotMap, new_key_type};

use crate::logging::targets;

new_key_type! {
    /// A unique identifier for one scheduled timer shot.
    pub struct TimerId;
}

/// A source of the current instant.
///
/// Fields read time through this trait so tests can drive debouncing
/// deterministically with a [`ManualClock`].
pub trait Clock: Send + Sync {
    /// The current instant.
    fn now(&self) -> Instant;
}

impl<C: Clock + ?Sized> Clock for Arc<C> {
    fn now(&self) -> Instant {
        (**self).now()
    }
}

/// The wall clock.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> Instant {
        Instant::now()
    }
}

/// A clock that only moves when told to.
///
/// # Example
///
/// ```
/// use std::time::Duration;
/// use horizon_entry_core::{Clock, ManualClock};
///
/// let clock = ManualClock::new();
/// let start = clock.now();
/// clock.advance(Duration::from_millis(150));
/// assert_eq!(clock.now() - start, Duration::from_millis(150));
/// ```
#[derive(Debug)]
pub struct ManualClock {
    now: Mutex<Instant>,
}

impl ManualClock {
    /// Create a manual clock frozen at the current instant.
    pub fn new() -> Self {
        Self {
            now: Mutex::new(Instant::now()),
        }
    }

    /// Move the clock forward.
    pub fn advance(&self, by: Duration) {
        *self.now.lock() += by;
    }

    /// Jump to a specific instant.
    pub fn set(&self, instant: Instant) {
        *self.now.lock() = instant;
    }
}

impl Default for ManualClock {
    fn default() -> Self {
        Self::new()
    }
}

impl Clock for ManualClock {
    fn now(&self) -> Instant {
        *self.now.lock()
    }
}

/// Internal shot data.
#[derive(Debug)]
struct Shot<P> {
    fire_time: Instant,
    payload: P,
}

/// A single-shot timer carrying a payload, with at most one pending shot.
///
/// # Example
///
/// ```
/// use std::time::{Duration, Instant};
/// use horizon_entry_core::FeedbackTimer;
///
/// let mut timer = FeedbackTimer::new();
/// let start = Instant::now();
/// let delay = Duration::from_millis(100);
///
/// timer.restart(start, delay, "first");
/// timer.restart(start + Duration::from_millis(50), delay, "second");
///
/// // The first shot was superseded and never fires.
/// assert_eq!(timer.take_expired(start + Duration::from_millis(120)), None);
/// assert_eq!(timer.take_expired(start + Duration::from_millis(150)), Some("second"));
/// assert!(!timer.is_pending());
/// ```
pub struct FeedbackTimer<P> {
    shots: SlotMap<TimerId, Shot<P>>,
    pending: Option<TimerId>,
}

impl<P> Default for FeedbackTimer<P> {
    fn default() -> Self {
        Self::new()
    }
}

impl<P: fmt::Debug> fmt::Debug for FeedbackTimer<P> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FeedbackTimer")
            .field("pending", &self.pending.and_then(|id| self.shots.get(id)))
            .finish()
    }
}

impl<P> FeedbackTimer<P> {
    /// Create an idle timer.
    pub fn new() -> Self {
        Self {
            shots: SlotMap::with_key(),
            pending: None,
        }
    }

    /// Cancel any pending shot and schedule a new one `delay` after `now`.
    ///
    /// Returns the ID of the new shot.
    pub fn restart(&mut self, now: Instant, delay: Duration, payload: P) -> TimerId {
        if let Some(previous) = self.pending.take() {
            self.shots.remove(previous);
            tracing::trace!(target: targets::TIMER, ?previous, "pending shot superseded");
        }
        let id = self.shots.insert(Shot {
            fire_time: now + delay,
            payload,
        });
        self.pending = Some(id);
        id
    }

    /// Cancel the pending shot, if any.
    ///
    /// Returns `true` if a shot was cancelled. Safe to call when idle.
    pub fn stop(&mut self) -> bool {
        match self.pending.take() {
            Some(id) => {
                self.shots.remove(id);
                true
            }
            None => false,
        }
    }

    /// Check whether a shot is pending.
    pub fn is_pending(&self) -> bool {
        self.pending.is_some()
    }

    /// The ID of the pending shot, if any.
    pub fn pending_id(&self) -> Option<TimerId> {
        self.pending
    }

    /// When the pending shot fires, if any.
    pub fn deadline(&self) -> Option<Instant> {
        self.pending
            .and_then(|id| self.shots.get(id))
            .map(|shot| shot.fire_time)
    }

    /// Get the duration until the pending shot fires.
    ///
    /// Returns `None` when idle and `Duration::ZERO` when overdue.
    pub fn time_until_next(&self, now: Instant) -> Option<Duration> {
        self.deadline()
            .map(|fire_time| fire_time.saturating_duration_since(now))
    }

    /// Fire the pending shot if it is due at `now`.
    ///
    /// A shot fires at most once; afterwards the timer is idle.
    #[tracing::instrument(skip(self), target = "horizon_entry_core::timer", level = "trace")]
    pub fn take_expired(&mut self, now: Instant) -> Option<P> {
        let id = self.pending?;
        let due = self.shots.get(id).is_some_and(|shot| shot.fire_time <= now);
        if !due {
            return None;
        }
        self.pending = None;
        let shot = self.shots.remove(id)?;
        tracing::trace!(target: targets::TIMER, ?id, "timer fired");
        Some(shot.payload)
    }
}

//! Listener lists for Horizon Entry.
//!
//! A [`Signal`] is an ordered collection of registered callbacks. Fields use
//! signals to tell the outside world that a value was committed or that the
//! error message changed. Listeners are invoked synchronously, in the order
//! they were connected.
//!
//! # Example
//!
//! ```
//! use horizon_entry_core::Signal;
//!
//! let committed = Signal::<String>::new();
//!
//! let conn_id = committed.connect(|text| {
//!     println!("Committed: {}", text);
//! });
//!
//! committed.emit("42".to_string());
//! committed.disconnect(conn_id);
//! ```

use std::fmt;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use parking_lot::Mutex;
use slotmap::{SlotMap, new_key_type};

use crate::logging::targets;

new_key_type! {
    /// A unique identifier for a signal-listener connection.
    ///
    /// Use this ID to disconnect a specific listener via [`Signal::disconnect`].
    pub struct ConnectionId;
}

type Slot<Args> = Arc<dyn Fn(&Args) + Send + Sync>;

/// Internal storage: slots by key plus the registration order.
struct Connections<Args> {
    slots: SlotMap<ConnectionId, Slot<Args>>,
    order: Vec<ConnectionId>,
}

/// A type-safe signal that can have multiple connected listeners.
///
/// # Type Parameter
///
/// - `Args`: The argument type passed to listeners. Use `()` for signals
///   with no arguments.
///
/// # Ordering
///
/// Listeners run in registration order. Emission works on a snapshot of the
/// listener list, so a listener may connect or disconnect other listeners
/// while it runs; the change is visible from the next emission on.
pub struct Signal<Args> {
    connections: Mutex<Connections<Args>>,
    /// Whether emission is temporarily blocked.
    blocked: AtomicBool,
}

impl<Args> Default for Signal<Args> {
    fn default() -> Self {
        Self::new()
    }
}

impl<Args> fmt::Debug for Signal<Args> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Signal")
            .field("connection_count", &self.connection_count())
            .field("blocked", &self.is_blocked())
            .finish()
    }
}

impl<Args> Signal<Args> {
    /// Create a new signal with no connections.
    pub fn new() -> Self {
        Self {
            connections: Mutex::new(Connections {
                slots: SlotMap::with_key(),
                order: Vec::new(),
            }),
            blocked: AtomicBool::new(false),
        }
    }

    /// Connect a listener to this signal.
    ///
    /// Returns a `ConnectionId` that can be used to disconnect it later.
    ///
    /// # Example
    ///
    /// ```
    /// use horizon_entry_core::Signal;
    ///
    /// let signal = Signal::<String>::new();
    /// let id = signal.connect(|s| println!("Got: {}", s));
    /// signal.emit("Hello".to_string());
    /// assert!(signal.disconnect(id));
    /// ```
    pub fn connect<F>(&self, slot: F) -> ConnectionId
    where
        F: Fn(&Args) + Send + Sync + 'static,
    {
        let mut connections = self.connections.lock();
        let id = connections.slots.insert(Arc::new(slot));
        connections.order.push(id);
        id
    }

    /// Disconnect a specific listener by its connection ID.
    ///
    /// Returns `true` if the connection was found and removed, `false` otherwise.
    pub fn disconnect(&self, id: ConnectionId) -> bool {
        let mut connections = self.connections.lock();
        if connections.slots.remove(id).is_none() {
            tracing::trace!(target: targets::SIGNAL, ?id, "disconnect of unknown connection");
            return false;
        }
        connections.order.retain(|existing| *existing != id);
        true
    }

    /// Disconnect all listeners from this signal.
    pub fn disconnect_all(&self) {
        let mut connections = self.connections.lock();
        connections.slots.clear();
        connections.order.clear();
    }

    /// Get the number of connected listeners.
    pub fn connection_count(&self) -> usize {
        self.connections.lock().order.len()
    }

    /// Block signal emission temporarily.
    ///
    /// While blocked, calls to `emit()` do nothing.
    pub fn set_blocked(&self, blocked: bool) {
        self.blocked.store(blocked, Ordering::SeqCst);
    }

    /// Check if signal emission is currently blocked.
    pub fn is_blocked(&self) -> bool {
        self.blocked.load(Ordering::SeqCst)
    }

    /// Emit the signal, invoking all connected listeners in registration order.
    ///
    /// If the signal is blocked, this does nothing.
    #[tracing::instrument(skip_all, target = "horizon_entry_core::signal", level = "trace")]
    pub fn emit(&self, args: Args) {
        if self.is_blocked() {
            tracing::trace!(target: targets::SIGNAL, "signal blocked, skipping emit");
            return;
        }

        // Snapshot so listeners can touch this signal without deadlocking.
        let slots: Vec<Slot<Args>> = {
            let connections = self.connections.lock();
            connections
                .order
                .iter()
                .filter_map(|id| connections.slots.get(*id).cloned())
                .collect()
        };
        tracing::trace!(target: targets::SIGNAL, connection_count = slots.len(), "emitting signal");

        for slot in slots {
            slot(&args);
        }
    }
}

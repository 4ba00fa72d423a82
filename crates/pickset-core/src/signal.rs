//! Signal/slot system for Pickset.
//!
//! Widgets never mutate state they do not own. Instead they emit signals and
//! let the owner (usually the host application) react. This module provides
//! the type-safe notification primitive used for every such outward request.
//!
//! # Key Types
//!
//! - [`Signal<Args>`] - The signal type; slots receive `&Args`
//! - [`ConnectionId`] - Identifier returned when connecting a slot
//! - [`ConnectionGuard`] - Scoped connection that disconnects when dropped
//!
//! # Emission Semantics
//!
//! Slots run synchronously, in connection order, on the emitting thread.
//! The slot list is snapshotted before any slot runs, so a slot may connect
//! or disconnect (including dropping its own guard) without deadlocking.
//! Connections added during an emission are not invoked by that emission.
//!
//! # Example
//!
//! ```
//! use pickset_core::Signal;
//!
//! let query_changed = Signal::<String>::new();
//!
//! let conn_id = query_changed.connect(|query| {
//!     println!("Query is now: {query}");
//! });
//!
//! query_changed.emit("shoes".to_string());
//! query_changed.disconnect(conn_id);
//! ```

use std::sync::{Arc, Weak};

use parking_lot::Mutex;
use slotmap::{new_key_type, SlotMap};

use crate::logging::targets;

new_key_type! {
    /// A unique identifier for a signal-slot connection.
    ///
    /// Use this ID to disconnect a specific connection via [`Signal::disconnect`].
    pub struct ConnectionId;
}

type Slot<Args> = Arc<dyn Fn(&Args) + Send + Sync>;

/// Shared slot storage. Guards hold a weak reference to it.
struct SlotTable<Args> {
    slots: Mutex<SlotMap<ConnectionId, Slot<Args>>>,
}

impl<Args> SlotTable<Args> {
    fn remove(&self, id: ConnectionId) -> bool {
        self.slots.lock().remove(id).is_some()
    }
}

/// A type-safe signal that can have multiple connected slots.
///
/// # Type Parameter
///
/// - `Args`: The argument type passed to connected slots. Use `()` for signals
///   with no arguments, or a tuple for multiple arguments.
pub struct Signal<Args> {
    table: Arc<SlotTable<Args>>,
}

impl<Args: 'static> Default for Signal<Args> {
    fn default() -> Self {
        Self::new()
    }
}

impl<Args: 'static> Signal<Args> {
    /// Create a new signal with no connections.
    pub fn new() -> Self {
        Self {
            table: Arc::new(SlotTable {
                slots: Mutex::new(SlotMap::with_key()),
            }),
        }
    }

    /// Connect a slot (closure) to this signal.
    ///
    /// Returns a `ConnectionId` that can be used to disconnect the slot later.
    pub fn connect<F>(&self, slot: F) -> ConnectionId
    where
        F: Fn(&Args) + Send + Sync + 'static,
    {
        self.table.slots.lock().insert(Arc::new(slot))
    }

    /// Connect a slot that stays connected only while the returned guard lives.
    ///
    /// The guard holds a weak reference, so it is safe to keep it longer than
    /// the signal itself; dropping it afterwards is a no-op.
    ///
    /// ```
    /// use pickset_core::Signal;
    /// use std::sync::atomic::{AtomicI32, Ordering};
    /// use std::sync::Arc;
    ///
    /// let signal = Signal::<i32>::new();
    /// let total = Arc::new(AtomicI32::new(0));
    /// {
    ///     let total = total.clone();
    ///     let _guard = signal.connect_scoped(move |&n| {
    ///         total.fetch_add(n, Ordering::SeqCst);
    ///     });
    ///     signal.emit(42);
    /// }
    /// signal.emit(1);
    /// assert_eq!(total.load(Ordering::SeqCst), 42);
    /// ```
    pub fn connect_scoped<F>(&self, slot: F) -> ConnectionGuard<Args>
    where
        F: Fn(&Args) + Send + Sync + 'static,
    {
        let id = self.connect(slot);
        ConnectionGuard {
            table: Arc::downgrade(&self.table),
            id: Some(id),
        }
    }

    /// Disconnect a specific slot by its connection ID.
    ///
    /// Returns `true` if the connection was found and removed.
    pub fn disconnect(&self, id: ConnectionId) -> bool {
        self.table.remove(id)
    }

    /// Get the number of connected slots.
    pub fn connection_count(&self) -> usize {
        self.table.slots.lock().len()
    }

    /// Emit the signal, invoking all connected slots with `&args`.
    #[tracing::instrument(skip_all, target = "pickset_core::signal", level = "trace")]
    pub fn emit(&self, args: Args) {
        let slots: Vec<Slot<Args>> = self.table.slots.lock().values().cloned().collect();
        tracing::trace!(target: targets::SIGNAL, connection_count = slots.len(), "emitting signal");

        for slot in slots {
            slot(&args);
        }
    }
}

impl<Args> std::fmt::Debug for Signal<Args> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Signal")
            .field("connections", &self.table.slots.lock().len())
            .finish()
    }
}

/// A connection that disconnects itself when dropped.
///
/// Created via [`Signal::connect_scoped`]. This is the acquire-on-open,
/// release-on-close building block for subscriptions to global event sources.
pub struct ConnectionGuard<Args> {
    table: Weak<SlotTable<Args>>,
    id: Option<ConnectionId>,
}

impl<Args> ConnectionGuard<Args> {
    /// Check whether the connection is still live on a live signal.
    pub fn is_connected(&self) -> bool {
        match (self.id, self.table.upgrade()) {
            (Some(id), Some(table)) => table.slots.lock().contains_key(id),
            _ => false,
        }
    }
}

impl<Args> Drop for ConnectionGuard<Args> {
    fn drop(&mut self) {
        let Some(id) = self.id.take() else {
            return;
        };
        if let Some(table) = self.table.upgrade() {
            table.remove(id);
        }
    }
}

impl<Args> std::fmt::Debug for ConnectionGuard<Args> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ConnectionGuard")
            .field("id", &self.id)
            .finish()
    }
}

static_assertions::assert_impl_all!(Signal<i32>: Send, Sync);
static_assertions::assert_impl_all!(ConnectionGuard<i32>: Send, Sync);

//! Subscriber types for the reactive system.
//!
//! A subscriber is a callback registered on a [`Signal`](super::Signal) or an
//! [`EventStream`](super::EventStream). Registration hands back a
//! [`Subscription`] guard; dropping the guard removes the callback.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, Weak};

use indexmap::IndexMap;
use parking_lot::RwLock;

/// Unique identifier for a subscriber.
///
/// Each registered callback gets a unique ID. The ID doubles as the
/// registration order key, so listeners are always notified in the order
/// they subscribed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SubscriberId(u64);

impl SubscriberId {
    /// Generate a new unique subscriber ID.
    ///
    /// Uses an atomic counter to ensure uniqueness across threads.
    pub fn new() -> Self {
        static COUNTER: AtomicU64 = AtomicU64::new(0);
        Self(COUNTER.fetch_add(1, Ordering::Relaxed))
    }
}

impl Default for SubscriberId {
    fn default() -> Self {
        Self::new()
    }
}

/// Internal callback shape. Returning `false` unregisters the listener,
/// which is how channel-backed listeners clean up after their receiver
/// goes away.
pub(crate) type Listener<T> = Arc<dyn Fn(&T) -> bool + Send + Sync>;

/// Anything a [`Subscription`] can detach itself from.
trait Unsubscribe: Send + Sync {
    fn unsubscribe(&self, id: SubscriberId);
}

/// Insertion-ordered registry of listeners for values of type `T`.
pub(crate) struct Listeners<T> {
    entries: RwLock<IndexMap<SubscriberId, Listener<T>>>,
}

impl<T: 'static> Listeners<T> {
    pub(crate) fn new() -> Arc<Self> {
        Arc::new(Self {
            entries: RwLock::new(IndexMap::new()),
        })
    }

    /// Register a listener and return the guard that owns the registration.
    pub(crate) fn insert(self: &Arc<Self>, listener: Listener<T>) -> Subscription {
        let id = SubscriberId::new();
        self.entries.write().insert(id, listener);

        let registry: Arc<dyn Unsubscribe> = self.clone();
        Subscription {
            id,
            registry: Some(Arc::downgrade(&registry)),
        }
    }

    /// Call every listener with `value`, in subscription order.
    ///
    /// The registry lock is not held while callbacks run, so a callback may
    /// subscribe or unsubscribe without deadlocking.
    pub(crate) fn notify(&self, value: &T) {
        let snapshot: Vec<(SubscriberId, Listener<T>)> = self
            .entries
            .read()
            .iter()
            .map(|(id, listener)| (*id, Arc::clone(listener)))
            .collect();

        let mut closed = Vec::new();
        for (id, listener) in snapshot {
            if !listener(value) {
                closed.push(id);
            }
        }

        if !closed.is_empty() {
            let mut entries = self.entries.write();
            for id in closed {
                entries.shift_remove(&id);
            }
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.entries.read().len()
    }
}

impl<T: 'static> Unsubscribe for Listeners<T> {
    fn unsubscribe(&self, id: SubscriberId) {
        // shift_remove keeps the remaining listeners in subscription order
        self.entries.write().shift_remove(&id);
    }
}

/// Guard for a registered callback.
///
/// Dropping the guard unregisters the callback. Call [`Subscription::detach`]
/// to keep the callback registered for the lifetime of its source.
#[must_use = "dropping a Subscription unregisters its callback"]
pub struct Subscription {
    id: SubscriberId,
    registry: Option<Weak<dyn Unsubscribe>>,
}

impl Subscription {
    /// Get the subscriber's unique ID.
    pub fn id(&self) -> SubscriberId {
        self.id
    }

    /// Keep the callback registered after this guard is gone.
    pub fn detach(mut self) {
        self.registry = None;
    }
}

impl Drop for Subscription {
    fn drop(&mut self) {
        if let Some(registry) = self.registry.take().and_then(|weak| weak.upgrade()) {
            registry.unsubscribe(self.id);
        }
    }
}

impl std::fmt::Debug for Subscription {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscription")
            .field("id", &self.id)
            .field("attached", &self.registry.is_some())
            .finish()
    }
}

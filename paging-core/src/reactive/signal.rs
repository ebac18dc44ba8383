//! Signal Implementation
//!
//! A Signal is a latest-value cell. It always holds a complete value, and
//! every write notifies its listeners synchronously.
//!
//! # How Signals Work
//!
//! 1. A signal is created with an initial value. Reads never block on a
//!    writer for longer than the swap itself.
//!
//! 2. When a signal's value is set, the new value is stored first, then all
//!    listeners are called in the order they subscribed.
//!
//! 3. Every `set` notifies, even when the new value equals the old one.
//!    Callers that want change-only semantics (like
//!    [`BusyTracker`](crate::tracking::BusyTracker)) decide before calling
//!    `set`.
//!
//! # Thread Safety
//!
//! The value is protected by a `parking_lot::RwLock`, so a read from any
//! thread sees either the old or the new value, never a torn one. Writers are
//! expected to be serialized by their owner.

use std::fmt::Debug;
use std::sync::Arc;

use parking_lot::RwLock;
use tokio::sync::mpsc;

use super::subscriber::{Listeners, Subscription};

/// A reactive signal holding a value of type T.
///
/// Clones share the same value and listener list.
///
/// # Example
///
/// ```rust
/// use paging_core::reactive::Signal;
///
/// let count = Signal::new(0);
/// let _sub = count.subscribe(|v| println!("count is now {v}"));
///
/// count.set(5);
/// assert_eq!(count.get(), 5);
/// ```
pub struct Signal<T>
where
    T: Clone + Send + Sync + 'static,
{
    /// The current value.
    value: Arc<RwLock<T>>,

    /// Callbacks invoked after each write, in subscription order.
    listeners: Arc<Listeners<T>>,
}

impl<T> Signal<T>
where
    T: Clone + Send + Sync + 'static,
{
    /// Create a new signal with the given initial value.
    pub fn new(value: T) -> Self {
        Self {
            value: Arc::new(RwLock::new(value)),
            listeners: Listeners::new(),
        }
    }

    /// Get a clone of the current value.
    pub fn get(&self) -> T {
        self.value.read().clone()
    }

    /// Read the current value without cloning it.
    pub fn with<R>(&self, f: impl FnOnce(&T) -> R) -> R {
        f(&self.value.read())
    }

    /// Set a new value and notify subscribers.
    pub fn set(&self, value: T) {
        {
            let mut guard = self.value.write();
            *guard = value.clone();
        }

        // The lock is released before listeners run so they can read back.
        self.listeners.notify(&value);
    }

    /// Register a callback invoked with every new value.
    ///
    /// The callback is not invoked with the current value.
    pub fn subscribe<F>(&self, notify: F) -> Subscription
    where
        F: Fn(&T) + Send + Sync + 'static,
    {
        self.listeners.insert(Arc::new(move |value: &T| {
            notify(value);
            true
        }))
    }

    /// Forward every new value into an unbounded channel.
    ///
    /// The forwarding listener unregisters itself once the receiver is
    /// dropped.
    pub fn channel(&self) -> mpsc::UnboundedReceiver<T> {
        let (tx, rx) = mpsc::unbounded_channel();
        self.listeners
            .insert(Arc::new(move |value: &T| tx.send(value.clone()).is_ok()))
            .detach();
        rx
    }

    /// Get the number of subscribers.
    pub fn subscriber_count(&self) -> usize {
        self.listeners.len()
    }
}

impl<T> Clone for Signal<T>
where
    T: Clone + Send + Sync + 'static,
{
    fn clone(&self) -> Self {
        Self {
            value: Arc::clone(&self.value),
            listeners: Arc::clone(&self.listeners),
        }
    }
}

impl<T> Debug for Signal<T>
where
    T: Clone + Send + Sync + Debug + 'static,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Signal")
            .field("value", &*self.value.read())
            .field("subscriber_count", &self.subscriber_count())
            .finish()
    }
}

// ----------------------------------------------------------------------------
// Tests
// ----------------------------------------------------------------------------

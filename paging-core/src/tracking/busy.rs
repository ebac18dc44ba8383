//! Busy tracking.
//!
//! A [`BusyTracker`] counts the active invocations of one operation kind and
//! publishes `true` while the count is non-zero. Only transitions are
//! published, except for [`BusyTracker::emit_idle`], which always announces
//! `false`.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;

use tokio::sync::mpsc;

use crate::reactive::{Signal, Subscription};

/// Boolean activity signal derived from an invocation counter.
#[derive(Debug, Clone)]
pub struct BusyTracker {
    /// Number of invocations currently in flight.
    active: Arc<AtomicUsize>,

    /// Published busy state, seeded to `false`.
    signal: Signal<bool>,
}

impl BusyTracker {
    pub(crate) fn new() -> Self {
        Self {
            active: Arc::new(AtomicUsize::new(0)),
            signal: Signal::new(false),
        }
    }

    /// Latest published busy state.
    pub fn get(&self) -> bool {
        self.signal.get()
    }

    /// Whether any invocation is counted right now.
    ///
    /// This is what the trigger gate samples. It can run ahead of
    /// [`BusyTracker::get`] only while listeners are being notified.
    pub fn is_active(&self) -> bool {
        self.active.load(Ordering::SeqCst) > 0
    }

    pub fn subscribe<F>(&self, notify: F) -> Subscription
    where
        F: Fn(&bool) + Send + Sync + 'static,
    {
        self.signal.subscribe(notify)
    }

    pub fn channel(&self) -> mpsc::UnboundedReceiver<bool> {
        self.signal.channel()
    }

    /// Count one more invocation.
    pub(crate) fn begin(&self) {
        if self.active.fetch_add(1, Ordering::SeqCst) == 0 {
            self.signal.set(true);
        }
    }

    /// Count one invocation as finished.
    pub(crate) fn end(&self) {
        let previous = self
            .active
            .fetch_update(Ordering::SeqCst, Ordering::SeqCst, |n| n.checked_sub(1));
        if previous == Ok(1) {
            self.signal.set(false);
        }
    }

    /// Announce `false` even if nothing changed, provided nothing is counted.
    pub(crate) fn emit_idle(&self) {
        if !self.is_active() {
            self.signal.set(false);
        }
    }
}

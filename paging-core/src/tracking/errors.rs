//! Error channel.
//!
//! Supplier failures are republished here as plain events. The channel keeps
//! the most recent error for late readers and never closes.

use std::sync::Arc;

use parking_lot::RwLock;
use tokio::sync::mpsc;

use crate::reactive::{EventStream, Subscription};

/// Non-terminating sink for supplier errors.
pub struct ErrorChannel<E>
where
    E: Clone + Send + Sync + 'static,
{
    latest: Arc<RwLock<Option<E>>>,
    events: EventStream<E>,
}

impl<E> ErrorChannel<E>
where
    E: Clone + Send + Sync + 'static,
{
    pub(crate) fn new() -> Self {
        Self {
            latest: Arc::new(RwLock::new(None)),
            events: EventStream::new(),
        }
    }

    /// The most recently pushed error, if any.
    pub fn latest(&self) -> Option<E> {
        self.latest.read().clone()
    }

    pub fn subscribe<F>(&self, notify: F) -> Subscription
    where
        F: Fn(&E) + Send + Sync + 'static,
    {
        self.events.subscribe(notify)
    }

    pub fn channel(&self) -> mpsc::UnboundedReceiver<E> {
        self.events.channel()
    }

    pub(crate) fn push(&self, error: E) {
        *self.latest.write() = Some(error.clone());
        self.events.publish(error);
    }
}

impl<E> Clone for ErrorChannel<E>
where
    E: Clone + Send + Sync + 'static,
{
    fn clone(&self) -> Self {
        Self {
            latest: Arc::clone(&self.latest),
            events: self.events.clone(),
        }
    }
}

impl<E> std::fmt::Debug for ErrorChannel<E>
where
    E: Clone + Send + Sync + std::fmt::Debug + 'static,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ErrorChannel")
            .field("latest", &*self.latest.read())
            .field("events", &self.events)
            .finish()
    }
}

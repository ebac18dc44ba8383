//! Event streams.
//!
//! An [`EventStream`] is a publish-only broadcast: it has no current value,
//! late subscribers see nothing that was published before they arrived, and
//! publishing never ends the stream.

use std::sync::Arc;

use tokio::sync::mpsc;

use super::subscriber::{Listeners, Subscription};

/// A hot stream of values of type `T`.
pub struct EventStream<T>
where
    T: Clone + Send + Sync + 'static,
{
    listeners: Arc<Listeners<T>>,
}

impl<T> EventStream<T>
where
    T: Clone + Send + Sync + 'static,
{
    pub fn new() -> Self {
        Self {
            listeners: Listeners::new(),
        }
    }

    /// Deliver `value` to every current subscriber, in subscription order.
    pub fn publish(&self, value: T) {
        self.listeners.notify(&value);
    }

    /// Register a callback invoked with every published value.
    pub fn subscribe<F>(&self, notify: F) -> Subscription
    where
        F: Fn(&T) + Send + Sync + 'static,
    {
        self.listeners.insert(Arc::new(move |value: &T| {
            notify(value);
            true
        }))
    }

    /// Forward every published value into an unbounded channel.
    pub fn channel(&self) -> mpsc::UnboundedReceiver<T> {
        let (tx, rx) = mpsc::unbounded_channel();
        self.listeners
            .insert(Arc::new(move |value: &T| tx.send(value.clone()).is_ok()))
            .detach();
        rx
    }

    pub fn subscriber_count(&self) -> usize {
        self.listeners.len()
    }
}

impl<T> Default for EventStream<T>
where
    T: Clone + Send + Sync + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Clone for EventStream<T>
where
    T: Clone + Send + Sync + 'static,
{
    fn clone(&self) -> Self {
        Self {
            listeners: Arc::clone(&self.listeners),
        }
    }
}

impl<T> std::fmt::Debug for EventStream<T>
where
    T: Clone + Send + Sync + 'static,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("EventStream")
            .field("subscriber_count", &self.subscriber_count())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    #[test]
    fn late_subscriber_misses_earlier_events() {
        let stream = EventStream::new();
        stream.publish(1);

        let mut rx = stream.channel();
        assert!(rx.try_recv().is_err());

        stream.publish(2);
        assert_eq!(rx.try_recv().ok(), Some(2));
    }

    #[test]
    fn clones_share_subscribers() {
        let stream = EventStream::<()>::new();
        let hits = Arc::new(AtomicUsize::new(0));
        let hits_clone = hits.clone();
        let _sub = stream.subscribe(move |_| {
            hits_clone.fetch_add(1, Ordering::SeqCst);
        });

        let publisher = stream.clone();
        publisher.publish(());
        publisher.publish(());

        assert_eq!(hits.load(Ordering::SeqCst), 2);
    }
}

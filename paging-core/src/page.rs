//! Page state and the shared page store.
//!
//! [`PageState`] is an immutable snapshot: a page number plus the items
//! accumulated so far, in render order. [`PageStore`] is the single cell that
//! holds the latest snapshot. Anyone may read or observe it; only the
//! orchestrator writes it.

use serde::{Deserialize, Serialize};
use tokio::sync::mpsc;

use crate::reactive::{Signal, Subscription};

/// A page number and the ordered items loaded up to that page.
///
/// Every change produces a new value; nothing mutates a `PageState` in place.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PageState<T> {
    page: u32,
    items: Vec<T>,
}

impl<T> PageState<T> {
    pub fn new(page: u32, items: Vec<T>) -> Self {
        Self { page, items }
    }

    /// A page with no items.
    pub fn empty(page: u32) -> Self {
        Self {
            page,
            items: Vec::new(),
        }
    }

    pub fn page(&self) -> u32 {
        self.page
    }

    pub fn items(&self) -> &[T] {
        &self.items
    }

    pub fn into_items(self) -> Vec<T> {
        self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    /// Transform every item, keeping the page number.
    pub fn map_items<V, F>(self, f: F) -> PageState<V>
    where
        F: FnMut(T) -> V,
    {
        PageState {
            page: self.page,
            items: self.items.into_iter().map(f).collect(),
        }
    }

    /// Append `next`'s items after this state's items.
    ///
    /// The result takes `next`'s page number as-is, whatever it is.
    pub fn extended(&self, next: PageState<T>) -> PageState<T>
    where
        T: Clone,
    {
        let mut items = Vec::with_capacity(self.items.len() + next.items.len());
        items.extend_from_slice(&self.items);
        items.extend(next.items);
        PageState {
            page: next.page,
            items,
        }
    }
}

/// The single shared cell holding the latest [`PageState`].
///
/// Observers are notified synchronously, in subscription order, after every
/// write. Reads always return a complete snapshot.
pub struct PageStore<T>
where
    T: Clone + Send + Sync + 'static,
{
    state: Signal<PageState<T>>,
}

impl<T> PageStore<T>
where
    T: Clone + Send + Sync + 'static,
{
    pub(crate) fn new(initial: PageState<T>) -> Self {
        Self {
            state: Signal::new(initial),
        }
    }

    /// Latest snapshot.
    pub fn current(&self) -> PageState<T> {
        self.state.get()
    }

    /// Read the latest snapshot without cloning its items.
    pub fn with<R>(&self, f: impl FnOnce(&PageState<T>) -> R) -> R {
        self.state.with(f)
    }

    pub fn subscribe<F>(&self, notify: F) -> Subscription
    where
        F: Fn(&PageState<T>) + Send + Sync + 'static,
    {
        self.state.subscribe(notify)
    }

    pub fn channel(&self) -> mpsc::UnboundedReceiver<PageState<T>> {
        self.state.channel()
    }

    pub(crate) fn set(&self, next: PageState<T>) {
        self.state.set(next);
    }
}

impl<T> Clone for PageStore<T>
where
    T: Clone + Send + Sync + 'static,
{
    fn clone(&self) -> Self {
        Self {
            state: self.state.clone(),
        }
    }
}

impl<T> std::fmt::Debug for PageStore<T>
where
    T: Clone + Send + Sync + std::fmt::Debug + 'static,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PageStore").field("state", &self.state).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use parking_lot::Mutex;
    use std::sync::Arc;

    #[test]
    fn extended_appends_in_order_and_takes_new_page() {
        let base = PageState::new(2, vec!["a", "b"]);
        let next = base.extended(PageState::new(3, vec!["c", "d"]));

        assert_eq!(next, PageState::new(3, vec!["a", "b", "c", "d"]));
        // The base snapshot is untouched.
        assert_eq!(base.items(), &["a", "b"]);
    }

    #[test]
    fn extended_trusts_returned_page_number() {
        let base = PageState::new(2, vec![1]);
        let next = base.extended(PageState::new(9, vec![2]));
        assert_eq!(next.page(), 9);
    }

    #[test]
    fn map_items_keeps_page() {
        let mapped = PageState::new(4, vec![1, 2, 3]).map_items(|n| n * 10);
        assert_eq!(mapped, PageState::new(4, vec![10, 20, 30]));
    }

    #[test]
    fn page_state_serializes_as_plain_struct() {
        let json = serde_json::to_value(PageState::new(1, vec!["x"])).unwrap();
        assert_eq!(json, serde_json::json!({ "page": 1, "items": ["x"] }));
    }

    #[test]
    fn store_notifies_observers_in_subscription_order() {
        let store = PageStore::new(PageState::<u8>::empty(1));
        let log = Arc::new(Mutex::new(Vec::new()));

        let first_log = log.clone();
        let _first = store.subscribe(move |s| first_log.lock().push(("first", s.len())));
        let second_log = log.clone();
        let _second = store.subscribe(move |s| second_log.lock().push(("second", s.len())));

        store.set(PageState::new(1, vec![1, 2]));

        assert_eq!(*log.lock(), vec![("first", 2), ("second", 2)]);
        assert_eq!(store.current(), PageState::new(1, vec![1, 2]));
    }
}

//! Item mapper.
//!
//! Every fetched batch passes through a [`Mapper`] exactly once, on its way
//! into the page store. Orchestrators without a transform use the identity
//! mapper, so both construction paths share one state machine.

use std::sync::Arc;

use crate::page::PageState;

/// Pure per-item transform from fetched items to stored items.
pub struct Mapper<T, V> {
    map: Arc<dyn Fn(T) -> V + Send + Sync>,
}

impl<T, V> Mapper<T, V> {
    pub fn new<F>(map: F) -> Self
    where
        F: Fn(T) -> V + Send + Sync + 'static,
    {
        Self { map: Arc::new(map) }
    }

    /// Map every item of a fetched batch, keeping its page number.
    pub fn apply(&self, batch: PageState<T>) -> PageState<V> {
        batch.map_items(|item| (self.map)(item))
    }
}

impl<T: 'static> Mapper<T, T> {
    pub fn identity() -> Self {
        Self::new(|item| item)
    }
}

impl<T, V> Clone for Mapper<T, V> {
    fn clone(&self) -> Self {
        Self {
            map: Arc::clone(&self.map),
        }
    }
}

impl<T, V> std::fmt::Debug for Mapper<T, V> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Mapper").finish_non_exhaustive()
    }
}

//! In-flight call bookkeeping.
//!
//! Each operation kind owns one [`FlightSlot`]. Installing a new call aborts
//! the one it replaces, and every call carries a generation number so a
//! result that was already on its way out when it got replaced can still be
//! recognised as stale and discarded.

use tokio::task::{AbortHandle, Id};

#[derive(Debug)]
struct Flight {
    generation: u64,
    handle: AbortHandle,
}

/// Latest-wins slot for one operation kind.
#[derive(Debug, Default)]
pub(crate) struct FlightSlot {
    current: Option<Flight>,
    issued: u64,
}

impl FlightSlot {
    pub(crate) fn new() -> Self {
        Self::default()
    }

    /// Reserve the generation number for the next call.
    pub(crate) fn next_generation(&mut self) -> u64 {
        self.issued += 1;
        self.issued
    }

    /// Make `generation` the live call. Returns the generation it replaced,
    /// whose task has been aborted.
    pub(crate) fn install(&mut self, generation: u64, handle: AbortHandle) -> Option<u64> {
        let replaced = self.current.replace(Flight { generation, handle });
        replaced.map(|flight| {
            flight.handle.abort();
            flight.generation
        })
    }

    /// Retire the live call if it is `generation`. Returns false for stale
    /// results, which must be ignored.
    pub(crate) fn finish(&mut self, generation: u64) -> bool {
        match &self.current {
            Some(flight) if flight.generation == generation => {
                self.current = None;
                true
            }
            _ => false,
        }
    }

    /// Retire the live call if its task is `id`.
    pub(crate) fn finish_task(&mut self, id: Id) -> bool {
        match &self.current {
            Some(flight) if flight.handle.id() == id => {
                self.current = None;
                true
            }
            _ => false,
        }
    }

    pub(crate) fn is_live(&self) -> bool {
        self.current.is_some()
    }

    /// Abort the live call, if any.
    pub(crate) fn abort(&mut self) {
        if let Some(flight) = self.current.take() {
            flight.handle.abort();
        }
    }
}

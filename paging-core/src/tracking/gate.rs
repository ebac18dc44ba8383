//! Trigger gate.
//!
//! The gate samples the combined busy state of every tracker at the moment a
//! trigger arrives. A closed gate drops the trigger; nothing is queued.

use super::BusyTracker;

/// Drops triggers while any watched tracker is busy.
#[derive(Debug, Clone)]
pub struct TriggerGate {
    watched: Vec<BusyTracker>,
}

impl TriggerGate {
    pub fn new(watched: impl IntoIterator<Item = BusyTracker>) -> Self {
        Self {
            watched: watched.into_iter().collect(),
        }
    }

    /// True when no watched tracker counts an active invocation.
    pub fn is_open(&self) -> bool {
        !self.watched.iter().any(BusyTracker::is_active)
    }

    /// Forward `event` if the gate is open, drop it otherwise.
    pub fn admit<E>(&self, event: E) -> Option<E> {
        self.is_open().then_some(event)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn open_when_nothing_is_busy() {
        let gate = TriggerGate::new([BusyTracker::new(), BusyTracker::new()]);
        assert_eq!(gate.admit("go"), Some("go"));
    }

    #[test]
    fn closed_while_any_tracker_is_busy() {
        let a = BusyTracker::new();
        let b = BusyTracker::new();
        let gate = TriggerGate::new([a.clone(), b.clone()]);

        b.begin();
        assert!(!gate.is_open());
        assert_eq!(gate.admit(1), None);

        b.end();
        assert_eq!(gate.admit(2), Some(2));
    }

    #[test]
    fn dropped_events_are_not_replayed() {
        let a = BusyTracker::new();
        let gate = TriggerGate::new([a.clone()]);

        a.begin();
        let dropped: Vec<_> = (0..3).filter_map(|n| gate.admit(n)).collect();
        a.end();

        assert!(dropped.is_empty());
        assert_eq!(gate.admit(10), Some(10));
    }
}

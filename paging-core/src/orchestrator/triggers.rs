//! Trigger kinds, outcomes and channel-backed trigger sources.

use std::fmt;

use tokio::sync::mpsc;

/// The three operations an orchestrator runs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FetchKind {
    Load,
    Refresh,
    LoadMore,
}

impl FetchKind {
    pub const ALL: [FetchKind; 3] = [FetchKind::Load, FetchKind::Refresh, FetchKind::LoadMore];

    pub(crate) fn index(self) -> usize {
        match self {
            FetchKind::Load => 0,
            FetchKind::Refresh => 1,
            FetchKind::LoadMore => 2,
        }
    }
}

impl fmt::Display for FetchKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            FetchKind::Load => "load",
            FetchKind::Refresh => "refresh",
            FetchKind::LoadMore => "load_more",
        })
    }
}

/// What the gate decided for one trigger.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TriggerOutcome {
    /// A supplier call was started.
    Started,
    /// Something was busy; the trigger was discarded.
    Dropped,
    /// Load-more fired before any items were stored; no call was made.
    NothingToExtend,
}

/// Receiving ends of the three trigger streams.
///
/// Hand these to [`Orchestrator::attach`](crate::Orchestrator::attach).
#[derive(Debug)]
pub struct TriggerSources<U> {
    pub load: mpsc::UnboundedReceiver<U>,
    pub refresh: mpsc::UnboundedReceiver<U>,
    pub load_more: mpsc::UnboundedReceiver<U>,
}

/// Sending ends matching a [`TriggerSources`].
#[derive(Debug)]
pub struct TriggerSenders<U> {
    pub load: mpsc::UnboundedSender<U>,
    pub refresh: mpsc::UnboundedSender<U>,
    pub load_more: mpsc::UnboundedSender<U>,
}

impl<U> Clone for TriggerSenders<U> {
    fn clone(&self) -> Self {
        Self {
            load: self.load.clone(),
            refresh: self.refresh.clone(),
            load_more: self.load_more.clone(),
        }
    }
}

impl<U> TriggerSources<U> {
    /// Create three linked trigger channels.
    pub fn channel() -> (TriggerSenders<U>, TriggerSources<U>) {
        let (load_tx, load_rx) = mpsc::unbounded_channel();
        let (refresh_tx, refresh_rx) = mpsc::unbounded_channel();
        let (load_more_tx, load_more_rx) = mpsc::unbounded_channel();
        (
            TriggerSenders {
                load: load_tx,
                refresh: refresh_tx,
                load_more: load_more_tx,
            },
            TriggerSources {
                load: load_rx,
                refresh: refresh_rx,
                load_more: load_more_rx,
            },
        )
    }

    /// Wait for the next trigger from any source.
    ///
    /// Returns `None` once every sender is gone.
    pub(crate) async fn next(&mut self) -> Option<(FetchKind, U)> {
        // A closed receiver yields None, which disables its branch; `else`
        // runs once all three are closed.
        tokio::select! {
            Some(arg) = self.load.recv() => Some((FetchKind::Load, arg)),
            Some(arg) = self.refresh.recv() => Some((FetchKind::Refresh, arg)),
            Some(arg) = self.load_more.recv() => Some((FetchKind::LoadMore, arg)),
            else => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn kinds_have_distinct_indices() {
        let mut indices: Vec<_> = FetchKind::ALL.iter().map(|k| k.index()).collect();
        indices.sort_unstable();
        indices.dedup();
        assert_eq!(indices, vec![0, 1, 2]);
    }

    #[tokio::test]
    async fn next_tags_each_trigger_with_its_source() {
        let (senders, mut sources) = TriggerSources::channel();
        senders.refresh.send("r").unwrap();
        senders.load_more.send("m").unwrap();
        senders.load.send("l").unwrap();
        drop(senders);

        let mut seen = Vec::new();
        while let Some(event) = sources.next().await {
            seen.push(event);
        }
        seen.sort_by_key(|(kind, _)| kind.index());

        assert_eq!(
            seen,
            vec![
                (FetchKind::Load, "l"),
                (FetchKind::Refresh, "r"),
                (FetchKind::LoadMore, "m"),
            ]
        );
    }

    #[tokio::test]
    async fn next_ends_when_all_senders_drop() {
        let (senders, mut sources) = TriggerSources::<()>::channel();
        drop(senders);
        assert!(sources.next().await.is_none());
    }
}

//! The orchestrator's event loop.
//!
//! All paging logic runs on one task that owns the command queue and the
//! [`JoinSet`] of in-flight supplier calls. Triggers and supplier completions
//! are handled one at a time, so gating, busy flags and page store writes
//! never interleave. Listeners are called on this task; if they fire new
//! triggers those are only queued, never re-entered.

use tokio::sync::{mpsc, oneshot};
use tokio::task::{JoinError, JoinSet};
use tracing::{debug, error, trace, warn};

use super::flight::FlightSlot;
use super::mapper::Mapper;
use super::suppliers::{SupplierFuture, Suppliers};
use super::triggers::{FetchKind, TriggerOutcome};
use crate::page::{PageState, PageStore};
use crate::reactive::EventStream;
use crate::tracking::{BusyTracker, ErrorChannel, TriggerGate};

/// Messages accepted by the event loop.
pub(crate) enum Command<U> {
    Trigger {
        kind: FetchKind,
        arg: U,
        reply: Option<oneshot::Sender<TriggerOutcome>>,
    },
    Shutdown,
}

/// Result of one supplier call, tagged with the call it belongs to.
struct Completion<T, E> {
    kind: FetchKind,
    generation: u64,
    result: Result<PageState<T>, E>,
}

/// Everything the event loop publishes to. Cloned into every handle.
pub(crate) struct Outputs<V, E>
where
    V: Clone + Send + Sync + 'static,
    E: Clone + Send + Sync + 'static,
{
    pub(crate) store: PageStore<V>,
    pub(crate) busy: [BusyTracker; 3],
    pub(crate) errors: ErrorChannel<E>,
    pub(crate) fetch_activity: EventStream<()>,
}

impl<V, E> Outputs<V, E>
where
    V: Clone + Send + Sync + 'static,
    E: Clone + Send + Sync + 'static,
{
    pub(crate) fn new(initial: PageState<V>) -> Self {
        Self {
            store: PageStore::new(initial),
            busy: [BusyTracker::new(), BusyTracker::new(), BusyTracker::new()],
            errors: ErrorChannel::new(),
            fetch_activity: EventStream::new(),
        }
    }

    pub(crate) fn tracker(&self, kind: FetchKind) -> &BusyTracker {
        &self.busy[kind.index()]
    }
}

impl<V, E> Clone for Outputs<V, E>
where
    V: Clone + Send + Sync + 'static,
    E: Clone + Send + Sync + 'static,
{
    fn clone(&self) -> Self {
        Self {
            store: self.store.clone(),
            busy: self.busy.clone(),
            errors: self.errors.clone(),
            fetch_activity: self.fetch_activity.clone(),
        }
    }
}

pub(crate) struct EventLoop<U, T, V, E>
where
    V: Clone + Send + Sync + 'static,
    E: Clone + Send + Sync + 'static,
{
    /// Name attached to log records.
    label: String,
    suppliers: Suppliers<U, T, E>,
    mapper: Mapper<T, V>,
    outputs: Outputs<V, E>,
    gate: TriggerGate,
    /// One latest-wins slot per [`FetchKind`], indexed by `FetchKind::index`.
    slots: [FlightSlot; 3],
    tasks: JoinSet<Completion<T, E>>,
    commands: mpsc::UnboundedReceiver<Command<U>>,
}

impl<U, T, V, E> EventLoop<U, T, V, E>
where
    U: Send + 'static,
    T: Send + 'static,
    V: Clone + Send + Sync + 'static,
    E: Clone + Send + Sync + 'static,
{
    pub(crate) fn new(
        label: String,
        suppliers: Suppliers<U, T, E>,
        mapper: Mapper<T, V>,
        outputs: Outputs<V, E>,
        commands: mpsc::UnboundedReceiver<Command<U>>,
    ) -> Self {
        let gate = TriggerGate::new(outputs.busy.iter().cloned());
        Self {
            label,
            suppliers,
            mapper,
            outputs,
            gate,
            slots: [FlightSlot::new(), FlightSlot::new(), FlightSlot::new()],
            tasks: JoinSet::new(),
            commands,
        }
    }

    /// Process commands and completions until shutdown or until every
    /// handle is dropped.
    pub(crate) async fn run(mut self) {
        debug!(label = %self.label, "paging event loop started");

        loop {
            tokio::select! {
                command = self.commands.recv() => match command {
                    Some(Command::Trigger { kind, arg, reply }) => {
                        let outcome = self.on_trigger(kind, arg);
                        if let Some(reply) = reply {
                            // The caller may have stopped waiting.
                            let _ = reply.send(outcome);
                        }
                    }
                    Some(Command::Shutdown) | None => break,
                },
                Some(joined) = self.tasks.join_next() => self.on_joined(joined),
            }
        }

        let in_flight = self.slots.iter().filter(|slot| slot.is_live()).count();
        for slot in &mut self.slots {
            slot.abort();
        }
        self.tasks.abort_all();
        debug!(label = %self.label, in_flight, "paging event loop stopped");
    }

    fn on_trigger(&mut self, kind: FetchKind, arg: U) -> TriggerOutcome {
        let Some(arg) = self.gate.admit(arg) else {
            trace!(label = %self.label, %kind, "trigger dropped while busy");
            return TriggerOutcome::Dropped;
        };

        let future = match kind {
            FetchKind::Load => self.suppliers.get(arg),
            FetchKind::Refresh => self.suppliers.refresh(arg),
            FetchKind::LoadMore => {
                let (empty, page) = self
                    .outputs
                    .store
                    .with(|state| (state.is_empty(), state.page()));
                if empty {
                    debug!(label = %self.label, "load more skipped, nothing to extend");
                    self.outputs.tracker(kind).emit_idle();
                    self.outputs.fetch_activity.publish(());
                    return TriggerOutcome::NothingToExtend;
                }
                let requested = page.saturating_add(1);
                self.suppliers.load_more(arg, requested)
            }
        };

        self.start(kind, future);
        TriggerOutcome::Started
    }

    fn start(&mut self, kind: FetchKind, future: SupplierFuture<T, E>) {
        // Count the new call before retiring a replaced one so the busy
        // flag never dips to false in between.
        self.outputs.tracker(kind).begin();

        let slot = &mut self.slots[kind.index()];
        let generation = slot.next_generation();
        let handle = self.tasks.spawn(async move {
            Completion {
                kind,
                generation,
                result: future.await,
            }
        });
        debug!(label = %self.label, %kind, generation, "supplier call started");

        if let Some(replaced) = slot.install(generation, handle) {
            debug!(label = %self.label, %kind, generation = replaced, "supplier call cancelled");
            self.outputs.tracker(kind).end();
        }
    }

    fn on_joined(&mut self, joined: Result<Completion<T, E>, JoinError>) {
        match joined {
            Ok(completion) => self.on_completion(completion),
            Err(err) if err.is_cancelled() => {}
            Err(err) => {
                // A panicking supplier leaves no result to publish, but its
                // slot and busy count still have to be released.
                let id = err.id();
                for kind in FetchKind::ALL {
                    if self.slots[kind.index()].finish_task(id) {
                        error!(label = %self.label, %kind, "supplier panicked");
                        self.outputs.tracker(kind).end();
                    }
                }
            }
        }
    }

    fn on_completion(&mut self, completion: Completion<T, E>) {
        let Completion {
            kind,
            generation,
            result,
        } = completion;

        if !self.slots[kind.index()].finish(generation) {
            trace!(label = %self.label, %kind, generation, "stale result discarded");
            return;
        }

        match result {
            Ok(batch) => {
                if self.store(kind, batch) {
                    self.outputs.fetch_activity.publish(());
                }
            }
            Err(error) => {
                warn!(label = %self.label, %kind, generation, "supplier failed");
                self.outputs.errors.push(error);
            }
        }

        self.outputs.tracker(kind).end();
    }

    /// Fold a successful batch into the store. Returns whether it was written.
    fn store(&self, kind: FetchKind, batch: PageState<T>) -> bool {
        match kind {
            FetchKind::Load | FetchKind::Refresh => {
                let next = self.mapper.apply(batch);
                debug!(label = %self.label, %kind, page = next.page(), items = next.len(), "page replaced");
                self.outputs.store.set(next);
                true
            }
            FetchKind::LoadMore if batch.is_empty() => {
                debug!(label = %self.label, page = batch.page(), "load more returned no items");
                false
            }
            FetchKind::LoadMore => {
                // The stored page number is whatever the supplier reported.
                let addition = self.mapper.apply(batch);
                let next = self.outputs.store.with(|current| current.extended(addition));
                debug!(label = %self.label, page = next.page(), items = next.len(), "page extended");
                self.outputs.store.set(next);
                true
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    type Reply = Result<PageState<u32>, String>;

    fn event_loop() -> (EventLoop<oneshot::Receiver<Reply>, u32, u32, String>, Outputs<u32, String>) {
        let suppliers = Suppliers::new(
            |rx: oneshot::Receiver<Reply>| async move { rx.await.unwrap_or_else(|_| Err("dropped".into())) },
            |rx: oneshot::Receiver<Reply>| async move { rx.await.unwrap_or_else(|_| Err("dropped".into())) },
            |rx: oneshot::Receiver<Reply>, _page| async move {
                rx.await.unwrap_or_else(|_| Err("dropped".into()))
            },
        );
        let outputs = Outputs::new(PageState::empty(1));
        let (_commands, receiver) = mpsc::unbounded_channel();
        let event_loop = EventLoop::new(
            "test".to_string(),
            suppliers,
            Mapper::identity(),
            outputs.clone(),
            receiver,
        );
        (event_loop, outputs)
    }

    async fn drain_tasks(event_loop: &mut EventLoop<oneshot::Receiver<Reply>, u32, u32, String>) {
        while let Some(joined) = event_loop.tasks.join_next().await {
            event_loop.on_joined(joined);
        }
    }

    #[tokio::test]
    async fn restarting_a_kind_replaces_the_call_in_flight() {
        let (mut event_loop, outputs) = event_loop();
        let mut busy = outputs.tracker(FetchKind::Load).channel();

        let (first_tx, first_rx) = oneshot::channel();
        let (second_tx, second_rx) = oneshot::channel();
        let first = event_loop.suppliers.get(first_rx);
        event_loop.start(FetchKind::Load, first);
        let second = event_loop.suppliers.get(second_rx);
        event_loop.start(FetchKind::Load, second);

        // Whether or not the first call still hears back, it must not land.
        let _ = first_tx.send(Ok(PageState::new(1, vec![1])));
        let _ = second_tx.send(Ok(PageState::new(1, vec![2])));
        drain_tasks(&mut event_loop).await;

        assert_eq!(outputs.store.current(), PageState::new(1, vec![2]));
        assert_eq!(busy.try_recv().ok(), Some(true));
        assert_eq!(busy.try_recv().ok(), Some(false));
        assert!(busy.try_recv().is_err());
    }

    #[tokio::test]
    async fn stale_completion_is_discarded() {
        let (mut event_loop, outputs) = event_loop();
        let mut fetched = outputs.fetch_activity.channel();

        event_loop.outputs.tracker(FetchKind::Refresh).begin();
        let generation = event_loop.slots[FetchKind::Refresh.index()].next_generation();
        event_loop.on_completion(Completion {
            kind: FetchKind::Refresh,
            generation: generation + 1,
            result: Ok(PageState::new(1, vec![5])),
        });

        assert_eq!(outputs.store.current(), PageState::empty(1));
        assert!(fetched.try_recv().is_err());
        assert!(outputs.tracker(FetchKind::Refresh).is_active());
    }

    #[tokio::test]
    async fn failure_keeps_store_and_clears_flag() {
        let (mut event_loop, outputs) = event_loop();
        let mut errors = outputs.errors.channel();

        let (tx, rx) = oneshot::channel();
        let call = event_loop.suppliers.refresh(rx);
        event_loop.start(FetchKind::Refresh, call);
        tx.send(Err("boom".to_string())).unwrap();
        drain_tasks(&mut event_loop).await;

        assert_eq!(errors.try_recv().ok().as_deref(), Some("boom"));
        assert_eq!(outputs.store.current(), PageState::empty(1));
        assert!(!outputs.tracker(FetchKind::Refresh).get());
    }
}

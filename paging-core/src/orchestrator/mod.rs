//! Paging Orchestrator
//!
//! The orchestrator turns three trigger sources (load, refresh and
//! load-more) into supplier calls and folds their results into one shared
//! [`PageStore`].
//!
//! # Rules
//!
//! - A trigger is dropped if any operation is busy when it arrives. Dropped
//!   triggers are not queued.
//! - Load and refresh replace the stored page wholesale.
//! - Load-more asks for `stored page + 1`, appends the returned items after
//!   the stored ones, and keeps the page number the supplier returned. An
//!   empty result leaves the store alone.
//! - Load-more with nothing stored yet makes no call and re-announces
//!   `loading_more = false`.
//! - A new call of some kind replaces an in-flight call of the same kind.
//! - Supplier errors are republished on the [`ErrorChannel`]. They never
//!   touch the store and never stop the orchestrator.
//!
//! # Implementation Notes
//!
//! Each orchestrator owns a single event-loop task. Handles talk to it over
//! an unbounded command queue, which is what keeps every write and every
//! notification in one order. The loop stops on [`Orchestrator::shutdown`]
//! or when the last handle is dropped.

mod event_loop;
mod flight;
mod mapper;
mod suppliers;
mod triggers;

pub use suppliers::{SupplierFuture, Suppliers};
pub use triggers::{FetchKind, TriggerOutcome, TriggerSenders, TriggerSources};

use tokio::runtime::Handle;
use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tracing::debug;

use crate::config::PagingConfig;
use crate::error::{PagingError, Result};
use crate::page::{PageState, PageStore};
use crate::reactive::EventStream;
use crate::tracking::{BusyTracker, ErrorChannel};
use event_loop::{Command, EventLoop, Outputs};
use mapper::Mapper;

/// Handle to a running paging event loop.
///
/// - `U` is the trigger payload.
/// - `V` is the stored item type.
/// - `E` is the suppliers' error type.
///
/// Handles are cheap to clone and all drive the same loop.
///
/// # Example
///
/// ```rust
/// use paging_core::{Orchestrator, PageState, PagingConfig, Suppliers, TriggerOutcome};
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() -> Result<(), paging_core::PagingError> {
/// let suppliers = Suppliers::<(), u32, String>::unit(
///     || async { Ok(PageState::new(1, vec![1, 2])) },
///     || async { Ok(PageState::new(1, vec![1, 2])) },
///     |page| async move { Ok(PageState::new(page, vec![page * 10])) },
/// );
/// let paging = Orchestrator::new(suppliers, PagingConfig::default())?;
///
/// let mut fetched = paging.fetch_activity().channel();
/// assert_eq!(paging.load(()).await?, TriggerOutcome::Started);
/// fetched.recv().await;
///
/// assert_eq!(paging.page().current().items(), &[1, 2]);
/// # Ok(())
/// # }
/// ```
pub struct Orchestrator<U, V, E>
where
    V: Clone + Send + Sync + 'static,
    E: Clone + Send + Sync + 'static,
{
    commands: mpsc::UnboundedSender<Command<U>>,
    outputs: Outputs<V, E>,
}

impl<U, T, E> Orchestrator<U, T, E>
where
    U: Send + 'static,
    T: Clone + Send + Sync + 'static,
    E: Clone + Send + Sync + 'static,
{
    /// Start an orchestrator that stores fetched items as they are.
    ///
    /// Must be called from within a tokio runtime.
    pub fn new(suppliers: Suppliers<U, T, E>, config: PagingConfig) -> Result<Self> {
        Self::spawn(suppliers, Mapper::identity(), config)
    }
}

impl<U, V, E> Orchestrator<U, V, E>
where
    U: Send + 'static,
    V: Clone + Send + Sync + 'static,
    E: Clone + Send + Sync + 'static,
{
    /// Start an orchestrator that maps every fetched item before storing it.
    ///
    /// Each item is mapped exactly once, when its batch is stored.
    pub fn with_mapper<T, F>(
        suppliers: Suppliers<U, T, E>,
        mapper: F,
        config: PagingConfig,
    ) -> Result<Self>
    where
        T: Send + 'static,
        F: Fn(T) -> V + Send + Sync + 'static,
    {
        Self::spawn(suppliers, Mapper::new(mapper), config)
    }

    fn spawn<T>(suppliers: Suppliers<U, T, E>, mapper: Mapper<T, V>, config: PagingConfig) -> Result<Self>
    where
        T: Send + 'static,
    {
        config.validate()?;
        let runtime = Handle::try_current().map_err(|_| PagingError::NoRuntime)?;

        let outputs = Outputs::new(PageState::empty(config.first_page));
        let (commands, receiver) = mpsc::unbounded_channel();
        let event_loop = EventLoop::new(config.label, suppliers, mapper, outputs.clone(), receiver);
        runtime.spawn(event_loop.run());

        Ok(Self { commands, outputs })
    }

    /// Fire a load trigger and wait for the gate's verdict.
    pub async fn load(&self, arg: U) -> Result<TriggerOutcome> {
        self.trigger(FetchKind::Load, arg).await
    }

    /// Fire a refresh trigger and wait for the gate's verdict.
    pub async fn refresh(&self, arg: U) -> Result<TriggerOutcome> {
        self.trigger(FetchKind::Refresh, arg).await
    }

    /// Fire a load-more trigger and wait for the gate's verdict.
    pub async fn load_more(&self, arg: U) -> Result<TriggerOutcome> {
        self.trigger(FetchKind::LoadMore, arg).await
    }

    /// Fire a trigger and wait until the event loop has gated it.
    ///
    /// This does not wait for the supplier call itself.
    pub async fn trigger(&self, kind: FetchKind, arg: U) -> Result<TriggerOutcome> {
        let (reply, outcome) = oneshot::channel();
        self.commands
            .send(Command::Trigger {
                kind,
                arg,
                reply: Some(reply),
            })
            .map_err(|_| PagingError::ShutDown)?;
        outcome.await.map_err(|_| PagingError::ShutDown)
    }

    /// Queue a trigger without waiting for it to be gated.
    ///
    /// Safe to call from inside a listener callback.
    pub fn fire(&self, kind: FetchKind, arg: U) -> Result<()> {
        self.commands
            .send(Command::Trigger {
                kind,
                arg,
                reply: None,
            })
            .map_err(|_| PagingError::ShutDown)
    }

    /// Forward every event from `sources` as a trigger.
    ///
    /// The forwarding task ends when all three senders are dropped or when
    /// the event loop goes away. It does not keep the event loop alive.
    pub fn attach(&self, mut sources: TriggerSources<U>) -> Result<JoinHandle<()>> {
        let runtime = Handle::try_current().map_err(|_| PagingError::NoRuntime)?;
        let commands = self.commands.downgrade();

        Ok(runtime.spawn(async move {
            while let Some((kind, arg)) = sources.next().await {
                let Some(commands) = commands.upgrade() else {
                    break;
                };
                if commands
                    .send(Command::Trigger {
                        kind,
                        arg,
                        reply: None,
                    })
                    .is_err()
                {
                    break;
                }
            }
            debug!("trigger sources detached");
        }))
    }

    /// Stop the event loop and abort any in-flight supplier call.
    ///
    /// Triggers fired afterwards fail with [`PagingError::ShutDown`].
    pub fn shutdown(&self) {
        // Already gone if this fails.
        let _ = self.commands.send(Command::Shutdown);
    }

    pub fn is_shut_down(&self) -> bool {
        self.commands.is_closed()
    }

    /// The shared page store, initially `{ first_page, [] }`.
    pub fn page(&self) -> &PageStore<V> {
        &self.outputs.store
    }

    pub fn loading(&self) -> &BusyTracker {
        self.outputs.tracker(FetchKind::Load)
    }

    pub fn refreshing(&self) -> &BusyTracker {
        self.outputs.tracker(FetchKind::Refresh)
    }

    pub fn loading_more(&self) -> &BusyTracker {
        self.outputs.tracker(FetchKind::LoadMore)
    }

    /// Busy tracker for `kind`.
    pub fn busy(&self, kind: FetchKind) -> &BusyTracker {
        self.outputs.tracker(kind)
    }

    /// Whether any operation is in flight.
    pub fn is_busy(&self) -> bool {
        self.outputs.busy.iter().any(BusyTracker::is_active)
    }

    /// Supplier errors, republished without ever closing.
    pub fn error(&self) -> &ErrorChannel<E> {
        &self.outputs.errors
    }

    /// Fires once per completed cycle: every successful supplier call that
    /// wrote the store and every load-more skipped for lack of a base page.
    pub fn fetch_activity(&self) -> &EventStream<()> {
        &self.outputs.fetch_activity
    }
}

impl<U, V, E> Clone for Orchestrator<U, V, E>
where
    V: Clone + Send + Sync + 'static,
    E: Clone + Send + Sync + 'static,
{
    fn clone(&self) -> Self {
        Self {
            commands: self.commands.clone(),
            outputs: self.outputs.clone(),
        }
    }
}

impl<U, V, E> std::fmt::Debug for Orchestrator<U, V, E>
where
    V: Clone + Send + Sync + 'static,
    E: Clone + Send + Sync + 'static,
{
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Orchestrator")
            .field("shut_down", &self.commands.is_closed())
            .field("loading", &self.outputs.busy[0].get())
            .field("refreshing", &self.outputs.busy[1].get())
            .field("loading_more", &self.outputs.busy[2].get())
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ConfigError;

    fn fixed_suppliers() -> Suppliers<(), u32, String> {
        Suppliers::unit(
            || async { Ok(PageState::new(1, vec![1, 2, 3])) },
            || async { Ok(PageState::new(1, vec![9])) },
            |page| async move { Ok(PageState::new(page, vec![page])) },
        )
    }

    #[test]
    fn new_requires_runtime() {
        let err = Orchestrator::new(fixed_suppliers(), PagingConfig::default()).unwrap_err();
        assert!(matches!(err, PagingError::NoRuntime));
    }

    #[tokio::test]
    async fn new_rejects_invalid_config() {
        let config = PagingConfig {
            first_page: 0,
            ..PagingConfig::default()
        };
        let err = Orchestrator::new(fixed_suppliers(), config).unwrap_err();
        assert!(matches!(
            err,
            PagingError::Config(ConfigError::InvalidFirstPage { page: 0 })
        ));
    }

    #[tokio::test]
    async fn initial_page_uses_first_page() {
        let config = PagingConfig {
            first_page: 4,
            ..PagingConfig::default()
        };
        let paging = Orchestrator::new(fixed_suppliers(), config).unwrap();

        assert_eq!(paging.page().current(), PageState::empty(4));
        assert!(!paging.is_busy());
        assert!(!paging.loading().get());
        assert!(!paging.refreshing().get());
        assert!(!paging.loading_more().get());
    }

    #[tokio::test]
    async fn triggers_fail_after_shutdown() {
        let paging = Orchestrator::new(fixed_suppliers(), PagingConfig::default()).unwrap();
        paging.shutdown();

        let err = paging.load(()).await.unwrap_err();
        assert!(matches!(err, PagingError::ShutDown));
        assert!(paging.is_shut_down());
        assert!(matches!(paging.fire(FetchKind::Refresh, ()), Err(PagingError::ShutDown)));
    }

    #[tokio::test]
    async fn attached_sources_do_not_keep_the_loop_alive() {
        let paging = Orchestrator::new(fixed_suppliers(), PagingConfig::default()).unwrap();
        let (senders, sources) = TriggerSources::channel();
        let forwarder = paging.attach(sources).unwrap();

        drop(paging);
        senders.load.send(()).unwrap();

        tokio::time::timeout(std::time::Duration::from_secs(1), forwarder)
            .await
            .expect("forwarder should stop once the orchestrator is gone")
            .unwrap();
    }
}

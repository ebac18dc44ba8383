//! Paging Core
//!
//! This crate coordinates paginated loading for a client that holds "the
//! current page of items". It implements:
//!
//! - Reactive primitives (signals, event streams, subscriptions)
//! - Busy tracking and the trigger gate that keeps operations exclusive
//! - A non-terminating error channel for supplier failures
//! - The orchestrator that drives load, refresh and load-more suppliers
//!
//! Fetching itself is the caller's business: the orchestrator is handed
//! three async *suppliers* and only decides when to call them and how to
//! merge what they return.
//!
//! # Architecture
//!
//! The crate is organized into several modules:
//!
//! - `reactive`: latest-value signals and publish-only event streams
//! - `page`: the immutable `PageState` snapshot and the shared `PageStore`
//! - `tracking`: busy trackers, the trigger gate and the error channel
//! - `orchestrator`: the event loop wiring triggers to suppliers
//! - `config` / `error`: construction settings and crate error types
//!
//! # Example
//!
//! ```rust,ignore
//! use paging_core::{Orchestrator, PagingConfig, Suppliers};
//!
//! let paging = Orchestrator::with_mapper(
//!     Suppliers::new(api.search, api.search, api.search_page),
//!     |row: Row| RowView::from(row),
//!     PagingConfig::labeled("search"),
//! )?;
//!
//! let _sub = paging.page().subscribe(|state| render(state.items()));
//! paging.load(query.clone()).await?;
//! paging.load_more(query).await?;
//! ```

pub mod config;
pub mod error;
pub mod orchestrator;
pub mod page;
pub mod reactive;
pub mod tracking;

pub use config::PagingConfig;
pub use error::{ConfigError, PagingError};
pub use orchestrator::{
    FetchKind, Orchestrator, SupplierFuture, Suppliers, TriggerOutcome, TriggerSenders,
    TriggerSources,
};
pub use page::{PageState, PageStore};

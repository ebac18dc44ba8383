//! Reactive Primitives
//!
//! This module implements the observable building blocks the paging
//! orchestrator publishes through.
//!
//! # Concepts
//!
//! ## Signals
//!
//! A Signal is a container for the latest value of some state. Reading it
//! never blocks on I/O, and every write notifies its listeners synchronously,
//! in the order they subscribed.
//!
//! ## Event Streams
//!
//! An EventStream has no current value. It broadcasts each published value to
//! whoever is subscribed at that moment. Nothing ever terminates a stream,
//! which is what lets errors flow through one without tearing anything down.
//!
//! ## Subscriptions
//!
//! Subscribing returns a [`Subscription`] guard. Dropping it removes the
//! callback. For async consumers, `channel()` returns a tokio receiver
//! instead; its forwarding callback goes away when the receiver is dropped.

mod event;
mod signal;
mod subscriber;

pub use event::EventStream;
pub use signal::Signal;
pub use subscriber::{SubscriberId, Subscription};

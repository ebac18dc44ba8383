//! Activity and error tracking.
//!
//! These are the side channels the orchestrator reports through: one
//! [`BusyTracker`] per operation kind, a [`TriggerGate`] that samples all of
//! them, and the [`ErrorChannel`] that supplier failures are republished on.

mod busy;
mod errors;
mod gate;

pub use busy::BusyTracker;
pub use errors::ErrorChannel;
pub use gate::TriggerGate;

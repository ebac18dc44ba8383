//! Error types for the paging core.
//!
//! Supplier failures are not represented here. They belong to the caller's
//! error type and travel through the
//! [`ErrorChannel`](crate::tracking::ErrorChannel). The types below cover
//! misuse of the orchestrator itself.

use thiserror::Error;

/// Errors raised while building or driving an orchestrator.
#[derive(Error, Debug)]
pub enum PagingError {
    #[error("invalid paging configuration: {0}")]
    Config(#[from] ConfigError),

    #[error("no tokio runtime is available to host the paging event loop")]
    NoRuntime,

    #[error("the paging event loop has shut down")]
    ShutDown,
}

/// Errors raised while loading or validating a [`PagingConfig`](crate::PagingConfig).
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("first_page must be at least 1, got {page}")]
    InvalidFirstPage { page: u32 },

    #[error("failed to parse config: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Result alias for orchestrator operations.
pub type Result<T> = std::result::Result<T, PagingError>;

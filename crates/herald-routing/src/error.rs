//! Dispatch engine error types.

use herald_core::ValidationError;
use thiserror::Error;

/// Errors raised by the dispatch engine to its caller.
///
/// Per-channel delivery failures never appear here; they are folded into
/// `success:false` channel responses inside the routing result. Only a
/// malformed request and the nothing-to-deliver-to case are raised.
#[derive(Debug, Error)]
pub enum RouterError {
    /// The request failed validation; no plugin was invoked.
    #[error("Validation error: {0}")]
    Validation(#[from] ValidationError),

    /// No requested channel resolved to an available plugin.
    #[error("No deliverable channels (requested: {requested:?})")]
    NoChannelsResolved {
        /// The channel names the caller asked for.
        requested: Vec<String>,
    },
}

/// Result type for routing operations.
pub type Result<T> = std::result::Result<T, RouterError>;

//! Error types for Herald core.

use thiserror::Error;

/// Errors raised when a request fails validation before dispatch.
///
/// Validation runs before any plugin is invoked; a request that fails here
/// causes zero channel deliveries.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum ValidationError {
    /// The notification title is empty or whitespace-only.
    #[error("Notification title must not be empty")]
    EmptyTitle,

    /// The notification message is empty or whitespace-only.
    #[error("Notification message must not be empty")]
    EmptyMessage,

    /// The requested channel list is empty.
    #[error("No channels requested")]
    NoChannels,
}

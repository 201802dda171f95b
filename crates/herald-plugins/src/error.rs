//! Plugin error types.

use thiserror::Error;

/// Errors raised by plugins and the plugin registry.
#[derive(Debug, Error)]
pub enum PluginError {
    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Candidate failed contract validation and was not registered.
    #[error("Plugin rejected: {0}")]
    Rejected(String),

    /// Plugin not found.
    #[error("Plugin not found: {0}")]
    NotFound(String),

    /// Plugin already registered.
    #[error("Plugin already registered: {0}")]
    AlreadyRegistered(String),

    /// Plugin is not ready to deliver (missing credentials, probe failed).
    #[error("Plugin unavailable: {0}")]
    Unavailable(String),

    /// Notification failed the plugin's own validation.
    #[error("Invalid notification: {0}")]
    InvalidNotification(String),

    /// Delivery failed at the provider.
    #[error("Send failed: {0}")]
    Send(String),

    /// HTTP request error.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON serialization/deserialization error.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// I/O error.
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl PluginError {
    /// Create a configuration error.
    pub fn config(msg: impl Into<String>) -> Self {
        Self::Config(msg.into())
    }

    /// Create a rejection error.
    pub fn rejected(msg: impl Into<String>) -> Self {
        Self::Rejected(msg.into())
    }

    /// Create a not found error.
    pub fn not_found(name: impl Into<String>) -> Self {
        Self::NotFound(name.into())
    }

    /// Create an unavailable error.
    pub fn unavailable(msg: impl Into<String>) -> Self {
        Self::Unavailable(msg.into())
    }

    /// Create a send error.
    pub fn send(msg: impl Into<String>) -> Self {
        Self::Send(msg.into())
    }

    /// Create an invalid notification error.
    pub fn invalid(msg: impl Into<String>) -> Self {
        Self::InvalidNotification(msg.into())
    }
}

/// Result type for plugin operations.
pub type Result<T> = std::result::Result<T, PluginError>;

//! Notification request types.

use crate::error::ValidationError;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Severity level of a notification.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NotificationLevel {
    /// Informational notification.
    #[default]
    Info,

    /// Something needs attention.
    Warning,

    /// Something went wrong.
    Error,
}

impl NotificationLevel {
    /// Get the level as a lowercase string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Info => "info",
            Self::Warning => "warning",
            Self::Error => "error",
        }
    }
}

impl std::fmt::Display for NotificationLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A notification to deliver across one or more channels.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct NotificationRequest {
    /// Notification title. Must be non-empty.
    pub title: String,

    /// Notification body. Must be non-empty.
    pub message: String,

    /// Severity level.
    #[serde(default)]
    pub level: NotificationLevel,

    /// Free-form metadata forwarded to plugins.
    #[serde(default)]
    pub metadata: HashMap<String, serde_json::Value>,

    /// Per-channel option overrides, keyed by channel name.
    #[serde(default)]
    pub channel_options: HashMap<String, serde_json::Value>,
}

impl NotificationRequest {
    /// Create a new notification with the default level.
    pub fn new(title: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            message: message.into(),
            level: NotificationLevel::default(),
            metadata: HashMap::new(),
            channel_options: HashMap::new(),
        }
    }

    /// Set the severity level.
    pub fn with_level(mut self, level: NotificationLevel) -> Self {
        self.level = level;
        self
    }

    /// Add a metadata entry.
    pub fn with_metadata(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.metadata.insert(key.into(), value);
        self
    }

    /// Set the options for a specific channel.
    pub fn with_channel_options(
        mut self,
        channel: impl Into<String>,
        options: serde_json::Value,
    ) -> Self {
        self.channel_options.insert(channel.into(), options);
        self
    }

    /// Get the options for a specific channel, if any.
    pub fn options_for(&self, channel: &str) -> Option<&serde_json::Value> {
        self.channel_options.get(channel)
    }

    /// Validate the request.
    ///
    /// Runs before any dispatch; a request failing here never reaches a
    /// plugin.
    pub fn validate(&self) -> Result<(), ValidationError> {
        if self.title.trim().is_empty() {
            return Err(ValidationError::EmptyTitle);
        }
        if self.message.trim().is_empty() {
            return Err(ValidationError::EmptyMessage);
        }
        Ok(())
    }
}

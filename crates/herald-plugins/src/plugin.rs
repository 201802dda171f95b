//! The channel provider contract.

use crate::descriptor::PluginDescriptor;
use crate::error::{PluginError, Result};
use async_trait::async_trait;
use herald_core::types::NotificationRequest;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

/// Lifecycle state of a registered plugin.
///
/// The registry owns the state; plugins never transition themselves.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PluginState {
    /// Instance exists but `setup` has not run.
    Unconfigured,

    /// `setup` is in progress.
    Configuring,

    /// Configured and available for dispatch.
    Ready,

    /// Configured, but the availability probe failed. Still eligible for
    /// dispatch if the probe recovers by resolution time.
    Unavailable,

    /// `cleanup` ran and resources were released. Excluded from dispatch
    /// until re-enabled.
    Disabled,

    /// `setup` raised an unrecovered error. Excluded from dispatch until
    /// an explicit reload.
    Failed,
}

impl PluginState {
    /// Whether the dispatch engine may consider this plugin at all.
    ///
    /// `Unavailable` stays eligible so a recovered probe re-admits the
    /// channel without registry intervention; `Disabled` and `Failed`
    /// require an explicit enable/reload.
    pub fn is_dispatchable(&self) -> bool {
        matches!(self, Self::Ready | Self::Unavailable)
    }
}

/// Receipt returned by a successful plugin send.
#[derive(Debug, Clone, Default)]
pub struct SendReceipt {
    /// Human-readable delivery confirmation.
    pub message: String,

    /// Adapter-specific metadata (provider message id, status code, ...).
    pub metadata: HashMap<String, serde_json::Value>,
}

impl SendReceipt {
    /// Create a receipt with a confirmation message.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            metadata: HashMap::new(),
        }
    }

    /// Add a metadata entry.
    pub fn with_metadata(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.metadata.insert(key.into(), value);
        self
    }
}

/// Health snapshot for a plugin.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PluginHealth {
    /// Whether the plugin considers itself deliverable.
    pub healthy: bool,

    /// Optional diagnostic message.
    pub message: Option<String>,

    /// When the snapshot was taken.
    pub last_check: chrono::DateTime<chrono::Utc>,

    /// Adapter-specific diagnostics.
    pub metrics: HashMap<String, serde_json::Value>,
}

impl PluginHealth {
    /// Create a healthy snapshot.
    pub fn healthy() -> Self {
        Self {
            healthy: true,
            message: None,
            last_check: chrono::Utc::now(),
            metrics: HashMap::new(),
        }
    }

    /// Create an unhealthy snapshot.
    pub fn unhealthy(message: impl Into<String>) -> Self {
        Self {
            healthy: false,
            message: Some(message.into()),
            last_check: chrono::Utc::now(),
            metrics: HashMap::new(),
        }
    }

    /// Add a diagnostic metric.
    pub fn with_metric(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.metrics.insert(key.into(), value);
        self
    }
}

/// The capability contract every channel provider implements.
///
/// Business-level delivery failures must surface as `Err` values, never
/// panics; the dispatch engine converts them into failed channel
/// responses. A panic escaping `send` is caught by the engine and treated
/// like any other delivery failure.
#[async_trait]
pub trait NotificationPlugin: Send + Sync {
    /// Static descriptor for this plugin.
    fn descriptor(&self) -> &PluginDescriptor;

    /// Deliver one notification through this channel.
    ///
    /// `options` carries the caller's per-channel overrides, if any.
    async fn send(
        &self,
        notification: &NotificationRequest,
        options: Option<&serde_json::Value>,
    ) -> Result<SendReceipt>;

    /// Check that a notification is deliverable through this channel.
    async fn validate(&self, notification: &NotificationRequest) -> Result<()> {
        notification
            .validate()
            .map_err(|e| PluginError::invalid(e.to_string()))
    }

    /// Cheap, side-effect-free readiness check. Never fails.
    async fn is_available(&self) -> bool;

    /// Merge configuration and prepare resources.
    ///
    /// May probe the environment (credentials, connectivity). A probe
    /// failure should surface as [`PluginError::Unavailable`] so the
    /// registry degrades the instance instead of marking it failed.
    async fn setup(&mut self, _config: serde_json::Value) -> Result<()> {
        Ok(())
    }

    /// Release held resources and reset to an unconfigured state.
    async fn cleanup(&mut self) -> Result<()> {
        Ok(())
    }

    /// Best-effort diagnostic snapshot.
    ///
    /// Implementations must convert internal errors into an unhealthy
    /// snapshot rather than returning an error.
    async fn health_check(&self) -> PluginHealth {
        if self.is_available().await {
            PluginHealth::healthy()
        } else {
            PluginHealth::unhealthy("availability probe failed")
        }
    }
}

/// Factory producing plugin instances for the registry.
///
/// Registration goes through explicit factories rather than runtime
/// introspection; the trait bound is the capability check.
pub trait PluginFactory: Send + Sync {
    /// Descriptor of the plugin this factory creates.
    fn descriptor(&self) -> PluginDescriptor;

    /// Create a fresh, unconfigured instance.
    fn create(&self) -> Box<dyn NotificationPlugin>;
}

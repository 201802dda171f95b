//! Delivery outcome types.

use crate::types::NotificationRequest;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::Duration;

/// Outcome of delivering one notification to one channel.
///
/// Always produced for any settled attempt sequence, whether the channel
/// succeeded, exhausted its retries, or timed out. A raw fault never
/// replaces it.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ChannelResponse {
    /// Name of the channel this response belongs to.
    pub channel: String,

    /// Whether delivery succeeded.
    pub success: bool,

    /// Human-readable outcome. On failure this carries the last attempt's
    /// error.
    pub message: String,

    /// Adapter-specific metadata (provider message id, status codes, ...).
    #[serde(default)]
    pub metadata: HashMap<String, serde_json::Value>,

    /// When the attempt sequence settled.
    pub timestamp: DateTime<Utc>,

    /// Wall-clock time spent on the channel, including retries.
    pub duration_ms: u64,

    /// Number of send attempts made.
    pub attempts: u32,
}

impl ChannelResponse {
    /// Create a successful response.
    pub fn delivered(channel: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            channel: channel.into(),
            success: true,
            message: message.into(),
            metadata: HashMap::new(),
            timestamp: Utc::now(),
            duration_ms: 0,
            attempts: 1,
        }
    }

    /// Create a failed response.
    pub fn failed(channel: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            success: false,
            ..Self::delivered(channel, message)
        }
    }

    /// Add a metadata entry.
    pub fn with_metadata(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.metadata.insert(key.into(), value);
        self
    }

    /// Set the attempt count.
    pub fn with_attempts(mut self, attempts: u32) -> Self {
        self.attempts = attempts;
        self
    }

    /// Set the elapsed duration.
    pub fn with_duration(mut self, duration: Duration) -> Self {
        self.duration_ms = duration.as_millis() as u64;
        self
    }
}

/// Aggregated outcome of one `route()` invocation.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoutingResult {
    /// Delivery ID assigned by the tracker.
    pub delivery_id: String,

    /// True iff at least one channel delivered. Partial delivery counts as
    /// success at this level; callers must compare the counts below.
    pub success: bool,

    /// Number of channels actually dispatched to (resolved at dispatch
    /// time, not the number originally requested).
    pub total_channels: usize,

    /// Channels that delivered.
    pub successful_channels: usize,

    /// Channels that failed after exhausting retries.
    pub failed_channels: usize,

    /// Percentage of channels that delivered (0-100).
    pub success_rate: f64,

    /// Per-channel responses in completion order, not request order.
    pub responses: Vec<ChannelResponse>,

    /// Human-readable summary.
    pub summary: String,
}

impl RoutingResult {
    /// Aggregate a set of settled channel responses.
    pub fn from_responses(delivery_id: impl Into<String>, responses: Vec<ChannelResponse>) -> Self {
        let total_channels = responses.len();
        let successful_channels = responses.iter().filter(|r| r.success).count();
        let failed_channels = total_channels - successful_channels;
        let success_rate = if total_channels == 0 {
            0.0
        } else {
            successful_channels as f64 / total_channels as f64 * 100.0
        };

        Self {
            delivery_id: delivery_id.into(),
            success: successful_channels > 0,
            total_channels,
            successful_channels,
            failed_channels,
            success_rate,
            summary: format!(
                "Delivered to {}/{} channels",
                successful_channels, total_channels
            ),
            responses,
        }
    }
}

/// Persisted form of a routing result, kept for history and statistics.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeliveryRecord {
    /// Snapshot of the originating notification.
    pub notification: NotificationRequest,

    /// Channel names as requested by the caller.
    pub requested_channels: Vec<String>,

    /// The aggregated routing result.
    pub result: RoutingResult,

    /// When the dispatch started.
    pub started_at: DateTime<Utc>,

    /// When the dispatch settled.
    pub finished_at: DateTime<Utc>,
}

impl DeliveryRecord {
    /// End-to-end delivery time in milliseconds.
    pub fn duration_ms(&self) -> i64 {
        (self.finished_at - self.started_at).num_milliseconds()
    }
}

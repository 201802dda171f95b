//! Delivery tracking and rolling statistics.

use chrono::{DateTime, Utc};
use herald_core::id;
use herald_core::types::{DeliveryRecord, NotificationRequest, RoutingResult};
use serde::{Deserialize, Serialize};
use std::collections::{HashMap, VecDeque};
use tokio::sync::RwLock;
use tracing::{debug, warn};

/// Configuration for the delivery tracker.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TrackerConfig {
    /// Maximum delivery records kept in history. Oldest records are
    /// evicted first.
    pub history_size: usize,
}

impl Default for TrackerConfig {
    fn default() -> Self {
        Self { history_size: 100 }
    }
}

/// A delivery that has started but not yet settled.
#[derive(Debug, Clone, Serialize)]
pub struct InflightDelivery {
    /// Delivery ID.
    pub delivery_id: String,

    /// Snapshot of the originating notification.
    pub notification: NotificationRequest,

    /// Channel names being dispatched to.
    pub channels: Vec<String>,

    /// When the dispatch started.
    pub started_at: DateTime<Utc>,
}

/// Tracks in-flight deliveries and a bounded, FIFO-evicted history.
///
/// Statistics are folded over the full history on demand rather than
/// maintained as live counters; the bounded history keeps that cheap.
/// The router's completion path is the only writer, but both structures
/// take an `RwLock` because the runtime schedules tasks preemptively
/// across threads.
pub struct DeliveryTracker {
    config: TrackerConfig,
    inflight: RwLock<HashMap<String, InflightDelivery>>,
    history: RwLock<VecDeque<DeliveryRecord>>,
}

impl Default for DeliveryTracker {
    fn default() -> Self {
        Self::new(TrackerConfig::default())
    }
}

impl DeliveryTracker {
    /// Create a tracker with the given configuration.
    pub fn new(config: TrackerConfig) -> Self {
        Self {
            config,
            inflight: RwLock::new(HashMap::new()),
            history: RwLock::new(VecDeque::new()),
        }
    }

    /// Record the start of a dispatch and return its delivery ID.
    pub async fn begin(&self, notification: &NotificationRequest, channels: &[String]) -> String {
        let delivery_id = id::delivery_id();
        let entry = InflightDelivery {
            delivery_id: delivery_id.clone(),
            notification: notification.clone(),
            channels: channels.to_vec(),
            started_at: Utc::now(),
        };

        let mut inflight = self.inflight.write().await;
        inflight.insert(delivery_id.clone(), entry);
        debug!(delivery_id = %delivery_id, channels = channels.len(), "delivery started");
        delivery_id
    }

    /// Record the completion of a dispatch, moving it from the in-flight
    /// map into history.
    ///
    /// Returns the stored record, or `None` for an unknown delivery ID.
    pub async fn complete(
        &self,
        delivery_id: &str,
        result: RoutingResult,
    ) -> Option<DeliveryRecord> {
        let entry = {
            let mut inflight = self.inflight.write().await;
            inflight.remove(delivery_id)
        };

        let Some(entry) = entry else {
            warn!(delivery_id = %delivery_id, "completion for unknown delivery");
            return None;
        };

        let record = DeliveryRecord {
            notification: entry.notification,
            requested_channels: entry.channels,
            result,
            started_at: entry.started_at,
            finished_at: Utc::now(),
        };

        let mut history = self.history.write().await;
        history.push_back(record.clone());
        while history.len() > self.config.history_size {
            history.pop_front();
        }

        debug!(delivery_id = %delivery_id, "delivery settled");
        Some(record)
    }

    /// Deliveries currently in flight.
    pub async fn active(&self) -> Vec<InflightDelivery> {
        let inflight = self.inflight.read().await;
        inflight.values().cloned().collect()
    }

    /// The full stored history, oldest first.
    pub async fn history(&self) -> Vec<DeliveryRecord> {
        let history = self.history.read().await;
        history.iter().cloned().collect()
    }

    /// The most recent `n` records, oldest first.
    pub async fn recent(&self, n: usize) -> Vec<DeliveryRecord> {
        let history = self.history.read().await;
        history
            .iter()
            .skip(history.len().saturating_sub(n))
            .cloned()
            .collect()
    }

    /// Fold statistics over the stored history.
    ///
    /// Recomputed from scratch on every call; two calls with no
    /// intervening deliveries return identical output.
    pub async fn get_delivery_stats(&self) -> DeliveryStats {
        let history = self.history.read().await;

        let mut stats = DeliveryStats {
            total_deliveries: history.len(),
            ..Default::default()
        };

        struct ChannelAcc {
            attempts: u64,
            successes: u64,
            failures: u64,
            total_duration_ms: u64,
        }
        let mut channels: HashMap<String, ChannelAcc> = HashMap::new();
        let mut total_delivery_ms: i64 = 0;

        for record in history.iter() {
            if record.result.success {
                stats.successful_deliveries += 1;
            } else {
                stats.failed_deliveries += 1;
            }
            total_delivery_ms += record.duration_ms();

            for response in &record.result.responses {
                let acc = channels
                    .entry(response.channel.clone())
                    .or_insert(ChannelAcc {
                        attempts: 0,
                        successes: 0,
                        failures: 0,
                        total_duration_ms: 0,
                    });
                acc.attempts += u64::from(response.attempts);
                if response.success {
                    acc.successes += 1;
                } else {
                    acc.failures += 1;
                }
                acc.total_duration_ms += response.duration_ms;
            }
        }

        if stats.total_deliveries > 0 {
            stats.success_rate =
                stats.successful_deliveries as f64 / stats.total_deliveries as f64 * 100.0;
            stats.average_delivery_ms = total_delivery_ms as f64 / stats.total_deliveries as f64;
        }

        stats.channels = channels
            .into_iter()
            .map(|(name, acc)| {
                let settled = acc.successes + acc.failures;
                (
                    name,
                    ChannelStats {
                        attempts: acc.attempts,
                        successes: acc.successes,
                        failures: acc.failures,
                        average_duration_ms: if settled > 0 {
                            acc.total_duration_ms as f64 / settled as f64
                        } else {
                            0.0
                        },
                    },
                )
            })
            .collect();

        stats
    }
}

/// Aggregate delivery statistics folded over the stored history.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DeliveryStats {
    /// Deliveries in the history window.
    pub total_deliveries: usize,

    /// Deliveries where at least one channel succeeded.
    pub successful_deliveries: usize,

    /// Deliveries where every channel failed.
    pub failed_deliveries: usize,

    /// Percentage of successful deliveries (0-100).
    pub success_rate: f64,

    /// Mean end-to-end delivery time in milliseconds.
    pub average_delivery_ms: f64,

    /// Per-channel statistics.
    pub channels: HashMap<String, ChannelStats>,
}

/// Per-channel delivery statistics.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ChannelStats {
    /// Total send attempts, including retries.
    pub attempts: u64,

    /// Settled outcomes that succeeded.
    pub successes: u64,

    /// Settled outcomes that failed.
    pub failures: u64,

    /// Mean per-channel delivery time in milliseconds.
    pub average_duration_ms: f64,
}

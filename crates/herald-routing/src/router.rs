//! The channel dispatch engine.

use crate::error::{Result, RouterError};
use crate::events::RouterEvent;
use crate::tracker::DeliveryTracker;
use futures::stream::{FuturesUnordered, StreamExt};
use futures::FutureExt;
use herald_core::types::{ChannelResponse, NotificationRequest, RoutingResult};
use herald_core::ValidationError;
use herald_plugins::{PluginRegistry, RegisteredPlugin};
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::broadcast;
use tracing::{debug, info, warn};

/// Dispatch policy knobs.
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
pub struct RouterConfig {
    /// Maximum channel attempts in flight at once.
    pub max_concurrency: usize,

    /// Per-attempt send timeout.
    pub send_timeout: Duration,

    /// Maximum delivery attempts per channel.
    pub retry_attempts: u32,

    /// Fixed delay between attempts. No exponential growth at this layer;
    /// adapters may back off internally for their own network calls.
    pub retry_delay: Duration,
}

impl Default for RouterConfig {
    fn default() -> Self {
        Self {
            max_concurrency: 5,
            send_timeout: Duration::from_secs(30),
            retry_attempts: 3,
            retry_delay: Duration::from_secs(2),
        }
    }
}

/// Fans one notification out to every resolvable channel.
///
/// Channels dispatch in consecutive batches of at most
/// `max_concurrency`; a batch starts only after every member of the
/// previous batch has settled, so the concurrency ceiling is exact.
/// Within a batch, responses aggregate in completion order, which is not
/// the request order.
pub struct ChannelRouter {
    registry: Arc<PluginRegistry>,
    tracker: Arc<DeliveryTracker>,
    config: RouterConfig,
    events: broadcast::Sender<RouterEvent>,
}

impl ChannelRouter {
    /// Create a router with the default policy.
    pub fn new(registry: Arc<PluginRegistry>, tracker: Arc<DeliveryTracker>) -> Self {
        Self::with_config(registry, tracker, RouterConfig::default())
    }

    /// Create a router with a custom policy.
    pub fn with_config(
        registry: Arc<PluginRegistry>,
        tracker: Arc<DeliveryTracker>,
        config: RouterConfig,
    ) -> Self {
        let (events, _) = broadcast::channel(256);
        Self {
            registry,
            tracker,
            config,
            events,
        }
    }

    /// The injected plugin registry.
    pub fn registry(&self) -> &Arc<PluginRegistry> {
        &self.registry
    }

    /// The delivery tracker.
    pub fn tracker(&self) -> &Arc<DeliveryTracker> {
        &self.tracker
    }

    /// Subscribe to dispatch lifecycle events.
    pub fn subscribe(&self) -> broadcast::Receiver<RouterEvent> {
        self.events.subscribe()
    }

    /// Deliver a notification to the requested channels.
    ///
    /// Unresolvable channel names are dropped with a warning; the dispatch
    /// continues with whatever resolved. The call fails only when the
    /// request is invalid or nothing resolved at all.
    pub async fn route(
        &self,
        notification: &NotificationRequest,
        channels: &[String],
    ) -> Result<RoutingResult> {
        notification.validate()?;
        if channels.is_empty() {
            return Err(RouterError::Validation(ValidationError::NoChannels));
        }

        let resolved = self.resolve(channels).await;
        if resolved.is_empty() {
            return Err(RouterError::NoChannelsResolved {
                requested: channels.to_vec(),
            });
        }

        Ok(self.dispatch(notification, resolved).await)
    }

    /// Deliver a notification to every registered, dispatchable channel.
    pub async fn route_to_all(&self, notification: &NotificationRequest) -> Result<RoutingResult> {
        notification.validate()?;

        let channels = self.registry.list().await;
        let resolved = self.resolve(&channels).await;
        if resolved.is_empty() {
            return Err(RouterError::NoChannelsResolved {
                requested: channels,
            });
        }

        Ok(self.dispatch(notification, resolved).await)
    }

    /// Map channel names to registered, currently-available plugins.
    ///
    /// Names that do not resolve are dropped, not failed.
    async fn resolve(&self, channels: &[String]) -> Vec<(String, Arc<RegisteredPlugin>)> {
        let mut resolved: Vec<(String, Arc<RegisteredPlugin>)> = Vec::with_capacity(channels.len());

        for name in channels {
            if resolved.iter().any(|(n, _)| n == name) {
                debug!(channel = %name, "duplicate channel in request; skipping");
                continue;
            }
            let Some(entry) = self.registry.lookup(name).await else {
                warn!(channel = %name, "channel has no registered plugin; skipping");
                continue;
            };
            if !entry.state().await.is_dispatchable() {
                warn!(channel = %name, "channel plugin is disabled or failed; skipping");
                continue;
            }
            if !entry.is_available().await {
                warn!(channel = %name, "channel plugin is currently unavailable; skipping");
                continue;
            }
            resolved.push((name.clone(), entry));
        }

        resolved
    }

    /// Fan out to the resolved channels and aggregate the outcome.
    async fn dispatch(
        &self,
        notification: &NotificationRequest,
        resolved: Vec<(String, Arc<RegisteredPlugin>)>,
    ) -> RoutingResult {
        let channel_names: Vec<String> = resolved.iter().map(|(n, _)| n.clone()).collect();
        let delivery_id = self.tracker.begin(notification, &channel_names).await;

        let _ = self.events.send(RouterEvent::DispatchStarted {
            delivery_id: delivery_id.clone(),
            channels: channel_names,
        });

        let batch_size = self.config.max_concurrency.max(1);
        let mut responses: Vec<ChannelResponse> = Vec::with_capacity(resolved.len());

        // Strict barrier between batches: the next one starts only after
        // every member of the current one has settled.
        for batch in resolved.chunks(batch_size) {
            let mut in_flight: FuturesUnordered<_> = batch
                .iter()
                .map(|(name, entry)| self.deliver_channel(notification, name, entry.clone()))
                .collect();

            while let Some(response) = in_flight.next().await {
                let _ = self.events.send(RouterEvent::ChannelSettled {
                    delivery_id: delivery_id.clone(),
                    response: response.clone(),
                });
                responses.push(response);
            }
        }

        let result = RoutingResult::from_responses(delivery_id.clone(), responses);
        self.tracker.complete(&delivery_id, result.clone()).await;

        let _ = self.events.send(RouterEvent::DispatchCompleted {
            delivery_id: delivery_id.clone(),
            success: result.success,
            successful_channels: result.successful_channels,
            failed_channels: result.failed_channels,
        });

        info!(
            delivery_id = %delivery_id,
            successful = result.successful_channels,
            failed = result.failed_channels,
            "dispatch completed"
        );
        result
    }

    /// Run one channel's full attempt sequence and settle it into a
    /// response. Never returns an error: every failure mode folds into a
    /// `success:false` response.
    async fn deliver_channel(
        &self,
        notification: &NotificationRequest,
        channel: &str,
        entry: Arc<RegisteredPlugin>,
    ) -> ChannelResponse {
        let started = Instant::now();
        let options = notification.options_for(channel);
        let max_attempts = self.config.retry_attempts.max(1);

        let mut attempts = 0u32;
        let mut last_error = String::new();

        while attempts < max_attempts {
            if attempts > 0 {
                tokio::time::sleep(self.config.retry_delay).await;
            }
            attempts += 1;

            // The instance was available at resolution; it may have
            // degraded while waiting for its turn in a batch.
            if !entry.is_available().await {
                last_error = "channel became unavailable before dispatch".to_string();
                warn!(channel = %channel, "channel became unavailable; aborting delivery");
                break;
            }

            // A panic escaping the plugin is handled like any other
            // delivery failure; a timeout drops the in-flight future,
            // cancelling it at its next await point.
            let attempt = AssertUnwindSafe(entry.send(notification, options)).catch_unwind();
            match tokio::time::timeout(self.config.send_timeout, attempt).await {
                Ok(Ok(Ok(receipt))) => {
                    debug!(channel = %channel, attempts, "channel delivered");
                    let message = if receipt.message.is_empty() {
                        "delivered".to_string()
                    } else {
                        receipt.message
                    };
                    let mut response = ChannelResponse::delivered(channel, message)
                        .with_attempts(attempts)
                        .with_duration(started.elapsed());
                    response.metadata = receipt.metadata;
                    return response;
                }
                Ok(Ok(Err(e))) => {
                    last_error = e.to_string();
                    warn!(channel = %channel, attempt = attempts, error = %last_error, "channel delivery attempt failed");
                }
                Ok(Err(_)) => {
                    last_error = "plugin panicked during send".to_string();
                    warn!(channel = %channel, attempt = attempts, "channel plugin panicked");
                }
                Err(_) => {
                    last_error =
                        format!("delivery timed out after {:?}", self.config.send_timeout);
                    warn!(channel = %channel, attempt = attempts, "channel delivery timed out");
                }
            }
        }

        ChannelResponse::failed(channel, last_error)
            .with_attempts(attempts)
            .with_duration(started.elapsed())
    }
}

//! Generic webhook provider.
//!
//! POSTs the notification as JSON to a configured endpoint. Payload
//! templating for specific services (Slack blocks, Teams cards, ...)
//! belongs in dedicated adapters, not here.

use crate::descriptor::PluginDescriptor;
use crate::error::{PluginError, Result};
use crate::plugin::{NotificationPlugin, PluginFactory, PluginHealth, SendReceipt};
use async_trait::async_trait;
use herald_core::types::NotificationRequest;
use std::time::Duration;
use url::Url;

fn descriptor() -> PluginDescriptor {
    PluginDescriptor::new("webhook", "Webhook", "1.0.0", "Herald")
        .with_capability("text")
        .with_capability("json")
        .with_config_schema(serde_json::json!({
            "type": "object",
            "properties": {
                "url": { "type": "string", "format": "uri" }
            },
            "required": ["url"]
        }))
}

/// Delivers notifications as JSON POSTs to one endpoint.
pub struct WebhookPlugin {
    descriptor: PluginDescriptor,
    client: reqwest::Client,
    endpoint: Option<Url>,
}

impl WebhookPlugin {
    /// Create an unconfigured webhook plugin.
    pub fn new() -> Self {
        Self {
            descriptor: descriptor(),
            client: reqwest::Client::builder()
                .timeout(Duration::from_secs(20))
                .build()
                .unwrap_or_default(),
            endpoint: None,
        }
    }

    fn payload(notification: &NotificationRequest) -> serde_json::Value {
        serde_json::json!({
            "title": notification.title,
            "message": notification.message,
            "level": notification.level,
            "metadata": notification.metadata,
        })
    }
}

impl Default for WebhookPlugin {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl NotificationPlugin for WebhookPlugin {
    fn descriptor(&self) -> &PluginDescriptor {
        &self.descriptor
    }

    async fn send(
        &self,
        notification: &NotificationRequest,
        options: Option<&serde_json::Value>,
    ) -> Result<SendReceipt> {
        // A per-request URL override beats the configured endpoint.
        let endpoint = match options.and_then(|o| o.get("url")).and_then(|u| u.as_str()) {
            Some(raw) => Url::parse(raw)
                .map_err(|e| PluginError::config(format!("invalid webhook url override: {e}")))?,
            None => self
                .endpoint
                .clone()
                .ok_or_else(|| PluginError::unavailable("no webhook url configured"))?,
        };

        let response = self
            .client
            .post(endpoint.clone())
            .json(&Self::payload(notification))
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            return Err(PluginError::send(format!(
                "webhook returned {}",
                status.as_u16()
            )));
        }

        Ok(SendReceipt::new(format!("webhook accepted ({})", status.as_u16()))
            .with_metadata("status", serde_json::json!(status.as_u16())))
    }

    async fn is_available(&self) -> bool {
        self.endpoint.is_some()
    }

    async fn setup(&mut self, config: serde_json::Value) -> Result<()> {
        match config.get("url").and_then(|v| v.as_str()) {
            Some(raw) => {
                let url = Url::parse(raw)
                    .map_err(|e| PluginError::config(format!("invalid webhook url: {e}")))?;
                self.endpoint = Some(url);
                Ok(())
            }
            // No URL yet: stay unconfigured, the registry will mark the
            // plugin unavailable rather than failed.
            None => Ok(()),
        }
    }

    async fn cleanup(&mut self) -> Result<()> {
        self.endpoint = None;
        Ok(())
    }

    async fn health_check(&self) -> PluginHealth {
        match &self.endpoint {
            Some(url) => PluginHealth::healthy()
                .with_metric("endpoint_host", serde_json::json!(url.host_str())),
            None => PluginHealth::unhealthy("no webhook url configured"),
        }
    }
}

/// Factory for [`WebhookPlugin`].
pub struct WebhookFactory;

impl PluginFactory for WebhookFactory {
    fn descriptor(&self) -> PluginDescriptor {
        descriptor()
    }

    fn create(&self) -> Box<dyn NotificationPlugin> {
        Box::new(WebhookPlugin::new())
    }
}

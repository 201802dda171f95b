//! Console provider writing notifications through the log pipeline.

use crate::descriptor::PluginDescriptor;
use crate::error::Result;
use crate::plugin::{NotificationPlugin, PluginFactory, SendReceipt};
use async_trait::async_trait;
use herald_core::types::{NotificationLevel, NotificationRequest};
use tracing::{error, info, warn};

fn descriptor() -> PluginDescriptor {
    PluginDescriptor::new("console", "Console", "1.0.0", "Herald")
        .with_capability("text")
        .with_config_schema(serde_json::json!({
            "type": "object",
            "properties": {
                "prefix": { "type": "string" }
            }
        }))
}

/// Writes notifications to the process log. Always available.
pub struct ConsolePlugin {
    descriptor: PluginDescriptor,
    prefix: Option<String>,
}

impl ConsolePlugin {
    /// Create an unconfigured console plugin.
    pub fn new() -> Self {
        Self {
            descriptor: descriptor(),
            prefix: None,
        }
    }
}

impl Default for ConsolePlugin {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl NotificationPlugin for ConsolePlugin {
    fn descriptor(&self) -> &PluginDescriptor {
        &self.descriptor
    }

    async fn send(
        &self,
        notification: &NotificationRequest,
        _options: Option<&serde_json::Value>,
    ) -> Result<SendReceipt> {
        let title = match &self.prefix {
            Some(prefix) => format!("{} {}", prefix, notification.title),
            None => notification.title.clone(),
        };

        match notification.level {
            NotificationLevel::Info => {
                info!(target: "herald::console", title = %title, message = %notification.message)
            }
            NotificationLevel::Warning => {
                warn!(target: "herald::console", title = %title, message = %notification.message)
            }
            NotificationLevel::Error => {
                error!(target: "herald::console", title = %title, message = %notification.message)
            }
        }

        Ok(SendReceipt::new("written to console log"))
    }

    async fn is_available(&self) -> bool {
        true
    }

    async fn setup(&mut self, config: serde_json::Value) -> Result<()> {
        self.prefix = config
            .get("prefix")
            .and_then(|v| v.as_str())
            .map(str::to_string);
        Ok(())
    }

    async fn cleanup(&mut self) -> Result<()> {
        self.prefix = None;
        Ok(())
    }
}

/// Factory for [`ConsolePlugin`].
pub struct ConsoleFactory;

impl PluginFactory for ConsoleFactory {
    fn descriptor(&self) -> PluginDescriptor {
        descriptor()
    }

    fn create(&self) -> Box<dyn NotificationPlugin> {
        Box::new(ConsolePlugin::new())
    }
}

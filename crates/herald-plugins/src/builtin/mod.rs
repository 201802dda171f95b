//! Built-in channel providers.
//!
//! The "built-in" search location ships two minimal providers: a console
//! sink for local/demo use and a generic webhook poster. Vendor-specific
//! adapters (SMTP, SMS gateways, chat platforms) live outside this crate
//! and register through the same factory contract.

mod console;
mod webhook;

pub use console::{ConsoleFactory, ConsolePlugin};
pub use webhook::{WebhookFactory, WebhookPlugin};

use crate::plugin::PluginFactory;
use std::sync::Arc;

/// Factories for every built-in provider, in registration order.
pub fn builtin_factories() -> Vec<Arc<dyn PluginFactory>> {
    vec![Arc::new(ConsoleFactory), Arc::new(WebhookFactory)]
}

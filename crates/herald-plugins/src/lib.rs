//! # herald-plugins
//!
//! Plugin contract, lifecycle, and registry for Herald channel providers.
//!
//! Every delivery channel (email, SMS, chat webhook, desktop, ...) is a
//! plugin implementing [`NotificationPlugin`]. The [`PluginRegistry`] owns
//! the instances, drives their lifecycle state machine, and resolves
//! channel names for the dispatch engine. Providers are registered through
//! [`PluginFactory`] values from ordered sources (built-in, official,
//! user-supplied); the capability contract itself is enforced by the trait
//! at compile time.

pub mod builtin;
pub mod descriptor;
pub mod error;
pub mod plugin;
pub mod registry;

pub use descriptor::PluginDescriptor;
pub use error::{PluginError, Result};
pub use plugin::{
    NotificationPlugin, PluginFactory, PluginHealth, PluginState, SendReceipt,
};
pub use registry::{
    InstallOutcome, PluginRegistry, PluginSource, RegisteredPlugin, RegistryStats,
};

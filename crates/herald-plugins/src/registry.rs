//! Plugin registry.
//!
//! Owns every channel provider instance, drives the lifecycle state
//! machine, and resolves names for the dispatch engine. Registries are
//! plain values injected where needed; there is no global singleton, so
//! independent registries can coexist (isolated tests, embedded use).

use crate::descriptor::PluginDescriptor;
use crate::error::{PluginError, Result};
use crate::plugin::{NotificationPlugin, PluginFactory, PluginHealth, PluginState, SendReceipt};
use herald_core::types::NotificationRequest;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;
use tracing::{debug, info, warn};

/// Where a plugin came from. Later variants take precedence over earlier
/// ones when two sources provide the same name.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PluginSource {
    /// Shipped with Herald.
    Builtin,

    /// Officially maintained, installed separately.
    Official,

    /// User-supplied.
    User,
}

impl PluginSource {
    /// Get the source as a lowercase string.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Builtin => "builtin",
            Self::Official => "official",
            Self::User => "user",
        }
    }
}

/// A registered plugin with its lifecycle bookkeeping.
///
/// The registry owns the instance; the dispatch engine only borrows
/// `Arc` clones for the duration of one dispatch.
pub struct RegisteredPlugin {
    descriptor: PluginDescriptor,
    source: PluginSource,
    factory: Arc<dyn PluginFactory>,
    config: serde_json::Value,
    state: RwLock<PluginState>,
    instance: RwLock<Box<dyn NotificationPlugin>>,
}

impl std::fmt::Debug for RegisteredPlugin {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("RegisteredPlugin")
            .field("descriptor", &self.descriptor)
            .field("source", &self.source)
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}

impl RegisteredPlugin {
    /// The plugin's static descriptor.
    pub fn descriptor(&self) -> &PluginDescriptor {
        &self.descriptor
    }

    /// The plugin's name.
    pub fn name(&self) -> &str {
        &self.descriptor.name
    }

    /// The source this plugin was registered from.
    pub fn source(&self) -> PluginSource {
        self.source
    }

    /// Current lifecycle state.
    pub async fn state(&self) -> PluginState {
        *self.state.read().await
    }

    /// Live readiness probe of the underlying instance.
    pub async fn is_available(&self) -> bool {
        self.instance.read().await.is_available().await
    }

    /// Validate a notification against the plugin.
    pub async fn validate(&self, notification: &NotificationRequest) -> Result<()> {
        self.instance.read().await.validate(notification).await
    }

    /// Deliver a notification through the plugin.
    pub async fn send(
        &self,
        notification: &NotificationRequest,
        options: Option<&serde_json::Value>,
    ) -> Result<SendReceipt> {
        self.instance.read().await.send(notification, options).await
    }

    /// Health snapshot of the underlying instance.
    pub async fn health_check(&self) -> PluginHealth {
        self.instance.read().await.health_check().await
    }

    /// Run `setup` on the instance and record the resulting state.
    ///
    /// A probe failure degrades to `Unavailable`; any other setup error
    /// marks the plugin `Failed` until an explicit reload.
    async fn apply_setup(&self, config: serde_json::Value) -> PluginState {
        *self.state.write().await = PluginState::Configuring;

        let mut instance = self.instance.write().await;
        let next = match instance.setup(config).await {
            Ok(()) => {
                if instance.is_available().await {
                    PluginState::Ready
                } else {
                    PluginState::Unavailable
                }
            }
            Err(PluginError::Unavailable(reason)) => {
                warn!(plugin = %self.descriptor.name, %reason, "plugin probe failed; degrading to unavailable");
                PluginState::Unavailable
            }
            Err(e) => {
                warn!(plugin = %self.descriptor.name, error = %e, "plugin setup failed");
                PluginState::Failed
            }
        };
        drop(instance);

        *self.state.write().await = next;
        debug!(plugin = %self.descriptor.name, state = ?next, "plugin state changed");
        next
    }
}

/// Outcome of one candidate during bulk installation.
#[derive(Debug)]
pub enum InstallOutcome {
    /// Candidate passed validation and was registered.
    Installed {
        /// Plugin name.
        name: String,
        /// State after setup.
        state: PluginState,
    },

    /// Candidate was skipped; installation of the batch continued.
    Skipped {
        /// Plugin name (or display name if the name was missing).
        name: String,
        /// Why the candidate was skipped.
        reason: String,
    },
}

/// Registry of channel provider plugins, keyed by unique name.
pub struct PluginRegistry {
    plugins: RwLock<HashMap<String, Arc<RegisteredPlugin>>>,
}

impl Default for PluginRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl PluginRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self {
            plugins: RwLock::new(HashMap::new()),
        }
    }

    /// Register a plugin from a factory.
    ///
    /// The candidate's descriptor is validated (missing required fields are
    /// a hard rejection, a non-semver version only warns), a fresh instance
    /// is created and `setup` runs with the given configuration. Duplicate
    /// names within the same source are a hard error; a higher-precedence
    /// source replaces a lower one, never the reverse.
    pub async fn register(
        &self,
        source: PluginSource,
        factory: Arc<dyn PluginFactory>,
        config: serde_json::Value,
    ) -> Result<Arc<RegisteredPlugin>> {
        let descriptor = factory.descriptor();

        if let Some(field) = descriptor.missing_field() {
            return Err(PluginError::rejected(format!(
                "descriptor is missing required field '{field}'"
            )));
        }
        if semver::Version::parse(&descriptor.version).is_err() {
            warn!(
                plugin = %descriptor.name,
                version = %descriptor.version,
                "plugin version is not valid semver"
            );
        }

        let instance = factory.create();
        if instance.descriptor().name != descriptor.name {
            return Err(PluginError::rejected(format!(
                "factory descriptor '{}' does not match instance descriptor '{}'",
                descriptor.name,
                instance.descriptor().name
            )));
        }

        let entry = Arc::new(RegisteredPlugin {
            descriptor: descriptor.clone(),
            source,
            factory,
            config: config.clone(),
            state: RwLock::new(PluginState::Unconfigured),
            instance: RwLock::new(instance),
        });
        let state = entry.apply_setup(config).await;

        let mut plugins = self.plugins.write().await;
        if let Some(previous) = plugins.get(&descriptor.name).cloned() {
            if previous.source >= source {
                return Err(if previous.source == source {
                    PluginError::AlreadyRegistered(descriptor.name.clone())
                } else {
                    PluginError::rejected(format!(
                        "name '{}' is already taken by a {} plugin",
                        descriptor.name,
                        previous.source.as_str()
                    ))
                });
            }

            warn!(
                plugin = %descriptor.name,
                replaced = previous.source.as_str(),
                by = source.as_str(),
                "replacing plugin from lower-precedence source"
            );
            let mut old_instance = previous.instance.write().await;
            if let Err(e) = old_instance.cleanup().await {
                warn!(plugin = %descriptor.name, error = %e, "cleanup of replaced plugin failed");
            }
            drop(old_instance);
            *previous.state.write().await = PluginState::Disabled;
        }

        plugins.insert(descriptor.name.clone(), entry.clone());
        info!(
            plugin = %descriptor.name,
            source = source.as_str(),
            state = ?state,
            "registered plugin"
        );
        Ok(entry)
    }

    /// Register a batch of candidates from one source.
    ///
    /// Validation failures are non-fatal per candidate: a bad plugin is
    /// skipped with a warning and installation continues.
    pub async fn install(
        &self,
        source: PluginSource,
        factories: Vec<Arc<dyn PluginFactory>>,
    ) -> Vec<InstallOutcome> {
        let mut outcomes = Vec::with_capacity(factories.len());

        for factory in factories {
            let name = {
                let d = factory.descriptor();
                if d.name.trim().is_empty() {
                    d.display_name
                } else {
                    d.name
                }
            };
            match self.register(source, factory, serde_json::json!({})).await {
                Ok(entry) => outcomes.push(InstallOutcome::Installed {
                    name,
                    state: entry.state().await,
                }),
                Err(e) => {
                    warn!(plugin = %name, error = %e, "skipping plugin candidate");
                    outcomes.push(InstallOutcome::Skipped {
                        name,
                        reason: e.to_string(),
                    });
                }
            }
        }

        outcomes
    }

    /// Remove a plugin, releasing its resources.
    pub async fn unregister(&self, name: &str) -> Result<()> {
        let mut plugins = self.plugins.write().await;
        match plugins.remove(name) {
            Some(entry) => {
                let mut instance = entry.instance.write().await;
                if let Err(e) = instance.cleanup().await {
                    warn!(plugin = %name, error = %e, "cleanup failed during unregister");
                }
                drop(instance);
                *entry.state.write().await = PluginState::Disabled;
                info!(plugin = %name, "unregistered plugin");
                Ok(())
            }
            None => Err(PluginError::not_found(name)),
        }
    }

    /// Look up a plugin by name.
    pub async fn lookup(&self, name: &str) -> Option<Arc<RegisteredPlugin>> {
        let plugins = self.plugins.read().await;
        plugins.get(name).cloned()
    }

    /// List all registered plugin names, sorted.
    pub async fn list(&self) -> Vec<String> {
        let plugins = self.plugins.read().await;
        let mut names: Vec<String> = plugins.keys().cloned().collect();
        names.sort();
        names
    }

    /// All registered descriptors, sorted by name.
    pub async fn descriptors(&self) -> Vec<PluginDescriptor> {
        let plugins = self.plugins.read().await;
        let mut all: Vec<PluginDescriptor> =
            plugins.values().map(|p| p.descriptor.clone()).collect();
        all.sort_by(|a, b| a.name.cmp(&b.name));
        all
    }

    /// Plugins declaring a capability tag.
    pub async fn filter_by_capability(&self, tag: &str) -> Vec<Arc<RegisteredPlugin>> {
        let plugins = self.plugins.read().await;
        let mut matching: Vec<Arc<RegisteredPlugin>> = plugins
            .values()
            .filter(|p| p.descriptor.has_capability(tag))
            .cloned()
            .collect();
        matching.sort_by(|a, b| a.descriptor.name.cmp(&b.descriptor.name));
        matching
    }

    /// Current lifecycle state of a plugin.
    pub async fn state(&self, name: &str) -> Result<PluginState> {
        let entry = self.lookup(name).await.ok_or_else(|| PluginError::not_found(name))?;
        Ok(entry.state().await)
    }

    /// Re-run setup on a disabled or degraded plugin.
    ///
    /// Failed plugins cannot be re-enabled in place; they require a
    /// [`reload`](Self::reload).
    pub async fn enable(&self, name: &str) -> Result<PluginState> {
        let entry = self.lookup(name).await.ok_or_else(|| PluginError::not_found(name))?;
        if entry.state().await == PluginState::Failed {
            return Err(PluginError::config(format!(
                "plugin '{name}' is in a failed state; reload it instead"
            )));
        }
        Ok(entry.apply_setup(entry.config.clone()).await)
    }

    /// Run cleanup and exclude the plugin from dispatch.
    pub async fn disable(&self, name: &str) -> Result<()> {
        let entry = self.lookup(name).await.ok_or_else(|| PluginError::not_found(name))?;
        let mut instance = entry.instance.write().await;
        if let Err(e) = instance.cleanup().await {
            warn!(plugin = %name, error = %e, "cleanup failed during disable");
        }
        drop(instance);
        *entry.state.write().await = PluginState::Disabled;
        debug!(plugin = %name, "disabled plugin");
        Ok(())
    }

    /// Replace the instance with a fresh one from the factory and re-run
    /// setup. The only path out of the `Failed` state.
    pub async fn reload(&self, name: &str) -> Result<PluginState> {
        let entry = self.lookup(name).await.ok_or_else(|| PluginError::not_found(name))?;

        let fresh = entry.factory.create();
        {
            let mut instance = entry.instance.write().await;
            let mut old = std::mem::replace(&mut *instance, fresh);
            if let Err(e) = old.cleanup().await {
                warn!(plugin = %name, error = %e, "cleanup of stale instance failed during reload");
            }
        }

        let state = entry.apply_setup(entry.config.clone()).await;
        info!(plugin = %name, state = ?state, "reloaded plugin");
        Ok(state)
    }

    /// Health snapshots for every registered plugin.
    pub async fn health_check(&self) -> HashMap<String, PluginHealth> {
        let entries: Vec<Arc<RegisteredPlugin>> = {
            let plugins = self.plugins.read().await;
            plugins.values().cloned().collect()
        };

        let mut health_map = HashMap::with_capacity(entries.len());
        for entry in entries {
            let health = entry.health_check().await;
            health_map.insert(entry.descriptor.name.clone(), health);
        }
        health_map
    }

    /// Number of registered plugins.
    pub async fn count(&self) -> usize {
        let plugins = self.plugins.read().await;
        plugins.len()
    }

    /// Registry statistics.
    pub async fn stats(&self) -> RegistryStats {
        let entries: Vec<Arc<RegisteredPlugin>> = {
            let plugins = self.plugins.read().await;
            plugins.values().cloned().collect()
        };

        let mut stats = RegistryStats {
            total: entries.len(),
            ..Default::default()
        };
        for entry in &entries {
            match entry.state().await {
                PluginState::Ready => stats.ready += 1,
                PluginState::Unavailable => stats.unavailable += 1,
                PluginState::Disabled => stats.disabled += 1,
                PluginState::Failed => stats.failed += 1,
                PluginState::Unconfigured | PluginState::Configuring => {}
            }
            *stats
                .by_source
                .entry(entry.source.as_str().to_string())
                .or_insert(0) += 1;
        }
        stats
    }
}

/// Statistics about the plugin registry.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RegistryStats {
    /// Total registered plugins.
    pub total: usize,

    /// Plugins in the `Ready` state.
    pub ready: usize,

    /// Plugins in the `Unavailable` state.
    pub unavailable: usize,

    /// Plugins in the `Disabled` state.
    pub disabled: usize,

    /// Plugins in the `Failed` state.
    pub failed: usize,

    /// Plugin counts by source.
    pub by_source: HashMap<String, usize>,
}

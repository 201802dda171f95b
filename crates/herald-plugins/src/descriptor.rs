//! Plugin descriptors.

use serde::{Deserialize, Serialize};

/// Static description of a channel provider.
///
/// Immutable once registered. The registry keys plugins by `name` and
/// rejects candidates whose required fields are missing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PluginDescriptor {
    /// Unique plugin name. Doubles as the channel name.
    pub name: String,

    /// Human-readable display name.
    pub display_name: String,

    /// Plugin version. Expected to be semver; a non-semver string only
    /// produces a warning at registration.
    pub version: String,

    /// Plugin author.
    pub author: String,

    /// Capability tags, e.g. "text", "markdown".
    #[serde(default)]
    pub capabilities: Vec<String>,

    /// JSON schema describing the accepted configuration.
    #[serde(default)]
    pub config_schema: serde_json::Value,
}

impl PluginDescriptor {
    /// Create a new descriptor.
    pub fn new(
        name: impl Into<String>,
        display_name: impl Into<String>,
        version: impl Into<String>,
        author: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            display_name: display_name.into(),
            version: version.into(),
            author: author.into(),
            capabilities: Vec::new(),
            config_schema: serde_json::Value::Null,
        }
    }

    /// Add a capability tag.
    pub fn with_capability(mut self, tag: impl Into<String>) -> Self {
        self.capabilities.push(tag.into());
        self
    }

    /// Set the configuration schema.
    pub fn with_config_schema(mut self, schema: serde_json::Value) -> Self {
        self.config_schema = schema;
        self
    }

    /// Check whether the plugin declares a capability tag.
    pub fn has_capability(&self, tag: &str) -> bool {
        self.capabilities.iter().any(|c| c == tag)
    }

    /// Check the required descriptor fields.
    ///
    /// Returns the name of the first missing field. Version format is not
    /// checked here; non-semver versions are a warning, not a rejection.
    pub fn missing_field(&self) -> Option<&'static str> {
        if self.name.trim().is_empty() {
            Some("name")
        } else if self.display_name.trim().is_empty() {
            Some("display_name")
        } else if self.version.trim().is_empty() {
            Some("version")
        } else if self.author.trim().is_empty() {
            Some("author")
        } else {
            None
        }
    }
}

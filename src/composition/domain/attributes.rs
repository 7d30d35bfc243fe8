//! Plugin metadata exposed to the host for introspection.

use serde::{Deserialize, Serialize};

/// Name and version a plugin presents to the host.
///
/// The composition engine never interprets these values; hosts use them to
/// identify plugins and to detect repeated registrations.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct PluginAttributes {
    name: String,
    version: String,
    #[serde(default)]
    multiple: bool,
}

impl PluginAttributes {
    /// Creates attributes for a plugin that may be registered once per server.
    #[must_use]
    pub fn new(name: impl Into<String>, version: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            version: version.into(),
            multiple: false,
        }
    }

    /// Allows the plugin to be registered more than once on the same server.
    #[must_use]
    pub const fn allowing_multiple(mut self) -> Self {
        self.multiple = true;
        self
    }

    /// Returns the plugin name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Returns the plugin version.
    #[must_use]
    pub fn version(&self) -> &str {
        &self.version
    }

    /// Returns whether repeated registration is allowed.
    #[must_use]
    pub const fn multiple(&self) -> bool {
        self.multiple
    }
}

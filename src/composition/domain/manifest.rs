//! Declarative manifest describing a server, its connections and plugins.

use super::ModulePath;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// JSON object passed through to the host untouched.
pub type ObjectMap = Map<String, Value>;

/// Options handed to the host alongside a plugin registration.
pub type RegistrationOptions = ObjectMap;

/// Declarative description of a composed server.
///
/// The manifest is read-only input. The composition engine clones the parts
/// it needs to alter, such as cache descriptors and registration options.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Manifest {
    /// Settings for constructing a new server.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub server: Option<ServerConfig>,
    /// Connections to bind; one default connection is bound when empty.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub connections: Vec<ConnectionConfig>,
    /// Plugins to register, in order.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub registrations: Vec<Registration>,
}

impl Manifest {
    /// Creates an empty manifest.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the server configuration.
    #[must_use]
    pub fn with_server(mut self, server: ServerConfig) -> Self {
        self.server = Some(server);
        self
    }

    /// Appends a connection.
    #[must_use]
    pub fn with_connection(mut self, connection: ConnectionConfig) -> Self {
        self.connections.push(connection);
        self
    }

    /// Appends a plugin registration.
    #[must_use]
    pub fn with_registration(mut self, registration: Registration) -> Self {
        self.registrations.push(registration);
        self
    }
}

/// Server construction settings.
///
/// Only `cache` is interpreted; every other key is forwarded to the host.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ServerConfig {
    /// Cache engines to provision.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cache: Option<CacheSetting>,
    /// Remaining host-specific settings.
    #[serde(flatten)]
    pub settings: ObjectMap,
}

impl ServerConfig {
    /// Creates empty server settings.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the cache configuration.
    #[must_use]
    pub fn with_cache(mut self, cache: CacheSetting) -> Self {
        self.cache = Some(cache);
        self
    }

    /// Adds a host-specific setting.
    #[must_use]
    pub fn with_setting(mut self, key: impl Into<String>, value: Value) -> Self {
        self.settings.insert(key.into(), value);
        self
    }

    /// Returns the declared cache entries, if any.
    #[must_use]
    pub fn cache_entries(&self) -> &[CacheSpec] {
        match &self.cache {
            Some(cache) => cache.entries(),
            None => &[],
        }
    }
}

/// One cache descriptor or a list of them.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CacheSetting {
    /// A single cache.
    Single(CacheSpec),
    /// Several caches.
    Multiple(Vec<CacheSpec>),
}

impl CacheSetting {
    /// Returns the entries as a slice regardless of form.
    #[must_use]
    pub fn entries(&self) -> &[CacheSpec] {
        match self {
            Self::Single(spec) => std::slice::from_ref(spec),
            Self::Multiple(specs) => specs,
        }
    }
}

/// A cache declaration naming its engine module.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CacheSpec {
    /// Bare engine module name.
    Engine(ModulePath),
    /// Engine module with cache options.
    Descriptor(CacheDescriptor),
}

impl CacheSpec {
    /// Returns the engine module identifier.
    #[must_use]
    pub const fn engine(&self) -> &ModulePath {
        match self {
            Self::Engine(engine) => engine,
            Self::Descriptor(descriptor) => &descriptor.engine,
        }
    }

    /// Returns cache options other than the engine.
    #[must_use]
    pub fn options(&self) -> ObjectMap {
        match self {
            Self::Engine(_) => ObjectMap::new(),
            Self::Descriptor(descriptor) => descriptor.options.clone(),
        }
    }
}

/// Cache declaration in object form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CacheDescriptor {
    /// Engine module identifier.
    pub engine: ModulePath,
    /// Options such as `name` or `partition`.
    #[serde(flatten)]
    pub options: ObjectMap,
}

/// Host connection settings.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ConnectionConfig(pub ObjectMap);

impl ConnectionConfig {
    /// Creates an empty connection, equivalent to the host default.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a connection setting.
    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: Value) -> Self {
        self.0.insert(key.into(), value);
        self
    }

    /// Returns the raw settings.
    #[must_use]
    pub const fn settings(&self) -> &ObjectMap {
        &self.0
    }
}

/// A plugin to register along with its registration options.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct Registration {
    /// Plugin module reference.
    pub plugin: PluginSpec,
    /// Registration options; treated as `{}` when absent.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub options: Option<RegistrationOptions>,
}

impl Registration {
    /// Creates a registration without options.
    #[must_use]
    pub fn new(plugin: impl Into<PluginSpec>) -> Self {
        Self {
            plugin: plugin.into(),
            options: None,
        }
    }

    /// Sets the registration options.
    #[must_use]
    pub fn with_options(mut self, options: RegistrationOptions) -> Self {
        self.options = Some(options);
        self
    }
}

/// Plugin reference as written in a manifest.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum PluginSpec {
    /// Module path shorthand.
    Path(ModulePath),
    /// Descriptor naming the module under `register`.
    Descriptor(PluginDescriptor),
}

impl PluginSpec {
    /// Returns the module identifier.
    #[must_use]
    pub const fn module(&self) -> &ModulePath {
        match self {
            Self::Path(path) => path,
            Self::Descriptor(descriptor) => &descriptor.register,
        }
    }

    /// Expands shorthand into descriptor form.
    #[must_use]
    pub fn to_descriptor(&self) -> PluginDescriptor {
        match self {
            Self::Path(path) => PluginDescriptor::new(path.clone()),
            Self::Descriptor(descriptor) => descriptor.clone(),
        }
    }
}

impl From<&str> for PluginSpec {
    fn from(value: &str) -> Self {
        Self::Path(ModulePath::new(value))
    }
}

impl From<PluginDescriptor> for PluginSpec {
    fn from(value: PluginDescriptor) -> Self {
        Self::Descriptor(value)
    }
}

/// Plugin reference in object form.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PluginDescriptor {
    /// Module identifier.
    pub register: ModulePath,
    /// Extra keys forwarded with the loaded plugin, such as plugin `options`.
    #[serde(flatten)]
    pub extra: ObjectMap,
}

impl PluginDescriptor {
    /// Creates a descriptor with no extra keys.
    #[must_use]
    pub fn new(register: impl Into<ModulePath>) -> Self {
        Self {
            register: register.into(),
            extra: ObjectMap::new(),
        }
    }

    /// Adds an extra key.
    #[must_use]
    pub fn with(mut self, key: impl Into<String>, value: Value) -> Self {
        self.extra.insert(key.into(), value);
        self
    }
}

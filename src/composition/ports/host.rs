//! Host framework port for server construction and plugin registration.

use crate::composition::domain::{ConnectionConfig, ModulePath, ObjectMap, RegistrationOptions};
use async_trait::async_trait;
use std::sync::Arc;
use thiserror::Error;

/// Result type for host framework operations.
pub type HostResult<T> = Result<T, HostError>;

/// Capability contract of the web framework being composed.
///
/// The composition engine calls these operations and nothing else, so any
/// framework, or a test double, can be supplied by the surrounding
/// application.
#[async_trait]
pub trait HostFramework: Send + Sync {
    /// Server instance type.
    type Server: Send + Sync + 'static;
    /// Loaded plugin module type.
    type Plugin: Send + Sync;
    /// Loaded cache engine type.
    type CacheEngine: Send + Sync;

    /// Loads the cache engine module named by `module`.
    ///
    /// # Errors
    ///
    /// Returns [`HostError::ModuleNotFound`] when the module cannot be loaded.
    fn load_cache_engine(&self, module: &ModulePath) -> HostResult<Self::CacheEngine>;

    /// Loads the plugin module named by `module`.
    ///
    /// # Errors
    ///
    /// Returns [`HostError::ModuleNotFound`] when the module cannot be loaded.
    fn load_plugin(&self, module: &ModulePath) -> HostResult<Self::Plugin>;

    /// Constructs a new server.
    ///
    /// # Errors
    ///
    /// Returns host errors when the settings are rejected.
    fn construct_server(
        &self,
        settings: ServerSettings<Self::CacheEngine>,
    ) -> HostResult<Arc<Self::Server>>;

    /// Binds a connection to the server.
    ///
    /// # Errors
    ///
    /// Returns host errors when the connection settings are rejected.
    fn add_connection(
        &self,
        server: &Arc<Self::Server>,
        connection: &ConnectionConfig,
    ) -> HostResult<()>;

    /// Registers a plugin, completing once the plugin's own registration has.
    ///
    /// # Errors
    ///
    /// Returns the plugin's or the host's registration failure.
    async fn register(
        &self,
        server: &Arc<Self::Server>,
        plugin: LoadedPlugin<Self::Plugin>,
        options: RegistrationOptions,
    ) -> HostResult<()>;
}

/// Server settings with cache engines already loaded.
#[derive(Debug, Clone, PartialEq)]
pub struct ServerSettings<E> {
    /// Loaded caches, empty when none were declared.
    pub caches: Vec<ResolvedCache<E>>,
    /// Remaining host-specific settings.
    pub settings: ObjectMap,
}

impl<E> Default for ServerSettings<E> {
    fn default() -> Self {
        Self {
            caches: Vec::new(),
            settings: ObjectMap::new(),
        }
    }
}

/// A cache declaration with its engine loaded.
#[derive(Debug, Clone, PartialEq)]
pub struct ResolvedCache<E> {
    /// Resolved engine module identifier.
    pub module: ModulePath,
    /// Loaded engine.
    pub engine: E,
    /// Cache options other than the engine.
    pub options: ObjectMap,
}

/// A plugin module ready for registration.
#[derive(Debug, Clone, PartialEq)]
pub struct LoadedPlugin<P> {
    /// Resolved module identifier.
    pub module: ModulePath,
    /// Loaded plugin.
    pub plugin: P,
    /// Descriptor keys other than `register`.
    pub extra: ObjectMap,
}

/// Errors returned by host framework adapters.
#[derive(Debug, Clone, Error)]
pub enum HostError {
    /// A plugin or cache-engine module could not be resolved.
    #[error("cannot find module '{0}'")]
    ModuleNotFound(ModulePath),

    /// Server or connection settings were rejected.
    #[error("invalid host configuration: {0}")]
    InvalidConfiguration(String),

    /// The host refused a plugin registration.
    #[error("registration rejected: {0}")]
    Rejected(String),

    /// Generic runtime failure.
    #[error("host runtime error: {0}")]
    Runtime(Arc<dyn std::error::Error + Send + Sync>),
}

impl HostError {
    /// Wraps a runtime error from a host adapter, hook or plugin.
    pub fn runtime(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::Runtime(Arc::new(err))
    }
}

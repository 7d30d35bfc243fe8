//! In-memory host framework adapter.

use super::InMemoryServer;
use crate::composition::{
    domain::{ConnectionConfig, ModulePath, RegistrationOptions},
    ports::{HostError, HostFramework, HostResult, LoadedPlugin, ServerPlugin, ServerSettings},
};
use async_trait::async_trait;
use serde_json::Value;
use std::collections::{HashMap, HashSet};
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

/// Plugin type loaded by [`InMemoryFramework`].
pub type InMemoryPlugin = Arc<dyn ServerPlugin<InMemoryServer>>;

/// Cache engine loaded by [`InMemoryFramework`].
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct InMemoryCacheEngine {
    module: ModulePath,
}

impl InMemoryCacheEngine {
    /// Returns the module the engine was loaded from.
    #[must_use]
    pub const fn module(&self) -> &ModulePath {
        &self.module
    }
}

/// Side effect performed by the in-memory host, in order of occurrence.
#[derive(Debug, Clone, PartialEq)]
pub enum HostEvent {
    /// A server was constructed.
    ServerConstructed {
        /// Number of caches provisioned.
        caches: usize,
    },
    /// A connection was bound.
    ConnectionAdded {
        /// Connection settings as passed by the engine.
        config: ConnectionConfig,
    },
    /// A plugin finished registering.
    PluginRegistered {
        /// Resolved module identifier.
        module: ModulePath,
        /// Options passed with the registration.
        options: RegistrationOptions,
    },
}

/// Deterministic host framework backed by a module table.
///
/// Plugins and cache engines must be added under their resolved module path
/// before a composition can load them. Every side effect is appended to an
/// event log for inspection.
///
/// A plugin descriptor's own `options` object is merged beneath the
/// registration options before the plugin sees them. A plugin name is
/// recorded on the server only once its registration succeeds.
#[derive(Clone, Default)]
pub struct InMemoryFramework {
    state: Arc<RwLock<InMemoryFrameworkState>>,
}

#[derive(Default)]
struct InMemoryFrameworkState {
    plugins: HashMap<ModulePath, InMemoryPlugin>,
    cache_engines: HashSet<ModulePath>,
    events: Vec<HostEvent>,
}

impl InMemoryFramework {
    /// Creates a host with an empty module table.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Makes a plugin loadable under `module`, replacing any previous entry.
    ///
    /// # Errors
    ///
    /// Returns host runtime errors when lock acquisition fails.
    pub fn add_plugin(
        &self,
        module: impl Into<ModulePath>,
        plugin: InMemoryPlugin,
    ) -> HostResult<()> {
        self.write_state()?.plugins.insert(module.into(), plugin);
        Ok(())
    }

    /// Makes a cache engine loadable under `module`.
    ///
    /// # Errors
    ///
    /// Returns host runtime errors when lock acquisition fails.
    pub fn add_cache_engine(&self, module: impl Into<ModulePath>) -> HostResult<()> {
        self.write_state()?.cache_engines.insert(module.into());
        Ok(())
    }

    /// Returns the event log.
    ///
    /// # Errors
    ///
    /// Returns host runtime errors when lock acquisition fails.
    pub fn events(&self) -> HostResult<Vec<HostEvent>> {
        Ok(self.read_state()?.events.clone())
    }

    fn record(&self, event: HostEvent) -> HostResult<()> {
        self.write_state()?.events.push(event);
        Ok(())
    }

    fn read_state(&self) -> HostResult<RwLockReadGuard<'_, InMemoryFrameworkState>> {
        self.state.read().map_err(poisoned)
    }

    fn write_state(&self) -> HostResult<RwLockWriteGuard<'_, InMemoryFrameworkState>> {
        self.state.write().map_err(poisoned)
    }
}

fn poisoned<T>(err: PoisonError<T>) -> HostError {
    HostError::runtime(std::io::Error::other(err.to_string()))
}

#[async_trait]
impl HostFramework for InMemoryFramework {
    type Server = InMemoryServer;
    type Plugin = InMemoryPlugin;
    type CacheEngine = InMemoryCacheEngine;

    fn load_cache_engine(&self, module: &ModulePath) -> HostResult<Self::CacheEngine> {
        if self.read_state()?.cache_engines.contains(module) {
            return Ok(InMemoryCacheEngine {
                module: module.clone(),
            });
        }
        Err(HostError::ModuleNotFound(module.clone()))
    }

    fn load_plugin(&self, module: &ModulePath) -> HostResult<Self::Plugin> {
        self.read_state()?
            .plugins
            .get(module)
            .cloned()
            .ok_or_else(|| HostError::ModuleNotFound(module.clone()))
    }

    fn construct_server(
        &self,
        settings: ServerSettings<Self::CacheEngine>,
    ) -> HostResult<Arc<Self::Server>> {
        let caches = settings.caches.len();
        let server = Arc::new(InMemoryServer::new(settings));
        self.record(HostEvent::ServerConstructed { caches })?;
        Ok(server)
    }

    fn add_connection(
        &self,
        server: &Arc<Self::Server>,
        connection: &ConnectionConfig,
    ) -> HostResult<()> {
        server.add_connection(connection)?;
        self.record(HostEvent::ConnectionAdded {
            config: connection.clone(),
        })
    }

    async fn register(
        &self,
        server: &Arc<Self::Server>,
        plugin: LoadedPlugin<Self::Plugin>,
        options: RegistrationOptions,
    ) -> HostResult<()> {
        let attributes = plugin.plugin.attributes().clone();
        server.check_plugin(attributes.name(), attributes.multiple())?;

        let mut plugin_options = options.clone();
        if let Some(Value::Object(own)) = plugin.extra.get("options") {
            for (key, value) in own {
                plugin_options
                    .entry(key.clone())
                    .or_insert_with(|| value.clone());
            }
        }

        plugin
            .plugin
            .register(Arc::clone(server), &plugin_options)
            .await?;
        server.record_plugin(attributes.name(), attributes.multiple())?;
        self.record(HostEvent::PluginRegistered {
            module: plugin.module,
            options,
        })
    }
}

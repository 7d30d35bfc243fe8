//! In-memory server with labelled connections and static routes.

use crate::composition::{
    domain::{ConnectionConfig, ObjectMap, Select},
    ports::{HostError, HostResult, ServerSettings},
};
use serde_json::Value;
use std::sync::{PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use super::InMemoryCacheEngine;

/// Server instance produced by [`InMemoryFramework`].
///
/// [`InMemoryFramework`]: super::InMemoryFramework
#[derive(Debug, Default)]
pub struct InMemoryServer {
    settings: ServerSettings<InMemoryCacheEngine>,
    state: RwLock<InMemoryServerState>,
}

#[derive(Debug, Default)]
struct InMemoryServerState {
    connections: Vec<InMemoryConnection>,
    plugins: Vec<String>,
    app: ObjectMap,
}

/// Snapshot of a bound connection.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct InMemoryConnection {
    labels: Vec<String>,
    port: Option<u16>,
    routes: Vec<InMemoryRoute>,
}

impl InMemoryConnection {
    /// Returns the connection labels.
    #[must_use]
    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    /// Returns the configured port, if any.
    #[must_use]
    pub const fn port(&self) -> Option<u16> {
        self.port
    }

    /// Returns the routes served by this connection.
    #[must_use]
    pub fn routes(&self) -> &[InMemoryRoute] {
        &self.routes
    }
}

/// A `GET` route answering with a fixed JSON body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InMemoryRoute {
    /// Absolute request path.
    pub path: String,
    /// Response body.
    pub body: Value,
}

impl InMemoryServer {
    /// Creates a server from loaded settings.
    #[must_use]
    pub fn new(settings: ServerSettings<InMemoryCacheEngine>) -> Self {
        Self {
            settings,
            state: RwLock::default(),
        }
    }

    /// Returns the settings the server was constructed with.
    #[must_use]
    pub const fn settings(&self) -> &ServerSettings<InMemoryCacheEngine> {
        &self.settings
    }

    /// Binds a connection.
    ///
    /// `labels` may be a string or an array of strings; `port` must be an
    /// integer in the `u16` range.
    ///
    /// # Errors
    ///
    /// Returns [`HostError::InvalidConfiguration`] for malformed settings, or
    /// a runtime error when the state lock is poisoned.
    pub fn add_connection(&self, config: &ConnectionConfig) -> HostResult<()> {
        let connection = parse_connection(config)?;
        self.write_state()?.connections.push(connection);
        Ok(())
    }

    /// Adds a route to every connection matching `select`, or to every
    /// connection when `select` is `None`.
    ///
    /// Returns how many connections received the route.
    ///
    /// # Errors
    ///
    /// Returns a runtime error when the state lock is poisoned.
    pub fn route(
        &self,
        select: Option<&Select>,
        path: impl Into<String>,
        body: Value,
    ) -> HostResult<usize> {
        let route = InMemoryRoute {
            path: path.into(),
            body,
        };
        let mut state = self.write_state()?;
        let mut attached = 0;
        for connection in state
            .connections
            .iter_mut()
            .filter(|connection| {
                select.is_none_or(|filter| filter.matches_any(&connection.labels))
            })
        {
            connection.routes.push(route.clone());
            attached += 1;
        }
        Ok(attached)
    }

    /// Simulates a `GET` request against the first connection carrying
    /// `label` (any connection when `label` is `None`) that serves `path`.
    ///
    /// # Errors
    ///
    /// Returns a runtime error when the state lock is poisoned.
    pub fn inject(&self, label: Option<&str>, path: &str) -> HostResult<Option<Value>> {
        let state = self.read_state()?;
        Ok(state
            .connections
            .iter()
            .filter(|connection| {
                label.is_none_or(|wanted| connection.labels.iter().any(|owned| owned == wanted))
            })
            .flat_map(|connection| connection.routes.iter())
            .find(|route| route.path == path)
            .map(|route| route.body.clone()))
    }

    /// Returns a snapshot of the bound connections.
    ///
    /// # Errors
    ///
    /// Returns a runtime error when the state lock is poisoned.
    pub fn connections(&self) -> HostResult<Vec<InMemoryConnection>> {
        Ok(self.read_state()?.connections.clone())
    }

    /// Returns registered plugin names in registration order.
    ///
    /// # Errors
    ///
    /// Returns a runtime error when the state lock is poisoned.
    pub fn plugins(&self) -> HostResult<Vec<String>> {
        Ok(self.read_state()?.plugins.clone())
    }

    /// Checks that a plugin may be registered, without recording it.
    ///
    /// # Errors
    ///
    /// Returns [`HostError::Rejected`] for a repeated single-use plugin.
    pub fn check_plugin(&self, name: &str, multiple: bool) -> HostResult<()> {
        ensure_registrable(&self.read_state()?.plugins, name, multiple)
    }

    /// Records a plugin name, refusing repeats unless `multiple` is set.
    ///
    /// # Errors
    ///
    /// Returns [`HostError::Rejected`] for a repeated single-use plugin.
    pub fn record_plugin(&self, name: &str, multiple: bool) -> HostResult<()> {
        let mut state = self.write_state()?;
        ensure_registrable(&state.plugins, name, multiple)?;
        state.plugins.push(name.to_owned());
        Ok(())
    }

    /// Stores an application value.
    ///
    /// # Errors
    ///
    /// Returns a runtime error when the state lock is poisoned.
    pub fn set_app(&self, key: impl Into<String>, value: Value) -> HostResult<()> {
        self.write_state()?.app.insert(key.into(), value);
        Ok(())
    }

    /// Reads an application value.
    ///
    /// # Errors
    ///
    /// Returns a runtime error when the state lock is poisoned.
    pub fn app(&self, key: &str) -> HostResult<Option<Value>> {
        Ok(self.read_state()?.app.get(key).cloned())
    }

    fn read_state(&self) -> HostResult<RwLockReadGuard<'_, InMemoryServerState>> {
        self.state.read().map_err(poisoned)
    }

    fn write_state(&self) -> HostResult<RwLockWriteGuard<'_, InMemoryServerState>> {
        self.state.write().map_err(poisoned)
    }
}

fn poisoned<T>(err: PoisonError<T>) -> HostError {
    HostError::runtime(std::io::Error::other(err.to_string()))
}

fn ensure_registrable(plugins: &[String], name: &str, multiple: bool) -> HostResult<()> {
    if !multiple && plugins.iter().any(|existing| existing == name) {
        return Err(HostError::Rejected(format!("plugin {name} already registered")));
    }
    Ok(())
}

fn parse_connection(config: &ConnectionConfig) -> HostResult<InMemoryConnection> {
    let settings = config.settings();

    let labels = match settings.get("labels") {
        None => Vec::new(),
        Some(value) => Select::from_value(value, "labels")
            .map_err(|err| HostError::InvalidConfiguration(err.to_string()))?
            .into_labels(),
    };

    let port = match settings.get("port") {
        None => None,
        Some(value) => Some(
            value
                .as_u64()
                .and_then(|port| u16::try_from(port).ok())
                .ok_or_else(|| {
                    HostError::InvalidConfiguration(format!("invalid connection port: {value}"))
                })?,
        ),
    };

    Ok(InMemoryConnection {
        labels,
        port,
        routes: Vec::new(),
    })
}

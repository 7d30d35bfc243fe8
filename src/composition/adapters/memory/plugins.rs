//! Ready-made plugins for the in-memory host.

use super::InMemoryServer;
use crate::composition::{
    domain::{PluginAttributes, RegistrationOptions, SELECT_KEY, Select},
    ports::{HostError, HostResult, ServerPlugin},
};
use async_trait::async_trait;
use serde_json::Value;
use std::sync::Arc;

/// Plugin that serves one fixed `GET` route.
///
/// Honours two registration options: `select` limits the connections that
/// receive the route, and `routes.prefix` is prepended to its path.
#[derive(Debug, Clone)]
pub struct StaticRoutePlugin {
    attributes: PluginAttributes,
    path: String,
    body: Value,
}

impl StaticRoutePlugin {
    /// Creates a plugin serving `body` at `path`.
    #[must_use]
    pub fn new(attributes: PluginAttributes, path: impl Into<String>, body: Value) -> Self {
        Self {
            attributes,
            path: path.into(),
            body,
        }
    }
}

#[async_trait]
impl ServerPlugin<InMemoryServer> for StaticRoutePlugin {
    fn attributes(&self) -> &PluginAttributes {
        &self.attributes
    }

    async fn register(
        &self,
        server: Arc<InMemoryServer>,
        options: &RegistrationOptions,
    ) -> HostResult<()> {
        let select = options
            .get(SELECT_KEY)
            .map(|value| Select::from_value(value, SELECT_KEY))
            .transpose()
            .map_err(|err| HostError::InvalidConfiguration(err.to_string()))?;
        let prefix = options
            .get("routes")
            .and_then(|routes| routes.get("prefix"))
            .and_then(Value::as_str);

        server.route(
            select.as_ref(),
            prefixed_path(prefix, &self.path),
            self.body.clone(),
        )?;
        Ok(())
    }
}

/// Joins a route prefix and a path with exactly one separating slash.
fn prefixed_path(prefix: Option<&str>, path: &str) -> String {
    let trimmed = path.trim_start_matches('/');
    match prefix {
        Some(base) => format!("{}/{trimmed}", base.trim_end_matches('/')),
        None => format!("/{trimmed}"),
    }
}

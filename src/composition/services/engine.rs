//! Composition engine: validate, plan, then run steps one at a time.

use super::ComposeParameters;
use crate::composition::{
    domain::{
        CompositionId, CompositionMode, CompositionStep, ConnectionConfig, Manifest, ModulePath,
        Registration, RegistrationOptions, SELECT_KEY, Select, ValidationError,
    },
    ports::{HostError, HostFramework, HostResult, LoadedPlugin, ResolvedCache, ServerSettings},
};
use camino::Utf8Path;
use serde_json::Value;
use std::sync::Arc;
use thiserror::Error;
use tracing::{debug, warn};

/// Errors ending a composition run.
///
/// Step failures are returned exactly as the host, hook or plugin reported
/// them.
#[derive(Debug, Clone, Error)]
pub enum CompositionError {
    /// Manifest or options failed validation; no step ran.
    #[error("invalid composition parameters: {0}")]
    Validation(#[from] ValidationError),
    /// A step failed; later steps did not run.
    #[error(transparent)]
    Step(#[from] HostError),
}

impl CompositionError {
    /// Converts the error for reporting through a host plugin registration.
    ///
    /// Step errors pass through unchanged.
    #[must_use]
    pub fn into_host_error(self) -> HostError {
        match self {
            Self::Step(err) => err,
            Self::Validation(err) => HostError::runtime(err),
        }
    }
}

/// Result type for composition runs.
pub type CompositionResult<T> = Result<T, CompositionError>;

/// Builds or extends a server from a manifest through a host framework.
pub struct CompositionService<H>
where
    H: HostFramework,
{
    host: Arc<H>,
}

impl<H> Clone for CompositionService<H>
where
    H: HostFramework,
{
    fn clone(&self) -> Self {
        Self {
            host: Arc::clone(&self.host),
        }
    }
}

impl<H> CompositionService<H>
where
    H: HostFramework,
{
    /// Creates a composition service over a host framework.
    #[must_use]
    pub const fn new(host: Arc<H>) -> Self {
        Self { host }
    }

    /// Returns the host framework.
    #[must_use]
    pub const fn host(&self) -> &Arc<H> {
        &self.host
    }

    /// Runs one composition.
    ///
    /// Validates the parameters, constructs a server unless one was supplied,
    /// then runs the planned steps in order. The first failing step ends the
    /// run.
    ///
    /// # Errors
    ///
    /// Returns [`CompositionError::Validation`] before any side effect when the
    /// parameters are invalid, or [`CompositionError::Step`] with the first
    /// step failure.
    pub async fn compose(
        &self,
        parameters: &ComposeParameters<H::Server>,
    ) -> CompositionResult<Arc<H::Server>> {
        parameters.validate()?;

        let composition_id = CompositionId::new();
        let mode = CompositionMode::for_supplied_server(parameters.server.is_some());
        debug!(%composition_id, %mode, "composition started");

        let server = match &parameters.server {
            Some(server) => Arc::clone(server),
            None => self.construct_server(parameters).inspect_err(|err| {
                warn!(%composition_id, error = %err, "server construction failed");
            })?,
        };

        for &step in mode.steps() {
            debug!(%composition_id, %step, "running composition step");
            self.run_step(step, &server, parameters)
                .await
                .inspect_err(|err| {
                    warn!(%composition_id, %step, error = %err, "composition step failed");
                })?;
        }

        debug!(%composition_id, "composition finished");
        Ok(server)
    }

    async fn run_step(
        &self,
        step: CompositionStep,
        server: &Arc<H::Server>,
        parameters: &ComposeParameters<H::Server>,
    ) -> HostResult<()> {
        match step {
            CompositionStep::PreConnections => parameters.options.pre_connections.run(server).await,
            CompositionStep::BindConnections => self.bind_connections(server, &parameters.manifest),
            CompositionStep::PreRegister => parameters.options.pre_register.run(server).await,
            CompositionStep::RegisterPlugins => self.register_plugins(server, parameters).await,
        }
    }

    fn construct_server(
        &self,
        parameters: &ComposeParameters<H::Server>,
    ) -> HostResult<Arc<H::Server>> {
        let relative_to = parameters.options.relative_to.as_deref();
        let Some(config) = parameters.manifest.server.as_ref() else {
            return self.host.construct_server(ServerSettings::default());
        };

        let caches = config
            .cache_entries()
            .iter()
            .map(|spec| {
                let module = spec.engine().resolve(relative_to);
                let engine = self.host.load_cache_engine(&module)?;
                Ok(ResolvedCache {
                    module,
                    engine,
                    options: spec.options(),
                })
            })
            .collect::<HostResult<Vec<_>>>()?;

        self.host.construct_server(ServerSettings {
            caches,
            settings: config.settings.clone(),
        })
    }

    fn bind_connections(&self, server: &Arc<H::Server>, manifest: &Manifest) -> HostResult<()> {
        if manifest.connections.is_empty() {
            return self.host.add_connection(server, &ConnectionConfig::default());
        }
        manifest
            .connections
            .iter()
            .try_for_each(|connection| self.host.add_connection(server, connection))
    }

    async fn register_plugins(
        &self,
        server: &Arc<H::Server>,
        parameters: &ComposeParameters<H::Server>,
    ) -> HostResult<()> {
        let relative_to = parameters.options.relative_to.as_deref();
        let select = parameters.options.select.as_ref();

        let prepared = parameters
            .manifest
            .registrations
            .iter()
            .map(|registration| self.prepare_registration(registration, relative_to, select))
            .collect::<HostResult<Vec<_>>>()?;

        for (plugin, options) in prepared {
            debug!(module = %plugin.module, "registering plugin");
            self.host.register(server, plugin, options).await?;
        }
        Ok(())
    }

    fn prepare_registration(
        &self,
        registration: &Registration,
        relative_to: Option<&Utf8Path>,
        select: Option<&Select>,
    ) -> HostResult<(LoadedPlugin<H::Plugin>, RegistrationOptions)> {
        let descriptor = registration.plugin.to_descriptor();
        let module: ModulePath = descriptor.register.resolve(relative_to);
        let plugin = self.host.load_plugin(&module)?;
        let options = merge_registration_options(registration.options.as_ref(), select);
        Ok((
            LoadedPlugin {
                module,
                plugin,
                extra: descriptor.extra,
            },
            options,
        ))
    }
}

/// Builds the options handed to the host for one registration.
///
/// Absent options become `{}`. When `select` is given it fills the `select`
/// key only if the registration does not already set one.
#[must_use]
pub fn merge_registration_options(
    options: Option<&RegistrationOptions>,
    select: Option<&Select>,
) -> RegistrationOptions {
    let mut merged = options.cloned().unwrap_or_default();
    if let Some(filter) = select {
        merged
            .entry(SELECT_KEY)
            .or_insert_with(|| Value::from(filter));
    }
    merged
}

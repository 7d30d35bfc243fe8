//! Entry wrapper exposing `compose` and host-plugin `register`.

use super::{
    ComposeParameters, CompositionError, CompositionResult, CompositionService,
    HostRegistrationOptions,
};
use crate::composition::{
    domain::{PluginAttributes, RegistrationOptions},
    ports::{HostError, HostFramework, HostResult, ServerPlugin},
};
use async_trait::async_trait;
use std::sync::Arc;
use tokio::task::JoinHandle;

/// Captured composition parameters with a plugin identity.
///
/// A composer either builds a server from its manifest (`compose`) or applies
/// the manifest's registrations to a server handed over by a host
/// (`register`). Each call plans and runs its own steps.
///
/// Two calls that share one server and run at the same time interleave their
/// steps in no particular order; nothing guards against that.
pub struct Composer<H>
where
    H: HostFramework,
{
    service: CompositionService<H>,
    parameters: ComposeParameters<H::Server>,
    attributes: PluginAttributes,
}

impl<H> Clone for Composer<H>
where
    H: HostFramework,
{
    fn clone(&self) -> Self {
        Self {
            service: self.service.clone(),
            parameters: self.parameters.clone(),
            attributes: self.attributes.clone(),
        }
    }
}

impl<H> Composer<H>
where
    H: HostFramework + 'static,
{
    /// Captures parameters and plugin attributes.
    #[must_use]
    pub fn new(
        host: Arc<H>,
        parameters: ComposeParameters<H::Server>,
        attributes: PluginAttributes,
    ) -> Self {
        Self {
            service: CompositionService::new(host),
            parameters,
            attributes,
        }
    }

    /// Returns the plugin attributes exactly as supplied.
    #[must_use]
    pub const fn attributes(&self) -> &PluginAttributes {
        &self.attributes
    }

    /// Returns the captured parameters.
    #[must_use]
    pub const fn parameters(&self) -> &ComposeParameters<H::Server> {
        &self.parameters
    }

    /// Composes with the captured parameters unchanged.
    ///
    /// # Errors
    ///
    /// Returns the validation error or the first failing step's error.
    pub async fn compose(&self) -> CompositionResult<Arc<H::Server>> {
        self.service.compose(&self.parameters).await
    }

    /// Composes on a spawned task and hands the outcome to `callback`.
    ///
    /// The callback never runs inside the calling frame.
    ///
    /// # Panics
    ///
    /// Panics when called outside a Tokio runtime.
    pub fn compose_with<F>(&self, callback: F) -> JoinHandle<()>
    where
        F: FnOnce(CompositionResult<Arc<H::Server>>) + Send + 'static,
    {
        let composer = self.clone();
        tokio::spawn(async move {
            let outcome = composer.compose().await;
            callback(outcome);
        })
    }

    /// Applies the manifest's registrations to a host-supplied server.
    ///
    /// The captured parameters are copied with `server` replaced and, when
    /// the host passes one, `select` replaced.
    ///
    /// # Errors
    ///
    /// Returns the validation error or the first failing registration's
    /// error.
    pub async fn register(
        &self,
        server: Arc<H::Server>,
        host_options: HostRegistrationOptions,
    ) -> CompositionResult<Arc<H::Server>> {
        self.register_into(server, &host_options).await
    }

    /// Registers on a spawned task and hands the outcome to `callback`.
    ///
    /// # Panics
    ///
    /// Panics when called outside a Tokio runtime.
    pub fn register_with<F>(
        &self,
        server: Arc<H::Server>,
        host_options: HostRegistrationOptions,
        callback: F,
    ) -> JoinHandle<()>
    where
        F: FnOnce(CompositionResult<Arc<H::Server>>) + Send + 'static,
    {
        let composer = self.clone();
        tokio::spawn(async move {
            let outcome = composer.register_into(server, &host_options).await;
            callback(outcome);
        })
    }

    async fn register_into(
        &self,
        server: Arc<H::Server>,
        host_options: &HostRegistrationOptions,
    ) -> CompositionResult<Arc<H::Server>> {
        let parameters = self.parameters.for_host(server, host_options);
        self.service.compose(&parameters).await
    }
}

#[async_trait]
impl<H> ServerPlugin<H::Server> for Composer<H>
where
    H: HostFramework + 'static,
{
    fn attributes(&self) -> &PluginAttributes {
        &self.attributes
    }

    async fn register(
        &self,
        server: Arc<H::Server>,
        options: &RegistrationOptions,
    ) -> HostResult<()> {
        let host_options =
            HostRegistrationOptions::from_options(options).map_err(HostError::runtime)?;
        self.register_into(server, &host_options)
            .await
            .map(drop)
            .map_err(CompositionError::into_host_error)
    }
}

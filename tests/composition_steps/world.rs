//! Shared world state for composition BDD scenarios.

use std::sync::Arc;

use rstest::fixture;
use serde_json::{Value, json};
use trellis::composition::{
    adapters::memory::{InMemoryFramework, InMemoryServer},
    domain::{Manifest, PluginAttributes},
    ports::ServerSettings,
    services::{ComposeOptions, ComposeParameters, Composer, CompositionResult},
};

/// Base directory used to resolve relative module paths in scenarios.
pub const APP_ROOT: &str = "/srv/app";

/// Body served by the route plugin.
#[must_use]
pub fn route_body() -> Value {
    json!({"plugin": "works"})
}

/// Scenario world for composition behaviour tests.
pub struct CompositionWorld {
    /// Host framework the composer talks to.
    pub host: Arc<InMemoryFramework>,
    /// Manifest assembled by given steps.
    pub manifest: Manifest,
    /// Options assembled by given steps.
    pub options: ComposeOptions<InMemoryServer>,
    /// Server owned by the host before composition, if any.
    pub existing_server: Option<Arc<InMemoryServer>>,
    /// Outcome of the last composition.
    pub outcome: Option<CompositionResult<Arc<InMemoryServer>>>,
}

impl CompositionWorld {
    /// Creates a world with an empty host and manifest.
    #[must_use]
    pub fn new() -> Self {
        Self {
            host: Arc::new(InMemoryFramework::new()),
            manifest: Manifest::new(),
            options: ComposeOptions::new().with_relative_to(APP_ROOT),
            existing_server: None,
            outcome: None,
        }
    }

    /// Builds a composer from the assembled manifest and options.
    #[must_use]
    pub fn composer(&self) -> Composer<InMemoryFramework> {
        Composer::new(
            Arc::clone(&self.host),
            ComposeParameters::new(self.manifest.clone()).with_options(self.options.clone()),
            PluginAttributes::new("scenario-composer", "0.1.0"),
        )
    }

    /// Returns the existing server, creating an empty one on first use.
    pub fn existing_server(&mut self) -> Arc<InMemoryServer> {
        Arc::clone(
            self.existing_server
                .get_or_insert_with(|| Arc::new(InMemoryServer::new(ServerSettings::default()))),
        )
    }

    /// Returns the server produced by a successful composition.
    ///
    /// # Errors
    ///
    /// Returns an error when nothing was composed or the composition failed.
    pub fn composed_server(&self) -> Result<Arc<InMemoryServer>, eyre::Report> {
        match &self.outcome {
            Some(Ok(server)) => Ok(Arc::clone(server)),
            Some(Err(err)) => Err(eyre::eyre!("composition failed: {err}")),
            None => Err(eyre::eyre!("no composition ran in this scenario")),
        }
    }
}

impl Default for CompositionWorld {
    fn default() -> Self {
        Self::new()
    }
}

/// Fixture that creates a new scenario world.
#[fixture]
pub fn world() -> CompositionWorld {
    CompositionWorld::default()
}

/// Runs an async operation within sync step definitions.
pub fn run_async<T>(future: impl std::future::Future<Output = T>) -> T {
    tokio::task::block_in_place(|| tokio::runtime::Handle::current().block_on(future))
}

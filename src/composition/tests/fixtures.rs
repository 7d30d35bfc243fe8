//! Shared plugins and builders for composition unit tests.

use crate::composition::{
    adapters::memory::{InMemoryFramework, InMemoryServer},
    domain::{PluginAttributes, RegistrationOptions},
    ports::{HostError, HostResult, ServerPlugin},
};
use async_trait::async_trait;
use std::sync::{Arc, Mutex, PoisonError};

/// Ordered log shared between plugins and hooks in one test.
#[derive(Debug, Clone, Default)]
pub struct CallLog(Arc<Mutex<Vec<String>>>);

impl CallLog {
    pub fn push(&self, entry: impl Into<String>) {
        self.0
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(entry.into());
    }

    pub fn entries(&self) -> Vec<String> {
        self.0
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

/// Plugin that logs the start and end of its registration and the options
/// it received, yielding to the scheduler in between.
pub struct RecordingPlugin {
    attributes: PluginAttributes,
    log: CallLog,
    received: Arc<Mutex<Vec<RegistrationOptions>>>,
}

impl RecordingPlugin {
    pub fn new(name: &str, log: &CallLog) -> Self {
        Self {
            attributes: PluginAttributes::new(name, "1.0.0"),
            log: log.clone(),
            received: Arc::default(),
        }
    }

    pub fn received(&self) -> Vec<RegistrationOptions> {
        self.received
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

#[async_trait]
impl ServerPlugin<InMemoryServer> for RecordingPlugin {
    fn attributes(&self) -> &PluginAttributes {
        &self.attributes
    }

    async fn register(
        &self,
        _server: Arc<InMemoryServer>,
        options: &RegistrationOptions,
    ) -> HostResult<()> {
        self.log.push(format!("start:{}", self.attributes.name()));
        self.received
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(options.clone());
        tokio::task::yield_now().await;
        self.log.push(format!("end:{}", self.attributes.name()));
        Ok(())
    }
}

/// Plugin whose registration always fails.
pub struct FailingPlugin {
    attributes: PluginAttributes,
    log: CallLog,
}

impl FailingPlugin {
    pub fn new(name: &str, log: &CallLog) -> Self {
        Self {
            attributes: PluginAttributes::new(name, "1.0.0"),
            log: log.clone(),
        }
    }
}

#[async_trait]
impl ServerPlugin<InMemoryServer> for FailingPlugin {
    fn attributes(&self) -> &PluginAttributes {
        &self.attributes
    }

    async fn register(
        &self,
        _server: Arc<InMemoryServer>,
        _options: &RegistrationOptions,
    ) -> HostResult<()> {
        self.log.push(format!("fail:{}", self.attributes.name()));
        Err(HostError::Rejected(format!(
            "{} refused to register",
            self.attributes.name()
        )))
    }
}

/// Host with recording plugins loadable under `./plugins/<name>` resolved
/// against `/srv/app`.
pub fn host_with_recorders(
    names: &[&str],
    log: &CallLog,
) -> (Arc<InMemoryFramework>, Vec<Arc<RecordingPlugin>>) {
    let host = Arc::new(InMemoryFramework::new());
    let plugins = names
        .iter()
        .map(|name| {
            let plugin = Arc::new(RecordingPlugin::new(name, log));
            host.add_plugin(format!("/srv/app/plugins/{name}"), plugin.clone())
                .expect("plugin should be added");
            plugin
        })
        .collect();
    (host, plugins)
}

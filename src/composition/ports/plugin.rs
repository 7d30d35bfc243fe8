//! Plugin port implemented by anything a host can register.

use super::HostResult;
use crate::composition::domain::{PluginAttributes, RegistrationOptions};
use async_trait::async_trait;
use std::sync::Arc;

/// A plugin that installs itself onto a server of type `S`.
#[async_trait]
pub trait ServerPlugin<S>: Send + Sync
where
    S: Send + Sync + 'static,
{
    /// Returns the metadata presented to the host.
    fn attributes(&self) -> &PluginAttributes;

    /// Installs the plugin.
    ///
    /// # Errors
    ///
    /// Returns a host error when installation fails; the host aborts the
    /// enclosing composition with it.
    async fn register(&self, server: Arc<S>, options: &RegistrationOptions) -> HostResult<()>;
}

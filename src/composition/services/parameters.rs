//! Composition parameters and lifecycle hooks.

use crate::composition::{
    domain::{Manifest, RegistrationOptions, SELECT_KEY, Select, ValidationError, ValidationResult},
    ports::HostResult,
    validation::{validate_manifest, validate_relative_to, validate_select},
};
use camino::Utf8PathBuf;
use std::fmt;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;

/// Future returned by a hook handler.
pub type HookFuture = Pin<Box<dyn Future<Output = HostResult<()>> + Send>>;

type HookHandler<S> = Arc<dyn Fn(Arc<S>) -> HookFuture + Send + Sync>;

/// A lifecycle hook that runs before connections are bound or before plugins
/// are registered.
///
/// `Absent` and `Disabled` behave the same at run time; `Disabled` records
/// that the caller explicitly switched the hook off.
pub enum Hook<S> {
    /// No hook configured.
    Absent,
    /// Hook explicitly switched off.
    Disabled,
    /// Handler invoked with the server; the composition waits for it.
    Handler(HookHandler<S>),
}

impl<S> Hook<S> {
    /// Wraps an async handler.
    pub fn handler<F, Fut>(handler: F) -> Self
    where
        S: 'static,
        F: Fn(Arc<S>) -> Fut + Send + Sync + 'static,
        Fut: Future<Output = HostResult<()>> + Send + 'static,
    {
        Self::Handler(Arc::new(move |server: Arc<S>| -> HookFuture {
            Box::pin(handler(server))
        }))
    }

    /// Returns `true` when a handler will run.
    #[must_use]
    pub const fn is_handler(&self) -> bool {
        matches!(self, Self::Handler(_))
    }

    /// Runs the handler, or completes immediately when there is none.
    ///
    /// # Errors
    ///
    /// Returns the handler's error unchanged.
    pub async fn run(&self, server: &Arc<S>) -> HostResult<()> {
        match self {
            Self::Handler(handler) => handler(Arc::clone(server)).await,
            Self::Absent | Self::Disabled => Ok(()),
        }
    }
}

impl<S> Default for Hook<S> {
    fn default() -> Self {
        Self::Absent
    }
}

impl<S> Clone for Hook<S> {
    fn clone(&self) -> Self {
        match self {
            Self::Absent => Self::Absent,
            Self::Disabled => Self::Disabled,
            Self::Handler(handler) => Self::Handler(Arc::clone(handler)),
        }
    }
}

impl<S> fmt::Debug for Hook<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Absent => f.write_str("Absent"),
            Self::Disabled => f.write_str("Disabled"),
            Self::Handler(_) => f.write_str("Handler(..)"),
        }
    }
}

/// Options steering a composition run.
pub struct ComposeOptions<S> {
    /// Base directory for relative module paths.
    pub relative_to: Option<Utf8PathBuf>,
    /// Hook run before connections are bound.
    pub pre_connections: Hook<S>,
    /// Hook run after connections are bound and before plugins register.
    pub pre_register: Hook<S>,
    /// Connection filter merged into every registration's options.
    pub select: Option<Select>,
}

impl<S> ComposeOptions<S> {
    /// Creates options with every field unset.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the base directory for relative module paths.
    #[must_use]
    pub fn with_relative_to(mut self, relative_to: impl Into<Utf8PathBuf>) -> Self {
        self.relative_to = Some(relative_to.into());
        self
    }

    /// Sets the connection filter.
    #[must_use]
    pub fn with_select(mut self, select: impl Into<Select>) -> Self {
        self.select = Some(select.into());
        self
    }

    /// Sets the pre-connections hook.
    #[must_use]
    pub fn with_pre_connections(mut self, hook: Hook<S>) -> Self {
        self.pre_connections = hook;
        self
    }

    /// Sets the pre-register hook.
    #[must_use]
    pub fn with_pre_register(mut self, hook: Hook<S>) -> Self {
        self.pre_register = hook;
        self
    }

    /// Validates the options.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError`] listing every violated constraint.
    pub fn validate(&self) -> ValidationResult<()> {
        let mut errors = Vec::new();
        if let Some(relative_to) = &self.relative_to
            && let Err(err) = validate_relative_to(relative_to)
        {
            errors.push(err);
        }
        if let Some(select) = &self.select
            && let Err(err) = validate_select(select)
        {
            errors.push(err);
        }
        ValidationError::collect(errors)
    }
}

impl<S> Default for ComposeOptions<S> {
    fn default() -> Self {
        Self {
            relative_to: None,
            pre_connections: Hook::Absent,
            pre_register: Hook::Absent,
            select: None,
        }
    }
}

impl<S> Clone for ComposeOptions<S> {
    fn clone(&self) -> Self {
        Self {
            relative_to: self.relative_to.clone(),
            pre_connections: self.pre_connections.clone(),
            pre_register: self.pre_register.clone(),
            select: self.select.clone(),
        }
    }
}

impl<S> fmt::Debug for ComposeOptions<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ComposeOptions")
            .field("relative_to", &self.relative_to)
            .field("pre_connections", &self.pre_connections)
            .field("pre_register", &self.pre_register)
            .field("select", &self.select)
            .finish()
    }
}

/// Everything one composition run needs.
///
/// When `server` is present the run is registration-only: connections are
/// assumed bound and only the manifest's registrations are applied.
pub struct ComposeParameters<S> {
    /// Manifest to apply.
    pub manifest: Manifest,
    /// Run options.
    pub options: ComposeOptions<S>,
    /// Existing server to register into.
    pub server: Option<Arc<S>>,
}

impl<S> ComposeParameters<S> {
    /// Creates parameters with default options and no server.
    #[must_use]
    pub fn new(manifest: Manifest) -> Self {
        Self {
            manifest,
            options: ComposeOptions::default(),
            server: None,
        }
    }

    /// Replaces the options.
    #[must_use]
    pub fn with_options(mut self, options: ComposeOptions<S>) -> Self {
        self.options = options;
        self
    }

    /// Supplies an existing server.
    #[must_use]
    pub fn with_server(mut self, server: Arc<S>) -> Self {
        self.server = Some(server);
        self
    }

    /// Returns a copy targeting a host-supplied server.
    ///
    /// The host's `select`, when present, replaces the configured one.
    #[must_use]
    pub fn for_host(&self, server: Arc<S>, host_options: &HostRegistrationOptions) -> Self {
        let mut parameters = self.clone();
        parameters.server = Some(server);
        if let Some(select) = &host_options.select {
            parameters.options.select = Some(select.clone());
        }
        parameters
    }

    /// Validates manifest and options together.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError`] listing every violated constraint across
    /// both.
    pub fn validate(&self) -> ValidationResult<()> {
        let errors = [validate_manifest(&self.manifest), self.options.validate()]
            .into_iter()
            .filter_map(Result::err)
            .collect();
        ValidationError::collect(errors)
    }
}

impl<S> Clone for ComposeParameters<S> {
    fn clone(&self) -> Self {
        Self {
            manifest: self.manifest.clone(),
            options: self.options.clone(),
            server: self.server.clone(),
        }
    }
}

impl<S> fmt::Debug for ComposeParameters<S> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ComposeParameters")
            .field("manifest", &self.manifest)
            .field("options", &self.options)
            .field("server_supplied", &self.server.is_some())
            .finish()
    }
}

/// Options a host passes when registering a composer as a plugin.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct HostRegistrationOptions {
    /// Connection filter overriding the composer's own.
    pub select: Option<Select>,
}

impl HostRegistrationOptions {
    /// Creates empty host options.
    #[must_use]
    pub const fn new() -> Self {
        Self { select: None }
    }

    /// Sets the connection filter.
    #[must_use]
    pub fn with_select(mut self, select: impl Into<Select>) -> Self {
        self.select = Some(select.into());
        self
    }

    /// Reads host options from registration options.
    ///
    /// Keys other than `select` belong to the host and are ignored. An empty
    /// string `select` counts as absent.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError`] when `select` is malformed or contains an
    /// empty label.
    pub fn from_options(options: &RegistrationOptions) -> ValidationResult<Self> {
        let select = options
            .get(SELECT_KEY)
            .filter(|value| value.as_str() != Some(""))
            .map(|value| Select::from_value(value, SELECT_KEY))
            .transpose()?;
        if let Some(filter) = &select {
            validate_select(filter)?;
        }
        Ok(Self { select })
    }
}

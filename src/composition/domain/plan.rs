//! Ordered composition steps.

use std::fmt;

/// Whether the composition builds a server or joins an existing one.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompositionMode {
    /// A new server is constructed and connections are bound.
    Full,
    /// A server was supplied; only plugin registration runs.
    RegistrationOnly,
}

impl CompositionMode {
    /// Selects the mode from whether a server was supplied.
    #[must_use]
    pub const fn for_supplied_server(server_supplied: bool) -> Self {
        if server_supplied {
            Self::RegistrationOnly
        } else {
            Self::Full
        }
    }

    /// Returns the steps to run, in execution order.
    #[must_use]
    pub const fn steps(self) -> &'static [CompositionStep] {
        match self {
            Self::Full => &[
                CompositionStep::PreConnections,
                CompositionStep::BindConnections,
                CompositionStep::PreRegister,
                CompositionStep::RegisterPlugins,
            ],
            Self::RegistrationOnly => &[CompositionStep::RegisterPlugins],
        }
    }

    /// Returns the canonical lowercase name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Full => "full",
            Self::RegistrationOnly => "registration_only",
        }
    }
}

impl fmt::Display for CompositionMode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A single side-effecting step of a composition run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompositionStep {
    /// Runs the pre-connections hook.
    PreConnections,
    /// Binds manifest connections, or one default connection.
    BindConnections,
    /// Runs the pre-register hook.
    PreRegister,
    /// Registers manifest plugins one at a time.
    RegisterPlugins,
}

impl CompositionStep {
    /// Returns the canonical lowercase name.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::PreConnections => "pre_connections",
            Self::BindConnections => "bind_connections",
            Self::PreRegister => "pre_register",
            Self::RegisterPlugins => "register_plugins",
        }
    }
}

impl fmt::Display for CompositionStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

//! Port contracts between the composition engine and its host framework.

mod host;
mod plugin;

pub use host::{
    HostError, HostFramework, HostResult, LoadedPlugin, ResolvedCache, ServerSettings,
};
pub use plugin::ServerPlugin;

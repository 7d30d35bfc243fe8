//! Domain model for manifest-driven composition.
//!
//! The domain models manifests, module references, connection filters and the
//! ordered step plan. Host framework concerns remain outside this boundary.

mod attributes;
mod error;
mod ids;
mod manifest;
mod module_path;
mod plan;
mod select;

pub use attributes::PluginAttributes;
pub use error::{ValidationError, ValidationResult};
pub use ids::CompositionId;
pub use manifest::{
    CacheDescriptor, CacheSetting, CacheSpec, ConnectionConfig, Manifest, ObjectMap,
    PluginDescriptor, PluginSpec, Registration, RegistrationOptions, ServerConfig,
};
pub use module_path::ModulePath;
pub use plan::{CompositionMode, CompositionStep};
pub use select::{SELECT_KEY, Select};

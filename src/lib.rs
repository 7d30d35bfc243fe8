//! Trellis: manifest-driven server composition.
//!
//! This crate builds and configures a web server from a declarative manifest
//! of server settings, connections and plugins, or registers itself as a
//! plugin into a server that already exists. The web framework is reached
//! only through the [`composition::ports::HostFramework`] port.
//!
//! # Architecture
//!
//! Trellis follows hexagonal architecture principles:
//!
//! - **Domain**: Manifests, module paths and the step plan
//! - **Ports**: Abstract trait interfaces for the host framework and plugins
//! - **Adapters**: An in-memory host and manifest file loading
//!
//! # Modules
//!
//! - [`composition`]: Validation, step planning and serial execution

pub mod composition;

pub use composition::{
    domain::{Manifest, PluginAttributes, Select, ValidationError},
    ports::{HostError, HostFramework, ServerPlugin},
    services::{
        ComposeOptions, ComposeParameters, Composer, CompositionError, CompositionService, Hook,
        HostRegistrationOptions,
    },
};

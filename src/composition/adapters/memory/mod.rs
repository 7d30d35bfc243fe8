//! In-memory host adapter for tests and local tooling.

mod framework;
mod plugins;
mod server;

pub use framework::{HostEvent, InMemoryCacheEngine, InMemoryFramework, InMemoryPlugin};
pub use plugins::StaticRoutePlugin;
pub use server::{InMemoryConnection, InMemoryRoute, InMemoryServer};

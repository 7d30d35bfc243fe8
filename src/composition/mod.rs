//! Manifest-driven server composition.
//!
//! A manifest names server settings, connections and plugin registrations.
//! Composition validates it, builds a server (or adopts one supplied by a
//! host), then binds connections and registers plugins strictly one after
//! another, stopping at the first failure. The module follows hexagonal
//! architecture:
//!
//! - Domain types in [`domain`]
//! - Validation rules in [`validation`]
//! - Port contracts in [`ports`]
//! - Adapter implementations in [`adapters`]
//! - Orchestration services in [`services`]

pub mod adapters;
pub mod domain;
pub mod ports;
pub mod services;
pub mod validation;

#[cfg(test)]
mod tests;

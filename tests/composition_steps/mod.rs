//! Step definitions and world state for composition scenarios.

pub mod world;

mod given;
mod then;
mod when;

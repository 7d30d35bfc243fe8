//! Adapter implementations for the composition ports.

pub mod file;
pub mod memory;

pub use file::{ManifestFileError, load_parameters_file, load_parameters_from_dir};

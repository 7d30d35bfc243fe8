//! Manifest and options validation.
//!
//! Typed rules live in [`rules`]; checks on raw JSON documents live in
//! [`document`]. Both collect every violation into one [`ValidationError`].
//!
//! [`ValidationError`]: crate::composition::domain::ValidationError

pub mod document;
pub mod rules;

pub use document::{check_parameters_document, parse_manifest};
pub use rules::{validate_manifest, validate_relative_to, validate_select};

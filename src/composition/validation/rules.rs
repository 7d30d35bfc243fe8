//! Constraint checks on typed manifests and option values.
//!
//! Each rule collects every violation it finds rather than stopping at the
//! first, so callers can report the complete list in one error.

use crate::composition::domain::{
    CacheSetting, CacheSpec, Manifest, PluginSpec, Registration, Select, ValidationError,
    ValidationResult,
};
use camino::Utf8Path;

/// Validates a manifest.
///
/// Checks that every cache engine and plugin module identifier is non-empty.
///
/// # Errors
///
/// Returns [`ValidationError`] listing every violated constraint.
pub fn validate_manifest(manifest: &Manifest) -> ValidationResult<()> {
    let mut errors = Vec::new();

    if let Some(cache) = manifest
        .server
        .as_ref()
        .and_then(|server| server.cache.as_ref())
    {
        collect_cache_errors(&mut errors, cache, "manifest.server.cache");
    }

    for (index, registration) in manifest.registrations.iter().enumerate() {
        collect_registration_errors(&mut errors, registration, index);
    }

    ValidationError::collect(errors)
}

/// Validates the base directory for relative module resolution.
///
/// # Errors
///
/// Returns [`ValidationError::EmptyValue`] when the path is empty.
pub fn validate_relative_to(relative_to: &Utf8Path) -> ValidationResult<()> {
    if relative_to.as_str().is_empty() {
        return Err(ValidationError::empty("options.relativeTo"));
    }
    Ok(())
}

/// Validates a connection filter.
///
/// # Errors
///
/// Returns [`ValidationError`] listing every empty label.
pub fn validate_select(select: &Select) -> ValidationResult<()> {
    match select {
        Select::Label(label) if label.is_empty() => {
            Err(ValidationError::empty("options.select"))
        }
        Select::Label(_) => Ok(()),
        Select::Labels(labels) => ValidationError::collect(
            labels
                .iter()
                .enumerate()
                .filter(|(_, label)| label.is_empty())
                .map(|(index, _)| ValidationError::empty(format!("options.select[{index}]")))
                .collect(),
        ),
    }
}

fn collect_cache_errors(errors: &mut Vec<ValidationError>, cache: &CacheSetting, path: &str) {
    match cache {
        CacheSetting::Single(spec) => collect_cache_spec_error(errors, spec, path),
        CacheSetting::Multiple(specs) => {
            for (index, spec) in specs.iter().enumerate() {
                collect_cache_spec_error(errors, spec, &format!("{path}[{index}]"));
            }
        }
    }
}

fn collect_cache_spec_error(errors: &mut Vec<ValidationError>, spec: &CacheSpec, path: &str) {
    if !spec.engine().as_str().is_empty() {
        return;
    }
    let engine_path = match spec {
        CacheSpec::Engine(_) => path.to_owned(),
        CacheSpec::Descriptor(_) => format!("{path}.engine"),
    };
    errors.push(ValidationError::empty(engine_path));
}

fn collect_registration_errors(
    errors: &mut Vec<ValidationError>,
    registration: &Registration,
    index: usize,
) {
    if registration.plugin.module().as_str().is_empty() {
        let path = match &registration.plugin {
            PluginSpec::Path(_) => {
                format!("manifest.registrations[{index}].plugin")
            }
            PluginSpec::Descriptor(_) => {
                format!("manifest.registrations[{index}].plugin.register")
            }
        };
        errors.push(ValidationError::empty(path));
    }
}

//! Shape checks for JSON manifest and parameters documents.
//!
//! Documents are checked before deserialization so that every type mismatch,
//! missing key and unknown key is reported with its path, instead of the first
//! decoding error only.

use crate::composition::domain::{Manifest, ValidationError, ValidationResult};
use serde_json::{Map, Value};

const PARAMETERS_KEYS: &[&str] = &["manifest", "options"];
const MANIFEST_KEYS: &[&str] = &["server", "connections", "registrations"];
const REGISTRATION_KEYS: &[&str] = &["plugin", "options"];
const OPTIONS_KEYS: &[&str] = &["relativeTo", "select", "preConnections", "preRegister"];

/// Checks and decodes a manifest document.
///
/// # Errors
///
/// Returns [`ValidationError`] listing every shape violation, or
/// [`ValidationError::Malformed`] when decoding fails after the checks pass.
pub fn parse_manifest(value: &Value) -> ValidationResult<Manifest> {
    let mut errors = Vec::new();
    check_manifest(value, "manifest", &mut errors);
    ValidationError::collect(errors)?;
    decode(value)
}

/// Checks the shape of a complete parameters document.
///
/// The document must be an object with a required `manifest` and an optional
/// `options` block.
///
/// # Errors
///
/// Returns [`ValidationError`] listing every shape violation.
pub fn check_parameters_document(value: &Value) -> ValidationResult<()> {
    let mut errors = Vec::new();
    let Some(document) = expect_object(value, "parameters", &mut errors) else {
        return ValidationError::collect(errors);
    };
    check_keys(document, PARAMETERS_KEYS, "parameters", &mut errors);

    match document.get("manifest") {
        Some(manifest) => check_manifest(manifest, "manifest", &mut errors),
        None => errors.push(ValidationError::missing("manifest")),
    }
    if let Some(options) = document.get("options") {
        check_options(options, "options", &mut errors);
    }

    ValidationError::collect(errors)
}

/// Decodes a value that already passed its shape checks.
///
/// # Errors
///
/// Returns [`ValidationError::Malformed`] when deserialization fails.
pub fn decode<T: serde::de::DeserializeOwned>(value: &Value) -> ValidationResult<T> {
    serde_json::from_value(value.clone()).map_err(|err| ValidationError::Malformed(err.to_string()))
}

fn check_manifest(value: &Value, path: &str, errors: &mut Vec<ValidationError>) {
    let Some(manifest) = expect_object(value, path, errors) else {
        return;
    };
    check_keys(manifest, MANIFEST_KEYS, path, errors);

    if let Some(server) = manifest.get("server") {
        check_server(server, &format!("{path}.server"), errors);
    }

    if let Some(connections) = manifest.get("connections") {
        let connections_path = format!("{path}.connections");
        if let Some(items) = expect_array(connections, &connections_path, errors) {
            for (index, connection) in items.iter().enumerate() {
                expect_object(connection, &format!("{connections_path}[{index}]"), errors);
            }
        }
    }

    if let Some(registrations) = manifest.get("registrations") {
        let registrations_path = format!("{path}.registrations");
        if let Some(items) = expect_array(registrations, &registrations_path, errors) {
            for (index, registration) in items.iter().enumerate() {
                check_registration(
                    registration,
                    &format!("{registrations_path}[{index}]"),
                    errors,
                );
            }
        }
    }
}

fn check_server(value: &Value, path: &str, errors: &mut Vec<ValidationError>) {
    let Some(server) = expect_object(value, path, errors) else {
        return;
    };
    let Some(cache) = server.get("cache") else {
        return;
    };

    let cache_path = format!("{path}.cache");
    match cache {
        Value::Array(entries) => {
            for (index, entry) in entries.iter().enumerate() {
                check_cache_entry(entry, &format!("{cache_path}[{index}]"), errors);
            }
        }
        entry => check_cache_entry(entry, &cache_path, errors),
    }
}

fn check_cache_entry(value: &Value, path: &str, errors: &mut Vec<ValidationError>) {
    match value {
        Value::String(_) => check_non_empty_string(value, path, errors),
        Value::Object(descriptor) => match descriptor.get("engine") {
            Some(engine) => check_non_empty_string(engine, &format!("{path}.engine"), errors),
            None => errors.push(ValidationError::missing(format!("{path}.engine"))),
        },
        _ => errors.push(ValidationError::invalid_type(
            path,
            "an engine name or a cache descriptor object",
        )),
    }
}

fn check_registration(value: &Value, path: &str, errors: &mut Vec<ValidationError>) {
    let Some(registration) = expect_object(value, path, errors) else {
        return;
    };
    check_keys(registration, REGISTRATION_KEYS, path, errors);

    let plugin_path = format!("{path}.plugin");
    match registration.get("plugin") {
        None => errors.push(ValidationError::missing(plugin_path)),
        Some(plugin @ Value::String(_)) => check_non_empty_string(plugin, &plugin_path, errors),
        Some(Value::Object(descriptor)) => {
            let register_path = format!("{plugin_path}.register");
            match descriptor.get("register") {
                Some(register) => check_non_empty_string(register, &register_path, errors),
                None => errors.push(ValidationError::missing(register_path)),
            }
        }
        Some(_) => errors.push(ValidationError::invalid_type(
            plugin_path,
            "a module path or a plugin descriptor object",
        )),
    }

    if let Some(options) = registration.get("options") {
        expect_object(options, &format!("{path}.options"), errors);
    }
}

fn check_options(value: &Value, path: &str, errors: &mut Vec<ValidationError>) {
    let Some(options) = expect_object(value, path, errors) else {
        return;
    };
    check_keys(options, OPTIONS_KEYS, path, errors);

    if let Some(relative_to) = options.get("relativeTo") {
        check_non_empty_string(relative_to, &format!("{path}.relativeTo"), errors);
    }

    if let Some(select) = options.get("select") {
        let select_path = format!("{path}.select");
        match select {
            Value::String(_) => check_non_empty_string(select, &select_path, errors),
            Value::Array(labels) => {
                for (index, label) in labels.iter().enumerate() {
                    check_non_empty_string(label, &format!("{select_path}[{index}]"), errors);
                }
            }
            _ => errors.push(ValidationError::invalid_type(
                select_path,
                "a string or an array of strings",
            )),
        }
    }

    for hook in ["preConnections", "preRegister"] {
        if let Some(value) = options.get(hook)
            && *value != Value::Bool(false)
        {
            errors.push(ValidationError::invalid_type(
                format!("{path}.{hook}"),
                "false (handlers are attached in code)",
            ));
        }
    }
}

fn expect_object<'a>(
    value: &'a Value,
    path: &str,
    errors: &mut Vec<ValidationError>,
) -> Option<&'a Map<String, Value>> {
    let object = value.as_object();
    if object.is_none() {
        errors.push(ValidationError::invalid_type(path, "an object"));
    }
    object
}

fn expect_array<'a>(
    value: &'a Value,
    path: &str,
    errors: &mut Vec<ValidationError>,
) -> Option<&'a Vec<Value>> {
    let array = value.as_array();
    if array.is_none() {
        errors.push(ValidationError::invalid_type(path, "an array"));
    }
    array
}

fn check_keys(
    object: &Map<String, Value>,
    allowed: &[&str],
    path: &str,
    errors: &mut Vec<ValidationError>,
) {
    for key in object.keys() {
        if !allowed.contains(&key.as_str()) {
            errors.push(ValidationError::unknown_key(format!("{path}.{key}")));
        }
    }
}

fn check_non_empty_string(value: &Value, path: &str, errors: &mut Vec<ValidationError>) {
    match value.as_str() {
        Some("") => errors.push(ValidationError::empty(path)),
        Some(_) => {}
        None => errors.push(ValidationError::invalid_type(path, "a string")),
    }
}

//! Parameters documents loaded from JSON.

use super::{ComposeOptions, ComposeParameters, Hook};
use crate::composition::{
    domain::{Manifest, Select, ValidationError, ValidationResult},
    validation::{check_parameters_document, document::decode},
};
use camino::Utf8PathBuf;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Manifest plus data-only options, as stored in a JSON document.
///
/// ```json
/// {
///   "manifest": {
///     "registrations": [{ "plugin": "./plugins/route" }]
///   },
///   "options": { "relativeTo": "/srv/app", "select": ["api"] }
/// }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ParametersDocument {
    /// Manifest to apply.
    pub manifest: Manifest,
    /// Data-only options.
    #[serde(default)]
    pub options: OptionsDocument,
}

/// The subset of composition options expressible as data.
///
/// Hooks can only be disabled from a document; handlers are attached in code
/// after loading.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", deny_unknown_fields)]
pub struct OptionsDocument {
    /// Base directory for relative module paths.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub relative_to: Option<Utf8PathBuf>,
    /// Connection filter.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub select: Option<Select>,
    /// `Some(false)` disables the pre-connections hook.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pre_connections: Option<bool>,
    /// `Some(false)` disables the pre-register hook.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub pre_register: Option<bool>,
}

impl ParametersDocument {
    /// Checks and decodes a parameters document.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError`] listing every shape violation.
    pub fn from_value(value: &Value) -> ValidationResult<Self> {
        check_parameters_document(value)?;
        decode(value)
    }

    /// Parses, checks and decodes a JSON string.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::Malformed`] for invalid JSON, otherwise the
    /// errors of [`Self::from_value`].
    pub fn from_json_str(json: &str) -> ValidationResult<Self> {
        let value: Value =
            serde_json::from_str(json).map_err(|err| ValidationError::Malformed(err.to_string()))?;
        Self::from_value(&value)
    }

    /// Sets `relative_to` when the document leaves it unset.
    #[must_use]
    pub fn with_default_relative_to(mut self, relative_to: impl Into<Utf8PathBuf>) -> Self {
        if self.options.relative_to.is_none() {
            self.options.relative_to = Some(relative_to.into());
        }
        self
    }

    /// Converts the document into composition parameters without a server.
    #[must_use]
    pub fn into_parameters<S>(self) -> ComposeParameters<S> {
        let options = ComposeOptions {
            relative_to: self.options.relative_to,
            pre_connections: hook_from_flag(self.options.pre_connections),
            pre_register: hook_from_flag(self.options.pre_register),
            select: self.options.select,
        };
        ComposeParameters::new(self.manifest).with_options(options)
    }
}

fn hook_from_flag<S>(flag: Option<bool>) -> Hook<S> {
    if flag == Some(false) {
        Hook::Disabled
    } else {
        Hook::Absent
    }
}

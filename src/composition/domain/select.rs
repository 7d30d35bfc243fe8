//! Connection label filter propagated into plugin registrations.

use super::{ValidationError, ValidationResult};
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Option key under which the filter is merged into registration options.
pub const SELECT_KEY: &str = "select";

/// Connection labels a plugin should attach to.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum Select {
    /// A single label.
    Label(String),
    /// Several labels.
    Labels(Vec<String>),
}

impl Select {
    /// Returns the labels in declaration order.
    #[must_use]
    pub fn labels(&self) -> Vec<&str> {
        match self {
            Self::Label(label) => vec![label.as_str()],
            Self::Labels(labels) => labels.iter().map(String::as_str).collect(),
        }
    }

    /// Consumes the filter, returning its labels.
    #[must_use]
    pub fn into_labels(self) -> Vec<String> {
        match self {
            Self::Label(label) => vec![label],
            Self::Labels(labels) => labels,
        }
    }

    /// Returns `true` when any label in `candidates` is selected.
    #[must_use]
    pub fn matches_any<S: AsRef<str>>(&self, candidates: &[S]) -> bool {
        let labels = self.labels();
        candidates
            .iter()
            .any(|candidate| labels.contains(&candidate.as_ref()))
    }

    /// Reads a filter from a JSON value found at `path`.
    ///
    /// # Errors
    ///
    /// Returns [`ValidationError::InvalidType`] when the value is neither a
    /// string nor an array of strings.
    pub fn from_value(value: &Value, path: &str) -> ValidationResult<Self> {
        match value {
            Value::String(label) => Ok(Self::Label(label.clone())),
            Value::Array(items) => items
                .iter()
                .map(|item| item.as_str().map(str::to_owned))
                .collect::<Option<Vec<_>>>()
                .map(Self::Labels)
                .ok_or_else(|| ValidationError::invalid_type(path, "an array of strings")),
            _ => Err(ValidationError::invalid_type(
                path,
                "a string or an array of strings",
            )),
        }
    }
}

impl From<&Select> for Value {
    fn from(select: &Select) -> Self {
        match select {
            Select::Label(label) => Self::String(label.clone()),
            Select::Labels(labels) => {
                Self::Array(labels.iter().cloned().map(Self::String).collect())
            }
        }
    }
}

impl From<&str> for Select {
    fn from(value: &str) -> Self {
        Self::Label(value.to_owned())
    }
}

impl From<Vec<String>> for Select {
    fn from(value: Vec<String>) -> Self {
        Self::Labels(value)
    }
}

//! Module identifiers for plugins and cache engines.

use camino::{Utf8Component, Utf8Path, Utf8PathBuf};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Identifier of a loadable plugin or cache-engine module.
///
/// A path starting with `.` is relative and is joined onto the composition's
/// `relative_to` directory when one is configured. Bare names and absolute
/// paths are passed to the host unchanged.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ModulePath(String);

impl ModulePath {
    /// Wraps a module identifier.
    #[must_use]
    pub fn new(value: impl Into<String>) -> Self {
        Self(value.into())
    }

    /// Returns the identifier as a string slice.
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Returns `true` when the identifier begins with the relative marker.
    #[must_use]
    pub fn is_relative(&self) -> bool {
        self.0.starts_with('.')
    }

    /// Resolves the identifier against an optional base directory.
    ///
    /// Relative identifiers are joined onto `relative_to` and lexically
    /// normalised. Anything else, or any identifier when no base is given, is
    /// returned unchanged.
    #[must_use]
    pub fn resolve(&self, relative_to: Option<&Utf8Path>) -> Self {
        match relative_to {
            Some(base) if self.is_relative() => {
                Self(normalize(&base.join(&self.0)).into_string())
            }
            _ => self.clone(),
        }
    }
}

impl AsRef<str> for ModulePath {
    fn as_ref(&self) -> &str {
        self.as_str()
    }
}

impl fmt::Display for ModulePath {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl From<&str> for ModulePath {
    fn from(value: &str) -> Self {
        Self::new(value)
    }
}

impl From<String> for ModulePath {
    fn from(value: String) -> Self {
        Self(value)
    }
}

/// Removes `.` segments and folds `..` into its parent without touching the
/// filesystem.
fn normalize(path: &Utf8Path) -> Utf8PathBuf {
    let mut normalized = Utf8PathBuf::new();
    for component in path.components() {
        match component {
            Utf8Component::CurDir => {}
            Utf8Component::ParentDir => {
                let parent_is_named = matches!(
                    normalized.components().next_back(),
                    Some(Utf8Component::Normal(_))
                );
                if parent_is_named {
                    normalized.pop();
                } else if !normalized.has_root() {
                    normalized.push("..");
                }
            }
            other => normalized.push(other.as_str()),
        }
    }

    if normalized.as_str().is_empty() {
        normalized.push(".");
    }
    normalized
}

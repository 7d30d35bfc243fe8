//! Error types for manifest and options validation.

use thiserror::Error;

/// Result type for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// A violated constraint in a manifest, options block or parameters document.
///
/// Paths use dotted notation with bracketed indices, for example
/// `manifest.registrations[0].plugin`.
#[derive(Debug, Clone, Error, PartialEq, Eq)]
pub enum ValidationError {
    /// A required key is absent.
    #[error("{path} is required")]
    MissingField {
        /// Location of the missing key.
        path: String,
    },

    /// A value has the wrong JSON type.
    #[error("{path} must be {expected}")]
    InvalidType {
        /// Location of the offending value.
        path: String,
        /// Human-readable description of the accepted shape.
        expected: &'static str,
    },

    /// A key is not part of a closed schema object.
    #[error("{path} is not allowed")]
    UnknownKey {
        /// Location of the unexpected key.
        path: String,
    },

    /// A string that names a module, label or directory is empty.
    #[error("{path} must not be empty")]
    EmptyValue {
        /// Location of the empty value.
        path: String,
    },

    /// The document passed shape checks but could not be decoded.
    #[error("malformed document: {0}")]
    Malformed(String),

    /// Several constraints were violated at once.
    #[error("{}", format_errors(.0))]
    Multiple(Vec<ValidationError>),
}

fn format_errors(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

impl ValidationError {
    /// Creates a missing-field error.
    #[must_use]
    pub fn missing(path: impl Into<String>) -> Self {
        Self::MissingField { path: path.into() }
    }

    /// Creates a type-mismatch error.
    #[must_use]
    pub fn invalid_type(path: impl Into<String>, expected: &'static str) -> Self {
        Self::InvalidType {
            path: path.into(),
            expected,
        }
    }

    /// Creates an unknown-key error.
    #[must_use]
    pub fn unknown_key(path: impl Into<String>) -> Self {
        Self::UnknownKey { path: path.into() }
    }

    /// Creates an empty-value error.
    #[must_use]
    pub fn empty(path: impl Into<String>) -> Self {
        Self::EmptyValue { path: path.into() }
    }

    /// Combines collected errors into a single error.
    ///
    /// Nested `Multiple` values are flattened and a single error is returned
    /// unwrapped. Returns `Ok(())` when nothing was collected.
    ///
    /// # Errors
    ///
    /// Returns the combined error whenever `errors` is non-empty.
    pub fn collect(errors: Vec<Self>) -> ValidationResult<()> {
        let mut flattened = Vec::with_capacity(errors.len());
        for error in errors {
            match error {
                Self::Multiple(inner) => flattened.extend(inner),
                other => flattened.push(other),
            }
        }

        if flattened.len() > 1 {
            return Err(Self::Multiple(flattened));
        }
        flattened.pop().map_or(Ok(()), Err)
    }

    /// Returns every individual violation carried by this error.
    #[must_use]
    pub fn violations(&self) -> Vec<&Self> {
        match self {
            Self::Multiple(inner) => inner.iter().collect(),
            other => vec![other],
        }
    }
}

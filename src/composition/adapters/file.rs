//! Loading parameters documents from JSON files.

use crate::composition::{domain::ValidationError, services::ParametersDocument};
use camino::{Utf8Path, Utf8PathBuf};
use cap_std::{ambient_authority, fs_utf8::Dir};
use serde_json::Value;
use thiserror::Error;

/// Errors raised while loading a parameters file.
#[derive(Debug, Error)]
pub enum ManifestFileError {
    /// The path has no file name component.
    #[error("manifest path '{0}' does not name a file")]
    InvalidPath(Utf8PathBuf),

    /// The file could not be read.
    #[error("failed to read manifest file: {0}")]
    Io(#[from] std::io::Error),

    /// The file is not valid JSON.
    #[error("manifest file is not valid JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// The document violates the parameters schema.
    #[error("invalid manifest file: {0}")]
    Validation(#[from] ValidationError),
}

/// Loads a parameters document from `file_name` inside `dir`.
///
/// # Errors
///
/// Returns [`ManifestFileError`] when the file cannot be read, parsed or
/// validated.
pub fn load_parameters_from_dir(
    dir: &Dir,
    file_name: &Utf8Path,
) -> Result<ParametersDocument, ManifestFileError> {
    let contents = dir.read_to_string(file_name)?;
    let value: Value = serde_json::from_str(&contents)?;
    Ok(ParametersDocument::from_value(&value)?)
}

/// Loads a parameters document from a path.
///
/// When the document leaves `relativeTo` unset it defaults to the directory
/// containing the file.
///
/// # Errors
///
/// Returns [`ManifestFileError`] when the path names no file, or the file
/// cannot be read, parsed or validated.
pub fn load_parameters_file(path: &Utf8Path) -> Result<ParametersDocument, ManifestFileError> {
    let file_name = path
        .file_name()
        .ok_or_else(|| ManifestFileError::InvalidPath(path.to_path_buf()))?;
    let parent = path
        .parent()
        .filter(|parent| !parent.as_str().is_empty())
        .unwrap_or_else(|| Utf8Path::new("."));

    let dir = Dir::open_ambient_dir(parent, ambient_authority())?;
    let document = load_parameters_from_dir(&dir, Utf8Path::new(file_name))?;
    Ok(document.with_default_relative_to(parent))
}

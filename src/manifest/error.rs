use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ManifestError {
    #[error("Manifest file not found: {}", .0.display())]
    FileNotFound(PathBuf),

    #[error("IO error reading manifest: {0}")]
    Io(#[from] std::io::Error),

    /// The document is not well-formed, violates the schema, or cannot be bound to a manifest.
    #[error("Invalid manifest ({schema}): {message}")]
    Validation {
        schema: &'static str,
        message: String,
    },

    #[error("Cannot compile schema {schema}: {message}")]
    Schema {
        schema: &'static str,
        message: String,
    },
}

impl ManifestError {
    pub fn is_validation(&self) -> bool {
        matches!(self, ManifestError::Validation { .. })
    }
}

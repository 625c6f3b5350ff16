//! Error types for bundle operations

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Result type for bundle operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while building, persisting or loading a bundle
#[derive(Error, Debug)]
pub enum Error {
    /// I/O error occurred
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// JSON (de)serialization failed
    #[error("Bundle serialization error: {0}")]
    Json(#[from] serde_json::Error),

    /// Bundle file not found
    #[error("Bundle not found: {path}")]
    NotFound { path: PathBuf },

    /// Bundle written by a different format version
    #[error("Bundle version mismatch: expected {expected}, found {found}")]
    VersionMismatch { expected: String, found: String },

    /// Stored digest does not match stored content
    #[error("Digest mismatch for {name}: expected {expected}, found {found}")]
    DigestMismatch {
        name: String,
        expected: String,
        found: String,
    },

    /// Upload file cannot be digested
    #[error("Cannot read upload file {path}: {source}")]
    UploadFile {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// Generic error with context
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Create a not found error
    pub fn not_found<P: Into<PathBuf>>(path: P) -> Self {
        Error::NotFound { path: path.into() }
    }

    /// Create a version mismatch error
    pub fn version_mismatch<S: Into<String>>(expected: S, found: S) -> Self {
        Error::VersionMismatch {
            expected: expected.into(),
            found: found.into(),
        }
    }

    /// Create a digest mismatch error
    pub fn digest_mismatch<S: Into<String>>(name: S, expected: S, found: S) -> Self {
        Error::DigestMismatch {
            name: name.into(),
            expected: expected.into(),
            found: found.into(),
        }
    }

    /// Whether a failed load means "rebuild" rather than "abort"
    pub fn is_stale(&self) -> bool {
        matches!(
            self,
            Error::NotFound { .. }
                | Error::Json(_)
                | Error::VersionMismatch { .. }
                | Error::DigestMismatch { .. }
        )
    }
}

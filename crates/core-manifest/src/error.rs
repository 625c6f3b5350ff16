//! Error types for manifest operations
//!
//! Only structural failures are errors here. Problems with the content of a
//! manifest (missing fields, bad values, unresolved references) are reported
//! as [`ValidationMessage`](crate::message::ValidationMessage)s instead.

use std::io;
use std::path::PathBuf;
use thiserror::Error;

/// Result type for manifest operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur during manifest operations
#[derive(Error, Debug)]
pub enum Error {
    /// I/O error occurred
    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    /// Manifest file not found
    #[error("Manifest not found: {path}")]
    ManifestNotFound { path: PathBuf },

    /// Manifest file exists but could not be read
    #[error("Unable to read manifest {path}: {source}")]
    ManifestUnreadable {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    /// A field name or synonym was registered twice
    #[error("Duplicate field definition: {name}")]
    DuplicateField { name: String },

    /// Field definition is internally inconsistent
    #[error("Invalid field definition {name}: {reason}")]
    InvalidField { name: String, reason: String },

    /// File group references a field that is not a registered file field
    #[error("File group references unknown file field: {field}")]
    UnknownGroupField { field: String },

    /// Generic error with context
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Create a duplicate field error
    pub fn duplicate_field<S: Into<String>>(name: S) -> Self {
        Error::DuplicateField { name: name.into() }
    }

    /// Create an invalid field error
    pub fn invalid_field<S: Into<String>, R: Into<String>>(name: S, reason: R) -> Self {
        Error::InvalidField {
            name: name.into(),
            reason: reason.into(),
        }
    }

    /// Create a manifest not found error
    pub fn manifest_not_found<P: Into<PathBuf>>(path: P) -> Self {
        Error::ManifestNotFound { path: path.into() }
    }

    /// Whether this error stems from the schema configuration rather than user input
    pub fn is_configuration(&self) -> bool {
        matches!(
            self,
            Error::DuplicateField { .. } | Error::InvalidField { .. } | Error::UnknownGroupField { .. }
        )
    }
}

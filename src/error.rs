/*!
 * Error types for Webin
 */

use std::fmt;
use std::io;
use std::path::PathBuf;
use webin_core_manifest::ValidationResult;

pub type Result<T> = std::result::Result<T, WebinError>;

/// Exit code constants for structured process exit
pub const EXIT_SUCCESS: i32 = 0;
pub const EXIT_SYSTEM: i32 = 1;
pub const EXIT_USAGE: i32 = 2;
pub const EXIT_VALIDATION: i32 = 3;

#[derive(Debug)]
pub enum WebinError {
    /// Manifest file not found or unreadable
    ManifestNotFound(PathBuf),

    /// Manifest has ERROR messages
    ValidationFailed {
        errors: usize,
        report: Option<PathBuf>,
        messages: ValidationResult,
    },

    /// Invalid command line usage
    Usage(String),

    /// Missing or rejected credentials
    Authentication(String),

    /// Configuration file error
    Config(String),

    /// Field schema registration error
    Schema(webin_core_manifest::Error),

    /// Bundle build or persistence error
    Bundle(webin_core_bundle::Error),

    /// Lookup service client error
    Lookup(String),

    /// I/O error
    Io(io::Error),

    /// Generic error with message
    Other(String),
}

impl WebinError {
    /// Get the process exit code for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            WebinError::ValidationFailed { .. } => EXIT_VALIDATION,
            WebinError::ManifestNotFound(_)
            | WebinError::Usage(_)
            | WebinError::Authentication(_)
            | WebinError::Config(_) => EXIT_USAGE,
            WebinError::Schema(_)
            | WebinError::Bundle(_)
            | WebinError::Lookup(_)
            | WebinError::Io(_)
            | WebinError::Other(_) => EXIT_SYSTEM,
        }
    }

    /// Get error category for logging and reporting
    pub fn category(&self) -> ErrorCategory {
        match self {
            WebinError::ManifestNotFound(_)
            | WebinError::ValidationFailed { .. }
            | WebinError::Usage(_)
            | WebinError::Authentication(_) => ErrorCategory::User,
            WebinError::Config(_) | WebinError::Schema(_) => ErrorCategory::Configuration,
            WebinError::Bundle(_)
            | WebinError::Lookup(_)
            | WebinError::Io(_)
            | WebinError::Other(_) => ErrorCategory::System,
        }
    }

    /// Whether the error is the user's to fix
    pub fn is_user_error(&self) -> bool {
        self.category() == ErrorCategory::User
    }
}

/// Error category for classification and reporting
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    /// Bad manifest content or command line
    User,
    /// Service, I/O or persistence failure
    System,
    /// Broken configuration or schema
    Configuration,
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ErrorCategory::User => write!(f, "user"),
            ErrorCategory::System => write!(f, "system"),
            ErrorCategory::Configuration => write!(f, "configuration"),
        }
    }
}

impl fmt::Display for WebinError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            WebinError::ManifestNotFound(path) => {
                write!(f, "Manifest not found: {}", path.display())
            }
            WebinError::ValidationFailed { errors, report, .. } => {
                write!(f, "Manifest validation failed with {} error(s)", errors)?;
                if let Some(report) = report {
                    write!(f, "; see {}", report.display())?;
                }
                Ok(())
            }
            WebinError::Usage(msg) => {
                write!(f, "Invalid usage: {}", msg)
            }
            WebinError::Authentication(msg) => {
                write!(f, "Authentication error: {}", msg)
            }
            WebinError::Config(msg) => {
                write!(f, "Configuration error: {}", msg)
            }
            WebinError::Schema(err) => {
                write!(f, "Field schema error: {}", err)
            }
            WebinError::Bundle(err) => {
                write!(f, "Submission bundle error: {}", err)
            }
            WebinError::Lookup(msg) => {
                write!(f, "Lookup service error: {}", msg)
            }
            WebinError::Io(err) => {
                write!(f, "I/O error: {}", err)
            }
            WebinError::Other(msg) => {
                write!(f, "{}", msg)
            }
        }
    }
}

impl std::error::Error for WebinError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            WebinError::Io(err) => Some(err),
            WebinError::Schema(err) => Some(err),
            WebinError::Bundle(err) => Some(err),
            _ => None,
        }
    }
}

impl From<io::Error> for WebinError {
    fn from(err: io::Error) -> Self {
        WebinError::Io(err)
    }
}

impl From<serde_json::Error> for WebinError {
    fn from(err: serde_json::Error) -> Self {
        WebinError::Other(format!("JSON error: {}", err))
    }
}

impl From<toml::de::Error> for WebinError {
    fn from(err: toml::de::Error) -> Self {
        WebinError::Config(format!("TOML parse error: {}", err))
    }
}

impl From<toml::ser::Error> for WebinError {
    fn from(err: toml::ser::Error) -> Self {
        WebinError::Config(format!("TOML serialize error: {}", err))
    }
}

impl From<webin_core_manifest::Error> for WebinError {
    fn from(err: webin_core_manifest::Error) -> Self {
        match err {
            webin_core_manifest::Error::ManifestNotFound { path } => {
                WebinError::ManifestNotFound(path)
            }
            webin_core_manifest::Error::ManifestUnreadable { path, source } => {
                WebinError::Io(io::Error::new(
                    source.kind(),
                    format!("{}: {}", path.display(), source),
                ))
            }
            webin_core_manifest::Error::Io(err) => WebinError::Io(err),
            other => WebinError::Schema(other),
        }
    }
}

impl From<webin_core_bundle::Error> for WebinError {
    fn from(err: webin_core_bundle::Error) -> Self {
        match err {
            webin_core_bundle::Error::Io(err) => WebinError::Io(err),
            other => WebinError::Bundle(other),
        }
    }
}

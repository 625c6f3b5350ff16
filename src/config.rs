/*!
 * Configuration types for Webin
 */

use crate::error::{Result, WebinError};
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Environment variable holding the Webin password
pub const PASSWORD_ENV: &str = "WEBIN_PASSWORD";

/// Test service base URL
pub const TEST_SERVICE_URL: &str = "https://wwwdev.ebi.ac.uk/ena/submit/drop-box/";

/// Production service base URL
pub const PRODUCTION_SERVICE_URL: &str = "https://www.ebi.ac.uk/ena/submit/drop-box/";

/// Submission service environment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    /// Test service; submissions are discarded
    Test,

    #[default]
    Production,
}

impl Environment {
    /// Base URL of the submission service
    pub fn base_url(&self) -> &'static str {
        match self {
            Environment::Test => TEST_SERVICE_URL,
            Environment::Production => PRODUCTION_SERVICE_URL,
        }
    }
}

/// Main configuration for a submission run
#[derive(Debug, Serialize, Deserialize)]
pub struct SubmitConfig {
    /// Directory data files and INFO files are resolved against
    #[serde(default = "default_dir")]
    pub input_dir: PathBuf,

    /// Root directory for validation reports and submission bundles
    #[serde(default = "default_dir")]
    pub output_dir: PathBuf,

    /// Service environment
    #[serde(default)]
    pub environment: Environment,

    /// Lookup service base URL (overrides the environment default)
    #[serde(default)]
    pub service_url: Option<String>,

    /// Webin submission account
    #[serde(default)]
    pub username: Option<String>,

    /// Webin password; never written to disk
    #[serde(skip)]
    pub password: Option<SecretString>,

    /// Submitting center name
    #[serde(default)]
    pub center_name: Option<String>,

    /// Continue past validation errors (diagnostics only, nothing is cached)
    #[serde(default)]
    pub ignore_errors: bool,

    /// Keep manifest fields the schema does not declare
    #[serde(default)]
    pub allow_unknown_fields: bool,

    /// Submission tool recorded in the XML
    #[serde(default = "default_tool")]
    pub submission_tool: String,

    /// Submission tool version recorded in the XML
    #[serde(default = "default_tool_version")]
    pub submission_tool_version: String,

    /// Lookup request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,

    /// Log level for diagnostic output
    #[serde(default)]
    pub log_level: LogLevel,

    /// Log file path (None = stderr)
    #[serde(default)]
    pub log_file: Option<PathBuf>,

    /// Enable verbose logging (shorthand for log_level = debug)
    #[serde(default)]
    pub verbose: bool,
}

fn default_dir() -> PathBuf {
    PathBuf::from(".")
}

fn default_tool() -> String {
    env!("CARGO_PKG_NAME").to_string()
}

fn default_tool_version() -> String {
    env!("CARGO_PKG_VERSION").to_string()
}

fn default_timeout() -> u64 {
    30
}

impl Default for SubmitConfig {
    fn default() -> Self {
        Self {
            input_dir: default_dir(),
            output_dir: default_dir(),
            environment: Environment::default(),
            service_url: None,
            username: None,
            password: None,
            center_name: None,
            ignore_errors: false,
            allow_unknown_fields: false,
            submission_tool: default_tool(),
            submission_tool_version: default_tool_version(),
            timeout_secs: default_timeout(),
            log_level: LogLevel::Info,
            log_file: None,
            verbose: false,
        }
    }
}

/// Log level for diagnostic output
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    /// Only errors
    Error,

    /// Warnings and errors
    Warn,

    /// Info, warnings, and errors
    #[default]
    Info,

    /// Debug and above
    Debug,

    /// All messages including traces
    Trace,
}

impl LogLevel {
    /// Convert to tracing::Level
    pub fn to_tracing_level(&self) -> tracing::Level {
        match self {
            LogLevel::Error => tracing::Level::ERROR,
            LogLevel::Warn => tracing::Level::WARN,
            LogLevel::Info => tracing::Level::INFO,
            LogLevel::Debug => tracing::Level::DEBUG,
            LogLevel::Trace => tracing::Level::TRACE,
        }
    }
}

impl SubmitConfig {
    /// Default config file location (`~/.config/webin/config.toml` on Linux)
    pub fn default_path() -> Option<PathBuf> {
        dirs::config_dir().map(|dir| dir.join("webin").join("config.toml"))
    }

    /// Load configuration from a TOML file
    pub fn from_file(path: &Path) -> Result<Self> {
        let contents = std::fs::read_to_string(path).map_err(|e| {
            WebinError::Config(format!("Cannot read {}: {}", path.display(), e))
        })?;
        let config: SubmitConfig = toml::from_str(&contents)?;
        Ok(config)
    }

    /// Save configuration to a TOML file
    pub fn to_file(&self, path: &Path) -> Result<()> {
        let contents = toml::to_string_pretty(self)?;
        std::fs::write(path, contents)?;
        Ok(())
    }

    /// Load an explicit config file, or the default one when it exists
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        match explicit {
            Some(path) => Self::from_file(path),
            None => match Self::default_path() {
                Some(path) if path.is_file() => Self::from_file(&path),
                _ => Ok(Self::default()),
            },
        }
    }

    /// Take the password from the environment unless one is already set
    pub fn apply_env(&mut self) {
        if self.password.is_none() {
            if let Ok(password) = std::env::var(PASSWORD_ENV) {
                if !password.is_empty() {
                    self.password = Some(SecretString::new(password.into_boxed_str()));
                }
            }
        }
    }

    /// Lookup service base URL
    pub fn service_url(&self) -> &str {
        self.service_url
            .as_deref()
            .unwrap_or_else(|| self.environment.base_url())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use secrecy::ExposeSecret;
    use tempfile::tempdir;

    #[test]
    fn test_default_config() {
        let config = SubmitConfig::default();
        assert_eq!(config.environment, Environment::Production);
        assert_eq!(config.service_url(), PRODUCTION_SERVICE_URL);
        assert!(!config.ignore_errors);
        assert_eq!(config.submission_tool, "webin");
    }

    #[test]
    fn test_partial_file_uses_defaults() {
        let config: SubmitConfig =
            toml::from_str("environment = \"test\"\nusername = \"Webin-123\"\n").unwrap();
        assert_eq!(config.environment, Environment::Test);
        assert_eq!(config.service_url(), TEST_SERVICE_URL);
        assert_eq!(config.username.as_deref(), Some("Webin-123"));
        assert_eq!(config.timeout_secs, 30);
        assert!(config.password.is_none());
    }

    #[test]
    fn test_service_url_override() {
        let config = SubmitConfig {
            service_url: Some("http://localhost:8080/".to_string()),
            ..Default::default()
        };
        assert_eq!(config.service_url(), "http://localhost:8080/");
    }

    #[test]
    fn test_password_is_never_serialized() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("config.toml");
        let config = SubmitConfig {
            username: Some("Webin-123".to_string()),
            password: Some(SecretString::new("hunter2".into())),
            ..Default::default()
        };
        config.to_file(&path).unwrap();

        let text = std::fs::read_to_string(&path).unwrap();
        assert!(!text.contains("hunter2"));
        let loaded = SubmitConfig::from_file(&path).unwrap();
        assert_eq!(loaded.username.as_deref(), Some("Webin-123"));
        assert!(loaded.password.is_none());
    }

    #[test]
    fn test_explicit_password_wins_over_env() {
        let mut config = SubmitConfig {
            password: Some(SecretString::new("explicit".into())),
            ..Default::default()
        };
        config.apply_env();
        assert_eq!(
            config.password.as_ref().map(|p| p.expose_secret().to_string()),
            Some("explicit".to_string())
        );
    }

    #[test]
    fn test_missing_explicit_file_is_config_error() {
        let dir = tempdir().unwrap();
        let err = SubmitConfig::load(Some(&dir.path().join("absent.toml"))).unwrap_err();
        assert!(matches!(err, WebinError::Config(_)));
    }

    #[test]
    fn test_log_level_conversion() {
        assert_eq!(LogLevel::Error.to_tracing_level(), tracing::Level::ERROR);
        assert_eq!(LogLevel::Debug.to_tracing_level(), tracing::Level::DEBUG);
    }
}

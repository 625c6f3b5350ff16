//! Validation messages and their aggregation
//!
//! Every defect found while reading a manifest is recorded here rather than
//! returned as an error, so a single pass reports all of them.

use std::fmt;
use std::path::{Path, PathBuf};

/// Message severity
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Severity {
    /// Informational (value corrected, default applied, ...)
    Info,
    /// Makes the manifest invalid
    Error,
}

impl Severity {
    /// Convert to string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            Severity::Info => "INFO",
            Severity::Error => "ERROR",
        }
    }
}

impl fmt::Display for Severity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Where a message came from
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Origin {
    /// Manifest (or INFO) file the line was read from
    pub file: Option<PathBuf>,

    /// 1-based line number
    pub line: Option<usize>,

    /// Field the message is about
    pub field: Option<String>,
}

impl Origin {
    /// Origin pointing at a line of a file
    pub fn line<P: AsRef<Path>>(file: P, line: usize) -> Self {
        Self {
            file: Some(file.as_ref().to_path_buf()),
            line: Some(line),
            field: None,
        }
    }

    /// Origin naming only a field
    pub fn field<S: Into<String>>(field: S) -> Self {
        Self {
            file: None,
            line: None,
            field: Some(field.into()),
        }
    }

    /// Attach a field name
    pub fn with_field<S: Into<String>>(mut self, field: S) -> Self {
        self.field = Some(field.into());
        self
    }

    /// Whether any location information is present
    pub fn is_empty(&self) -> bool {
        self.file.is_none() && self.line.is_none() && self.field.is_none()
    }
}

impl fmt::Display for Origin {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut parts = Vec::new();
        if let Some(file) = &self.file {
            let name = file
                .file_name()
                .map(|n| n.to_string_lossy().to_string())
                .unwrap_or_else(|| file.display().to_string());
            match self.line {
                Some(line) => parts.push(format!("{}:{}", name, line)),
                None => parts.push(name),
            }
        } else if let Some(line) = self.line {
            parts.push(format!("line {}", line));
        }
        if let Some(field) = &self.field {
            parts.push(format!("field {}", field));
        }
        write!(f, "{}", parts.join(", "))
    }
}

/// A single validation message
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidationMessage {
    pub severity: Severity,
    pub text: String,
    pub origin: Origin,
}

impl ValidationMessage {
    /// Create an informational message
    pub fn info<S: Into<String>>(text: S) -> Self {
        Self {
            severity: Severity::Info,
            text: text.into(),
            origin: Origin::default(),
        }
    }

    /// Create an error message
    pub fn error<S: Into<String>>(text: S) -> Self {
        Self {
            severity: Severity::Error,
            text: text.into(),
            origin: Origin::default(),
        }
    }

    /// Set the message origin
    pub fn at(mut self, origin: Origin) -> Self {
        self.origin = origin;
        self
    }

    pub fn is_error(&self) -> bool {
        self.severity == Severity::Error
    }
}

impl fmt::Display for ValidationMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.origin.is_empty() {
            write!(f, "{}: {}", self.severity, self.text)
        } else {
            write!(f, "{}: {} [{}]", self.severity, self.text, self.origin)
        }
    }
}

/// Accumulated messages of one validation run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidationResult {
    messages: Vec<ValidationMessage>,
}

impl ValidationResult {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a message
    pub fn add(&mut self, message: ValidationMessage) {
        self.messages.push(message);
    }

    /// Record an informational message at the given origin
    pub fn info<S: Into<String>>(&mut self, text: S, origin: Origin) {
        self.add(ValidationMessage::info(text).at(origin));
    }

    /// Record an error message at the given origin
    pub fn error<S: Into<String>>(&mut self, text: S, origin: Origin) {
        self.add(ValidationMessage::error(text).at(origin));
    }

    /// Append all messages from another result
    pub fn extend<I: IntoIterator<Item = ValidationMessage>>(&mut self, messages: I) {
        self.messages.extend(messages);
    }

    /// Valid when no ERROR message was recorded; INFO messages never invalidate
    pub fn is_valid(&self) -> bool {
        !self.messages.iter().any(ValidationMessage::is_error)
    }

    /// Number of messages with the given severity
    pub fn count(&self, severity: Severity) -> usize {
        self.messages
            .iter()
            .filter(|m| m.severity == severity)
            .count()
    }

    /// All messages in the order they were recorded
    pub fn messages(&self) -> &[ValidationMessage] {
        &self.messages
    }

    /// Consume the result, returning its messages
    pub fn into_messages(self) -> Vec<ValidationMessage> {
        self.messages
    }

    /// Error messages only
    pub fn errors(&self) -> impl Iterator<Item = &ValidationMessage> {
        self.messages.iter().filter(|m| m.is_error())
    }

    pub fn is_empty(&self) -> bool {
        self.messages.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_info_does_not_invalidate() {
        let mut result = ValidationResult::new();
        result.info("Corrected value", Origin::field("PLATFORM"));
        assert!(result.is_valid());
        assert_eq!(result.count(Severity::Info), 1);

        result.error("Unknown field", Origin::line("manifest.txt", 4));
        assert!(!result.is_valid());
        assert_eq!(result.errors().count(), 1);
    }

    #[test]
    fn test_origin_display() {
        let origin = Origin::line("/data/manifest.txt", 7).with_field("STUDY");
        assert_eq!(origin.to_string(), "manifest.txt:7, field STUDY");
        assert_eq!(Origin::field("NAME").to_string(), "field NAME");
    }

    #[test]
    fn test_message_display() {
        let msg = ValidationMessage::error("Missing mandatory field").at(Origin::field("NAME"));
        assert_eq!(msg.to_string(), "ERROR: Missing mandatory field [field NAME]");
        let bare = ValidationMessage::info("done");
        assert_eq!(bare.to_string(), "INFO: done");
    }
}

/*!
 * Webin - submission manifest validation
 *
 * Validates a submission manifest against the field schema of its context
 * (genome, transcriptome, sequence or reads), resolves study, sample, run and
 * analysis references through the lookup service, and prepares an upload
 * bundle:
 * - SHA-256 checksummed upload file list
 * - Deterministic XML documents
 * - A validation report for every run
 * - Bundle reuse while the manifest bytes are unchanged
 */

pub mod cli_style;
pub mod config;
pub mod context;
pub mod error;
pub mod logging;
pub mod lookup;
pub mod manifest;
pub mod report;
pub mod submit;
pub mod xml;

// Re-export commonly used types
pub use config::{Environment, LogLevel, SubmitConfig};
pub use context::ContextType;
pub use error::{Result, WebinError};
pub use lookup::HttpLookupClient;
pub use manifest::{FileType, Manifest, SubmissionFile, SubmissionTool};
pub use submit::{Prepared, Submission, Validated};
pub use webin_core_bundle::{CacheOutcome, MissReason, SubmissionBundle};
pub use webin_core_manifest::{FieldSchema, Severity, ValidationMessage, ValidationResult};

/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_version() {
        assert_eq!(VERSION, env!("CARGO_PKG_VERSION"));
    }
}

//! Submission bundle cache for Webin submissions
//!
//! A bundle records the upload file list and the generated XML documents of
//! one submission, keyed by the SHA-256 of the manifest file it came from.
//! An unchanged manifest is never re-validated or re-packaged.
//!
//! # Layout
//!
//! ```text
//! <working-dir>/
//!   submit/
//!     bundle.json      persisted SubmissionBundle
//!     analysis.xml     generated documents
//! ```
//!
//! # Example
//!
//! ```no_run
//! use webin_core_bundle::{BundleCache, BundleSource, Generated, SubmissionBundle};
//! use std::path::Path;
//!
//! struct Builder;
//!
//! impl BundleSource for Builder {
//!     type Error = webin_core_bundle::Error;
//!
//!     fn generate(&mut self, digest: &str, _manifest: &[u8]) -> webin_core_bundle::Result<Generated> {
//!         let mut bundle = SubmissionBundle::new(digest, "/work/submit", "webin-cli/genome/asm1");
//!         bundle.add_xml("ANALYSIS", "<ANALYSIS_SET/>".to_string());
//!         Ok(Generated::Complete(bundle))
//!     }
//! }
//!
//! let cache = BundleCache::new("/work");
//! let (bundle, outcome) = cache
//!     .load_or_build(Path::new("/data/manifest.txt"), &mut Builder)
//!     .unwrap();
//! println!("{:?}: {} documents", outcome, bundle.xml_documents.len());
//! ```

pub mod bundle;
pub mod cache;
pub mod digest;
pub mod error;

pub use bundle::{SubmissionBundle, UploadFile, XmlDocument};
pub use cache::{BundleCache, BundleSource, CacheOutcome, Generated, MissReason};
pub use digest::{sha256_bytes, sha256_file};
pub use error::{Error, Result};

/// Bundle format version
pub const BUNDLE_SCHEMA_VERSION: &str = "webin.bundle.v1";

/// Bundle file name inside the submit directory
pub const BUNDLE_FILE_NAME: &str = "bundle.json";

/// Submit directory name inside the working directory
pub const SUBMIT_DIR_NAME: &str = "submit";

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_new_bundle_carries_current_version() {
        let bundle = SubmissionBundle::new("digest", "/tmp/submit", "webin-cli/reads/run1");
        assert_eq!(bundle.schema, BUNDLE_SCHEMA_VERSION);
        assert!(bundle.upload_files.is_empty());
    }

    #[test]
    fn test_bundle_path_layout() {
        let cache = BundleCache::new("/out/genome/manifest");
        assert_eq!(
            cache.bundle_path(),
            std::path::PathBuf::from("/out/genome/manifest/submit/bundle.json")
        );
    }
}

//! Bundle cache keyed by manifest digest
//!
//! `load_or_build` digests the raw manifest bytes and reuses the persisted
//! bundle only when its stored digest is equal. Anything else (absent,
//! unreadable, other format version, tampered documents, changed manifest)
//! is a miss and the bundle is regenerated from its [`BundleSource`].

use crate::bundle::SubmissionBundle;
use crate::digest::sha256_bytes;
use crate::error::{Error, Result};
use crate::{BUNDLE_FILE_NAME, SUBMIT_DIR_NAME};
use std::fmt;
use std::path::{Path, PathBuf};

/// Why a persisted bundle was not reused
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MissReason {
    /// No bundle file exists
    Absent,
    /// The manifest changed since the bundle was built
    DigestChanged,
    /// Bundle written by another format version
    VersionMismatch,
    /// Bundle unreadable or a stored document failed its digest check
    Corrupt(String),
}

impl fmt::Display for MissReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            MissReason::Absent => write!(f, "no bundle"),
            MissReason::DigestChanged => write!(f, "manifest changed"),
            MissReason::VersionMismatch => write!(f, "bundle format changed"),
            MissReason::Corrupt(reason) => write!(f, "bundle unusable: {}", reason),
        }
    }
}

/// How `load_or_build` produced its bundle
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CacheOutcome {
    /// Persisted bundle reused
    Hit,
    /// Bundle regenerated and persisted
    Rebuilt(MissReason),
    /// Bundle regenerated but not persisted
    Provisional(MissReason),
}

impl CacheOutcome {
    pub fn is_hit(&self) -> bool {
        matches!(self, CacheOutcome::Hit)
    }
}

/// Result of generating a bundle
#[derive(Debug)]
pub enum Generated {
    /// Built from a valid manifest; persisted for reuse
    Complete(SubmissionBundle),
    /// Built from a manifest with errors; returned but never persisted
    Provisional(SubmissionBundle),
}

/// Produces a fresh bundle on a cache miss
pub trait BundleSource {
    type Error: From<Error>;

    /// Build a bundle from the manifest bytes that were digested
    fn generate(
        &mut self,
        manifest_digest: &str,
        manifest: &[u8],
    ) -> std::result::Result<Generated, Self::Error>;
}

/// Bundle cache rooted at a submission working directory
#[derive(Debug, Clone)]
pub struct BundleCache {
    working_dir: PathBuf,
}

impl BundleCache {
    pub fn new<P: Into<PathBuf>>(working_dir: P) -> Self {
        Self {
            working_dir: working_dir.into(),
        }
    }

    pub fn working_dir(&self) -> &Path {
        &self.working_dir
    }

    /// Directory holding the bundle and generated documents
    pub fn submit_dir(&self) -> PathBuf {
        self.working_dir.join(SUBMIT_DIR_NAME)
    }

    /// Fixed location of the persisted bundle
    pub fn bundle_path(&self) -> PathBuf {
        self.submit_dir().join(BUNDLE_FILE_NAME)
    }

    /// Return the persisted bundle if it was built from a manifest with this digest
    pub fn lookup(&self, manifest_digest: &str) -> Result<std::result::Result<SubmissionBundle, MissReason>> {
        match SubmissionBundle::load(self.bundle_path()) {
            Ok(bundle) if bundle.manifest_digest == manifest_digest => Ok(Ok(bundle)),
            Ok(_) => Ok(Err(MissReason::DigestChanged)),
            Err(Error::NotFound { .. }) => Ok(Err(MissReason::Absent)),
            Err(Error::VersionMismatch { .. }) => Ok(Err(MissReason::VersionMismatch)),
            Err(e) if e.is_stale() => Ok(Err(MissReason::Corrupt(e.to_string()))),
            Err(e) => Err(e),
        }
    }

    /// Persist a bundle at the fixed location
    pub fn store(&self, bundle: &SubmissionBundle) -> Result<()> {
        bundle.save(self.bundle_path())
    }

    /// Remove a persisted bundle, if any
    pub fn invalidate(&self) -> Result<()> {
        match std::fs::remove_file(self.bundle_path()) {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    /// Reuse the bundle for an unchanged manifest, or build and persist a new one
    pub fn load_or_build<S: BundleSource>(
        &self,
        manifest_path: &Path,
        source: &mut S,
    ) -> std::result::Result<(SubmissionBundle, CacheOutcome), S::Error> {
        let manifest = std::fs::read(manifest_path).map_err(Error::from)?;
        let digest = sha256_bytes(&manifest);

        let reason = match self.lookup(&digest)? {
            Ok(bundle) => return Ok((bundle, CacheOutcome::Hit)),
            Err(reason) => reason,
        };

        match source.generate(&digest, &manifest)? {
            Generated::Complete(bundle) => {
                self.store(&bundle)?;
                Ok((bundle, CacheOutcome::Rebuilt(reason)))
            }
            Generated::Provisional(bundle) => {
                // A stale bundle must not outlive a manifest that now has errors
                self.invalidate()?;
                Ok((bundle, CacheOutcome::Provisional(reason)))
            }
        }
    }
}

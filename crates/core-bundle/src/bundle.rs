//! Submission bundle record
//!
//! A bundle is everything an uploader needs for one submission: the files to
//! upload with their digests and the generated XML documents. It is keyed by
//! the digest of the manifest it was built from.

use crate::digest::{sha256_bytes, sha256_file};
use crate::error::{Error, Result};
use crate::BUNDLE_SCHEMA_VERSION;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::io::Write;
use std::path::{Path, PathBuf};

/// A data file to upload
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct UploadFile {
    /// Path on the local filesystem
    pub local_path: PathBuf,

    /// Path relative to the remote upload area
    pub remote_path: String,

    /// SHA-256 of the file content
    pub digest: String,
}

/// A generated XML document
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct XmlDocument {
    /// Document type (e.g. "ANALYSIS", "RUN")
    pub doc_type: String,

    /// File name inside the submit directory
    pub file_name: String,

    /// SHA-256 of `content`
    pub digest: String,

    pub content: String,
}

impl XmlDocument {
    /// Create a document, deriving its file name and digest
    pub fn new<S: Into<String>>(doc_type: S, content: String) -> Self {
        let doc_type = doc_type.into();
        Self {
            file_name: format!("{}.xml", doc_type.to_ascii_lowercase()),
            digest: sha256_bytes(content.as_bytes()),
            doc_type,
            content,
        }
    }

    /// Whether the stored digest matches the stored content
    pub fn verify(&self) -> Result<()> {
        let actual = sha256_bytes(self.content.as_bytes());
        if actual != self.digest {
            return Err(Error::digest_mismatch(
                self.file_name.clone(),
                self.digest.clone(),
                actual,
            ));
        }
        Ok(())
    }
}

/// Persisted submission package
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SubmissionBundle {
    /// Format version identifier
    pub schema: String,

    /// SHA-256 of the raw manifest bytes; the cache key
    pub manifest_digest: String,

    /// Local directory holding the generated documents
    pub submit_dir: PathBuf,

    /// Remote directory files are uploaded into
    pub upload_dir: String,

    pub upload_files: Vec<UploadFile>,

    pub xml_documents: Vec<XmlDocument>,

    /// Creation timestamp (UTC)
    pub created_utc: DateTime<Utc>,
}

impl SubmissionBundle {
    /// Create an empty bundle for a manifest digest
    pub fn new<S: Into<String>, P: Into<PathBuf>>(
        manifest_digest: S,
        submit_dir: P,
        upload_dir: S,
    ) -> Self {
        Self {
            schema: BUNDLE_SCHEMA_VERSION.to_string(),
            manifest_digest: manifest_digest.into(),
            submit_dir: submit_dir.into(),
            upload_dir: upload_dir.into(),
            upload_files: Vec::new(),
            xml_documents: Vec::new(),
            created_utc: Utc::now(),
        }
    }

    /// Add a data file, digesting its content. The remote path is the file
    /// name placed under the upload directory.
    pub fn add_upload_file(&mut self, local_path: &Path) -> Result<&UploadFile> {
        let digest = sha256_file(local_path).map_err(|source| Error::UploadFile {
            path: local_path.to_path_buf(),
            source,
        })?;
        let file_name = local_path
            .file_name()
            .map(|n| n.to_string_lossy().to_string())
            .ok_or_else(|| Error::Other(format!("Not a file path: {}", local_path.display())))?;
        let remote_path = format!("{}/{}", self.upload_dir.trim_end_matches('/'), file_name);

        self.upload_files.push(UploadFile {
            local_path: local_path.to_path_buf(),
            remote_path,
            digest,
        });
        Ok(&self.upload_files[self.upload_files.len() - 1])
    }

    /// Add a generated XML document
    pub fn add_xml<S: Into<String>>(&mut self, doc_type: S, content: String) -> &XmlDocument {
        self.xml_documents.push(XmlDocument::new(doc_type, content));
        &self.xml_documents[self.xml_documents.len() - 1]
    }

    /// Document of the given type
    pub fn xml(&self, doc_type: &str) -> Option<&XmlDocument> {
        self.xml_documents
            .iter()
            .find(|d| d.doc_type.eq_ignore_ascii_case(doc_type))
    }

    /// Digest of an uploaded file by local path
    pub fn upload_digest(&self, local_path: &Path) -> Option<&str> {
        self.upload_files
            .iter()
            .find(|f| f.local_path == local_path)
            .map(|f| f.digest.as_str())
    }

    /// Check every stored XML digest against its stored content
    pub fn verify_documents(&self) -> Result<()> {
        self.xml_documents.iter().try_for_each(XmlDocument::verify)
    }

    /// Write every XML document into the submit directory
    pub fn write_documents(&self) -> Result<Vec<PathBuf>> {
        std::fs::create_dir_all(&self.submit_dir)?;
        let mut written = Vec::with_capacity(self.xml_documents.len());
        for document in &self.xml_documents {
            let path = self.submit_dir.join(&document.file_name);
            std::fs::write(&path, &document.content)?;
            written.push(path);
        }
        Ok(written)
    }

    /// Save the bundle as JSON.
    ///
    /// The record is written to a temporary file in the destination directory
    /// and renamed into place, so a reader never observes a partial bundle.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        let dir = match path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => parent,
            _ => Path::new("."),
        };
        std::fs::create_dir_all(dir)?;

        let mut temp = tempfile::Builder::new()
            .prefix(".bundle-")
            .suffix(".tmp")
            .tempfile_in(dir)?;
        serde_json::to_writer_pretty(&mut temp, self)?;
        temp.write_all(b"\n")?;
        temp.as_file().sync_all()?;
        temp.persist(path).map_err(|e| Error::Io(e.error))?;
        Ok(())
    }

    /// Load a bundle, rejecting other format versions and tampered documents
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(Error::not_found(path));
        }

        let contents = std::fs::read(path)?;
        let bundle: SubmissionBundle = serde_json::from_slice(&contents)?;

        if bundle.schema != BUNDLE_SCHEMA_VERSION {
            return Err(Error::version_mismatch(
                BUNDLE_SCHEMA_VERSION.to_string(),
                bundle.schema,
            ));
        }
        bundle.verify_documents()?;

        Ok(bundle)
    }
}

/*!
 * Submission pipeline
 *
 * Ties a context schema, the manifest reader, the report writer, the XML
 * assembler and the bundle cache together for one manifest file.
 *
 * ```text
 * <output-dir>/<context>/<manifest-stem>/
 *   validate/<manifest-file-name>.report
 *   submit/bundle.json
 *   submit/<document>.xml
 * ```
 */

use crate::config::SubmitConfig;
use crate::context::ContextType;
use crate::error::{Result, WebinError};
use crate::manifest::Manifest;
use crate::report;
use crate::xml::{self, XmlFile, XmlOptions};
use std::io;
use std::path::{Path, PathBuf};
use tracing::{debug, info, warn};
use webin_core_bundle::{
    BundleCache, BundleSource, CacheOutcome, Generated, SubmissionBundle,
};
use webin_core_manifest::{
    FieldSchema, LookupService, ManifestReader, ManifestReaderResult, ReaderOptions, Severity,
};

/// Upload directory prefix on the file server
pub const UPLOAD_ROOT: &str = "webin-cli";

/// Outcome of reading and validating a manifest
#[derive(Debug)]
pub struct Validated {
    pub manifest: Manifest,
    pub result: ManifestReaderResult,
    pub report: PathBuf,
}

impl Validated {
    pub fn is_valid(&self) -> bool {
        self.result.is_valid()
    }

    pub fn error_count(&self) -> usize {
        self.result.validation.count(Severity::Error)
    }

    /// Turn an invalid run into `ValidationFailed`, keeping its messages
    pub fn into_failure(self) -> WebinError {
        WebinError::ValidationFailed {
            errors: self.error_count(),
            report: Some(self.report),
            messages: self.result.validation,
        }
    }
}

/// Outcome of preparing a submission bundle
#[derive(Debug)]
pub struct Prepared {
    pub bundle: SubmissionBundle,
    pub outcome: CacheOutcome,

    /// Validation run that produced the bundle; `None` when it came from the cache
    pub validated: Option<Validated>,
}

/// One manifest in one context
pub struct Submission<'a> {
    context: ContextType,
    manifest_path: PathBuf,
    schema: FieldSchema,
    config: &'a SubmitConfig,
    lookup: &'a dyn LookupService,
}

impl<'a> Submission<'a> {
    pub fn new(
        context: ContextType,
        manifest_path: &Path,
        config: &'a SubmitConfig,
        lookup: &'a dyn LookupService,
    ) -> Result<Self> {
        let schema = context.schema()?;
        Ok(Self {
            context,
            manifest_path: resolve_manifest_path(manifest_path, &config.input_dir),
            schema,
            config,
            lookup,
        })
    }

    pub fn context(&self) -> ContextType {
        self.context
    }

    pub fn manifest_path(&self) -> &Path {
        &self.manifest_path
    }

    pub fn schema(&self) -> &FieldSchema {
        &self.schema
    }

    /// `<output-dir>/<context>/<manifest-stem>`
    pub fn working_dir(&self) -> PathBuf {
        let stem = self
            .manifest_path
            .file_stem()
            .map(|s| s.to_string_lossy().to_string())
            .unwrap_or_else(|| "manifest".to_string());
        self.config
            .output_dir
            .join(self.context.as_str())
            .join(stem)
    }

    pub fn report_path(&self) -> PathBuf {
        report::report_path(&self.working_dir(), &self.manifest_path)
    }

    /// Read the manifest, populate the typed manifest and write the report
    pub fn validate(&self) -> Result<Validated> {
        if !self.manifest_path.is_file() {
            return Err(WebinError::ManifestNotFound(self.manifest_path.clone()));
        }
        let bytes = std::fs::read(&self.manifest_path).map_err(|source| self.unreadable(source))?;
        self.validate_bytes(&bytes)
    }

    /// Validate manifest content already read from `manifest_path`
    fn validate_bytes(&self, bytes: &[u8]) -> Result<Validated> {
        info!(
            "Validating {} manifest {}",
            self.context,
            self.manifest_path.display()
        );
        let text = std::str::from_utf8(bytes)
            .map_err(|e| self.unreadable(io::Error::new(io::ErrorKind::InvalidData, e)))?;
        let options = ReaderOptions::new(&self.config.input_dir)
            .with_unknown_fields(self.config.allow_unknown_fields);
        let reader = ManifestReader::new(&self.schema, self.lookup, options);
        let mut result = reader.read_str(text, &self.manifest_path);
        let manifest = self.context.populate(&mut result, self.config.ignore_errors);

        let report = self.report_path();
        report::write_report(&report, &result.validation)?;
        debug!(report = %report.display(), "{}", report::summary(&result.validation));

        Ok(Validated {
            manifest,
            result,
            report,
        })
    }

    /// Validate and fail on any ERROR message
    pub fn validate_strict(&self) -> Result<Validated> {
        let validated = self.validate()?;
        if !validated.is_valid() {
            return Err(validated.into_failure());
        }
        Ok(validated)
    }

    /// Return the submission bundle for the manifest, reusing the cached one
    /// when the manifest bytes are unchanged.
    pub fn prepare(&self) -> Result<Prepared> {
        if !self.manifest_path.is_file() {
            return Err(WebinError::ManifestNotFound(self.manifest_path.clone()));
        }
        let cache = BundleCache::new(self.working_dir());
        let mut builder = BundleBuilder {
            submission: self,
            submit_dir: cache.submit_dir(),
            validated: None,
        };
        let (bundle, outcome) = cache.load_or_build(&self.manifest_path, &mut builder)?;

        match &outcome {
            CacheOutcome::Hit => info!(
                "Manifest unchanged; reusing submission bundle {}",
                cache.bundle_path().display()
            ),
            CacheOutcome::Rebuilt(reason) => info!(
                "Built submission bundle {} ({})",
                cache.bundle_path().display(),
                reason
            ),
            CacheOutcome::Provisional(reason) => warn!(
                "Submission bundle built despite validation errors is not cached ({})",
                reason
            ),
        }

        Ok(Prepared {
            bundle,
            outcome,
            validated: builder.validated,
        })
    }

    fn unreadable(&self, source: io::Error) -> WebinError {
        webin_core_manifest::Error::ManifestUnreadable {
            path: self.manifest_path.clone(),
            source,
        }
        .into()
    }

    fn alias(&self, manifest: &Manifest) -> String {
        format!("webin-{}-{}", self.context, manifest.sanitized_name())
    }

    fn upload_dir(&self, manifest: &Manifest) -> String {
        format!(
            "{}/{}/{}",
            UPLOAD_ROOT,
            self.context,
            manifest.sanitized_name()
        )
    }
}

/// Builds a bundle on a cache miss
struct BundleBuilder<'s, 'a> {
    submission: &'s Submission<'a>,
    submit_dir: PathBuf,
    validated: Option<Validated>,
}

impl BundleSource for BundleBuilder<'_, '_> {
    type Error = WebinError;

    fn generate(&mut self, manifest_digest: &str, manifest: &[u8]) -> Result<Generated> {
        let submission = self.submission;
        let validated = submission.validate_bytes(manifest)?;
        let valid = validated.is_valid();
        if !valid && !submission.config.ignore_errors {
            return Err(validated.into_failure());
        }

        let manifest = &validated.manifest;
        let mut bundle = SubmissionBundle::new(
            manifest_digest.to_string(),
            self.submit_dir.clone(),
            submission.upload_dir(manifest),
        );
        for file in &manifest.files {
            bundle.add_upload_file(&file.path)?;
        }

        let documents = {
            let files: Vec<XmlFile<'_>> = manifest
                .files
                .iter()
                .zip(&bundle.upload_files)
                .map(|(file, upload)| XmlFile {
                    file_type: file.file_type,
                    upload,
                })
                .collect();
            let options = XmlOptions {
                alias: submission.alias(manifest),
                center_name: submission.config.center_name.clone(),
            };
            xml::documents(manifest, &files, &options)
        };
        for (doc_type, content) in documents {
            bundle.add_xml(doc_type, content);
        }
        for path in bundle.write_documents()? {
            debug!("Wrote {}", path.display());
        }

        self.validated = Some(validated);
        if valid {
            Ok(Generated::Complete(bundle))
        } else {
            Ok(Generated::Provisional(bundle))
        }
    }
}

/// A relative manifest path that does not exist as given is looked up in the
/// input directory.
fn resolve_manifest_path(path: &Path, input_dir: &Path) -> PathBuf {
    if path.is_absolute() || path.exists() {
        return path.to_path_buf();
    }
    let candidate = input_dir.join(path);
    if candidate.exists() {
        candidate
    } else {
        path.to_path_buf()
    }
}

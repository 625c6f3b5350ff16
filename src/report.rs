/*!
 * Validation report files
 *
 * Every validation run leaves `<working>/validate/<manifest-file-name>.report`
 * holding one line per message, so a failed run can be diagnosed after the
 * console output is gone.
 */

use crate::error::Result;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};
use webin_core_manifest::{Severity, ValidationResult};

/// Directory name for reports inside the working directory
pub const VALIDATE_DIR_NAME: &str = "validate";

/// Report location for a manifest
pub fn report_path(working_dir: &Path, manifest_path: &Path) -> PathBuf {
    let file_name = manifest_path
        .file_name()
        .map(|n| n.to_string_lossy().to_string())
        .unwrap_or_else(|| "manifest".to_string());
    working_dir
        .join(VALIDATE_DIR_NAME)
        .join(format!("{}.report", file_name))
}

/// Write all messages, replacing any previous report
pub fn write_report(path: &Path, validation: &ValidationResult) -> Result<()> {
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent)?;
    }
    let mut out = BufWriter::new(File::create(path)?);
    for message in validation.messages() {
        writeln!(out, "{}", message)?;
    }
    out.flush()?;
    Ok(())
}

/// Summary line, e.g. "2 error(s), 1 info message(s)"
pub fn summary(validation: &ValidationResult) -> String {
    format!(
        "{} error(s), {} info message(s)",
        validation.count(Severity::Error),
        validation.count(Severity::Info)
    )
}

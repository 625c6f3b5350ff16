//! Raw reads context

use super::{define_common_fields, sample_field, study_field, vocabulary};
use crate::manifest::Manifest;
use tracing::debug;
use webin_core_manifest::{
    AsciiFileNameValidator, FieldDefinition, FieldProcessor, FieldSchema, FileGroup,
    FileSuffixValidator, ManifestReaderResult, NumberValidator, Result, TrimCorrector,
};

pub fn schema() -> Result<FieldSchema> {
    let mut schema = FieldSchema::new();
    define_common_fields(&mut schema, &[])?;

    schema.define(study_field())?;
    schema.define(sample_field())?;

    let instruments = vocabulary::instrument_names();
    schema.define(
        FieldDefinition::meta("INSTRUMENT")
            .required()
            .description("Sequencing instrument model")
            .processors(FieldProcessor::vocabulary(&instruments)),
    )?;
    schema.define(
        FieldDefinition::meta("PLATFORM")
            .description("Sequencing platform, derived from INSTRUMENT when absent")
            .processors(FieldProcessor::vocabulary(vocabulary::PLATFORMS)),
    )?;
    schema.define(
        FieldDefinition::meta("LIBRARY_SOURCE")
            .required()
            .description("Library source")
            .processors(FieldProcessor::vocabulary(vocabulary::LIBRARY_SOURCES)),
    )?;
    schema.define(
        FieldDefinition::meta("LIBRARY_SELECTION")
            .required()
            .description("Library selection")
            .processors(FieldProcessor::vocabulary(vocabulary::LIBRARY_SELECTIONS)),
    )?;
    schema.define(
        FieldDefinition::meta("LIBRARY_STRATEGY")
            .required()
            .description("Library strategy")
            .processors(FieldProcessor::vocabulary(vocabulary::LIBRARY_STRATEGIES)),
    )?;
    schema.define(
        FieldDefinition::meta("LIBRARY_NAME")
            .description("Library name")
            .processor(FieldProcessor::corrector(TrimCorrector)),
    )?;
    schema.define(
        FieldDefinition::meta("LIBRARY_CONSTRUCTION_PROTOCOL")
            .description("Library construction protocol"),
    )?;
    schema.define(
        FieldDefinition::meta("INSERT_SIZE")
            .description("Insert size for paired reads")
            .processor(FieldProcessor::validator(NumberValidator::integer().at_least(0.0))),
    )?;

    schema.define(
        FieldDefinition::file("FASTQ")
            .count(0, 2)
            .description("Reads in fastq format, gzip or bzip2 compressed")
            .processor(FieldProcessor::validator(AsciiFileNameValidator))
            .processor(FieldProcessor::validator(FileSuffixValidator::new(&[".gz", ".bz2"]))),
    )?;
    schema.define(
        FieldDefinition::file("BAM")
            .description("Reads in a BAM file")
            .processor(FieldProcessor::validator(AsciiFileNameValidator))
            .processor(FieldProcessor::validator(FileSuffixValidator::new(&[".bam"]))),
    )?;
    schema.define(
        FieldDefinition::file("CRAM")
            .description("Reads in a CRAM file")
            .processor(FieldProcessor::validator(AsciiFileNameValidator))
            .processor(FieldProcessor::validator(FileSuffixValidator::new(&[".cram"]))),
    )?;

    schema.define_group(FileGroup::named("Single or paired fastq files").required("FASTQ"))?;
    schema.define_group(FileGroup::named("BAM file").required("BAM"))?;
    schema.define_group(FileGroup::named("CRAM file").required("CRAM"))?;
    Ok(schema)
}

/// Fill in PLATFORM from INSTRUMENT, or check that the two agree.
///
/// Invalid INSTRUMENT or PLATFORM values already carry an error and are
/// left alone.
pub(crate) fn derive_platform(manifest: &mut Manifest, result: &mut ManifestReaderResult) {
    let (instrument, origin) = match result.values("INSTRUMENT").next() {
        Some(field) => (field.value.clone(), field.origin.clone()),
        None => return,
    };
    if !vocabulary::INSTRUMENTS.iter().any(|(name, _)| *name == instrument) {
        return;
    }

    let derived = vocabulary::platform_for_instrument(&instrument);
    let explicit = manifest.attribute("PLATFORM").map(str::to_string);
    let origin = origin.with_field("PLATFORM");

    match (derived, explicit) {
        (Some(derived), None) => {
            debug!("Derived platform {} from instrument {}", derived, instrument);
            manifest.set_attribute("PLATFORM", derived);
            result.validation.info(
                format!(
                    "Field PLATFORM set to \"{}\" for instrument \"{}\"",
                    derived, instrument
                ),
                origin,
            );
        }
        (Some(derived), Some(explicit)) => {
            if explicit != derived && vocabulary::PLATFORMS.contains(&explicit.as_str()) {
                result.validation.error(
                    format!(
                        "Field PLATFORM \"{}\" does not match instrument \"{}\" (platform {})",
                        explicit, instrument, derived
                    ),
                    origin,
                );
            }
        }
        (None, None) => {
            result.validation.error(
                format!(
                    "Field PLATFORM is required when INSTRUMENT is \"{}\"",
                    instrument
                ),
                origin,
            );
        }
        (None, Some(_)) => {}
    }
}

/// Whether the library is paired: two fastq files or an insert size
pub fn is_paired(manifest: &Manifest) -> bool {
    manifest.files_of(crate::manifest::FileType::Fastq).count() == 2
        || manifest.attribute("INSERT_SIZE").is_some()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::context::ContextType;
    use std::path::Path;
    use webin_core_manifest::{
        ManifestReader, ReaderOptions, Sample, Severity, StaticLookup, Study,
    };

    fn lookup() -> StaticLookup {
        StaticLookup::new()
            .with_study(
                "ERP000001",
                Study {
                    study_id: "ERP000001".to_string(),
                    project_id: "PRJEB0001".to_string(),
                    locus_tags: vec![],
                },
            )
            .with_sample(
                "ERS000001",
                Sample {
                    sample_id: "ERS000001".to_string(),
                    biosample_id: "SAMEA0000001".to_string(),
                    organism: None,
                    tax_id: None,
                },
            )
    }

    fn read(extra: &str) -> (Manifest, ManifestReaderResult) {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("r1.fastq.gz"), b"@r1\nACGT\n+\n!!!!\n").unwrap();
        let schema = schema().unwrap();
        let lookup = lookup();
        let reader = ManifestReader::new(&schema, &lookup, ReaderOptions::new(dir.path()));
        let text = format!(
            "NAME run1\nSTUDY ERP000001\nSAMPLE ERS000001\nLIBRARY_SOURCE GENOMIC\nLIBRARY_SELECTION RANDOM\nLIBRARY_STRATEGY WGS\nFASTQ r1.fastq.gz\n{}",
            extra
        );
        let mut result = reader.read_str(&text, Path::new("reads.txt"));
        let manifest = ContextType::Reads.populate(&mut result, false);
        (manifest, result)
    }

    #[test]
    fn test_platform_derived_from_instrument() {
        let (manifest, result) = read("INSTRUMENT illumina miseq\n");
        assert!(result.is_valid(), "{:?}", result.validation);
        assert_eq!(manifest.attribute("INSTRUMENT"), Some("Illumina MiSeq"));
        assert_eq!(manifest.attribute("PLATFORM"), Some("ILLUMINA"));
        assert!(result
            .validation
            .messages()
            .iter()
            .any(|m| m.severity == Severity::Info && m.text.contains("PLATFORM")));
    }

    #[test]
    fn test_contradicting_platform_is_an_error() {
        let (_, result) = read("INSTRUMENT MinION\nPLATFORM ILLUMINA\n");
        assert_eq!(result.validation.count(Severity::Error), 1);
    }

    #[test]
    fn test_unspecified_instrument_needs_platform() {
        let (_, result) = read("INSTRUMENT unspecified\n");
        assert_eq!(result.validation.count(Severity::Error), 1);

        let (manifest, result) = read("INSTRUMENT unspecified\nPLATFORM PACBIO_SMRT\n");
        assert!(result.is_valid(), "{:?}", result.validation);
        assert_eq!(manifest.attribute("PLATFORM"), Some("PACBIO_SMRT"));
    }

    #[test]
    fn test_fastq_must_be_compressed() {
        let schema = schema().unwrap();
        let field = schema.lookup("FASTQ").unwrap();
        assert_eq!(field.cardinality(), "0-2");

        let (_, result) = read("INSTRUMENT MinION\nFASTQ r2.fastq\n");
        assert!(!result.is_valid());
    }

    #[test]
    fn test_single_fastq_is_not_paired() {
        let (manifest, _) = read("INSTRUMENT MinION\n");
        assert!(!is_paired(&manifest));
    }
}

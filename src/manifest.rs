/*!
 * Typed manifest populated from a reader result
 */

use crate::context::ContextType;
use std::fmt;
use std::path::PathBuf;
use webin_core_manifest::{Analysis, Entity, FieldKind, ManifestReaderResult, Run, Sample, Study};

/// Data file type, one per file field
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum FileType {
    Fasta,
    Flatfile,
    Agp,
    ChromosomeList,
    UnlocalisedList,
    Tab,
    Fastq,
    Bam,
    Cram,
}

impl FileType {
    /// Manifest field name
    pub fn field_name(&self) -> &'static str {
        match self {
            FileType::Fasta => "FASTA",
            FileType::Flatfile => "FLATFILE",
            FileType::Agp => "AGP",
            FileType::ChromosomeList => "CHROMOSOME_LIST",
            FileType::UnlocalisedList => "UNLOCALISED_LIST",
            FileType::Tab => "TAB",
            FileType::Fastq => "FASTQ",
            FileType::Bam => "BAM",
            FileType::Cram => "CRAM",
        }
    }

    /// Value of the `filetype` attribute in the XML
    pub fn xml_name(&self) -> &'static str {
        match self {
            FileType::Fasta => "fasta",
            FileType::Flatfile => "flatfile",
            FileType::Agp => "agp",
            FileType::ChromosomeList => "chromosome_list",
            FileType::UnlocalisedList => "unlocalised_list",
            FileType::Tab => "tab",
            FileType::Fastq => "fastq",
            FileType::Bam => "bam",
            FileType::Cram => "cram",
        }
    }

    /// File type for a canonical field name
    pub fn from_field(name: &str) -> Option<Self> {
        let file_type = match name {
            "FASTA" => FileType::Fasta,
            "FLATFILE" => FileType::Flatfile,
            "AGP" => FileType::Agp,
            "CHROMOSOME_LIST" => FileType::ChromosomeList,
            "UNLOCALISED_LIST" => FileType::UnlocalisedList,
            "TAB" => FileType::Tab,
            "FASTQ" => FileType::Fastq,
            "BAM" => FileType::Bam,
            "CRAM" => FileType::Cram,
            _ => return None,
        };
        Some(file_type)
    }
}

impl fmt::Display for FileType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.field_name())
    }
}

/// A resolved, readable data file
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmissionFile {
    pub file_type: FileType,
    pub path: PathBuf,
}

/// Tool that prepared the submission
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubmissionTool {
    pub name: String,
    pub version: Option<String>,
}

/// Fields copied onto typed members rather than into `attributes`
const TYPED_FIELDS: &[&str] = &[
    "NAME",
    "DESCRIPTION",
    "AUTHORS",
    "ADDRESS",
    "STUDY",
    "SAMPLE",
    "RUN_REF",
    "ANALYSIS_REF",
    "SUBMISSION_TOOL",
    "SUBMISSION_TOOL_VERSION",
];

/// Validated submission manifest
#[derive(Debug, Clone, PartialEq)]
pub struct Manifest {
    pub context: ContextType,

    /// Unique submission name
    pub name: String,

    pub description: Option<String>,

    pub authors: Option<String>,

    pub address: Option<String>,

    pub study: Option<Study>,

    pub sample: Option<Sample>,

    pub runs: Vec<Run>,

    pub analyses: Vec<Analysis>,

    /// Data files in manifest order
    pub files: Vec<SubmissionFile>,

    /// Remaining context fields in manifest order, canonical names
    pub attributes: Vec<(String, String)>,

    pub submission_tool: Option<SubmissionTool>,

    /// Built despite validation errors
    pub ignore_errors: bool,
}

impl Manifest {
    /// Copy fields and resolved entities out of a reader result
    pub fn from_result(context: ContextType, result: &ManifestReaderResult, ignore_errors: bool) -> Self {
        let text = |name: &str| result.value(name).map(str::to_string);

        let study = match result.entity("STUDY") {
            Some(Entity::Study(study)) => Some(study.clone()),
            _ => None,
        };
        let sample = match result.entity("SAMPLE") {
            Some(Entity::Sample(sample)) => Some(sample.clone()),
            _ => None,
        };
        let runs = result
            .values("RUN_REF")
            .filter_map(|v| match &v.entity {
                Some(Entity::Run(run)) => Some(run.clone()),
                _ => None,
            })
            .collect();
        let analyses = result
            .values("ANALYSIS_REF")
            .filter_map(|v| match &v.entity {
                Some(Entity::Analysis(analysis)) => Some(analysis.clone()),
                _ => None,
            })
            .collect();

        let files = result
            .files()
            .filter_map(|f| {
                let file_type = FileType::from_field(&f.name)?;
                let path = f.path.clone()?;
                Some(SubmissionFile { file_type, path })
            })
            .collect();

        let attributes = result
            .fields
            .iter()
            .filter(|f| f.known && f.kind == FieldKind::Meta)
            .filter(|f| !TYPED_FIELDS.contains(&f.name.as_str()))
            .map(|f| (f.name.clone(), f.value.clone()))
            .collect();

        let submission_tool = text("SUBMISSION_TOOL").map(|name| SubmissionTool {
            name,
            version: text("SUBMISSION_TOOL_VERSION"),
        });

        Self {
            context,
            name: text("NAME").unwrap_or_default(),
            description: text("DESCRIPTION"),
            authors: text("AUTHORS"),
            address: text("ADDRESS"),
            study,
            sample,
            runs,
            analyses,
            files,
            attributes,
            submission_tool,
            ignore_errors,
        }
    }

    /// First value of a context attribute
    pub fn attribute(&self, name: &str) -> Option<&str> {
        self.attributes
            .iter()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Set an attribute, replacing an existing value
    pub fn set_attribute<S: Into<String>>(&mut self, name: &str, value: S) {
        let value = value.into();
        match self
            .attributes
            .iter_mut()
            .find(|(n, _)| n.eq_ignore_ascii_case(name))
        {
            Some(entry) => entry.1 = value,
            None => self.attributes.push((name.to_ascii_uppercase(), value)),
        }
    }

    /// Files of one type
    pub fn files_of(&self, file_type: FileType) -> impl Iterator<Item = &SubmissionFile> {
        self.files.iter().filter(move |f| f.file_type == file_type)
    }

    /// Name made safe for use as a directory and alias
    pub fn sanitized_name(&self) -> String {
        let sanitized: String = self
            .name
            .trim()
            .chars()
            .map(|c| {
                if c.is_ascii_alphanumeric() || matches!(c, '.' | '-' | '_') {
                    c
                } else {
                    '_'
                }
            })
            .collect();
        if sanitized.is_empty() {
            "unnamed".to_string()
        } else {
            sanitized
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::Path;
    use webin_core_manifest::{
        EntityKind, FieldDefinition, FieldProcessor, FieldSchema, ManifestReader, ReaderOptions,
        StaticLookup,
    };

    fn schema() -> FieldSchema {
        FieldSchema::new()
            .with(FieldDefinition::meta("NAME").required())
            .unwrap()
            .with(FieldDefinition::meta("STUDY").processor(FieldProcessor::resolver(EntityKind::Study)))
            .unwrap()
            .with(FieldDefinition::meta("RUN_REF").repeatable().processor(FieldProcessor::resolver(EntityKind::Run)))
            .unwrap()
            .with(FieldDefinition::meta("PROGRAM"))
            .unwrap()
            .with(FieldDefinition::meta("SUBMISSION_TOOL"))
            .unwrap()
            .with(FieldDefinition::file("FASTA"))
            .unwrap()
    }

    fn lookup() -> StaticLookup {
        StaticLookup::new()
            .with_study(
                "SRP000392",
                Study {
                    study_id: "SRP000392".to_string(),
                    project_id: "PRJNA28545".to_string(),
                    locus_tags: vec![],
                },
            )
            .with_entity(
                "ERR000001",
                Entity::Run(Run {
                    run_id: "ERR000001".to_string(),
                    name: None,
                }),
            )
            .with_entity(
                "ERR000002",
                Entity::Run(Run {
                    run_id: "ERR000002".to_string(),
                    name: None,
                }),
            )
    }

    #[test]
    fn test_populate_from_result() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("a.fasta"), ">a\nACGT\n").unwrap();
        let schema = schema();
        let lookup = lookup();
        let reader = ManifestReader::new(&schema, &lookup, ReaderOptions::new(dir.path()));
        let result = reader.read_str(
            "NAME my assembly\nSTUDY SRP000392\nRUN_REF ERR000001\nRUN_REF ERR000002\nPROGRAM spades\nSUBMISSION_TOOL pipeline\nFASTA a.fasta\n",
            Path::new("manifest.txt"),
        );
        assert!(result.is_valid(), "{:?}", result.validation);

        let manifest = Manifest::from_result(ContextType::Genome, &result, false);
        assert_eq!(manifest.name, "my assembly");
        assert_eq!(manifest.study.as_ref().unwrap().project_id, "PRJNA28545");
        assert_eq!(manifest.runs.len(), 2);
        assert_eq!(manifest.attribute("program"), Some("spades"));
        assert_eq!(manifest.attributes.len(), 1);
        assert_eq!(manifest.submission_tool.as_ref().unwrap().name, "pipeline");
        assert_eq!(manifest.files_of(FileType::Fasta).count(), 1);
        assert_eq!(manifest.sanitized_name(), "my_assembly");
    }

    #[test]
    fn test_set_attribute() {
        let result = ManifestReaderResult::default();
        let mut manifest = Manifest::from_result(ContextType::Reads, &result, false);
        manifest.set_attribute("PLATFORM", "ILLUMINA");
        manifest.set_attribute("platform", "PACBIO_SMRT");
        assert_eq!(manifest.attributes, vec![("PLATFORM".to_string(), "PACBIO_SMRT".to_string())]);
        assert_eq!(manifest.sanitized_name(), "unnamed");
    }

    #[test]
    fn test_file_type_names() {
        assert_eq!(FileType::from_field("CHROMOSOME_LIST"), Some(FileType::ChromosomeList));
        assert_eq!(FileType::ChromosomeList.xml_name(), "chromosome_list");
        assert_eq!(FileType::from_field("NAME"), None);
    }
}

/*!
 * Submission contexts
 *
 * A context decides which manifest fields are legal, which combinations of
 * data files may be submitted together and which XML documents describe the
 * submission. Each context registers its own `FieldSchema`; the fields
 * shared by every context are declared once here.
 */

pub mod genome;
pub mod reads;
pub mod sequence;
pub mod transcriptome;
pub mod vocabulary;

use crate::manifest::Manifest;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use webin_core_manifest::{
    EntityKind, FieldDefinition, FieldProcessor, FieldSchema, ManifestReaderResult, Result,
    TrimCorrector,
};

/// Kind of submission a manifest describes
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ContextType {
    /// Genome assembly
    Genome,

    /// Transcriptome assembly
    Transcriptome,

    /// Annotated sequences in a flat file or tab separated file
    Sequence,

    /// Raw sequencing reads
    Reads,
}

impl ContextType {
    pub fn all() -> [ContextType; 4] {
        [
            ContextType::Genome,
            ContextType::Transcriptome,
            ContextType::Sequence,
            ContextType::Reads,
        ]
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            ContextType::Genome => "genome",
            ContextType::Transcriptome => "transcriptome",
            ContextType::Sequence => "sequence",
            ContextType::Reads => "reads",
        }
    }

    /// Human readable title used in XML documents
    pub fn title(&self) -> &'static str {
        match self {
            ContextType::Genome => "Genome assembly",
            ContextType::Transcriptome => "Transcriptome assembly",
            ContextType::Sequence => "Sequence assembly",
            ContextType::Reads => "Raw reads",
        }
    }

    /// Build the field schema for this context
    pub fn schema(&self) -> Result<FieldSchema> {
        match self {
            ContextType::Genome => genome::schema(),
            ContextType::Transcriptome => transcriptome::schema(),
            ContextType::Sequence => sequence::schema(),
            ContextType::Reads => reads::schema(),
        }
    }

    /// XML document types produced for this context, in submission order
    pub fn document_types(&self) -> &'static [&'static str] {
        match self {
            ContextType::Reads => &["EXPERIMENT", "RUN"],
            _ => &["ANALYSIS"],
        }
    }

    /// Populate the typed manifest from a reader result.
    ///
    /// Context checks that span several fields run here and append their
    /// messages to the result.
    pub fn populate(&self, result: &mut ManifestReaderResult, ignore_errors: bool) -> Manifest {
        let mut manifest = Manifest::from_result(*self, result, ignore_errors);
        if *self == ContextType::Reads {
            reads::derive_platform(&mut manifest, result);
        }
        manifest
    }
}

impl fmt::Display for ContextType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ContextType {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        ContextType::all()
            .into_iter()
            .find(|c| c.as_str().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| format!("unknown context '{}'", s))
    }
}

/// Fields accepted by every context. `name_synonyms` are the context's
/// alternative spellings of NAME.
pub(crate) fn define_common_fields(schema: &mut FieldSchema, name_synonyms: &[&str]) -> Result<()> {
    let name = name_synonyms.iter().fold(
        FieldDefinition::meta("NAME")
            .required()
            .description("Unique submission name")
            .processor(FieldProcessor::corrector(TrimCorrector)),
        |field, synonym| field.synonym(*synonym),
    );
    schema.define(name)?;
    schema.define(
        FieldDefinition::meta("DESCRIPTION")
            .description("Free text description")
            .processor(FieldProcessor::corrector(TrimCorrector)),
    )?;
    schema.define(FieldDefinition::meta("SUBMISSION_TOOL").description("Name of the submitting tool"))?;
    schema.define(
        FieldDefinition::meta("SUBMISSION_TOOL_VERSION").description("Version of the submitting tool"),
    )?;
    schema.define(FieldDefinition::meta("AUTHORS").description("Author list"))?;
    schema.define(FieldDefinition::meta("ADDRESS").description("Author address"))?;
    schema.define(
        FieldDefinition::meta("RUN_REF")
            .repeatable()
            .description("Run accession")
            .processor(FieldProcessor::resolver(EntityKind::Run)),
    )?;
    schema.define(
        FieldDefinition::meta("ANALYSIS_REF")
            .repeatable()
            .description("Analysis accession")
            .processor(FieldProcessor::resolver(EntityKind::Analysis)),
    )?;
    Ok(())
}

/// Study reference, resolved to its project accession
pub(crate) fn study_field() -> FieldDefinition {
    FieldDefinition::meta("STUDY")
        .required()
        .synonym("STUDY_ID")
        .description("Study accession")
        .processor(FieldProcessor::resolver(EntityKind::Study))
}

/// Sample reference, resolved to its BioSample accession
pub(crate) fn sample_field() -> FieldDefinition {
    FieldDefinition::meta("SAMPLE")
        .required()
        .synonym("SAMPLE_ID")
        .description("Sample accession")
        .processor(FieldProcessor::resolver(EntityKind::Sample))
}

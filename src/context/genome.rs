//! Genome assembly context

use super::{define_common_fields, sample_field, study_field, vocabulary};
use webin_core_manifest::{
    AsciiFileNameValidator, FieldDefinition, FieldProcessor, FieldSchema, FileGroup,
    NumberValidator, Result, TrimCorrector,
};

fn file_field(name: &str, description: &str) -> FieldDefinition {
    FieldDefinition::file(name)
        .description(description)
        .processor(FieldProcessor::validator(AsciiFileNameValidator))
}

pub fn schema() -> Result<FieldSchema> {
    let mut schema = FieldSchema::new();
    define_common_fields(&mut schema, &["ASSEMBLYNAME", "ASSEMBLY_NAME"])?;

    schema.define(study_field())?;
    schema.define(sample_field())?;
    schema.define(
        FieldDefinition::meta("COVERAGE")
            .required()
            .description("Sequencing coverage")
            .processor(FieldProcessor::validator(NumberValidator::decimal().greater_than(0.0))),
    )?;
    schema.define(
        FieldDefinition::meta("PROGRAM")
            .required()
            .description("Assembly program")
            .processor(FieldProcessor::corrector(TrimCorrector)),
    )?;
    schema.define(
        FieldDefinition::meta("PLATFORM")
            .required()
            .description("Sequencing platform")
            .processor(FieldProcessor::corrector(TrimCorrector)),
    )?;
    schema.define(
        FieldDefinition::meta("MINGAPLENGTH")
            .description("Minimum gap length")
            .processor(FieldProcessor::validator(NumberValidator::integer().at_least(0.0))),
    )?;
    schema.define(
        FieldDefinition::meta("MOLECULETYPE")
            .description("Molecule type")
            .processors(FieldProcessor::vocabulary(vocabulary::MOLECULE_TYPES)),
    )?;
    schema.define(
        FieldDefinition::meta("ASSEMBLY_TYPE")
            .description("Assembly type")
            .processors(FieldProcessor::vocabulary(vocabulary::ASSEMBLY_TYPES)),
    )?;
    schema.define(
        FieldDefinition::meta("TPA")
            .description("Third party annotation")
            .processors(FieldProcessor::vocabulary(vocabulary::YES_NO)),
    )?;

    schema.define(file_field("FASTA", "Sequences in fasta format"))?;
    schema.define(file_field("FLATFILE", "Sequences in EMBL flat file format"))?;
    schema.define(file_field("AGP", "Scaffolds in AGP format"))?;
    schema.define(file_field("CHROMOSOME_LIST", "Chromosome list"))?;
    schema.define(file_field("UNLOCALISED_LIST", "Unlocalised sequence list"))?;

    schema.define_group(
        FileGroup::named("Sequences in a fasta file")
            .required("FASTA")
            .optional("AGP"),
    )?;
    schema.define_group(
        FileGroup::named("Chromosomes in a fasta file")
            .required("FASTA")
            .required("CHROMOSOME_LIST")
            .optional("UNLOCALISED_LIST")
            .optional("AGP"),
    )?;
    schema.define_group(
        FileGroup::named("Sequences in a flat file")
            .required("FLATFILE")
            .optional("AGP"),
    )?;
    schema.define_group(
        FileGroup::named("Chromosomes in a flat file")
            .required("FLATFILE")
            .required("CHROMOSOME_LIST")
            .optional("UNLOCALISED_LIST")
            .optional("AGP"),
    )?;
    Ok(schema)
}

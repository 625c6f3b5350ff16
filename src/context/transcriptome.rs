//! Transcriptome assembly context

use super::{define_common_fields, sample_field, study_field, vocabulary};
use webin_core_manifest::{
    AsciiFileNameValidator, FieldDefinition, FieldProcessor, FieldSchema, FileGroup, Result,
    TrimCorrector,
};

pub fn schema() -> Result<FieldSchema> {
    let mut schema = FieldSchema::new();
    define_common_fields(&mut schema, &["ASSEMBLYNAME"])?;

    schema.define(study_field())?;
    schema.define(sample_field())?;
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
        FieldDefinition::meta("TPA")
            .description("Third party annotation")
            .processors(FieldProcessor::vocabulary(vocabulary::YES_NO)),
    )?;

    for (name, description) in [
        ("FASTA", "Sequences in fasta format"),
        ("FLATFILE", "Sequences in EMBL flat file format"),
    ] {
        schema.define(
            FieldDefinition::file(name)
                .description(description)
                .processor(FieldProcessor::validator(AsciiFileNameValidator)),
        )?;
    }

    schema.define_group(FileGroup::named("Sequences in a fasta file").required("FASTA"))?;
    schema.define_group(FileGroup::named("Sequences in a flat file").required("FLATFILE"))?;
    Ok(schema)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_schema() {
        let schema = schema().unwrap();
        assert!(schema.lookup("COVERAGE").is_none());
        assert_eq!(schema.lookup("TPA").unwrap().cardinality(), "0-1");
        assert_eq!(schema.groups().len(), 2);
        assert_eq!(schema.file_fields().count(), 2);
    }
}

//! Annotated sequence context

use super::{define_common_fields, study_field};
use webin_core_manifest::{
    AsciiFileNameValidator, FieldDefinition, FieldProcessor, FieldSchema, FileGroup, Result,
};

pub fn schema() -> Result<FieldSchema> {
    let mut schema = FieldSchema::new();
    define_common_fields(&mut schema, &[])?;

    schema.define(study_field())?;

    schema.define(
        FieldDefinition::file("TAB")
            .description("Annotated sequences in a tab separated file")
            .processor(FieldProcessor::validator(AsciiFileNameValidator)),
    )?;
    schema.define(
        FieldDefinition::file("FLATFILE")
            .description("Annotated sequences in EMBL flat file format")
            .processor(FieldProcessor::validator(AsciiFileNameValidator)),
    )?;

    schema.define_group(FileGroup::named("Tab separated file").required("TAB"))?;
    schema.define_group(FileGroup::named("Flat file").required("FLATFILE"))?;
    Ok(schema)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_schema() {
        let schema = schema().unwrap();
        assert!(schema.lookup("SAMPLE").is_none());
        assert!(schema.lookup("STUDY").unwrap().is_required());
        assert_eq!(
            schema.groups().iter().map(|g| g.describe()).collect::<Vec<_>>(),
            vec!["TAB".to_string(), "FLATFILE".to_string()]
        );
    }
}

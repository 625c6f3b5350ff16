//! Manifest reader
//!
//! Reads a manifest in three phases:
//!
//! 1. **Parse**: split lines into field/value pairs, expand `INFO` includes
//!    and resolve file fields against the input directory.
//! 2. **Process**: reject unknown fields, enforce per-field cardinality and
//!    run every occurrence through its processor chain.
//! 3. **Assemble**: match the provided file fields against the file groups.
//!
//! Only an unreadable manifest aborts the read. Everything else is recorded
//! in the result's [`ValidationResult`].

use crate::error::{Error, Result};
use crate::field::{FieldKind, FieldSchema};
use crate::file_group::{match_file_groups, mismatch_message};
use crate::lookup::{Entity, LookupService};
use crate::message::{Origin, ValidationResult};
use crate::processor::process_value;
use std::collections::{BTreeSet, HashMap};
use std::fs::File;
use std::path::{Path, PathBuf};

/// Keyword naming a file of additional manifest lines
pub const INFO_KEYWORD: &str = "INFO";

/// Reader options
#[derive(Debug, Clone, Default)]
pub struct ReaderOptions {
    /// Directory file fields are resolved against
    pub input_dir: PathBuf,

    /// Keep fields not declared in the schema instead of reporting them
    pub allow_unknown_fields: bool,
}

impl ReaderOptions {
    pub fn new<P: Into<PathBuf>>(input_dir: P) -> Self {
        Self {
            input_dir: input_dir.into(),
            allow_unknown_fields: false,
        }
    }

    pub fn with_unknown_fields(mut self, allow: bool) -> Self {
        self.allow_unknown_fields = allow;
        self
    }
}

/// One observed occurrence of a field
#[derive(Debug, Clone, PartialEq)]
pub struct FieldValue {
    /// Canonical field name (the raw key for unknown fields)
    pub name: String,

    pub kind: FieldKind,

    /// Whether the field is declared in the schema
    pub known: bool,

    /// Value as written in the manifest
    pub raw: String,

    /// Value after processing
    pub value: String,

    pub origin: Origin,

    /// Resolved path of a readable data file
    pub path: Option<PathBuf>,

    /// Entity captured by a resolver
    pub entity: Option<Entity>,
}

/// Everything learned from reading one manifest
#[derive(Debug, Clone, Default)]
pub struct ManifestReaderResult {
    /// Manifest file that was read
    pub manifest_path: PathBuf,

    /// Field occurrences in manifest order
    pub fields: Vec<FieldValue>,

    /// Index of the matched file group
    pub file_group: Option<usize>,

    pub validation: ValidationResult,
}

impl ManifestReaderResult {
    /// All occurrences of a field
    pub fn values<'a>(&'a self, name: &str) -> impl Iterator<Item = &'a FieldValue> + 'a {
        let name = name.to_ascii_uppercase();
        self.fields.iter().filter(move |f| f.name == name)
    }

    /// Processed value of the first occurrence of a field
    pub fn value(&self, name: &str) -> Option<&str> {
        self.values(name).next().map(|f| f.value.as_str())
    }

    /// Entity captured for the first occurrence of a field
    pub fn entity(&self, name: &str) -> Option<&Entity> {
        self.values(name).find_map(|f| f.entity.as_ref())
    }

    /// File field occurrences
    pub fn files(&self) -> impl Iterator<Item = &FieldValue> {
        self.fields.iter().filter(|f| f.kind == FieldKind::File)
    }

    /// Names of file fields with at least one occurrence
    pub fn present_file_fields(&self) -> BTreeSet<String> {
        self.files().map(|f| f.name.clone()).collect()
    }

    pub fn is_valid(&self) -> bool {
        self.validation.is_valid()
    }
}

/// Raw key/value pair from the parse phase
#[derive(Debug, Clone)]
struct RawField {
    key: String,
    value: String,
    origin: Origin,
}

/// Reads manifests against one schema
pub struct ManifestReader<'a> {
    schema: &'a FieldSchema,
    lookup: &'a dyn LookupService,
    options: ReaderOptions,
}

impl<'a> ManifestReader<'a> {
    pub fn new(schema: &'a FieldSchema, lookup: &'a dyn LookupService, options: ReaderOptions) -> Self {
        Self {
            schema,
            lookup,
            options,
        }
    }

    /// Read and validate a manifest file
    pub fn read<P: AsRef<Path>>(&self, path: P) -> Result<ManifestReaderResult> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(Error::manifest_not_found(path));
        }
        let text = std::fs::read_to_string(path).map_err(|source| Error::ManifestUnreadable {
            path: path.to_path_buf(),
            source,
        })?;
        Ok(self.read_str(&text, path))
    }

    /// Read and validate manifest text; `path` is used for message origins
    pub fn read_str(&self, text: &str, path: &Path) -> ManifestReaderResult {
        let mut result = ManifestReaderResult {
            manifest_path: path.to_path_buf(),
            ..Default::default()
        };

        let raw = self.parse(text, path, &mut result.validation);
        self.resolve_fields(raw, &mut result);
        self.check_cardinality(&mut result);
        self.process(&mut result);
        self.match_groups(&mut result);
        result
    }

    /// Phase 1: tokenise lines and expand INFO includes
    fn parse(&self, text: &str, path: &Path, validation: &mut ValidationResult) -> Vec<RawField> {
        let mut fields = Vec::new();
        for raw in parse_lines(text, path, validation) {
            if raw.key.eq_ignore_ascii_case(INFO_KEYWORD) {
                self.parse_info(&raw, &mut fields, validation);
            } else {
                fields.push(raw);
            }
        }
        fields
    }

    fn parse_info(&self, info: &RawField, fields: &mut Vec<RawField>, validation: &mut ValidationResult) {
        let info_path = self.options.input_dir.join(&info.value);
        let text = match std::fs::read_to_string(&info_path) {
            Ok(text) => text,
            Err(e) => {
                validation.error(
                    format!("Unable to read INFO file {}: {}", info_path.display(), e),
                    info.origin.clone(),
                );
                return;
            }
        };
        for raw in parse_lines(&text, &info_path, validation) {
            if raw.key.eq_ignore_ascii_case(INFO_KEYWORD) {
                validation.error("INFO files cannot include other INFO files", raw.origin);
            } else {
                fields.push(raw);
            }
        }
    }

    /// Phase 1 (cont.): map keys to definitions and check data files
    fn resolve_fields(&self, raw: Vec<RawField>, result: &mut ManifestReaderResult) {
        for field in raw {
            let Some(definition) = self.schema.lookup(&field.key) else {
                if self.options.allow_unknown_fields {
                    result.fields.push(FieldValue {
                        name: field.key.to_ascii_uppercase(),
                        kind: FieldKind::Meta,
                        known: false,
                        raw: field.value.clone(),
                        value: field.value,
                        origin: field.origin,
                        path: None,
                        entity: None,
                    });
                } else {
                    result.validation.error(
                        format!("Unknown field: {}", field.key),
                        field.origin.with_field(field.key.to_ascii_uppercase()),
                    );
                }
                continue;
            };

            let path = if definition.is_file() {
                self.resolve_file(&field.value).or_else(|| {
                    result.validation.error(
                        format!(
                            "File {} does not exist or is not readable in {}",
                            field.value,
                            self.options.input_dir.display()
                        ),
                        field.origin.clone().with_field(&definition.name),
                    );
                    None
                })
            } else {
                None
            };

            result.fields.push(FieldValue {
                name: definition.name.clone(),
                kind: definition.kind,
                known: true,
                raw: field.value.clone(),
                value: field.value,
                origin: field.origin,
                path,
                entity: None,
            });
        }
    }

    fn resolve_file(&self, value: &str) -> Option<PathBuf> {
        let path = self.options.input_dir.join(value);
        let readable = path.is_file() && File::open(&path).is_ok();
        readable.then_some(path)
    }

    /// Phase 2: occurrence bounds per declared field
    fn check_cardinality(&self, result: &mut ManifestReaderResult) {
        let mut occurrences: HashMap<&str, Vec<&FieldValue>> = HashMap::new();
        for value in result.fields.iter().filter(|f| f.known) {
            occurrences.entry(value.name.as_str()).or_default().push(value);
        }

        let mut messages = ValidationResult::new();
        for definition in self.schema.fields() {
            let found = occurrences
                .get(definition.name.as_str())
                .map(Vec::as_slice)
                .unwrap_or(&[]);

            if found.len() < definition.min_count {
                if found.is_empty() {
                    messages.error(
                        format!("Missing mandatory field {}", definition.name),
                        Origin::field(&definition.name),
                    );
                } else {
                    messages.error(
                        format!(
                            "Field {} has {} values; allowed number of values: {}",
                            definition.name,
                            found.len(),
                            definition.cardinality()
                        ),
                        Origin::field(&definition.name),
                    );
                }
            } else if found.len() > definition.max_count {
                messages.error(
                    format!(
                        "Field {} has {} values; allowed number of values: {}",
                        definition.name,
                        found.len(),
                        definition.cardinality()
                    ),
                    found[definition.max_count]
                        .origin
                        .clone()
                        .with_field(&definition.name),
                );
            }
        }
        result.validation.extend(messages.into_messages());
    }

    /// Phase 2 (cont.): run processor chains
    fn process(&self, result: &mut ManifestReaderResult) {
        for value in result.fields.iter_mut().filter(|f| f.known) {
            let Some(definition) = self.schema.lookup(&value.name) else {
                continue;
            };
            if definition.processors.is_empty() {
                continue;
            }
            let outcome = process_value(
                &definition.name,
                &value.value,
                &definition.processors,
                self.lookup,
                &value.origin,
            );
            value.value = outcome.value;
            value.entity = outcome.entity;
            result.validation.extend(outcome.messages);
        }
    }

    /// Phase 3: file group matching
    fn match_groups(&self, result: &mut ManifestReaderResult) {
        let groups = self.schema.groups();
        if groups.is_empty() {
            return;
        }
        let present = result.present_file_fields();
        match match_file_groups(groups, &present) {
            Some((index, _)) => result.file_group = Some(index),
            None => result
                .validation
                .error(mismatch_message(groups, &present), Origin::default()),
        }
    }
}

/// Split manifest text into key/value pairs.
///
/// Accepts `KEY value`, `KEY=value` and `KEY: value`; blank lines and lines
/// starting with `#` are skipped. A leading byte order mark is ignored.
fn parse_lines(text: &str, path: &Path, validation: &mut ValidationResult) -> Vec<RawField> {
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);
    let mut fields = Vec::new();
    for (index, line) in text.lines().enumerate() {
        let origin = Origin::line(path, index + 1);
        let line = line.trim();
        if line.is_empty() || line.starts_with('#') {
            continue;
        }

        let key_len = line
            .find(|c: char| !(c.is_ascii_alphanumeric() || c == '_'))
            .unwrap_or(line.len());
        let (key, rest) = line.split_at(key_len);
        let separated = rest.is_empty()
            || rest.starts_with(|c: char| c.is_whitespace() || c == '=' || c == ':');
        if key.is_empty() || !separated {
            validation.error(format!("Unable to parse manifest line: {}", line), origin);
            continue;
        }

        let rest = rest.trim_start();
        let value = rest
            .strip_prefix('=')
            .or_else(|| rest.strip_prefix(':'))
            .unwrap_or(rest)
            .trim();
        if value.is_empty() {
            validation.info(
                format!("Ignored field {} with no value", key.to_ascii_uppercase()),
                origin,
            );
            continue;
        }

        fields.push(RawField {
            key: key.to_string(),
            value: value.to_string(),
            origin,
        });
    }
    fields
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::field::FieldDefinition;
    use crate::file_group::FileGroup;
    use crate::lookup::{EntityKind, StaticLookup, Study};
    use crate::message::Severity;
    use crate::processor::FieldProcessor;
    use tempfile::tempdir;

    fn schema() -> FieldSchema {
        let mut schema = FieldSchema::new();
        schema
            .define(FieldDefinition::meta("NAME").required().synonym("ASSEMBLYNAME"))
            .unwrap();
        schema
            .define(
                FieldDefinition::meta("STUDY")
                    .required()
                    .processor(FieldProcessor::resolver(EntityKind::Study)),
            )
            .unwrap();
        schema
            .define(
                FieldDefinition::meta("PLATFORM")
                    .processors(FieldProcessor::vocabulary(&["ILLUMINA", "PACBIO_SMRT"])),
            )
            .unwrap();
        schema
            .define(FieldDefinition::meta("RUN_REF").repeatable())
            .unwrap();
        schema.define(FieldDefinition::file("FASTA")).unwrap();
        schema.define(FieldDefinition::file("AGP")).unwrap();
        schema.define(FieldDefinition::file("FLATFILE")).unwrap();
        schema
            .define_group(FileGroup::new().required("FASTA").optional("AGP"))
            .unwrap();
        schema
            .define_group(FileGroup::new().required("FLATFILE"))
            .unwrap();
        schema
    }

    fn lookup() -> StaticLookup {
        StaticLookup::new().with_study(
            "SRP000392",
            Study {
                study_id: "SRP000392".to_string(),
                project_id: "PRJNA28545".to_string(),
                locus_tags: vec![],
            },
        )
    }

    #[test]
    fn test_parse_lines_separators_and_comments() {
        let mut validation = ValidationResult::new();
        let text = "# comment\n\nNAME  my assembly\nSTUDY=SRP000392\nPLATFORM: illumina\nDESCRIPTION\n";
        let fields = parse_lines(text, Path::new("manifest.txt"), &mut validation);
        let pairs: Vec<(&str, &str)> = fields
            .iter()
            .map(|f| (f.key.as_str(), f.value.as_str()))
            .collect();
        assert_eq!(
            pairs,
            vec![
                ("NAME", "my assembly"),
                ("STUDY", "SRP000392"),
                ("PLATFORM", "illumina")
            ]
        );
        assert_eq!(fields[1].origin.line, Some(4));
        assert_eq!(validation.count(Severity::Info), 1);
        assert!(validation.is_valid());
    }

    #[test]
    fn test_unparseable_line_is_error() {
        let mut validation = ValidationResult::new();
        parse_lines("NAME.x value\n", Path::new("m"), &mut validation);
        assert!(!validation.is_valid());
    }

    #[test]
    fn test_byte_order_mark_is_ignored() {
        let mut validation = ValidationResult::new();
        let fields = parse_lines("\u{feff}NAME x\n", Path::new("m"), &mut validation);
        assert_eq!(fields.len(), 1);
        assert_eq!(fields[0].key, "NAME");
        assert!(validation.is_empty());

        let dir = tempdir().unwrap();
        std::fs::write(dir.path().join("a.embl"), b"ID x").unwrap();
        std::fs::write(dir.path().join("info.txt"), "\u{feff}STUDY SRP000392\n").unwrap();
        let manifest = dir.path().join("manifest.txt");
        std::fs::write(&manifest, "\u{feff}NAME x\r\nINFO info.txt\r\nFLATFILE a.embl\r\n").unwrap();

        let schema = schema();
        let lookup = lookup();
        let reader = ManifestReader::new(&schema, &lookup, ReaderOptions::new(dir.path()));
        let result = reader.read(&manifest).unwrap();
        assert!(result.is_valid(), "{:?}", result.validation);
        assert_eq!(result.value("NAME"), Some("x"));
        assert_eq!(result.value("STUDY"), Some("SRP000392"));
    }

    #[test]
    fn test_valid_manifest() {
        let dir = tempdir().unwrap();
        std::fs::write(dir.path().join("genome.fasta.gz"), b">seq\nACGT\n").unwrap();
        let manifest = dir.path().join("manifest.txt");
        std::fs::write(
            &manifest,
            "ASSEMBLYNAME test\nSTUDY SRP000392\nPLATFORM illumina\nFASTA genome.fasta.gz\n",
        )
        .unwrap();

        let schema = schema();
        let lookup = lookup();
        let reader = ManifestReader::new(&schema, &lookup, ReaderOptions::new(dir.path()));
        let result = reader.read(&manifest).unwrap();

        assert!(result.is_valid(), "{:?}", result.validation);
        assert_eq!(result.value("NAME"), Some("test"));
        assert_eq!(result.value("PLATFORM"), Some("ILLUMINA"));
        assert_eq!(result.file_group, Some(0));
        match result.entity("STUDY") {
            Some(Entity::Study(study)) => assert_eq!(study.project_id, "PRJNA28545"),
            other => panic!("unexpected entity: {:?}", other),
        }
        let fasta = result.files().next().unwrap();
        assert_eq!(fasta.path.as_deref(), Some(dir.path().join("genome.fasta.gz").as_path()));
    }

    #[test]
    fn test_errors_are_accumulated() {
        let dir = tempdir().unwrap();
        let schema = schema();
        let lookup = lookup();
        let reader = ManifestReader::new(&schema, &lookup, ReaderOptions::new(dir.path()));
        let result = reader.read_str(
            "NAME a\nNAME b\nSTUDY ERP999\nPLATFORM SANGER\nCOLOUR blue\nFASTA missing.fasta\nFLATFILE other.embl\n",
            &dir.path().join("manifest.txt"),
        );

        assert!(!result.is_valid());
        let texts: Vec<&str> = result
            .validation
            .errors()
            .map(|m| m.text.as_str())
            .collect();
        assert!(texts.iter().any(|t| t.starts_with("Field NAME has 2 values")));
        assert!(texts.iter().any(|t| t.starts_with("Unknown study")));
        assert!(texts.iter().any(|t| t.contains("Permitted values are: ILLUMINA, PACBIO_SMRT")));
        assert!(texts.iter().any(|t| *t == "Unknown field: COLOUR"));
        assert!(texts.iter().any(|t| t.starts_with("File missing.fasta does not exist")));
        assert!(texts.iter().any(|t| t.starts_with("Invalid set of data files: FASTA, FLATFILE")));
        assert!(result.entity("STUDY").is_none());
        assert_eq!(result.file_group, None);
    }

    #[test]
    fn test_cardinality_bounds() {
        let dir = tempdir().unwrap();
        std::fs::write(dir.path().join("a.embl"), b"ID x").unwrap();
        let schema = schema();
        let lookup = lookup();
        let reader = ManifestReader::new(&schema, &lookup, ReaderOptions::new(dir.path()));
        let path = dir.path().join("manifest.txt");

        let missing = reader.read_str("STUDY SRP000392\nFLATFILE a.embl\n", &path);
        assert!(missing
            .validation
            .errors()
            .any(|m| m.text == "Missing mandatory field NAME"));

        let many_runs = reader.read_str(
            "NAME x\nSTUDY SRP000392\nFLATFILE a.embl\nRUN_REF ERR1\nRUN_REF ERR2\nRUN_REF ERR3\n",
            &path,
        );
        assert!(many_runs.is_valid(), "{:?}", many_runs.validation);
        assert_eq!(many_runs.values("RUN_REF").count(), 3);

        let no_runs = reader.read_str("NAME x\nSTUDY SRP000392\nFLATFILE a.embl\n", &path);
        assert!(no_runs.is_valid());
    }

    #[test]
    fn test_unknown_fields_passthrough() {
        let dir = tempdir().unwrap();
        std::fs::write(dir.path().join("a.embl"), b"ID x").unwrap();
        let schema = schema();
        let lookup = lookup();
        let options = ReaderOptions::new(dir.path()).with_unknown_fields(true);
        let reader = ManifestReader::new(&schema, &lookup, options);
        let result = reader.read_str(
            "NAME x\nSTUDY SRP000392\nFLATFILE a.embl\nCOLOUR blue\n",
            &dir.path().join("manifest.txt"),
        );
        assert!(result.is_valid(), "{:?}", result.validation);
        let colour = result.values("COLOUR").next().unwrap();
        assert!(!colour.known);
        assert_eq!(colour.value, "blue");
    }

    #[test]
    fn test_info_file_is_included() {
        let dir = tempdir().unwrap();
        std::fs::write(dir.path().join("a.embl"), b"ID x").unwrap();
        std::fs::write(dir.path().join("info.txt"), "STUDY SRP000392\nINFO other.txt\n").unwrap();
        let schema = schema();
        let lookup = lookup();
        let reader = ManifestReader::new(&schema, &lookup, ReaderOptions::new(dir.path()));
        let result = reader.read_str(
            "NAME x\nINFO info.txt\nFLATFILE a.embl\n",
            &dir.path().join("manifest.txt"),
        );

        assert_eq!(result.value("STUDY"), Some("SRP000392"));
        let study = result.values("STUDY").next().unwrap();
        assert_eq!(study.origin.file.as_deref(), Some(dir.path().join("info.txt").as_path()));
        let errors: Vec<_> = result.validation.errors().collect();
        assert_eq!(errors.len(), 1);
        assert!(errors[0].text.contains("cannot include other INFO files"));
    }

    #[test]
    fn test_missing_manifest_is_fatal() {
        let dir = tempdir().unwrap();
        let schema = schema();
        let lookup = lookup();
        let reader = ManifestReader::new(&schema, &lookup, ReaderOptions::new(dir.path()));
        let err = reader.read(dir.path().join("nope.txt")).unwrap_err();
        assert!(matches!(err, Error::ManifestNotFound { .. }));
    }
}

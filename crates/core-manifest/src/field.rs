//! Field definitions and the schema registry
//!
//! A [`FieldSchema`] is built once per submission context and is read-only
//! afterwards. Names and synonyms are matched case-insensitively.

use crate::error::{Error, Result};
use crate::file_group::FileGroup;
use crate::processor::FieldProcessor;
use std::collections::HashMap;
use std::fmt;

/// Upper occurrence bound for repeatable fields
pub const UNBOUNDED: usize = usize::MAX;

/// Field kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FieldKind {
    /// Scalar string value
    Meta,
    /// Path to a data file, resolved against the input directory
    File,
}

impl FieldKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            FieldKind::Meta => "META",
            FieldKind::File => "FILE",
        }
    }
}

impl fmt::Display for FieldKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Declaration of one legal manifest field
#[derive(Debug, Clone)]
pub struct FieldDefinition {
    /// Canonical upper-case name
    pub name: String,

    pub kind: FieldKind,

    /// Minimum number of occurrences
    pub min_count: usize,

    /// Maximum number of occurrences ([`UNBOUNDED`] for no limit)
    pub max_count: usize,

    /// Human-readable description
    pub description: String,

    /// Alternative names accepted in manifests
    pub synonyms: Vec<String>,

    /// Processing chain applied to every occurrence
    pub processors: Vec<FieldProcessor>,
}

impl FieldDefinition {
    /// Create a field with the given kind, optional and single-valued
    pub fn new<S: Into<String>>(name: S, kind: FieldKind) -> Self {
        Self {
            name: name.into().to_ascii_uppercase(),
            kind,
            min_count: 0,
            max_count: 1,
            description: String::new(),
            synonyms: Vec::new(),
            processors: Vec::new(),
        }
    }

    /// Create a scalar field
    pub fn meta<S: Into<String>>(name: S) -> Self {
        Self::new(name, FieldKind::Meta)
    }

    /// Create a file field
    pub fn file<S: Into<String>>(name: S) -> Self {
        Self::new(name, FieldKind::File)
    }

    /// Exactly one occurrence
    pub fn required(mut self) -> Self {
        self.min_count = 1;
        self.max_count = 1;
        self
    }

    /// Occurrence bounds
    pub fn count(mut self, min: usize, max: usize) -> Self {
        self.min_count = min;
        self.max_count = max;
        self
    }

    /// Zero or more occurrences
    pub fn repeatable(mut self) -> Self {
        self.max_count = UNBOUNDED;
        self
    }

    pub fn description<S: Into<String>>(mut self, description: S) -> Self {
        self.description = description.into();
        self
    }

    pub fn synonym<S: Into<String>>(mut self, synonym: S) -> Self {
        self.synonyms.push(synonym.into().to_ascii_uppercase());
        self
    }

    pub fn processor(mut self, processor: FieldProcessor) -> Self {
        self.processors.push(processor);
        self
    }

    pub fn processors<I: IntoIterator<Item = FieldProcessor>>(mut self, processors: I) -> Self {
        self.processors.extend(processors);
        self
    }

    pub fn is_required(&self) -> bool {
        self.min_count > 0
    }

    pub fn is_file(&self) -> bool {
        self.kind == FieldKind::File
    }

    /// Occurrence bounds as text, e.g. "1", "0-1", "0-unbounded"
    pub fn cardinality(&self) -> String {
        match (self.min_count, self.max_count) {
            (min, max) if min == max => min.to_string(),
            (min, UNBOUNDED) => format!("{}-unbounded", min),
            (min, max) => format!("{}-{}", min, max),
        }
    }

    fn check(&self) -> Result<()> {
        if self.name.is_empty() {
            return Err(Error::invalid_field("<empty>", "field name cannot be empty"));
        }
        if self.max_count == 0 {
            return Err(Error::invalid_field(&self.name, "max_count must be at least 1"));
        }
        if self.min_count > self.max_count {
            return Err(Error::invalid_field(&self.name, "min_count exceeds max_count"));
        }
        Ok(())
    }
}

/// Registry of legal fields and file groups for one submission context
#[derive(Debug, Clone, Default)]
pub struct FieldSchema {
    fields: Vec<FieldDefinition>,
    index: HashMap<String, usize>,
    groups: Vec<FileGroup>,
}

impl FieldSchema {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a field. Duplicate names or synonyms are a configuration error.
    pub fn define(&mut self, field: FieldDefinition) -> Result<()> {
        field.check()?;

        let position = self.fields.len();
        let keys: Vec<String> = std::iter::once(&field.name)
            .chain(field.synonyms.iter())
            .map(|k| k.to_ascii_uppercase())
            .collect();

        for (i, key) in keys.iter().enumerate() {
            if self.index.contains_key(key) || keys[..i].contains(key) {
                return Err(Error::duplicate_field(key));
            }
        }
        for key in keys {
            self.index.insert(key, position);
        }
        self.fields.push(field);
        Ok(())
    }

    /// Builder-style [`define`](Self::define)
    pub fn with(mut self, field: FieldDefinition) -> Result<Self> {
        self.define(field)?;
        Ok(self)
    }

    /// Register a file group. Every member must be a registered file field.
    pub fn define_group(&mut self, group: FileGroup) -> Result<()> {
        for member in group.members() {
            match self.lookup(&member.field) {
                Some(field) if field.is_file() => {}
                _ => {
                    return Err(Error::UnknownGroupField {
                        field: member.field.clone(),
                    })
                }
            }
        }
        self.groups.push(group);
        Ok(())
    }

    /// Builder-style [`define_group`](Self::define_group)
    pub fn with_group(mut self, group: FileGroup) -> Result<Self> {
        self.define_group(group)?;
        Ok(self)
    }

    /// Find a field by name or synonym, ignoring case
    pub fn lookup(&self, name: &str) -> Option<&FieldDefinition> {
        self.index
            .get(&name.trim().to_ascii_uppercase())
            .map(|&i| &self.fields[i])
    }

    /// Fields in declaration order
    pub fn fields(&self) -> &[FieldDefinition] {
        &self.fields
    }

    /// File groups in declaration order
    pub fn groups(&self) -> &[FileGroup] {
        &self.groups
    }

    /// File fields in declaration order
    pub fn file_fields(&self) -> impl Iterator<Item = &FieldDefinition> {
        self.fields.iter().filter(|f| f.is_file())
    }

    /// Field catalogue, one line per field, e.g. "STUDY (META, 1): Study accession"
    pub fn describe(&self) -> String {
        self.fields
            .iter()
            .map(|f| {
                let mut line = format!("{} ({}, {})", f.name, f.kind, f.cardinality());
                if !f.synonyms.is_empty() {
                    line.push_str(&format!(" aka {}", f.synonyms.join(", ")));
                }
                if !f.description.is_empty() {
                    line.push_str(": ");
                    line.push_str(&f.description);
                }
                line
            })
            .collect::<Vec<_>>()
            .join("\n")
    }

    pub fn len(&self) -> usize {
        self.fields.len()
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }
}

//! Field value processors
//!
//! A field carries an ordered list of processors. Three capability shapes
//! exist: correctors rewrite a value, validators accept or reject it, and
//! resolvers look the value up through a [`LookupService`].
//!
//! For one value, correctors and resolvers run first in declaration order,
//! each seeing the output of the previous one. Validators run afterwards in
//! declaration order; every validator runs even after a rejection so that all
//! defects of a value are reported together.

use crate::error::{Error, Result};
use crate::lookup::{Entity, EntityKind, LookupError, LookupService};
use crate::message::{Origin, ValidationMessage};
use regex::Regex;
use std::fmt;
use std::sync::Arc;

/// Rewrites a value into canonical form
pub trait Corrector: Send + Sync + fmt::Debug {
    /// Returns the corrected value, or `None` to leave the value as is
    fn correct(&self, value: &str) -> Option<String>;
}

/// Accepts or rejects a value without modifying it
pub trait Validator: Send + Sync + fmt::Debug {
    /// Returns a user-facing reason on rejection
    fn validate(&self, value: &str) -> std::result::Result<(), String>;
}

/// One step of a field's processing chain
#[derive(Debug, Clone)]
pub enum FieldProcessor {
    Correct(Arc<dyn Corrector>),
    Validate(Arc<dyn Validator>),
    Resolve(EntityKind),
}

impl FieldProcessor {
    pub fn corrector<C: Corrector + 'static>(corrector: C) -> Self {
        FieldProcessor::Correct(Arc::new(corrector))
    }

    pub fn validator<V: Validator + 'static>(validator: V) -> Self {
        FieldProcessor::Validate(Arc::new(validator))
    }

    pub fn resolver(kind: EntityKind) -> Self {
        FieldProcessor::Resolve(kind)
    }

    /// Corrector + validator pair over one controlled vocabulary
    pub fn vocabulary(values: &[&str]) -> [Self; 2] {
        let cv = Arc::new(ControlledVocabulary::new(values));
        [
            FieldProcessor::Correct(cv.clone()),
            FieldProcessor::Validate(cv),
        ]
    }
}

/// Result of running a processor chain over one value
#[derive(Debug, Clone, PartialEq)]
pub struct ProcessOutcome {
    /// Value after all corrections
    pub value: String,

    /// Entity captured by a resolver, if any
    pub entity: Option<Entity>,

    /// Messages emitted by the chain
    pub messages: Vec<ValidationMessage>,
}

/// Run a processor chain over one field value
pub fn process_value(
    field: &str,
    value: &str,
    processors: &[FieldProcessor],
    lookup: &dyn LookupService,
    origin: &Origin,
) -> ProcessOutcome {
    let origin = origin.clone().with_field(field);
    let mut current = value.to_string();
    let mut entity = None;
    let mut messages = Vec::new();

    for processor in processors {
        match processor {
            FieldProcessor::Correct(corrector) => {
                if let Some(corrected) = corrector.correct(&current) {
                    if corrected != current {
                        messages.push(
                            ValidationMessage::info(format!(
                                "Field {} value \"{}\" corrected to \"{}\"",
                                field, current, corrected
                            ))
                            .at(origin.clone()),
                        );
                        current = corrected;
                    }
                }
            }
            FieldProcessor::Resolve(kind) => match lookup.resolve(*kind, &current) {
                Ok(resolved) => {
                    let canonical = resolved.canonical_id().to_string();
                    if canonical != current {
                        messages.push(
                            ValidationMessage::info(format!(
                                "Field {} value \"{}\" resolved to {} {}",
                                field, current, kind, canonical
                            ))
                            .at(origin.clone()),
                        );
                        current = canonical;
                    }
                    entity = Some(resolved);
                }
                Err(LookupError::NotFound { kind, id }) => {
                    messages.push(
                        ValidationMessage::error(format!(
                            "Unknown {} \"{}\": it does not exist or is not visible to the submission account",
                            kind, id
                        ))
                        .at(origin.clone()),
                    );
                }
                Err(LookupError::Service { message }) => {
                    messages.push(
                        ValidationMessage::error(format!(
                            "Unable to resolve {} \"{}\": {}",
                            kind, current, message
                        ))
                        .at(origin.clone()),
                    );
                }
            },
            FieldProcessor::Validate(_) => {}
        }
    }

    for processor in processors {
        if let FieldProcessor::Validate(validator) = processor {
            if let Err(reason) = validator.validate(&current) {
                messages.push(
                    ValidationMessage::error(format!("Field {}: {}", field, reason))
                        .at(origin.clone()),
                );
            }
        }
    }

    ProcessOutcome {
        value: current,
        entity,
        messages,
    }
}

/// Fixed set of permitted values with case and punctuation tolerant correction
#[derive(Debug, Clone)]
pub struct ControlledVocabulary {
    values: Vec<String>,
}

impl ControlledVocabulary {
    pub fn new(values: &[&str]) -> Self {
        Self {
            values: values.iter().map(|v| v.to_string()).collect(),
        }
    }

    /// Permitted values in declaration order
    pub fn values(&self) -> &[String] {
        &self.values
    }

    pub fn contains(&self, value: &str) -> bool {
        self.values.iter().any(|v| v == value)
    }

    /// Case and punctuation insensitive match key
    fn key(value: &str) -> String {
        value
            .chars()
            .filter(|c| c.is_alphanumeric())
            .flat_map(char::to_lowercase)
            .collect()
    }
}

impl Corrector for ControlledVocabulary {
    fn correct(&self, value: &str) -> Option<String> {
        if self.contains(value) {
            return None;
        }
        let key = Self::key(value);
        if key.is_empty() {
            return None;
        }
        self.values.iter().find(|v| Self::key(v) == key).cloned()
    }
}

impl Validator for ControlledVocabulary {
    fn validate(&self, value: &str) -> std::result::Result<(), String> {
        if self.contains(value) {
            Ok(())
        } else {
            Err(format!(
                "invalid value \"{}\". Permitted values are: {}",
                value,
                self.values.join(", ")
            ))
        }
    }
}

/// Collapses runs of whitespace into single spaces and trims the ends
#[derive(Debug, Clone, Copy, Default)]
pub struct TrimCorrector;

impl Corrector for TrimCorrector {
    fn correct(&self, value: &str) -> Option<String> {
        let collapsed = value.split_whitespace().collect::<Vec<_>>().join(" ");
        (collapsed != value).then_some(collapsed)
    }
}

/// Numeric value check
#[derive(Debug, Clone, Copy)]
pub struct NumberValidator {
    integer: bool,
    min: Option<f64>,
    exclusive: bool,
}

impl NumberValidator {
    /// Accept whole numbers only
    pub fn integer() -> Self {
        Self {
            integer: true,
            min: None,
            exclusive: false,
        }
    }

    /// Accept any decimal number
    pub fn decimal() -> Self {
        Self {
            integer: false,
            min: None,
            exclusive: false,
        }
    }

    /// Require value >= min
    pub fn at_least(mut self, min: f64) -> Self {
        self.min = Some(min);
        self.exclusive = false;
        self
    }

    /// Require value > min
    pub fn greater_than(mut self, min: f64) -> Self {
        self.min = Some(min);
        self.exclusive = true;
        self
    }
}

impl Validator for NumberValidator {
    fn validate(&self, value: &str) -> std::result::Result<(), String> {
        let number = if self.integer {
            value
                .parse::<i64>()
                .map(|n| n as f64)
                .map_err(|_| format!("\"{}\" is not an integer", value))?
        } else {
            value
                .parse::<f64>()
                .ok()
                .filter(|n| n.is_finite())
                .ok_or_else(|| format!("\"{}\" is not a number", value))?
        };

        match self.min {
            Some(min) if self.exclusive && number <= min => {
                Err(format!("value {} must be greater than {}", value, min))
            }
            Some(min) if !self.exclusive && number < min => {
                Err(format!("value {} must be at least {}", value, min))
            }
            _ => Ok(()),
        }
    }
}

/// Regular expression check
#[derive(Debug, Clone)]
pub struct PatternValidator {
    regex: Regex,
    description: String,
}

impl PatternValidator {
    pub fn new<S: Into<String>>(pattern: &str, description: S) -> Result<Self> {
        let regex = Regex::new(pattern)
            .map_err(|e| Error::Other(format!("Invalid pattern {}: {}", pattern, e)))?;
        Ok(Self {
            regex,
            description: description.into(),
        })
    }
}

impl Validator for PatternValidator {
    fn validate(&self, value: &str) -> std::result::Result<(), String> {
        if self.regex.is_match(value) {
            Ok(())
        } else {
            Err(format!("\"{}\" is not {}", value, self.description))
        }
    }
}

/// Requires a file name to end with one of the given suffixes
#[derive(Debug, Clone)]
pub struct FileSuffixValidator {
    suffixes: Vec<String>,
}

impl FileSuffixValidator {
    pub fn new(suffixes: &[&str]) -> Self {
        Self {
            suffixes: suffixes.iter().map(|s| s.to_ascii_lowercase()).collect(),
        }
    }
}

impl Validator for FileSuffixValidator {
    fn validate(&self, value: &str) -> std::result::Result<(), String> {
        let lower = value.to_ascii_lowercase();
        if self.suffixes.iter().any(|s| lower.ends_with(s.as_str())) {
            Ok(())
        } else {
            Err(format!(
                "file \"{}\" must have one of the suffixes: {}",
                value,
                self.suffixes.join(", ")
            ))
        }
    }
}

/// File names must be plain ASCII without shell metacharacters
#[derive(Debug, Clone, Copy, Default)]
pub struct AsciiFileNameValidator;

impl Validator for AsciiFileNameValidator {
    fn validate(&self, value: &str) -> std::result::Result<(), String> {
        let name = value.rsplit(|c| c == '/' || c == '\\').next().unwrap_or(value);
        let valid = !name.is_empty()
            && name
                .chars()
                .all(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-' | '+'));
        if valid {
            Ok(())
        } else {
            Err(format!(
                "file name \"{}\" may only contain ASCII letters, digits and . _ - +",
                name
            ))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lookup::{StaticLookup, Study};
    use crate::message::Severity;

    const PLATFORMS: &[&str] = &["ILLUMINA", "OXFORD_NANOPORE", "PACBIO_SMRT"];

    fn run(value: &str, processors: &[FieldProcessor]) -> ProcessOutcome {
        let lookup = StaticLookup::new();
        process_value("PLATFORM", value, processors, &lookup, &Origin::default())
    }

    #[test]
    fn test_canonical_value_roundtrips_without_message() {
        let processors = FieldProcessor::vocabulary(PLATFORMS);
        for value in PLATFORMS {
            let outcome = run(value, &processors);
            assert_eq!(outcome.value, *value);
            assert!(outcome.messages.is_empty(), "{:?}", outcome.messages);
        }
    }

    #[test]
    fn test_vocabulary_corrects_case_and_punctuation() {
        let processors = FieldProcessor::vocabulary(PLATFORMS);
        let outcome = run("oxford nanopore", &processors);
        assert_eq!(outcome.value, "OXFORD_NANOPORE");
        assert_eq!(outcome.messages.len(), 1);
        assert_eq!(outcome.messages[0].severity, Severity::Info);
    }

    #[test]
    fn test_vocabulary_rejects_unknown_and_lists_permitted() {
        let processors = FieldProcessor::vocabulary(PLATFORMS);
        let outcome = run("SANGER", &processors);
        assert_eq!(outcome.value, "SANGER");
        assert_eq!(outcome.messages.len(), 1);
        let msg = &outcome.messages[0];
        assert!(msg.is_error());
        assert!(msg.text.contains("ILLUMINA, OXFORD_NANOPORE, PACBIO_SMRT"));
        assert_eq!(msg.origin.field.as_deref(), Some("PLATFORM"));
    }

    #[test]
    fn test_all_validators_run_after_first_failure() {
        let processors = vec![
            FieldProcessor::validator(NumberValidator::integer()),
            FieldProcessor::validator(PatternValidator::new("^[0-9]+$", "a digit string").unwrap()),
        ];
        let outcome = run("abc", &processors);
        assert_eq!(outcome.messages.iter().filter(|m| m.is_error()).count(), 2);
    }

    #[test]
    fn test_correctors_run_before_validators_regardless_of_order() {
        let processors = vec![
            FieldProcessor::validator(PatternValidator::new("^a b$", "\"a b\"").unwrap()),
            FieldProcessor::corrector(TrimCorrector),
        ];
        let outcome = run("  a   b ", &processors);
        assert_eq!(outcome.value, "a b");
        assert!(outcome.messages.iter().all(|m| !m.is_error()));
    }

    #[test]
    fn test_resolver_rewrites_and_captures_entity() {
        let lookup = StaticLookup::new().with_study(
            "PRJNA28545",
            Study {
                study_id: "SRP000392".to_string(),
                project_id: "PRJNA28545".to_string(),
                locus_tags: vec![],
            },
        );
        let processors = [FieldProcessor::resolver(EntityKind::Study)];
        let outcome = process_value("STUDY", "PRJNA28545", &processors, &lookup, &Origin::default());
        assert_eq!(outcome.value, "SRP000392");
        assert!(matches!(outcome.entity, Some(Entity::Study(_))));
        assert_eq!(outcome.messages.len(), 1);
        assert!(!outcome.messages[0].is_error());
    }

    #[test]
    fn test_resolver_failure_is_single_error_without_entity() {
        let lookup = StaticLookup::new().unavailable();
        let processors = [FieldProcessor::resolver(EntityKind::Sample)];
        let outcome = process_value("SAMPLE", "ERS1", &processors, &lookup, &Origin::default());
        assert!(outcome.entity.is_none());
        assert_eq!(outcome.value, "ERS1");
        assert_eq!(outcome.messages.len(), 1);
        assert!(outcome.messages[0].is_error());
        assert!(outcome.messages[0].text.contains("service unavailable"));
    }

    #[test]
    fn test_number_validator_bounds() {
        let coverage = NumberValidator::decimal().greater_than(0.0);
        assert!(coverage.validate("12.5").is_ok());
        assert!(coverage.validate("0").is_err());
        assert!(coverage.validate("NaN").is_err());

        let gap = NumberValidator::integer().at_least(0.0);
        assert!(gap.validate("0").is_ok());
        assert!(gap.validate("-1").is_err());
        assert!(gap.validate("1.5").is_err());
    }

    #[test]
    fn test_file_validators() {
        let suffix = FileSuffixValidator::new(&[".gz", ".bz2"]);
        assert!(suffix.validate("reads_1.fastq.GZ").is_ok());
        assert!(suffix.validate("reads_1.fastq").is_err());

        let ascii = AsciiFileNameValidator;
        assert!(ascii.validate("dir with space/genome-1.fasta.gz").is_ok());
        assert!(ascii.validate("genome;rm.fasta").is_err());
        assert!(ascii.validate("génome.fasta").is_err());
    }
}

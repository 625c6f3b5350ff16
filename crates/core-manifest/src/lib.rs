//! Core manifest validation for Webin submissions
//!
//! This crate declares which manifest fields and data files are legal for a
//! submission, and reads user manifests against that declaration.
//!
//! # Key Concepts
//!
//! - **Field Schema**: catalogue of legal fields, their cardinality and processing chains
//! - **Processors**: correctors, validators and resolvers applied to each field value
//! - **File Groups**: alternative combinations of data files a submission may provide
//! - **Manifest Reader**: parse → process → assemble, collecting every message on the way
//!
//! # Example
//!
//! ```no_run
//! use webin_core_manifest::{
//!     EntityKind, FieldDefinition, FieldProcessor, FieldSchema, FileGroup, ManifestReader,
//!     ReaderOptions, StaticLookup,
//! };
//!
//! let mut schema = FieldSchema::new();
//! schema.define(FieldDefinition::meta("NAME").required()).unwrap();
//! schema
//!     .define(
//!         FieldDefinition::meta("STUDY")
//!             .required()
//!             .processor(FieldProcessor::resolver(EntityKind::Study)),
//!     )
//!     .unwrap();
//! schema.define(FieldDefinition::file("FASTA")).unwrap();
//! schema.define_group(FileGroup::new().required("FASTA")).unwrap();
//!
//! let lookup = StaticLookup::new();
//! let reader = ManifestReader::new(&schema, &lookup, ReaderOptions::new("/data/input"));
//! let result = reader.read("/data/input/manifest.txt").unwrap();
//! for message in result.validation.messages() {
//!     println!("{}", message);
//! }
//! ```

pub mod error;
pub mod field;
pub mod file_group;
pub mod lookup;
pub mod message;
pub mod processor;
pub mod reader;

// Re-export main types for convenience
pub use error::{Error, Result};
pub use field::{FieldDefinition, FieldKind, FieldSchema, UNBOUNDED};
pub use file_group::{match_file_groups, mismatch_message, FileGroup, FileGroupMember};
pub use lookup::{
    Analysis, Entity, EntityKind, LookupError, LookupService, Run, Sample, StaticLookup, Study,
};
pub use message::{Origin, Severity, ValidationMessage, ValidationResult};
pub use processor::{
    process_value, AsciiFileNameValidator, ControlledVocabulary, Corrector, FieldProcessor,
    FileSuffixValidator, NumberValidator, PatternValidator, ProcessOutcome, TrimCorrector,
    Validator,
};
pub use reader::{FieldValue, ManifestReader, ManifestReaderResult, ReaderOptions, INFO_KEYWORD};

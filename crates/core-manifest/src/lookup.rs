//! Reference lookup interface
//!
//! Resolver processors hand a field value to a [`LookupService`] and get back
//! the referenced study, sample, run or analysis record. The network client
//! lives outside this crate; [`StaticLookup`] is an in-memory implementation
//! for offline use and tests.

use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};
use thiserror::Error;

/// Kind of referenced entity
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum EntityKind {
    Study,
    Sample,
    Run,
    Analysis,
}

impl EntityKind {
    /// Convert to string representation
    pub fn as_str(&self) -> &'static str {
        match self {
            EntityKind::Study => "study",
            EntityKind::Sample => "sample",
            EntityKind::Run => "run",
            EntityKind::Analysis => "analysis",
        }
    }
}

impl fmt::Display for EntityKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Study record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Study {
    /// Study accession (e.g. "ERP000001")
    pub study_id: String,

    /// BioProject accession (e.g. "PRJEB1234")
    pub project_id: String,

    /// Registered locus tag prefixes
    #[serde(default)]
    pub locus_tags: Vec<String>,
}

/// Sample record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Sample {
    /// Sample accession (e.g. "ERS000001")
    pub sample_id: String,

    /// BioSample accession (e.g. "SAMEA123456")
    pub biosample_id: String,

    /// Scientific name of the organism
    #[serde(default)]
    pub organism: Option<String>,

    /// NCBI taxonomy id
    #[serde(default)]
    pub tax_id: Option<u64>,
}

/// Run record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Run {
    pub run_id: String,

    #[serde(default)]
    pub name: Option<String>,
}

/// Analysis record
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Analysis {
    pub analysis_id: String,

    #[serde(default)]
    pub name: Option<String>,
}

/// A resolved entity
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Entity {
    Study(Study),
    Sample(Sample),
    Run(Run),
    Analysis(Analysis),
}

impl Entity {
    pub fn kind(&self) -> EntityKind {
        match self {
            Entity::Study(_) => EntityKind::Study,
            Entity::Sample(_) => EntityKind::Sample,
            Entity::Run(_) => EntityKind::Run,
            Entity::Analysis(_) => EntityKind::Analysis,
        }
    }

    /// Canonical identifier the manifest value is rewritten to
    pub fn canonical_id(&self) -> &str {
        match self {
            Entity::Study(study) => &study.study_id,
            Entity::Sample(sample) => &sample.biosample_id,
            Entity::Run(run) => &run.run_id,
            Entity::Analysis(analysis) => &analysis.analysis_id,
        }
    }
}

/// Lookup failure
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum LookupError {
    /// The service answered but knows no such entity
    #[error("Unknown {kind}: {id}")]
    NotFound { kind: EntityKind, id: String },

    /// The service could not be reached or answered with an error
    #[error("Lookup service error: {message}")]
    Service { message: String },
}

/// Resolves external references. Implementations own their credentials
/// and their timeout policy.
pub trait LookupService {
    fn resolve(&self, kind: EntityKind, id: &str) -> std::result::Result<Entity, LookupError>;
}

/// In-memory lookup keyed by (kind, identifier)
#[derive(Debug, Default)]
pub struct StaticLookup {
    entities: HashMap<(EntityKind, String), Entity>,
    unavailable: bool,
    calls: AtomicUsize,
}

impl StaticLookup {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register an entity under an identifier
    pub fn with_entity<S: Into<String>>(mut self, id: S, entity: Entity) -> Self {
        self.entities.insert((entity.kind(), id.into()), entity);
        self
    }

    /// Register a study
    pub fn with_study<S: Into<String>>(self, id: S, study: Study) -> Self {
        self.with_entity(id, Entity::Study(study))
    }

    /// Register a sample
    pub fn with_sample<S: Into<String>>(self, id: S, sample: Sample) -> Self {
        self.with_entity(id, Entity::Sample(sample))
    }

    /// Make every lookup fail with a service error
    pub fn unavailable(mut self) -> Self {
        self.unavailable = true;
        self
    }

    /// Number of resolve calls made so far
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

impl LookupService for StaticLookup {
    fn resolve(&self, kind: EntityKind, id: &str) -> std::result::Result<Entity, LookupError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.unavailable {
            return Err(LookupError::Service {
                message: "service unavailable".to_string(),
            });
        }
        self.entities
            .get(&(kind, id.to_string()))
            .cloned()
            .ok_or_else(|| LookupError::NotFound {
                kind,
                id: id.to_string(),
            })
    }
}

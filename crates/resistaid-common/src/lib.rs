//! resistaid-common: data model, error kinds and evidence helpers shared by every ResistAID crate.

pub mod error;
pub mod models;
pub mod mutation;
pub mod confidence;

// Re-export commonly used types
pub use error::{ResistaidError, Result};
pub use models::{
    AnalysisReport, BiochemicalProfile, BiochemicalProperties, Candidate, ClinicalContext,
    DroppedCandidate, EvidenceBundle, EvidenceFound, FeasibilityCategory, LinkedReference,
    ReportSummary, RetrievedRecord, ScoredCandidate,
};
pub use mutation::{MutationCode, MutationQuery};

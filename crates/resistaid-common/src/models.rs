//! Pipeline data model.
//!
//! Field names on the serialised types are the JSON contract consumed by the
//! dashboard; rename with care.

use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

// ---------------------------------------------------------------------------
// Retrieval
// ---------------------------------------------------------------------------

/// One nearest-neighbour hit from the vector store.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RetrievedRecord {
    pub source_collection: String,
    pub record_id: String,
    pub payload: serde_json::Value,
    /// In [0, 1], higher is closer.
    pub similarity_score: f64,
}

impl RetrievedRecord {
    /// String field from the payload, if present and a string.
    pub fn payload_str(&self, key: &str) -> Option<&str> {
        self.payload.get(key).and_then(|v| v.as_str())
    }

    /// Deserialise the payload into a typed record.
    pub fn payload_as<T: DeserializeOwned>(&self) -> serde_json::Result<T> {
        serde_json::from_value(self.payload.clone())
    }
}

// ---------------------------------------------------------------------------
// Candidate + profile
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Candidate {
    pub candidate_id: String,
    pub cdr3: String,
    pub framework: String,
    pub length: usize,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub biological_source: Option<String>,
    pub sequence: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub genetic_code: Option<String>,
}

/// Numeric descriptors rendered under `biochemical_properties`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BiochemicalProperties {
    pub isoelectric_point: f64,
    pub gravy: f64,
    pub instability_index: f64,
    pub aromaticity: f64,
    #[serde(default)]
    pub molecular_weight: f64,
    #[serde(default)]
    pub net_charge_ph7: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BiochemicalProfile {
    #[serde(rename = "biochemical_properties")]
    pub properties: BiochemicalProperties,
    /// Ordered by rule, not by severity.
    pub manufacturing_risks: Vec<String>,
}

// ---------------------------------------------------------------------------
// Evidence
// ---------------------------------------------------------------------------

/// A retrieved record linked to a candidate as supporting evidence.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinkedReference {
    pub citation_id: String,
    pub source_collection: String,
    pub similarity_score: f64,
    pub relevance: f64,
}

/// `evidence_statements[i]` is supported by `supporting_papers[i]`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EvidenceBundle {
    pub evidence_statements: Vec<String>,
    pub supporting_papers: Vec<String>,
    #[serde(default, skip_serializing)]
    pub references: Vec<LinkedReference>,
}

impl EvidenceBundle {
    /// Append one statement together with the citation that backs it.
    pub fn push(&mut self, statement: String, reference: LinkedReference) {
        self.evidence_statements.push(statement);
        self.supporting_papers.push(reference.citation_id.clone());
        self.references.push(reference);
    }

    pub fn len(&self) -> usize {
        self.evidence_statements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.evidence_statements.is_empty()
    }
}

// ---------------------------------------------------------------------------
// Scoring
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FeasibilityCategory {
    Low,
    Moderate,
    High,
}

impl FeasibilityCategory {
    /// Low below 0.4, High above 0.7, Moderate in between (bounds inclusive).
    pub fn from_score(score: f64) -> Self {
        if score > 0.7 {
            Self::High
        } else if score >= 0.4 {
            Self::Moderate
        } else {
            Self::Low
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Low => "Low",
            Self::Moderate => "Moderate",
            Self::High => "High",
        }
    }
}

impl std::fmt::Display for FeasibilityCategory {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ScoredCandidate {
    #[serde(flatten)]
    pub candidate: Candidate,
    #[serde(flatten)]
    pub profile: BiochemicalProfile,
    #[serde(flatten)]
    pub evidence: EvidenceBundle,
    pub feasibility_score: f64,
    pub scientific_support_score: f64,
    pub combined_score: f64,
    pub feasibility_category: FeasibilityCategory,
}

impl ScoredCandidate {
    pub fn candidate_id(&self) -> &str {
        &self.candidate.candidate_id
    }
}

// ---------------------------------------------------------------------------
// Report
// ---------------------------------------------------------------------------

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct EvidenceFound {
    pub relevant_papers: usize,
    pub evidence_score: f64,
    #[serde(default)]
    pub similar_mutations: usize,
    #[serde(default)]
    pub related_experiments: usize,
    /// True when at least one retrieval failed and was replaced by an empty result.
    #[serde(default)]
    pub degraded: bool,
    #[serde(default)]
    pub retrieval_errors: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ReportSummary {
    pub candidates_generated: usize,
    pub average_feasibility: f64,
    #[serde(default)]
    pub average_scientific_support: f64,
    #[serde(default)]
    pub top_score: f64,
}

/// Curated clinical background for a well-characterised resistance mutation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ClinicalContext {
    pub prevalence: String,
    pub clinical_impact: String,
    pub treatment_implications: String,
    pub prognosis: String,
}

/// A candidate removed by the profiler and replaced from the framework pool.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DroppedCandidate {
    pub candidate_id: String,
    pub reason: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnalysisReport {
    pub report_id: String,
    pub mutation_id: String,
    pub created_at: DateTime<Utc>,
    pub evidence_found: EvidenceFound,
    pub summary: ReportSummary,
    pub top_candidates: Vec<ScoredCandidate>,
    #[serde(default)]
    pub dropped_candidates: Vec<DroppedCandidate>,
    #[serde(default)]
    pub recommendations: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub clinical_context: Option<ClinicalContext>,
}

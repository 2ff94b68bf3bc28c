//! Collection names and typed payload records.

use resistaid_common::ScoredCandidate;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

// ── Collections ───────────────────────────────────────────────────────────────

pub const MUTATION_PROFILES: &str = "mutation_profiles";
pub const ANTIBODY_SEQUENCES: &str = "antibody_sequences";
pub const LITERATURE: &str = "literature_abstracts";
pub const EXPERIMENTS: &str = "experiments";
pub const PROTOCOLS: &str = "protocols";
pub const LAB_NOTES: &str = "lab_notes";
pub const IMAGES: &str = "images";
pub const SCORED_CANDIDATES: &str = "scored_candidates";

pub const ALL_COLLECTIONS: [&str; 8] = [
    MUTATION_PROFILES,
    ANTIBODY_SEQUENCES,
    LITERATURE,
    EXPERIMENTS,
    PROTOCOLS,
    LAB_NOTES,
    IMAGES,
    SCORED_CANDIDATES,
];

/// Embedding dimension (all-MiniLM-L6-v2 compatible).
pub const EMBEDDING_DIM: usize = 384;

/// A payload type stored in one named collection.
pub trait CollectionRecord: Serialize + DeserializeOwned + Send + Sync {
    const COLLECTION: &'static str;

    fn record_id(&self) -> String;

    /// Text fed to the embedding function when the record is indexed.
    fn embedding_text(&self) -> String;
}

// ── Mutation profiles ─────────────────────────────────────────────────────────

fn default_gene() -> String { "ERBB2".to_string() }

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MutationProfile {
    pub mutation_id: String,
    #[serde(default = "default_gene")]
    pub gene: String,
    #[serde(default)]
    pub amino_acid_change: Option<String>,
    #[serde(default)]
    pub protein_position: Option<u32>,
    #[serde(default)]
    pub mutation_type: Option<String>,
    #[serde(default)]
    pub clinical_significance: Option<String>,
    #[serde(default)]
    pub domain: Option<String>,
    #[serde(default)]
    pub description: Option<String>,
    #[serde(default)]
    pub pubmed_refs: Vec<String>,
}

impl CollectionRecord for MutationProfile {
    const COLLECTION: &'static str = MUTATION_PROFILES;

    fn record_id(&self) -> String {
        self.mutation_id.clone()
    }

    fn embedding_text(&self) -> String {
        let mut parts = vec![format!("{} {} resistance mutation", self.gene, self.mutation_id)];
        if let Some(ref change) = self.amino_acid_change {
            parts.push(change.clone());
        }
        if let Some(pos) = self.protein_position {
            parts.push(format!("position {pos}"));
        }
        for field in [&self.domain, &self.clinical_significance, &self.description] {
            if let Some(v) = field {
                parts.push(v.clone());
            }
        }
        parts.join(" ")
    }
}

// ── Antibody templates ────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AntibodyTemplate {
    pub antibody_id: String,
    pub name: String,
    #[serde(default)]
    pub target: Option<String>,
    #[serde(default)]
    pub sequence: Option<String>,
    #[serde(default)]
    pub cdr1: Option<String>,
    #[serde(default)]
    pub cdr2: Option<String>,
    pub cdr3: String,
    /// Germline framework name, e.g. `VH3-23`.
    #[serde(default)]
    pub framework: Option<String>,
    /// Explicit FR1 sequence, takes precedence over `framework`.
    #[serde(default)]
    pub framework_sequence: Option<String>,
    #[serde(default)]
    pub affinity_nm: Option<f64>,
    #[serde(default)]
    pub source: Option<String>,
    #[serde(default)]
    pub pdb_id: Option<String>,
    /// Mutations this antibody was characterised against.
    #[serde(default)]
    pub mutation_context: Vec<String>,
}

impl CollectionRecord for AntibodyTemplate {
    const COLLECTION: &'static str = ANTIBODY_SEQUENCES;

    fn record_id(&self) -> String {
        self.antibody_id.clone()
    }

    fn embedding_text(&self) -> String {
        let mut text = format!("{} antibody CDR3 {}", self.name, self.cdr3);
        if let Some(ref t) = self.target {
            text.push_str(&format!(" targeting {t}"));
        }
        if !self.mutation_context.is_empty() {
            text.push_str(&format!(" active against {}", self.mutation_context.join(" ")));
        }
        text
    }
}

// ── Literature ────────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LiteratureRecord {
    pub pmid: String,
    pub title: String,
    #[serde(rename = "abstract", default)]
    pub abstract_text: String,
    #[serde(default)]
    pub mutation_mentions: Vec<String>,
    #[serde(default)]
    pub author: String,
    #[serde(default)]
    pub year: Option<i32>,
}

impl CollectionRecord for LiteratureRecord {
    const COLLECTION: &'static str = LITERATURE;

    fn record_id(&self) -> String {
        self.pmid.clone()
    }

    fn embedding_text(&self) -> String {
        format!("{} {} {}", self.title, self.abstract_text, self.mutation_mentions.join(" "))
    }
}

// ── Lab records ───────────────────────────────────────────────────────────────

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExperimentRecord {
    pub exp_id: String,
    pub outcome: String,
    #[serde(default)]
    pub notes: String,
    #[serde(default)]
    pub measurements: Value,
    #[serde(default)]
    pub conditions: Value,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub mutation_context: Option<String>,
}

impl CollectionRecord for ExperimentRecord {
    const COLLECTION: &'static str = EXPERIMENTS;

    fn record_id(&self) -> String {
        self.exp_id.clone()
    }

    fn embedding_text(&self) -> String {
        let ctx = self.mutation_context.as_deref().unwrap_or_default();
        format!("{ctx} {} {}", self.outcome, self.notes)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProtocolRecord {
    pub protocol_id: String,
    pub target: String,
    pub name: String,
    #[serde(default)]
    pub steps: Vec<String>,
    #[serde(default)]
    pub reagents: Vec<String>,
}

impl CollectionRecord for ProtocolRecord {
    const COLLECTION: &'static str = PROTOCOLS;

    fn record_id(&self) -> String {
        self.protocol_id.clone()
    }

    fn embedding_text(&self) -> String {
        format!("{} {} {}", self.name, self.target, self.steps.join(" "))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LabNote {
    pub note_id: String,
    pub mutation_context: String,
    pub date: String,
    pub text: String,
    pub experimenter: String,
}

impl CollectionRecord for LabNote {
    const COLLECTION: &'static str = LAB_NOTES;

    fn record_id(&self) -> String {
        self.note_id.clone()
    }

    fn embedding_text(&self) -> String {
        format!("{} {}", self.mutation_context, self.text)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ImageRecord {
    pub image_id: String,
    #[serde(rename = "type")]
    pub image_type: String,
    pub description: String,
    #[serde(default)]
    pub candidate_id: Option<String>,
    pub path: String,
}

impl CollectionRecord for ImageRecord {
    const COLLECTION: &'static str = IMAGES;

    fn record_id(&self) -> String {
        self.image_id.clone()
    }

    fn embedding_text(&self) -> String {
        format!("{} {}", self.image_type, self.description)
    }
}

// ── Scored candidates ─────────────────────────────────────────────────────────

impl CollectionRecord for ScoredCandidate {
    const COLLECTION: &'static str = SCORED_CANDIDATES;

    fn record_id(&self) -> String {
        self.candidate.candidate_id.clone()
    }

    fn embedding_text(&self) -> String {
        format!(
            "{} framework CDR3 {} {}",
            self.candidate.framework,
            self.candidate.cdr3,
            self.profile.manufacturing_risks.join(" ")
        )
    }
}

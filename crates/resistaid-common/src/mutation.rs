//! Query mutation input and point-substitution parsing.

use std::sync::OnceLock;

use regex::Regex;
use serde::{Deserialize, Serialize};

/// Immutable input to one pipeline run.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MutationQuery {
    /// Normalised identifier, e.g. `L755S`.
    pub mutation_id: String,
    /// Optional protein-domain context, e.g. "kinase domain".
    #[serde(default)]
    pub domain: Option<String>,
    /// Overrides the configured candidate count for this run.
    #[serde(default)]
    pub num_candidates: Option<usize>,
}

impl MutationQuery {
    pub fn new(mutation_id: impl AsRef<str>) -> Self {
        Self {
            mutation_id: normalise_mutation_id(mutation_id.as_ref()),
            domain: None,
            num_candidates: None,
        }
    }

    pub fn with_domain(mut self, domain: impl Into<String>) -> Self {
        let domain = domain.into();
        self.domain = if domain.trim().is_empty() { None } else { Some(domain) };
        self
    }

    pub fn with_num_candidates(mut self, k: usize) -> Self {
        self.num_candidates = Some(k);
        self
    }

    /// Decoded substitution, when the id has the `<wt><pos><mut>` shape.
    pub fn code(&self) -> Option<MutationCode> {
        MutationCode::parse(&self.mutation_id)
    }

    /// True when `other` names this mutation or another substitution of the
    /// same wild-type residue at the same position (`L755P` for `L755S`).
    pub fn is_related(&self, other: &str) -> bool {
        let other = normalise_mutation_id(other);
        if other == self.mutation_id {
            return true;
        }
        match (self.code(), MutationCode::parse(&other)) {
            (Some(a), Some(b)) => a.same_site(&b),
            _ => false,
        }
    }

    /// Text handed to the embedding function for retrieval.
    pub fn embedding_text(&self) -> String {
        let mut text = format!("HER2 {} resistance mutation", self.mutation_id);
        if let Some(code) = self.code() {
            text.push_str(&format!(
                " {} to {} at position {}",
                code.wild_type, code.mutant, code.position
            ));
        }
        if let Some(ref d) = self.domain {
            text.push(' ');
            text.push_str(d);
        }
        text
    }
}

/// Trim and upper-case a mutation identifier. A leading `p.` is dropped.
pub fn normalise_mutation_id(raw: &str) -> String {
    let trimmed = raw.trim();
    let trimmed = trimmed
        .strip_prefix("p.")
        .or_else(|| trimmed.strip_prefix("P."))
        .unwrap_or(trimmed);
    trimmed.to_ascii_uppercase()
}

/// A single amino-acid substitution such as `L755S`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct MutationCode {
    pub wild_type: char,
    pub position: u32,
    pub mutant: char,
}

fn code_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| {
        Regex::new(r"^([ACDEFGHIKLMNPQRSTVWY])(\d{1,5})([ACDEFGHIKLMNPQRSTVWY])$")
            .unwrap_or_else(|e| panic!("static mutation regex is invalid: {e}"))
    })
}

impl MutationCode {
    pub fn parse(id: &str) -> Option<Self> {
        let caps = code_regex().captures(id)?;
        let wild_type = caps.get(1)?.as_str().chars().next()?;
        let position = caps.get(2)?.as_str().parse().ok()?;
        let mutant = caps.get(3)?.as_str().chars().next()?;
        Some(Self { wild_type, position, mutant })
    }

    pub fn same_site(&self, other: &MutationCode) -> bool {
        self.wild_type == other.wild_type && self.position == other.position
    }
}

//! Pipeline tuning knobs, read from the `[pipeline]` section of `resistaid.toml`.

use std::time::Duration;

use resistaid_antibody::DesignerConfig;
use resistaid_ranker::{LinkerConfig, ScoreWeights};
use serde::{Deserialize, Serialize};
use tracing::warn;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Candidates per report (K).
    #[serde(default = "default_num_candidates")]
    pub num_candidates: usize,
    /// Largest K a single request may ask for.
    #[serde(default = "default_max_candidates")]
    pub max_candidates: usize,
    #[serde(default = "default_analog_top_k")]
    pub analog_top_k: usize,
    #[serde(default = "default_literature_top_k")]
    pub literature_top_k: usize,
    #[serde(default = "default_antibody_top_k")]
    pub antibody_top_k: usize,
    #[serde(default = "default_experiment_top_k")]
    pub experiment_top_k: usize,
    /// Analogs below this similarity do not seed designs.
    #[serde(default = "default_similarity_floor")]
    pub similarity_floor: f64,
    #[serde(default = "default_random_seed")]
    pub random_seed: u64,
    /// Bound on each embedding, search and upsert call.
    #[serde(default = "default_request_timeout_ms")]
    pub request_timeout_ms: u64,
    /// Concurrent per-candidate profiling/scoring tasks. Defaults to K.
    #[serde(default)]
    pub parallelism: Option<usize>,
    /// Reports kept in the (mutation_id, K) cache. 0 disables caching.
    #[serde(default = "default_cache_capacity")]
    pub cache_capacity: usize,
    #[serde(default = "default_max_evidence_statements")]
    pub max_evidence_statements: usize,
    /// Retrieved records below this similarity are never cited.
    #[serde(default = "default_min_evidence_similarity")]
    pub min_evidence_similarity: f64,
    /// Designer backfill rounds before giving up on replacing dropped candidates.
    #[serde(default = "default_max_backfill_rounds")]
    pub max_backfill_rounds: usize,
    #[serde(default = "bool_true")]
    pub persist_results: bool,
    #[serde(default)]
    pub weights: ScoreWeights,
}

fn default_num_candidates()          -> usize { 5 }
fn default_max_candidates()          -> usize { 50 }
fn default_analog_top_k()            -> usize { 10 }
fn default_literature_top_k()        -> usize { 5 }
fn default_antibody_top_k()          -> usize { 8 }
fn default_experiment_top_k()        -> usize { 5 }
fn default_similarity_floor()        -> f64   { 0.3 }
fn default_random_seed()             -> u64   { 42 }
fn default_request_timeout_ms()      -> u64   { 10_000 }
fn default_cache_capacity()          -> usize { 64 }
fn default_max_evidence_statements() -> usize { 5 }
fn default_min_evidence_similarity() -> f64   { 0.1 }
fn default_max_backfill_rounds()     -> usize { 3 }
fn bool_true()                       -> bool  { true }

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            num_candidates: default_num_candidates(),
            max_candidates: default_max_candidates(),
            analog_top_k: default_analog_top_k(),
            literature_top_k: default_literature_top_k(),
            antibody_top_k: default_antibody_top_k(),
            experiment_top_k: default_experiment_top_k(),
            similarity_floor: default_similarity_floor(),
            random_seed: default_random_seed(),
            request_timeout_ms: default_request_timeout_ms(),
            parallelism: None,
            cache_capacity: default_cache_capacity(),
            max_evidence_statements: default_max_evidence_statements(),
            min_evidence_similarity: default_min_evidence_similarity(),
            max_backfill_rounds: default_max_backfill_rounds(),
            persist_results: true,
            weights: ScoreWeights::default(),
        }
    }
}

impl PipelineConfig {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms.max(1))
    }

    pub fn parallelism_for(&self, k: usize) -> usize {
        self.parallelism.unwrap_or(k).max(1)
    }

    pub fn designer_config(&self, k: usize) -> DesignerConfig {
        DesignerConfig {
            num_candidates: k,
            similarity_floor: self.similarity_floor,
            seed: self.random_seed,
            ..DesignerConfig::default()
        }
    }

    pub fn linker_config(&self) -> LinkerConfig {
        LinkerConfig {
            max_statements: self.max_evidence_statements,
            min_similarity: self.min_evidence_similarity,
            ..LinkerConfig::default()
        }
    }

    /// Renormalise weights that do not sum to 1 and raise `max_candidates`
    /// to the configured default K when it is lower.
    pub fn validated(mut self) -> Self {
        if self.max_candidates < self.num_candidates {
            warn!(
                max_candidates = self.max_candidates,
                num_candidates = self.num_candidates,
                "max_candidates below num_candidates, raising it"
            );
            self.max_candidates = self.num_candidates;
        }
        if !self.weights.validate() {
            warn!(
                feasibility = self.weights.feasibility,
                scientific_support = self.weights.scientific_support,
                "Score weights do not sum to 1.0, renormalising"
            );
            self.weights.normalise();
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_from_empty_toml_like_json() {
        let c: PipelineConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(c, PipelineConfig::default());
        assert_eq!(c.parallelism_for(5), 5);
        assert_eq!(c.request_timeout(), Duration::from_secs(10));
    }

    #[test]
    fn test_weights_renormalised() {
        let c = PipelineConfig { weights: ScoreWeights::new(2.0, 2.0), ..Default::default() }.validated();
        assert!(c.weights.validate());
        assert!((c.weights.feasibility - 0.5).abs() < 1e-12);
    }

    #[test]
    fn test_max_candidates_never_below_default_k() {
        let c = PipelineConfig { num_candidates: 8, max_candidates: 3, ..Default::default() }.validated();
        assert_eq!(c.max_candidates, 8);
        assert_eq!(PipelineConfig::default().validated().max_candidates, 50);
    }
}

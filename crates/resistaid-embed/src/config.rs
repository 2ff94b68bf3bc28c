//! Configuration for the embedding function.

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
#[serde(rename_all = "snake_case")]
pub enum EmbeddingBackend {
    /// Deterministic feature hashing, no network.
    #[default]
    Hashing,
    /// Any server exposing the OpenAI `/v1/embeddings` API.
    OpenAiCompatible,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct EmbeddingConfig {
    #[serde(default)]
    pub backend: EmbeddingBackend,

    #[serde(default = "default_model")]
    pub model: String,

    #[serde(default = "default_dim")]
    pub dim: usize,

    /// Base URL for the OpenAI-compatible backend.
    #[serde(default)]
    pub base_url: Option<String>,

    #[serde(default)]
    pub api_key: Option<String>,

    #[serde(default = "default_batch_size")]
    pub batch_size: usize,

    /// Maximum cache size for embeddings (number of entries, 0 disables)
    #[serde(default = "default_cache_size")]
    pub cache_size: usize,

    /// HTTP client timeout; the pipeline applies its own per-call timeout on top.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_model() -> String { "sentence-transformers/all-MiniLM-L6-v2".to_string() }
fn default_dim() -> usize { 384 }
fn default_batch_size() -> usize { 32 }
fn default_cache_size() -> usize { 4_096 }
fn default_timeout_secs() -> u64 { 30 }

impl Default for EmbeddingConfig {
    fn default() -> Self {
        Self {
            backend: EmbeddingBackend::default(),
            model: default_model(),
            dim: default_dim(),
            base_url: None,
            api_key: None,
            batch_size: default_batch_size(),
            cache_size: default_cache_size(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

impl EmbeddingConfig {
    /// Hashing backend with a custom dimension.
    pub fn hashing(dim: usize) -> Self {
        Self { backend: EmbeddingBackend::Hashing, dim, ..Default::default() }
    }

    /// Set maximum cache size.
    pub fn with_cache_size(mut self, size: usize) -> Self {
        self.cache_size = size;
        self
    }
}

use std::time::Duration;

use thiserror::Error;

/// Error kinds surfaced by the candidate pipeline.
///
/// Crate-local errors (store, embedding, profiler, designer) convert into
/// this type at crate boundaries so the orchestrator can apply a single
/// degrade-or-fail policy.
#[derive(Debug, Error)]
pub enum ResistaidError {
    #[error("Invalid query: {0}")]
    InvalidQuery(String),

    #[error("Vector store unavailable: {0}")]
    StoreUnavailable(String),

    #[error("Collection not found: {0}")]
    CollectionNotFound(String),

    #[error("Invalid sequence: {0}")]
    InvalidSequence(String),

    #[error("Embedding failure: {0}")]
    EmbeddingFailure(String),

    #[error("Timed out after {after:?} during {operation}")]
    Timeout { operation: String, after: Duration },

    #[error("No antibody templates available to design candidates")]
    NoTemplates,

    #[error("Run cancelled before stage {0}")]
    Cancelled(String),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

impl ResistaidError {
    /// Short machine-readable kind, used in logs and API error bodies.
    pub fn kind(&self) -> &'static str {
        match self {
            Self::InvalidQuery(_) => "InvalidQuery",
            Self::StoreUnavailable(_) => "StoreUnavailable",
            Self::CollectionNotFound(_) => "CollectionNotFound",
            Self::InvalidSequence(_) => "InvalidSequence",
            Self::EmbeddingFailure(_) => "EmbeddingFailure",
            Self::Timeout { .. } => "Timeout",
            Self::NoTemplates => "NoTemplates",
            Self::Cancelled(_) => "Cancelled",
            Self::Config(_) => "Config",
            Self::Serialization(_) => "Serialization",
            Self::Other(_) => "Other",
        }
    }

    pub fn timeout(operation: impl Into<String>, after: Duration) -> Self {
        Self::Timeout { operation: operation.into(), after }
    }
}

pub type Result<T> = std::result::Result<T, ResistaidError>;

//! Embedding functions for ResistAID retrieval.
//!
//! Two backends share the [`Embedder`] contract:
//!
//! - [`HashEmbedder`]: deterministic feature hashing, no model download
//! - [`HttpEmbedder`]: any OpenAI-compatible `/v1/embeddings` server
//!
//! [`build_embedder`] wraps either in an LRU cache.

pub mod config;
pub mod embedder;
pub mod error;
pub mod hashing;
pub mod http;
pub mod pooling;

pub use config::{EmbeddingBackend, EmbeddingConfig};
pub use embedder::{build_embedder, CachedEmbedder, Embedder};
pub use error::{EmbedError, Result};
pub use hashing::HashEmbedder;
pub use http::HttpEmbedder;

//! The embedding function contract and a caching wrapper.

use std::num::NonZeroUsize;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use lru::LruCache;
use tracing::{debug, info};

use crate::config::{EmbeddingBackend, EmbeddingConfig};
use crate::error::{EmbedError, Result};
use crate::hashing::HashEmbedder;
use crate::http::HttpEmbedder;

/// Text → fixed-dimension vector. Treated as a black box by the pipeline.
#[async_trait]
pub trait Embedder: Send + Sync {
    /// Embed a batch of texts; returns one `dim()`-length vector per text.
    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>>;

    fn dim(&self) -> usize;

    fn name(&self) -> &str;

    /// Embed a single text.
    async fn embed_one(&self, text: &str) -> Result<Vec<f32>> {
        self.embed(&[text.to_string()])
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| EmbedError::InvalidResponse("empty embedding batch".to_string()))
    }
}

/// Wraps an embedder with an LRU cache keyed by the exact text.
pub struct CachedEmbedder<E> {
    inner: E,
    cache: Option<Mutex<LruCache<String, Vec<f32>>>>,
}

impl<E: Embedder> CachedEmbedder<E> {
    pub fn new(inner: E, cache_size: usize) -> Self {
        let cache = NonZeroUsize::new(cache_size).map(|n| Mutex::new(LruCache::new(n)));
        Self { inner, cache }
    }

    pub fn cached_entries(&self) -> usize {
        self.cache
            .as_ref()
            .and_then(|c| c.lock().ok().map(|g| g.len()))
            .unwrap_or(0)
    }
}

#[async_trait]
impl<E: Embedder> Embedder for CachedEmbedder<E> {
    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        let Some(cache) = &self.cache else {
            return self.inner.embed(texts).await;
        };

        // Check cache for each text
        let mut out: Vec<Option<Vec<f32>>> = vec![None; texts.len()];
        let mut uncached_indices = Vec::new();
        let mut uncached_texts = Vec::new();
        {
            let mut guard = cache
                .lock()
                .map_err(|_| EmbedError::InvalidInput("embedding cache poisoned".to_string()))?;
            for (i, text) in texts.iter().enumerate() {
                match guard.get(text) {
                    Some(v) => out[i] = Some(v.clone()),
                    None => {
                        uncached_indices.push(i);
                        uncached_texts.push(text.clone());
                    }
                }
            }
        }

        if !uncached_texts.is_empty() {
            debug!(hits = texts.len() - uncached_texts.len(), misses = uncached_texts.len(),
                "Embedding cache lookup");
            let fresh = self.inner.embed(&uncached_texts).await?;
            if fresh.len() != uncached_texts.len() {
                return Err(EmbedError::InvalidResponse(format!(
                    "expected {} embeddings, got {}",
                    uncached_texts.len(),
                    fresh.len()
                )));
            }
            let mut guard = cache
                .lock()
                .map_err(|_| EmbedError::InvalidInput("embedding cache poisoned".to_string()))?;
            for ((i, text), v) in uncached_indices.into_iter().zip(uncached_texts).zip(fresh) {
                guard.put(text, v.clone());
                out[i] = Some(v);
            }
        }

        Ok(out.into_iter().flatten().collect())
    }

    fn dim(&self) -> usize {
        self.inner.dim()
    }

    fn name(&self) -> &str {
        self.inner.name()
    }
}

/// Build the configured embedder, cache included.
pub fn build_embedder(cfg: &EmbeddingConfig) -> Result<Arc<dyn Embedder>> {
    info!(backend = ?cfg.backend, model = %cfg.model, dim = cfg.dim, "Initialising embedder");
    let embedder: Arc<dyn Embedder> = match cfg.backend {
        EmbeddingBackend::Hashing => {
            Arc::new(CachedEmbedder::new(HashEmbedder::new(cfg.dim)?, cfg.cache_size))
        }
        EmbeddingBackend::OpenAiCompatible => {
            Arc::new(CachedEmbedder::new(HttpEmbedder::new(cfg.clone())?, cfg.cache_size))
        }
    };
    Ok(embedder)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    struct CountingEmbedder {
        calls: AtomicUsize,
    }

    #[async_trait]
    impl Embedder for CountingEmbedder {
        async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
            self.calls.fetch_add(texts.len(), Ordering::SeqCst);
            Ok(texts.iter().map(|t| vec![t.len() as f32, 1.0]).collect())
        }
        fn dim(&self) -> usize { 2 }
        fn name(&self) -> &str { "counting" }
    }

    #[test]
    fn test_cache_avoids_recompute() {
        let e = CachedEmbedder::new(CountingEmbedder { calls: AtomicUsize::new(0) }, 8);
        let texts = vec!["abc".to_string(), "de".to_string()];
        let first = tokio_test::block_on(e.embed(&texts)).unwrap();
        let again = tokio_test::block_on(e.embed(&["de".to_string(), "abc".to_string()])).unwrap();
        assert_eq!(first[0], again[1]);
        assert_eq!(first[1], again[0]);
        assert_eq!(e.inner.calls.load(Ordering::SeqCst), 2);
        assert_eq!(e.cached_entries(), 2);
    }

    #[test]
    fn test_cache_disabled() {
        let e = CachedEmbedder::new(CountingEmbedder { calls: AtomicUsize::new(0) }, 0);
        tokio_test::block_on(e.embed(&["x".to_string()])).unwrap();
        tokio_test::block_on(e.embed(&["x".to_string()])).unwrap();
        assert_eq!(e.inner.calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_build_hashing_backend() {
        let e = build_embedder(&EmbeddingConfig::hashing(48)).unwrap();
        assert_eq!(e.dim(), 48);
        assert_eq!(e.name(), "hashing");
        let v = tokio_test::block_on(e.embed_one("L755S")).unwrap();
        assert_eq!(v.len(), 48);
    }

    #[test]
    fn test_build_rejects_zero_dimension() {
        assert!(build_embedder(&EmbeddingConfig::hashing(0)).is_err());
    }
}

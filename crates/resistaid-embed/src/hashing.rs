//! Deterministic feature-hashing embedder.
//!
//! Words and boundary-marked character trigrams are hashed into a signed
//! bag of features and L2-normalised. Identical text always yields the same
//! vector, and texts sharing tokens or trigrams land close together, which
//! is enough for mutation-id and keyword retrieval without a model.

use async_trait::async_trait;
use sha2::{Digest, Sha256};

use crate::embedder::Embedder;
use crate::error::{EmbedError, Result};
use crate::pooling::l2_normalize;

const WORD_WEIGHT: f32 = 1.0;
const TRIGRAM_WEIGHT: f32 = 0.5;

#[derive(Debug, Clone)]
pub struct HashEmbedder {
    dim: usize,
}

impl HashEmbedder {
    pub fn new(dim: usize) -> Result<Self> {
        if dim == 0 {
            return Err(EmbedError::InvalidInput("dimension must be positive".to_string()));
        }
        Ok(Self { dim })
    }

    fn bucket(&self, feature: &str) -> (usize, f32) {
        let digest = Sha256::digest(feature.as_bytes());
        let mut bytes = [0u8; 8];
        bytes.copy_from_slice(&digest[..8]);
        let h = u64::from_le_bytes(bytes);
        let sign = if h >> 63 == 0 { 1.0 } else { -1.0 };
        ((h % self.dim as u64) as usize, sign)
    }

    /// Embed one text synchronously.
    pub fn embed_text(&self, text: &str) -> Vec<f32> {
        let mut v = vec![0.0f32; self.dim];
        let lower = text.to_lowercase();
        for word in lower.split(|c: char| !c.is_alphanumeric()).filter(|w| !w.is_empty()) {
            let (i, s) = self.bucket(&format!("w:{word}"));
            v[i] += s * WORD_WEIGHT;

            let marked: Vec<char> = format!("#{word}#").chars().collect();
            for tri in marked.windows(3) {
                let tri: String = tri.iter().collect();
                let (i, s) = self.bucket(&format!("t:{tri}"));
                v[i] += s * TRIGRAM_WEIGHT;
            }
        }
        l2_normalize(&mut v);
        v
    }
}

#[async_trait]
impl Embedder for HashEmbedder {
    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        Ok(texts.iter().map(|t| self.embed_text(t)).collect())
    }

    fn dim(&self) -> usize {
        self.dim
    }

    fn name(&self) -> &str {
        "hashing"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cosine(a: &[f32], b: &[f32]) -> f32 {
        a.iter().zip(b).map(|(x, y)| x * y).sum()
    }

    #[test]
    fn test_deterministic_and_unit_length() {
        let e = HashEmbedder::new(64).unwrap();
        let a = e.embed_text("HER2 L755S resistance");
        let b = e.embed_text("HER2 L755S resistance");
        assert_eq!(a, b);
        let norm: f32 = a.iter().map(|x| x * x).sum::<f32>().sqrt();
        assert!((norm - 1.0).abs() < 1e-4);
    }

    #[test]
    fn test_shared_tokens_are_closer() {
        let e = HashEmbedder::new(384).unwrap();
        let q = e.embed_text("HER2 L755S kinase resistance mutation");
        let near = e.embed_text("L755S kinase domain mutation confers resistance");
        let far = e.embed_text("protocol for western blot buffer preparation");
        assert!(cosine(&q, &near) > cosine(&q, &far));
    }

    #[test]
    fn test_empty_text_is_zero_vector() {
        let e = HashEmbedder::new(16).unwrap();
        assert!(e.embed_text("  ").iter().all(|x| *x == 0.0));
    }

    #[test]
    fn test_zero_dimension_rejected() {
        assert!(matches!(HashEmbedder::new(0), Err(EmbedError::InvalidInput(_))));
    }

    #[test]
    fn test_batch_through_trait() {
        let e = HashEmbedder::new(32).unwrap();
        let out = tokio_test::block_on(e.embed(&["a".to_string(), "b".to_string()])).unwrap();
        assert_eq!(out.len(), 2);
        assert_eq!(out[0].len(), 32);
    }
}

//! OpenAI-compatible embedding client (`POST {base_url}/v1/embeddings`).

use std::time::Duration;

use async_trait::async_trait;
use reqwest::Client;
use tracing::instrument;

use crate::config::EmbeddingConfig;
use crate::embedder::Embedder;
use crate::error::{EmbedError, Result};
use crate::pooling::l2_normalize;

pub struct HttpEmbedder {
    cfg: EmbeddingConfig,
    client: Client,
}

impl HttpEmbedder {
    pub fn new(cfg: EmbeddingConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(Duration::from_secs(cfg.timeout_secs))
            .user_agent("ResistAID/0.1 (research)")
            .build()?;
        Ok(Self { cfg, client })
    }

    fn url(&self) -> String {
        let base = self
            .cfg
            .base_url
            .as_deref()
            .unwrap_or("http://localhost:11434")
            .trim_end_matches('/');
        format!("{base}/v1/embeddings")
    }

    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        let body = serde_json::json!({
            "model": &self.cfg.model,
            "input": texts,
        });
        let mut req = self.client.post(self.url()).json(&body);
        if let Some(ref k) = self.cfg.api_key {
            req = req.bearer_auth(k);
        }
        let resp: serde_json::Value = req.send().await?.error_for_status()?.json().await?;
        let mut vecs = parse_openai_embeddings(&resp)?;
        if vecs.len() != texts.len() {
            return Err(EmbedError::InvalidResponse(format!(
                "expected {} embeddings, got {}",
                texts.len(),
                vecs.len()
            )));
        }
        for v in vecs.iter_mut() {
            if v.len() != self.cfg.dim {
                return Err(EmbedError::DimensionMismatch { expected: self.cfg.dim, actual: v.len() });
            }
            l2_normalize(v);
        }
        Ok(vecs)
    }
}

#[async_trait]
impl Embedder for HttpEmbedder {
    #[instrument(skip(self, texts), fields(n = texts.len(), model = %self.cfg.model))]
    async fn embed(&self, texts: &[String]) -> Result<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(vec![]);
        }
        let mut out = Vec::with_capacity(texts.len());
        for batch in texts.chunks(self.cfg.batch_size.max(1)) {
            out.extend(self.embed_batch(batch).await?);
        }
        Ok(out)
    }

    fn dim(&self) -> usize {
        self.cfg.dim
    }

    fn name(&self) -> &str {
        &self.cfg.model
    }
}

/// Extract `data[].embedding` from an OpenAI-style response, ordered by `index`.
pub fn parse_openai_embeddings(resp: &serde_json::Value) -> Result<Vec<Vec<f32>>> {
    let data = resp["data"]
        .as_array()
        .ok_or_else(|| EmbedError::InvalidResponse("missing data array".to_string()))?;

    let mut rows: Vec<(u64, Vec<f32>)> = Vec::with_capacity(data.len());
    for (pos, item) in data.iter().enumerate() {
        let values = item["embedding"]
            .as_array()
            .ok_or_else(|| EmbedError::InvalidResponse("missing embedding".to_string()))?;
        let v = values
            .iter()
            .map(|x| {
                x.as_f64()
                    .map(|f| f as f32)
                    .ok_or_else(|| EmbedError::InvalidResponse("non-numeric embedding value".to_string()))
            })
            .collect::<Result<Vec<f32>>>()?;
        let index = item["index"].as_u64().unwrap_or(pos as u64);
        rows.push((index, v));
    }
    rows.sort_by_key(|(i, _)| *i);
    Ok(rows.into_iter().map(|(_, v)| v).collect())
}

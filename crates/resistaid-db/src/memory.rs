//! In-process vector store with brute-force cosine search.
//!
//! Suitable for tests, demos and catalogs of a few thousand records.

use std::collections::{BTreeMap, HashMap};
use std::sync::RwLock;

use async_trait::async_trait;
use resistaid_common::RetrievedRecord;
use serde_json::Value;
use tracing::debug;

use crate::error::{DbError, Result};
use crate::store::{cosine_similarity, rank_records, PayloadFilter, StoredRecord, VectorStore};

struct MemoryCollection {
    dim: usize,
    records: BTreeMap<String, (Vec<f32>, Value)>,
}

#[derive(Default)]
pub struct MemoryStore {
    collections: RwLock<HashMap<String, MemoryCollection>>,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    fn poisoned() -> DbError {
        DbError::StoreUnavailable("memory store lock poisoned".to_string())
    }
}

#[async_trait]
impl VectorStore for MemoryStore {
    async fn create_collection(&self, collection: &str, dim: usize) -> Result<()> {
        if dim == 0 {
            return Err(DbError::InvalidQuery("embedding dimension must be positive".to_string()));
        }
        let mut guard = self.collections.write().map_err(|_| Self::poisoned())?;
        guard.entry(collection.to_string()).or_insert_with(|| {
            debug!(collection, dim, "Created in-memory collection");
            MemoryCollection { dim, records: BTreeMap::new() }
        });
        Ok(())
    }

    async fn collections(&self) -> Result<Vec<String>> {
        let guard = self.collections.read().map_err(|_| Self::poisoned())?;
        let mut names: Vec<String> = guard.keys().cloned().collect();
        names.sort();
        Ok(names)
    }

    async fn upsert(
        &self,
        collection: &str,
        record_id: &str,
        embedding: Vec<f32>,
        payload: Value,
    ) -> Result<()> {
        let mut guard = self.collections.write().map_err(|_| Self::poisoned())?;
        let coll = guard
            .get_mut(collection)
            .ok_or_else(|| DbError::CollectionNotFound(collection.to_string()))?;
        if embedding.len() != coll.dim {
            return Err(DbError::InvalidEmbeddingDimension {
                expected: coll.dim,
                actual: embedding.len(),
            });
        }
        coll.records.insert(record_id.to_string(), (embedding, payload));
        Ok(())
    }

    async fn search(
        &self,
        collection: &str,
        query_embedding: &[f32],
        top_k: usize,
        filter: Option<&PayloadFilter>,
    ) -> Result<Vec<RetrievedRecord>> {
        let guard = self.collections.read().map_err(|_| Self::poisoned())?;
        let coll = guard
            .get(collection)
            .ok_or_else(|| DbError::CollectionNotFound(collection.to_string()))?;
        if query_embedding.len() != coll.dim {
            return Err(DbError::InvalidEmbeddingDimension {
                expected: coll.dim,
                actual: query_embedding.len(),
            });
        }
        if top_k == 0 {
            return Ok(Vec::new());
        }

        let hits = coll
            .records
            .iter()
            .filter(|(_, (_, payload))| filter.map_or(true, |f| f.matches(payload)))
            .map(|(id, (embedding, payload))| RetrievedRecord {
                source_collection: collection.to_string(),
                record_id: id.clone(),
                payload: payload.clone(),
                similarity_score: cosine_similarity(query_embedding, embedding),
            })
            .collect();

        Ok(rank_records(hits, top_k))
    }

    async fn scroll(&self, collection: &str, limit: usize) -> Result<Vec<StoredRecord>> {
        let guard = self.collections.read().map_err(|_| Self::poisoned())?;
        let coll = guard
            .get(collection)
            .ok_or_else(|| DbError::CollectionNotFound(collection.to_string()))?;
        Ok(coll
            .records
            .iter()
            .take(limit)
            .map(|(id, (_, payload))| StoredRecord { record_id: id.clone(), payload: payload.clone() })
            .collect())
    }

    async fn count(&self, collection: &str) -> Result<u64> {
        let guard = self.collections.read().map_err(|_| Self::poisoned())?;
        guard
            .get(collection)
            .map(|c| c.records.len() as u64)
            .ok_or_else(|| DbError::CollectionNotFound(collection.to_string()))
    }
}

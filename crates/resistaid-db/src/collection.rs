//! Typed access to one named collection.

use std::marker::PhantomData;
use std::sync::Arc;

use tracing::warn;

use crate::error::{DbError, Result};
use crate::schema::{CollectionRecord, ALL_COLLECTIONS};
use crate::store::{PayloadFilter, VectorStore};

/// Repository over the collection that stores `T`.
pub struct TypedCollection<T> {
    store: Arc<dyn VectorStore>,
    _marker: PhantomData<fn() -> T>,
}

impl<T> Clone for TypedCollection<T> {
    fn clone(&self) -> Self {
        Self { store: self.store.clone(), _marker: PhantomData }
    }
}

impl<T: CollectionRecord> TypedCollection<T> {
    pub fn new(store: Arc<dyn VectorStore>) -> Self {
        Self { store, _marker: PhantomData }
    }

    pub fn name(&self) -> &'static str {
        T::COLLECTION
    }

    pub async fn upsert(&self, record: &T, embedding: Vec<f32>) -> Result<()> {
        let payload = serde_json::to_value(record)?;
        self.store
            .upsert(T::COLLECTION, &record.record_id(), embedding, payload)
            .await
    }

    /// Nearest records with their similarity. Fails on payloads that do not decode.
    pub async fn search(
        &self,
        query_embedding: &[f32],
        top_k: usize,
        filter: Option<&PayloadFilter>,
    ) -> Result<Vec<(T, f64)>> {
        let hits = self.store.search(T::COLLECTION, query_embedding, top_k, filter).await?;
        hits.into_iter()
            .map(|h| {
                let score = h.similarity_score;
                h.payload_as::<T>().map(|r| (r, score)).map_err(DbError::from)
            })
            .collect()
    }

    /// Up to `limit` records ordered by id. Payloads that fail to decode are skipped.
    pub async fn list(&self, limit: usize) -> Result<Vec<T>> {
        let rows = self.store.scroll(T::COLLECTION, limit).await?;
        Ok(rows
            .into_iter()
            .filter_map(|row| match serde_json::from_value::<T>(row.payload) {
                Ok(r) => Some(r),
                Err(e) => {
                    warn!(collection = T::COLLECTION, record_id = %row.record_id, error = %e,
                        "Skipping undecodable payload");
                    None
                }
            })
            .collect())
    }

    pub async fn count(&self) -> Result<u64> {
        self.store.count(T::COLLECTION).await
    }
}

/// Create every known collection with the given embedding dimension.
pub async fn initialize(store: &dyn VectorStore, dim: usize) -> Result<()> {
    for name in ALL_COLLECTIONS {
        store.create_collection(name, dim).await?;
    }
    Ok(())
}

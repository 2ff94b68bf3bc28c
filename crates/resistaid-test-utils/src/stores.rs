//! Store fixtures.

use std::collections::HashSet;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use resistaid_common::RetrievedRecord;
use resistaid_db::{
    initialize, CollectionRecord, DbError, MemoryStore, PayloadFilter, StoredRecord,
    TypedCollection, VectorStore,
};
use resistaid_embed::{Embedder, HashEmbedder};
use serde_json::Value;

use crate::fixtures;

/// Embedding dimension used by test stores.
pub const TEST_DIM: usize = 64;

async fn index<T: CollectionRecord>(
    store: Arc<dyn VectorStore>,
    embedder: &HashEmbedder,
    records: Vec<T>,
) -> anyhow::Result<()> {
    let collection = TypedCollection::<T>::new(store);
    for r in records {
        let embedding = embedder.embed_one(&r.embedding_text()).await?;
        collection.upsert(&r, embedding).await?;
    }
    Ok(())
}

/// In-memory store holding every fixture collection, embedded with a
/// [`HashEmbedder`] of [`TEST_DIM`].
pub async fn seeded_store() -> anyhow::Result<Arc<MemoryStore>> {
    let store = Arc::new(MemoryStore::new());
    let dyn_store: Arc<dyn VectorStore> = store.clone();
    initialize(dyn_store.as_ref(), TEST_DIM).await?;
    let embedder = HashEmbedder::new(TEST_DIM)?;
    index(dyn_store.clone(), &embedder, fixtures::mutation_profiles()).await?;
    index(dyn_store.clone(), &embedder, fixtures::antibody_templates()).await?;
    index(dyn_store.clone(), &embedder, fixtures::literature()).await?;
    index(dyn_store.clone(), &embedder, fixtures::experiments()).await?;
    index(dyn_store.clone(), &embedder, fixtures::protocols()).await?;
    index(dyn_store.clone(), &embedder, fixtures::lab_notes()).await?;
    index(dyn_store.clone(), &embedder, fixtures::images()).await?;
    Ok(store)
}

/// Wraps a store and fails every call on the listed collections (or on all
/// collections when the list is empty) with `StoreUnavailable`.
pub struct FailingStore {
    inner: Arc<dyn VectorStore>,
    failing: HashSet<String>,
    upserts: AtomicUsize,
}

impl FailingStore {
    pub fn new(inner: Arc<dyn VectorStore>) -> Self {
        Self { inner, failing: HashSet::new(), upserts: AtomicUsize::new(0) }
    }

    pub fn failing(mut self, collection: &str) -> Self {
        self.failing.insert(collection.to_string());
        self
    }

    /// Upserts attempted, including failed ones.
    pub fn upsert_attempts(&self) -> usize {
        self.upserts.load(Ordering::SeqCst)
    }

    fn check(&self, collection: &str) -> resistaid_db::Result<()> {
        if self.failing.is_empty() || self.failing.contains(collection) {
            Err(DbError::StoreUnavailable(format!("{collection}: connection refused")))
        } else {
            Ok(())
        }
    }
}

#[async_trait]
impl VectorStore for FailingStore {
    async fn create_collection(&self, collection: &str, dim: usize) -> resistaid_db::Result<()> {
        self.check(collection)?;
        self.inner.create_collection(collection, dim).await
    }

    async fn collections(&self) -> resistaid_db::Result<Vec<String>> {
        if self.failing.is_empty() {
            return Err(DbError::StoreUnavailable("connection refused".to_string()));
        }
        self.inner.collections().await
    }

    async fn upsert(
        &self,
        collection: &str,
        record_id: &str,
        embedding: Vec<f32>,
        payload: Value,
    ) -> resistaid_db::Result<()> {
        self.upserts.fetch_add(1, Ordering::SeqCst);
        self.check(collection)?;
        self.inner.upsert(collection, record_id, embedding, payload).await
    }

    async fn search(
        &self,
        collection: &str,
        query_embedding: &[f32],
        top_k: usize,
        filter: Option<&PayloadFilter>,
    ) -> resistaid_db::Result<Vec<RetrievedRecord>> {
        self.check(collection)?;
        self.inner.search(collection, query_embedding, top_k, filter).await
    }

    async fn scroll(&self, collection: &str, limit: usize) -> resistaid_db::Result<Vec<StoredRecord>> {
        self.check(collection)?;
        self.inner.scroll(collection, limit).await
    }

    async fn count(&self, collection: &str) -> resistaid_db::Result<u64> {
        self.check(collection)?;
        self.inner.count(collection).await
    }
}

/// Delays every search by a fixed duration.
pub struct SlowStore {
    inner: Arc<dyn VectorStore>,
    delay: Duration,
}

impl SlowStore {
    pub fn new(inner: Arc<dyn VectorStore>, delay: Duration) -> Self {
        Self { inner, delay }
    }
}

#[async_trait]
impl VectorStore for SlowStore {
    async fn create_collection(&self, collection: &str, dim: usize) -> resistaid_db::Result<()> {
        self.inner.create_collection(collection, dim).await
    }

    async fn collections(&self) -> resistaid_db::Result<Vec<String>> {
        self.inner.collections().await
    }

    async fn upsert(
        &self,
        collection: &str,
        record_id: &str,
        embedding: Vec<f32>,
        payload: Value,
    ) -> resistaid_db::Result<()> {
        self.inner.upsert(collection, record_id, embedding, payload).await
    }

    async fn search(
        &self,
        collection: &str,
        query_embedding: &[f32],
        top_k: usize,
        filter: Option<&PayloadFilter>,
    ) -> resistaid_db::Result<Vec<RetrievedRecord>> {
        tokio::time::sleep(self.delay).await;
        self.inner.search(collection, query_embedding, top_k, filter).await
    }

    async fn scroll(&self, collection: &str, limit: usize) -> resistaid_db::Result<Vec<StoredRecord>> {
        self.inner.scroll(collection, limit).await
    }

    async fn count(&self, collection: &str) -> resistaid_db::Result<u64> {
        self.inner.count(collection).await
    }
}

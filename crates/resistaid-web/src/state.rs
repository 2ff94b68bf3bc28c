//! Shared application state for the web server.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use resistaid_db::{initialize, MemoryStore, VectorStore};
use resistaid_embed::{build_embedder, Embedder};
use resistaid_pipeline::{index_catalog, Catalog, Orchestrator};
use tracing::info;

use crate::config::{Config, StoreBackend};

/// Shared state injected into every Axum handler.
pub struct AppState {
    pub orchestrator: Orchestrator,
    pub store: Arc<dyn VectorStore>,
    pub embedder_name: String,
    pub started_at: DateTime<Utc>,
}

impl AppState {
    pub fn new(orchestrator: Orchestrator, embedder: &dyn Embedder) -> Self {
        Self {
            store: orchestrator.store(),
            orchestrator,
            embedder_name: embedder.name().to_string(),
            started_at: Utc::now(),
        }
    }

    /// Open the configured store and embedder, index the seed catalog if
    /// one is configured, and wire up the orchestrator.
    pub async fn from_config(config: &Config) -> anyhow::Result<Self> {
        let store = open_store(config).await?;
        let embedder = build_embedder(&config.embedding)?;

        match &config.data.catalog_dir {
            Some(dir) => {
                let catalog = Catalog::load_dir(dir)?;
                info!(dir = %dir.display(), records = catalog.len(), "Indexing seed catalog");
                index_catalog(store.clone(), embedder.clone(), &catalog).await?;
            }
            None => initialize(store.as_ref(), embedder.dim()).await?,
        }

        let mut orchestrator = Orchestrator::new(store, embedder.clone(), config.pipeline.clone());
        if let Some(dir) = &config.data.report_dir {
            orchestrator = orchestrator.with_report_dir(dir);
        }
        Ok(Self::new(orchestrator, embedder.as_ref()))
    }
}

async fn open_store(config: &Config) -> anyhow::Result<Arc<dyn VectorStore>> {
    match config.store.backend {
        StoreBackend::Memory => {
            info!("Using in-memory vector store");
            Ok(Arc::new(MemoryStore::new()))
        }
        #[cfg(feature = "lance")]
        StoreBackend::Lance => {
            let store = resistaid_db::LanceStore::open(&config.store.path).await?;
            Ok(Arc::new(store))
        }
        #[cfg(not(feature = "lance"))]
        StoreBackend::Lance => {
            anyhow::bail!("store backend \"lance\" requires building with --features lance")
        }
    }
}

pub type SharedState = Arc<AppState>;

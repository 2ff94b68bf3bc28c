//! The bundled demo catalog loads, indexes and supports a full run.

use std::path::PathBuf;
use std::sync::Arc;

use resistaid_common::MutationQuery;
use resistaid_db::{MemoryStore, VectorStore};
use resistaid_embed::{Embedder, HashEmbedder};
use resistaid_pipeline::{index_catalog, Catalog, Orchestrator, PipelineConfig};

fn seed_dir() -> PathBuf {
    PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../../data/seed")
}

#[tokio::test]
async fn test_demo_catalog_runs_end_to_end() {
    let catalog = Catalog::load_dir(seed_dir()).unwrap();
    assert!(!catalog.mutations.is_empty());
    assert!(!catalog.antibodies.is_empty());

    let store: Arc<dyn VectorStore> = Arc::new(MemoryStore::new());
    let embedder: Arc<dyn Embedder> = Arc::new(HashEmbedder::new(128).unwrap());
    let counts = index_catalog(store.clone(), embedder.clone(), &catalog).await.unwrap();
    assert_eq!(counts["antibody_sequences"], catalog.antibodies.len());

    let orch = Orchestrator::new(store, embedder, PipelineConfig::default());
    let report = orch.analyze(MutationQuery::new("L755S")).await.unwrap();
    assert_eq!(report.top_candidates.len(), 5);
    assert_eq!(report.evidence_found.relevant_papers, 1);
}

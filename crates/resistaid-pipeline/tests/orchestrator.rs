//! End-to-end orchestrator runs against in-memory stores.

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use pretty_assertions::assert_eq;
use resistaid_common::{MutationQuery, ResistaidError};
use resistaid_db::{
    initialize, AntibodyTemplate, CollectionRecord, MemoryStore, MutationProfile, TypedCollection,
    VectorStore, SCORED_CANDIDATES,
};
use resistaid_embed::{Embedder, HashEmbedder};
use resistaid_pipeline::{AnalyzeOptions, Cancellation, Orchestrator, PipelineConfig};
use resistaid_test_utils::{seeded_store, FailingStore, SlowStore, TEST_DIM};

fn hashing() -> Arc<dyn Embedder> {
    Arc::new(HashEmbedder::new(TEST_DIM).unwrap())
}

async fn seeded_orchestrator(config: PipelineConfig) -> Orchestrator {
    let store: Arc<dyn VectorStore> = seeded_store().await.unwrap();
    Orchestrator::new(store, hashing(), config)
}

/// Maps every text to the same unit vector, so every similarity is 1.0.
struct ConstEmbedder;

#[async_trait]
impl Embedder for ConstEmbedder {
    async fn embed(&self, texts: &[String]) -> resistaid_embed::Result<Vec<Vec<f32>>> {
        let v = vec![0.5f32; 4];
        Ok(texts.iter().map(|_| v.clone()).collect())
    }

    fn dim(&self) -> usize {
        4
    }

    fn name(&self) -> &str {
        "const"
    }
}

#[tokio::test]
async fn test_l755s_default_run() {
    let orch = seeded_orchestrator(PipelineConfig::default()).await;
    let report = orch.analyze(MutationQuery::new("L755S")).await.unwrap();

    assert_eq!(report.mutation_id, "L755S");
    assert_eq!(report.top_candidates.len(), 5);
    assert_eq!(report.summary.candidates_generated, 5);
    assert_eq!(report.evidence_found.relevant_papers, 2);
    assert!(!report.evidence_found.degraded);

    let mean: f64 = report.top_candidates.iter().map(|c| c.feasibility_score).sum::<f64>() / 5.0;
    assert!((report.summary.average_feasibility - mean).abs() < 1e-9);

    for pair in report.top_candidates.windows(2) {
        assert!(pair[0].combined_score >= pair[1].combined_score);
    }
    let mut ids: Vec<_> = report.top_candidates.iter().map(|c| c.candidate_id().to_string()).collect();
    ids.sort();
    ids.dedup();
    assert_eq!(ids.len(), 5);

    for c in &report.top_candidates {
        for s in [c.feasibility_score, c.scientific_support_score, c.combined_score] {
            assert!((0.0..=1.0).contains(&s), "score {s} out of range");
        }
        let expected = 0.5 * c.feasibility_score + 0.5 * c.scientific_support_score;
        assert!((c.combined_score - expected).abs() < 1e-6);
        assert_eq!(c.evidence.evidence_statements.len(), c.evidence.supporting_papers.len());
        assert!(c.profile.properties.isoelectric_point > 0.0);
    }
}

#[tokio::test]
async fn test_cached_read_is_identical() {
    let orch = seeded_orchestrator(PipelineConfig::default()).await;
    let a = orch.analyze(MutationQuery::new("L755S")).await.unwrap();
    let b = orch.analyze(MutationQuery::new(" l755s ")).await.unwrap();
    assert_eq!(a.report_id, b.report_id);
    assert!(Arc::ptr_eq(&a, &b));

    // Different K is a different cache entry.
    let c = orch.analyze(MutationQuery::new("L755S").with_num_candidates(3)).await.unwrap();
    assert_eq!(c.top_candidates.len(), 3);
    assert_eq!(orch.cache().len(), 2);
}

#[tokio::test]
async fn test_invalidate_then_rerun_reproduces_candidates() {
    let orch = seeded_orchestrator(PipelineConfig::default()).await;
    let first = orch.analyze(MutationQuery::new("T798I")).await.unwrap();
    assert_eq!(orch.invalidate("T798I"), 1);
    let second = orch.analyze(MutationQuery::new("T798I")).await.unwrap();

    assert_ne!(first.report_id, second.report_id);
    let seqs = |r: &resistaid_common::AnalysisReport| {
        r.top_candidates.iter().map(|c| (c.candidate_id().to_string(), c.candidate.sequence.clone())).collect::<Vec<_>>()
    };
    assert_eq!(seqs(&first), seqs(&second));

    let refreshed = orch.analyze_with(MutationQuery::new("T798I"), AnalyzeOptions::refresh()).await.unwrap();
    assert_eq!(seqs(&first), seqs(&refreshed));
}

#[tokio::test]
async fn test_empty_store_still_yields_k() {
    let store = Arc::new(MemoryStore::new());
    initialize(store.as_ref(), TEST_DIM).await.unwrap();
    let orch = Orchestrator::new(store, hashing(), PipelineConfig::default());
    let report = orch.analyze(MutationQuery::new("G776V")).await.unwrap();

    assert_eq!(report.top_candidates.len(), 5);
    assert_eq!(report.evidence_found.relevant_papers, 0);
    assert_eq!(report.evidence_found.evidence_score, 0.0);
    for c in &report.top_candidates {
        assert!(c.scientific_support_score.abs() < 1e-12);
        assert!(c.evidence.evidence_statements.is_empty());
    }
    assert!(report.recommendations.iter().any(|r| r.starts_with("Little prior evidence")));
}

#[tokio::test]
async fn test_unseen_mutation_borrows_no_evidence() {
    let orch = seeded_orchestrator(PipelineConfig::default()).await;
    let report = orch.analyze(MutationQuery::new("Z999Q")).await.unwrap();

    assert_eq!(report.top_candidates.len(), 5);
    assert_eq!(report.evidence_found.relevant_papers, 0);
    assert_eq!(report.evidence_found.related_experiments, 0);
    assert!(!report.evidence_found.degraded);
    assert!(report.clinical_context.is_none());
    for c in &report.top_candidates {
        assert!(c.evidence.supporting_papers.is_empty(), "cited {:?}", c.evidence.supporting_papers);
        assert!(c.scientific_support_score.abs() < 1e-12);
        assert!(c.profile.properties.isoelectric_point > 0.0);
    }
}

#[tokio::test]
async fn test_citations_stay_on_the_query_site() {
    let orch = seeded_orchestrator(PipelineConfig::default()).await;
    let report = orch.analyze(MutationQuery::new("L755S")).await.unwrap();

    let allowed = ["90000001", "90000002", "EXP-001"];
    for c in &report.top_candidates {
        for cited in &c.evidence.supporting_papers {
            assert!(allowed.contains(&cited.as_str()), "{cited} is not about L755");
        }
    }
    assert!(report.evidence_found.related_experiments <= 1);

    let clinical = report.clinical_context.as_ref().unwrap();
    assert_eq!(clinical.prevalence, "5-7% of trastuzumab-resistant cases");
}

#[tokio::test]
async fn test_unavailable_store_degrades() {
    let inner: Arc<dyn VectorStore> = seeded_store().await.unwrap();
    let store = Arc::new(FailingStore::new(inner));
    let orch = Orchestrator::new(store.clone(), hashing(), PipelineConfig::default());
    let report = orch.analyze(MutationQuery::new("L755S")).await.unwrap();

    assert!(report.evidence_found.degraded);
    assert_eq!(report.evidence_found.retrieval_errors.len(), 4);
    assert_eq!(report.top_candidates.len(), 5);
    assert_eq!(store.upsert_attempts(), 0);
}

#[tokio::test]
async fn test_failing_literature_only() {
    let inner: Arc<dyn VectorStore> = seeded_store().await.unwrap();
    let store = Arc::new(FailingStore::new(inner).failing("literature_abstracts"));
    let orch = Orchestrator::new(store, hashing(), PipelineConfig::default());
    let report = orch.analyze(MutationQuery::new("L755S")).await.unwrap();

    assert_eq!(report.evidence_found.retrieval_errors.len(), 1);
    assert!(report.evidence_found.retrieval_errors[0].starts_with("literature_abstracts"));
    assert_eq!(report.evidence_found.relevant_papers, 0);
    assert!(report.evidence_found.similar_mutations > 0);
}

#[tokio::test]
async fn test_search_timeout_degrades() {
    let inner: Arc<dyn VectorStore> = seeded_store().await.unwrap();
    let store = Arc::new(SlowStore::new(inner, Duration::from_millis(500)));
    let config = PipelineConfig { request_timeout_ms: 20, persist_results: false, ..Default::default() };
    let orch = Orchestrator::new(store, hashing(), config);
    let report = orch.analyze(MutationQuery::new("L755S")).await.unwrap();

    assert_eq!(report.evidence_found.retrieval_errors.len(), 4);
    assert!(report.evidence_found.retrieval_errors.iter().all(|e| e.contains("Timed out")));
    assert_eq!(report.top_candidates.len(), 5);
}

#[tokio::test]
async fn test_invalid_template_is_dropped_and_backfilled() {
    let store: Arc<dyn VectorStore> = Arc::new(MemoryStore::new());
    initialize(store.as_ref(), 4).await.unwrap();
    let v = vec![0.5f32; 4];
    TypedCollection::<MutationProfile>::new(store.clone())
        .upsert(
            &serde_json::from_value(serde_json::json!({"mutation_id": "L755P"})).unwrap(),
            v.clone(),
        )
        .await
        .unwrap();
    let bad: AntibodyTemplate = serde_json::from_value(serde_json::json!({
        "antibody_id": "AB-BAD",
        "name": "Broken",
        "cdr3": "ARXXXXXXXXDY",
        "framework": "VH1-69",
    }))
    .unwrap();
    store
        .upsert(AntibodyTemplate::COLLECTION, "AB-BAD", v, serde_json::to_value(&bad).unwrap())
        .await
        .unwrap();

    let orch = Orchestrator::new(store, Arc::new(ConstEmbedder), PipelineConfig::default());
    let report = orch.analyze(MutationQuery::new("L755S").with_num_candidates(3)).await.unwrap();

    assert_eq!(report.top_candidates.len(), 3);
    assert_eq!(report.dropped_candidates.len(), 1);
    assert!(report.dropped_candidates[0].reason.contains("Invalid sequence"));
    assert!(report.top_candidates.iter().all(|c| !c.candidate.cdr3.contains('X')));
    assert!(report
        .top_candidates
        .iter()
        .all(|c| c.candidate_id() != report.dropped_candidates[0].candidate_id));
}

#[tokio::test]
async fn test_no_templates_and_empty_pool_fails() {
    let store = Arc::new(MemoryStore::new());
    initialize(store.as_ref(), TEST_DIM).await.unwrap();
    let orch = Orchestrator::new(store, hashing(), PipelineConfig::default()).with_framework_pool(Vec::new());
    let err = orch.analyze(MutationQuery::new("L755S")).await.unwrap_err();
    assert!(matches!(err, ResistaidError::NoTemplates));
    assert!(orch.cache().is_empty());
}

#[tokio::test]
async fn test_cancelled_run_produces_no_report() {
    let orch = seeded_orchestrator(PipelineConfig::default()).await;
    let cancellation = Cancellation::new();
    cancellation.cancel();
    let options = AnalyzeOptions { force_refresh: false, cancellation };
    let err = orch.analyze_with(MutationQuery::new("L755S"), options).await.unwrap_err();
    assert!(matches!(err, ResistaidError::Cancelled(ref s) if s == "retrieving"));
    assert!(orch.cache().is_empty());
}

#[tokio::test]
async fn test_empty_mutation_rejected() {
    let orch = seeded_orchestrator(PipelineConfig::default()).await;
    let err = orch.analyze(MutationQuery::new("   ")).await.unwrap_err();
    assert!(matches!(err, ResistaidError::InvalidQuery(_)));
}

#[tokio::test]
async fn test_candidate_count_is_bounded() {
    let config = PipelineConfig { max_candidates: 10, ..Default::default() };
    let orch = seeded_orchestrator(config).await;

    let err = orch
        .analyze(MutationQuery::new("L755S").with_num_candidates(100_000_000))
        .await
        .unwrap_err();
    assert!(matches!(err, ResistaidError::InvalidQuery(ref m) if m.contains("at most 10")));
    assert!(orch.cache().is_empty());

    let report = orch.analyze(MutationQuery::new("L755S").with_num_candidates(10)).await.unwrap();
    assert_eq!(report.top_candidates.len(), 10);
}

#[tokio::test]
async fn test_scored_candidates_persisted() {
    let store = seeded_store().await.unwrap();
    let orch = Orchestrator::new(store.clone(), hashing(), PipelineConfig::default());
    let report = orch.analyze(MutationQuery::new("V777L")).await.unwrap();
    assert_eq!(store.count(SCORED_CANDIDATES).await.unwrap(), report.top_candidates.len() as u64);
}

#[tokio::test]
async fn test_persistence_failure_is_not_fatal() {
    let inner: Arc<dyn VectorStore> = seeded_store().await.unwrap();
    let store = Arc::new(FailingStore::new(inner).failing(SCORED_CANDIDATES));
    let orch = Orchestrator::new(store, hashing(), PipelineConfig::default());
    let report = orch.analyze(MutationQuery::new("L755S")).await.unwrap();
    assert_eq!(report.top_candidates.len(), 5);
    assert!(!report.evidence_found.degraded);
}

#[tokio::test]
async fn test_report_archived() {
    let dir = tempfile::tempdir().unwrap();
    let orch = seeded_orchestrator(PipelineConfig::default()).await.with_report_dir(dir.path());
    let report = orch.analyze(MutationQuery::new("D769H")).await.unwrap();
    let path = resistaid_pipeline::ingest::report_path(dir.path(), &report);
    let body = std::fs::read_to_string(path).unwrap();
    let parsed: resistaid_common::AnalysisReport = serde_json::from_str(&body).unwrap();
    assert_eq!(parsed.report_id, report.report_id);
}

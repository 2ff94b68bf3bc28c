//! Orchestrator: Scout → Designer → Profiler → Linker/Scorer → report.
//!
//! Retrieval failures degrade the report, profiler failures drop and
//! backfill candidates, persistence failures are logged. Only an empty
//! design (`NoTemplates`), an invalid query or cancellation fail a run.

use std::path::PathBuf;
use std::sync::Arc;

use chrono::Utc;
use futures::stream::{self, StreamExt};
use resistaid_antibody::{default_framework_pool, profile, AntibodyDesigner, Framework};
use resistaid_common::mutation::normalise_mutation_id;
use resistaid_common::{
    AnalysisReport, BiochemicalProfile, Candidate, DroppedCandidate, MutationQuery, ResistaidError,
    Result, ScoredCandidate,
};
use resistaid_db::{CollectionRecord, TypedCollection, VectorStore, SCORED_CANDIDATES};
use resistaid_embed::Embedder;
use resistaid_ranker::{link_evidence, rank_candidates, score_candidate};
use tokio::time::timeout;
use tracing::{debug, info, instrument, warn};
use uuid::Uuid;

use crate::cache::ReportCache;
use crate::cancel::Cancellation;
use crate::clinical::clinical_context;
use crate::config::PipelineConfig;
use crate::ingest::archive_report;
use crate::report::{recommendations, summarise};
use crate::scout::{ScoutReport, SimilarityScout};
use crate::stage::{RunStage, RunState};

/// Per-call switches for [`Orchestrator::analyze_with`].
#[derive(Debug, Clone, Default)]
pub struct AnalyzeOptions {
    /// Bypass the report cache and replace its entry.
    pub force_refresh: bool,
    pub cancellation: Cancellation,
}

impl AnalyzeOptions {
    pub fn refresh() -> Self {
        Self { force_refresh: true, ..Default::default() }
    }
}

pub struct Orchestrator {
    store: Arc<dyn VectorStore>,
    embedder: Arc<dyn Embedder>,
    scout: SimilarityScout,
    config: PipelineConfig,
    cache: ReportCache,
    framework_pool: Vec<Framework>,
    report_dir: Option<PathBuf>,
}

impl Orchestrator {
    pub fn new(store: Arc<dyn VectorStore>, embedder: Arc<dyn Embedder>, config: PipelineConfig) -> Self {
        let config = config.validated();
        Self {
            scout: SimilarityScout::new(store.clone(), embedder.clone(), &config),
            cache: ReportCache::new(config.cache_capacity),
            store,
            embedder,
            config,
            framework_pool: default_framework_pool(),
            report_dir: None,
        }
    }

    /// Archive each fresh report as JSON under `dir`.
    pub fn with_report_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.report_dir = Some(dir.into());
        self
    }

    pub fn with_framework_pool(mut self, pool: Vec<Framework>) -> Self {
        self.framework_pool = pool;
        self
    }

    pub fn config(&self) -> &PipelineConfig {
        &self.config
    }

    pub fn store(&self) -> Arc<dyn VectorStore> {
        self.store.clone()
    }

    pub fn cache(&self) -> &ReportCache {
        &self.cache
    }

    /// Drop cached reports for `mutation_id`.
    pub fn invalidate(&self, mutation_id: &str) -> usize {
        let removed = self.cache.invalidate(&normalise_mutation_id(mutation_id));
        debug!(mutation = mutation_id, removed, "Report cache invalidated");
        removed
    }

    pub fn clear_cache(&self) {
        self.cache.clear();
    }

    pub async fn analyze(&self, query: MutationQuery) -> Result<Arc<AnalysisReport>> {
        self.analyze_with(query, AnalyzeOptions::default()).await
    }

    #[instrument(skip(self, query, options), fields(mutation = %query.mutation_id, force = options.force_refresh))]
    pub async fn analyze_with(
        &self,
        query: MutationQuery,
        options: AnalyzeOptions,
    ) -> Result<Arc<AnalysisReport>> {
        if query.mutation_id.is_empty() {
            return Err(ResistaidError::InvalidQuery("mutation_id must not be empty".to_string()));
        }
        let k = query.num_candidates.unwrap_or(self.config.num_candidates);
        if k == 0 {
            return Err(ResistaidError::InvalidQuery("num_candidates must be at least 1".to_string()));
        }
        if k > self.config.max_candidates {
            return Err(ResistaidError::InvalidQuery(format!(
                "num_candidates must be at most {}, got {k}",
                self.config.max_candidates
            )));
        }

        if !options.force_refresh {
            if let Some(hit) = self.cache.get(&query.mutation_id, k) {
                info!(report_id = %hit.report_id, "Serving cached report");
                return Ok(hit);
            }
        }

        let run_id = Uuid::new_v4().to_string();
        let mut state = RunState::new(run_id.clone(), query.mutation_id.clone());
        let report = match self.run(&query, k, &run_id, &mut state, &options.cancellation).await {
            Ok(r) => Arc::new(r),
            Err(e) => {
                state.fail(e.kind());
                return Err(e);
            }
        };

        info!(
            report_id = %report.report_id,
            candidates = report.top_candidates.len(),
            dropped = report.dropped_candidates.len(),
            degraded = report.evidence_found.degraded,
            "Analysis complete"
        );
        self.cache.put(k, report.clone());
        if let Some(dir) = &self.report_dir {
            archive_report(dir, &report).await;
        }
        Ok(report)
    }

    async fn run(
        &self,
        query: &MutationQuery,
        k: usize,
        run_id: &str,
        state: &mut RunState,
        cancel: &Cancellation,
    ) -> Result<AnalysisReport> {
        cancel.check(RunStage::Retrieving)?;
        state.advance(RunStage::Retrieving)?;
        let scout = self.scout.scout(query).await;

        cancel.check(RunStage::Designing)?;
        state.advance(RunStage::Designing)?;
        let mut designer = AntibodyDesigner::new(self.config.designer_config(k), query)
            .with_pool(self.framework_pool.clone());
        let candidates = designer.design(&scout.analog_mutations, &scout.antibody_templates)?;

        cancel.check(RunStage::Profiling)?;
        state.advance(RunStage::Profiling)?;
        let (profiled, dropped) = self.profile_with_backfill(candidates, &mut designer, k).await;
        if profiled.is_empty() {
            return Err(ResistaidError::NoTemplates);
        }

        cancel.check(RunStage::Scoring)?;
        state.advance(RunStage::Scoring)?;
        let scored = self.score_all(query, &scout, profiled, k).await;

        cancel.check(RunStage::Aggregating)?;
        state.advance(RunStage::Aggregating)?;
        let ranked = rank_candidates(scored);
        let evidence_found = scout.evidence_found();
        let summary = summarise(&ranked);
        let recommendations = recommendations(&ranked, &evidence_found);
        if self.config.persist_results {
            self.persist(&ranked).await;
        }

        state.advance(RunStage::Done)?;
        Ok(AnalysisReport {
            report_id: format!("RPT-{run_id}"),
            mutation_id: query.mutation_id.clone(),
            created_at: Utc::now(),
            evidence_found,
            summary,
            top_candidates: ranked,
            dropped_candidates: dropped,
            recommendations,
            clinical_context: clinical_context(&query.mutation_id),
        })
    }

    /// Profile concurrently; replace failures with designer backfill until
    /// K candidates are profiled or the backfill rounds run out.
    async fn profile_with_backfill(
        &self,
        mut batch: Vec<Candidate>,
        designer: &mut AntibodyDesigner,
        k: usize,
    ) -> (Vec<(Candidate, BiochemicalProfile)>, Vec<DroppedCandidate>) {
        let parallelism = self.config.parallelism_for(k);
        let mut profiled = Vec::with_capacity(k);
        let mut dropped = Vec::new();
        let mut round = 0;

        loop {
            let results: Vec<_> = stream::iter(batch)
                .map(|c| async move {
                    let result = profile(&c.sequence);
                    (c, result)
                })
                .buffer_unordered(parallelism)
                .collect()
                .await;

            let mut failed = Vec::new();
            for (candidate, result) in results {
                match result {
                    Ok(p) => profiled.push((candidate, p)),
                    Err(e) => {
                        warn!(candidate_id = %candidate.candidate_id, error = %e, "Candidate dropped by profiler");
                        failed.push(DroppedCandidate {
                            candidate_id: candidate.candidate_id,
                            reason: ResistaidError::from(e).to_string(),
                        });
                    }
                }
            }
            failed.sort_by(|a, b| a.candidate_id.cmp(&b.candidate_id));
            dropped.extend(failed);

            let need = k.saturating_sub(profiled.len());
            if need == 0 || round >= self.config.max_backfill_rounds {
                break;
            }
            round += 1;
            batch = match designer.backfill(need) {
                Ok(b) => b,
                Err(e) => {
                    warn!(error = %e, need, "Backfill unavailable, report will be short");
                    break;
                }
            };
        }
        (profiled, dropped)
    }

    async fn score_all(
        &self,
        query: &MutationQuery,
        scout: &ScoutReport,
        profiled: Vec<(Candidate, BiochemicalProfile)>,
        k: usize,
    ) -> Vec<ScoredCandidate> {
        let linker = self.config.linker_config();
        let weights = &self.config.weights;
        let literature = &scout.related_literature;
        let experiments = &scout.related_experiments;
        let linker = &linker;
        stream::iter(profiled)
            .map(move |(candidate, profile)| async move {
                let evidence = link_evidence(&candidate, query, literature, experiments, linker);
                score_candidate(candidate, profile, evidence, weights)
            })
            .buffer_unordered(self.config.parallelism_for(k))
            .collect()
            .await
    }

    /// Best-effort write of scored candidates; every failure is logged only.
    async fn persist(&self, ranked: &[ScoredCandidate]) {
        let limit = self.config.request_timeout();
        match timeout(limit, self.store.create_collection(SCORED_CANDIDATES, self.embedder.dim())).await {
            Ok(Ok(())) => {}
            Ok(Err(e)) => {
                warn!(error = %e, "Scored candidates not persisted");
                return;
            }
            Err(_) => {
                warn!(timeout_ms = limit.as_millis() as u64, "Scored candidates not persisted: store timed out");
                return;
            }
        }

        let texts: Vec<String> = ranked.iter().map(|c| c.embedding_text()).collect();
        let embeddings = match timeout(limit, self.embedder.embed(&texts)).await {
            Ok(Ok(e)) => e,
            Ok(Err(e)) => {
                warn!(error = %e, "Scored candidates not persisted: embedding failed");
                return;
            }
            Err(_) => {
                warn!("Scored candidates not persisted: embedding timed out");
                return;
            }
        };

        let collection = TypedCollection::<ScoredCandidate>::new(self.store.clone());
        let mut written = 0usize;
        for (candidate, embedding) in ranked.iter().zip(embeddings) {
            match timeout(limit, collection.upsert(candidate, embedding)).await {
                Ok(Ok(())) => written += 1,
                Ok(Err(e)) => warn!(candidate_id = %candidate.candidate_id(), error = %e, "Persist failed"),
                Err(_) => warn!(candidate_id = %candidate.candidate_id(), "Persist timed out"),
            }
        }
        debug!(written, total = ranked.len(), "Scored candidates persisted");
    }
}

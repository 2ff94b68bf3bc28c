//! Similarity scout.
//!
//! Embeds the query once, searches analog mutations, then runs three
//! searches concurrently: literature mentioning the mutation, antibody
//! templates, and experiments recorded against the query mutation or a
//! retrieved analog at the same site. A failing search is replaced by an
//! empty list and recorded in `retrieval_errors`; the scout itself never fails.

use std::sync::Arc;
use std::time::Duration;

use resistaid_common::confidence::{clamp_unit, mean};
use resistaid_common::{EvidenceFound, MutationQuery, ResistaidError, RetrievedRecord};
use resistaid_db::{
    PayloadFilter, VectorStore, ANTIBODY_SEQUENCES, EXPERIMENTS, LITERATURE, MUTATION_PROFILES,
};
use resistaid_embed::Embedder;
use serde::{Deserialize, Serialize};
use tokio::time::timeout;
use tracing::{debug, instrument, warn};

use crate::config::PipelineConfig;

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ScoutReport {
    pub analog_mutations: Vec<RetrievedRecord>,
    pub related_literature: Vec<RetrievedRecord>,
    pub antibody_templates: Vec<RetrievedRecord>,
    pub related_experiments: Vec<RetrievedRecord>,
    pub retrieval_errors: Vec<String>,
}

impl ScoutReport {
    pub fn is_degraded(&self) -> bool {
        !self.retrieval_errors.is_empty()
    }

    /// 0.6 · mean literature similarity + 0.4 · mean analog similarity,
    /// boosted by 10% when both are present. 0 when nothing was retrieved.
    pub fn evidence_score(&self) -> f64 {
        let lit: Vec<f64> = self.related_literature.iter().map(|r| r.similarity_score).collect();
        let mutations: Vec<f64> = self.analog_mutations.iter().map(|r| r.similarity_score).collect();
        let mut score = 0.6 * mean(&lit) + 0.4 * mean(&mutations);
        if !lit.is_empty() && !mutations.is_empty() {
            score *= 1.1;
        }
        clamp_unit(score)
    }

    pub fn evidence_found(&self) -> EvidenceFound {
        EvidenceFound {
            relevant_papers: self.related_literature.len(),
            evidence_score: self.evidence_score(),
            similar_mutations: self.analog_mutations.len(),
            related_experiments: self.related_experiments.len(),
            degraded: self.is_degraded(),
            retrieval_errors: self.retrieval_errors.clone(),
        }
    }
}

pub struct SimilarityScout {
    store: Arc<dyn VectorStore>,
    embedder: Arc<dyn Embedder>,
    analog_top_k: usize,
    literature_top_k: usize,
    antibody_top_k: usize,
    experiment_top_k: usize,
    request_timeout: Duration,
}

impl SimilarityScout {
    pub fn new(store: Arc<dyn VectorStore>, embedder: Arc<dyn Embedder>, config: &PipelineConfig) -> Self {
        Self {
            store,
            embedder,
            analog_top_k: config.analog_top_k,
            literature_top_k: config.literature_top_k,
            antibody_top_k: config.antibody_top_k,
            experiment_top_k: config.experiment_top_k,
            request_timeout: config.request_timeout(),
        }
    }

    #[instrument(skip(self, query), fields(mutation = %query.mutation_id))]
    pub async fn scout(&self, query: &MutationQuery) -> ScoutReport {
        let mut report = ScoutReport::default();

        let embedding = match self.embed(query).await {
            Ok(e) => e,
            Err(e) => {
                warn!(error = %e, "Query embedding failed, retrieval skipped");
                report.retrieval_errors.push(format!("embedding: {e}"));
                return report;
            }
        };

        let analogs = self.search(MUTATION_PROFILES, &embedding, self.analog_top_k, None).await;
        let analogs = degrade(MUTATION_PROFILES, analogs, &mut report.retrieval_errors);

        let literature_filter = PayloadFilter::field("mutation_mentions", query.mutation_id.as_str());
        let experiment_filter = PayloadFilter::any_of("mutation_context", experiment_contexts(query, &analogs));
        let (literature, templates, experiments) = tokio::join!(
            self.search(LITERATURE, &embedding, self.literature_top_k, Some(&literature_filter)),
            self.search(ANTIBODY_SEQUENCES, &embedding, self.antibody_top_k, None),
            self.search(EXPERIMENTS, &embedding, self.experiment_top_k, Some(&experiment_filter)),
        );

        let errors = &mut report.retrieval_errors;
        report.analog_mutations = analogs;
        report.related_literature = degrade(LITERATURE, literature, errors);
        report.antibody_templates = degrade(ANTIBODY_SEQUENCES, templates, errors);
        report.related_experiments = degrade(EXPERIMENTS, experiments, errors);

        debug!(
            analogs = report.analog_mutations.len(),
            papers = report.related_literature.len(),
            templates = report.antibody_templates.len(),
            experiments = report.related_experiments.len(),
            errors = report.retrieval_errors.len(),
            "Scout complete"
        );
        report
    }

    async fn embed(&self, query: &MutationQuery) -> Result<Vec<f32>, ResistaidError> {
        match timeout(self.request_timeout, self.embedder.embed_one(&query.embedding_text())).await {
            Ok(Ok(v)) => Ok(v),
            Ok(Err(e)) => Err(e.into()),
            Err(_) => Err(ResistaidError::timeout("embedding", self.request_timeout)),
        }
    }

    async fn search(
        &self,
        collection: &str,
        embedding: &[f32],
        top_k: usize,
        filter: Option<&PayloadFilter>,
    ) -> Result<Vec<RetrievedRecord>, ResistaidError> {
        if top_k == 0 {
            return Ok(Vec::new());
        }
        match timeout(self.request_timeout, self.store.search(collection, embedding, top_k, filter)).await {
            Ok(Ok(v)) => Ok(v),
            Ok(Err(e)) => Err(e.into()),
            Err(_) => Err(ResistaidError::timeout(format!("search {collection}"), self.request_timeout)),
        }
    }
}

/// Mutation contexts whose experiments count as evidence: the query itself
/// and retrieved analogs at the same residue site.
pub fn experiment_contexts(query: &MutationQuery, analogs: &[RetrievedRecord]) -> Vec<String> {
    let mut contexts = vec![query.mutation_id.clone()];
    for analog in analogs {
        let id = analog
            .payload
            .get("mutation_id")
            .and_then(|v| v.as_str())
            .unwrap_or(&analog.record_id);
        if query.is_related(id) && !contexts.iter().any(|c| c == id) {
            contexts.push(id.to_string());
        }
    }
    contexts
}

fn degrade(
    collection: &str,
    result: Result<Vec<RetrievedRecord>, ResistaidError>,
    errors: &mut Vec<String>,
) -> Vec<RetrievedRecord> {
    match result {
        Ok(v) => v,
        Err(e) => {
            warn!(collection, kind = e.kind(), error = %e, "Retrieval degraded to empty result");
            errors.push(format!("{collection}: {e}"));
            Vec::new()
        }
    }
}

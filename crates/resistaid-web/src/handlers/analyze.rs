//! Analysis endpoints: run the pipeline, invalidate cached reports.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::Json;
use resistaid_common::MutationQuery;
use resistaid_pipeline::AnalyzeOptions;
use serde::Deserialize;

use crate::error::ApiError;
use crate::state::SharedState;

#[derive(Debug, Deserialize)]
pub struct AnalyzeRequest {
    pub mutation_id: String,
    #[serde(default)]
    pub num_candidates: Option<usize>,
    #[serde(default)]
    pub force_refresh: bool,
    #[serde(default)]
    pub domain: Option<String>,
}

impl AnalyzeRequest {
    fn query(&self) -> MutationQuery {
        let mut query = MutationQuery::new(&self.mutation_id);
        if let Some(k) = self.num_candidates {
            query = query.with_num_candidates(k);
        }
        if let Some(ref d) = self.domain {
            query = query.with_domain(d.clone());
        }
        query
    }
}

/// POST /analyze - Run (or serve from cache) an analysis for one mutation
pub async fn analyze(
    State(state): State<SharedState>,
    Json(req): Json<AnalyzeRequest>,
) -> Result<Response, ApiError> {
    let options = AnalyzeOptions { force_refresh: req.force_refresh, ..Default::default() };
    let report = state.orchestrator.analyze_with(req.query(), options).await?;
    Ok(Json(report.as_ref()).into_response())
}

/// DELETE /analyze/{mutation_id} - Drop cached reports for a mutation
pub async fn invalidate(
    State(state): State<SharedState>,
    Path(mutation_id): Path<String>,
) -> StatusCode {
    state.orchestrator.invalidate(&mutation_id);
    StatusCode::NO_CONTENT
}

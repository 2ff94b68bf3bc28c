//! Persisted scored candidates.

use axum::extract::{Query, State};
use axum::Json;
use resistaid_common::ScoredCandidate;
use resistaid_db::TypedCollection;

use crate::error::ApiError;
use crate::handlers::catalog::ListFilter;
use crate::state::SharedState;

/// GET /results?candidate_id= - Scored candidates from earlier runs
pub async fn results(
    State(state): State<SharedState>,
    Query(filter): Query<ListFilter>,
) -> Result<Json<Vec<ScoredCandidate>>, ApiError> {
    let rows: Vec<ScoredCandidate> =
        TypedCollection::new(state.store.clone()).list(filter.limit()).await?;
    let rows = match filter.candidate_id.as_deref() {
        Some(id) => rows.into_iter().filter(|c| c.candidate_id() == id).collect(),
        None => rows,
    };
    Ok(Json(rows))
}

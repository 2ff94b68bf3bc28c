//! Read-only catalog listings.

use axum::extract::{Query, State};
use axum::Json;
use resistaid_db::{
    ExperimentRecord, ImageRecord, LabNote, LiteratureRecord, MutationProfile, ProtocolRecord,
    TypedCollection,
};
use serde::Deserialize;

use crate::error::ApiError;
use crate::state::SharedState;

/// Default page size for list endpoints.
pub const DEFAULT_LIMIT: usize = 500;
pub const MAX_LIMIT: usize = 5_000;

#[derive(Debug, Default, Deserialize)]
pub struct ListFilter {
    pub limit: Option<usize>,
    pub candidate_id: Option<String>,
}

impl ListFilter {
    pub fn limit(&self) -> usize {
        self.limit.unwrap_or(DEFAULT_LIMIT).min(MAX_LIMIT)
    }
}

/// GET /mutations - Known mutation ids
pub async fn mutations(
    State(state): State<SharedState>,
    Query(filter): Query<ListFilter>,
) -> Result<Json<Vec<String>>, ApiError> {
    let rows = TypedCollection::<MutationProfile>::new(state.store.clone())
        .list(filter.limit())
        .await?;
    Ok(Json(rows.into_iter().map(|m| m.mutation_id).collect()))
}

/// GET /literature
pub async fn literature(
    State(state): State<SharedState>,
    Query(filter): Query<ListFilter>,
) -> Result<Json<Vec<LiteratureRecord>>, ApiError> {
    let rows = TypedCollection::<LiteratureRecord>::new(state.store.clone()).list(filter.limit()).await?;
    Ok(Json(rows))
}

/// GET /experiments
pub async fn experiments(
    State(state): State<SharedState>,
    Query(filter): Query<ListFilter>,
) -> Result<Json<Vec<ExperimentRecord>>, ApiError> {
    let rows = TypedCollection::<ExperimentRecord>::new(state.store.clone()).list(filter.limit()).await?;
    Ok(Json(rows))
}

/// GET /protocols
pub async fn protocols(
    State(state): State<SharedState>,
    Query(filter): Query<ListFilter>,
) -> Result<Json<Vec<ProtocolRecord>>, ApiError> {
    let rows = TypedCollection::<ProtocolRecord>::new(state.store.clone()).list(filter.limit()).await?;
    Ok(Json(rows))
}

/// GET /lab-notes
pub async fn lab_notes(
    State(state): State<SharedState>,
    Query(filter): Query<ListFilter>,
) -> Result<Json<Vec<LabNote>>, ApiError> {
    let rows = TypedCollection::<LabNote>::new(state.store.clone()).list(filter.limit()).await?;
    Ok(Json(rows))
}

/// GET /images?candidate_id= - Images, optionally only those attached to one candidate
pub async fn images(
    State(state): State<SharedState>,
    Query(filter): Query<ListFilter>,
) -> Result<Json<Vec<ImageRecord>>, ApiError> {
    let rows: Vec<ImageRecord> = TypedCollection::new(state.store.clone()).list(filter.limit()).await?;
    let rows = match filter.candidate_id.as_deref() {
        Some(id) => rows.into_iter().filter(|r| r.candidate_id.as_deref() == Some(id)).collect(),
        None => rows,
    };
    Ok(Json(rows))
}

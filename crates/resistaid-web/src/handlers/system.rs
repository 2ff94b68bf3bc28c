//! Health and collection statistics.

use std::collections::BTreeMap;

use axum::extract::State;
use axum::Json;
use resistaid_db::{DbError, ALL_COLLECTIONS};
use serde::Serialize;
use tracing::warn;

use crate::error::ApiError;
use crate::state::SharedState;

#[derive(Debug, Serialize)]
pub struct Health {
    pub status: &'static str,
    pub embedder: String,
    pub uptime_secs: i64,
}

#[derive(Debug, Serialize)]
pub struct Stats {
    pub collections: BTreeMap<String, u64>,
    pub cached_reports: usize,
}

/// GET /health - Liveness plus a store round-trip
pub async fn health(State(state): State<SharedState>) -> Json<Health> {
    let status = match state.store.collections().await {
        Ok(_) => "ok",
        Err(e) => {
            warn!(error = %e, "Health check: store unreachable");
            "degraded"
        }
    };
    Json(Health {
        status,
        embedder: state.embedder_name.clone(),
        uptime_secs: (chrono::Utc::now() - state.started_at).num_seconds(),
    })
}

/// GET /stats - Record count per collection
pub async fn stats(State(state): State<SharedState>) -> Result<Json<Stats>, ApiError> {
    let mut collections = BTreeMap::new();
    for name in ALL_COLLECTIONS {
        match state.store.count(name).await {
            Ok(n) => {
                collections.insert(name.to_string(), n);
            }
            Err(DbError::CollectionNotFound(_)) => {}
            Err(e) => return Err(e.into()),
        }
    }
    Ok(Json(Stats { collections, cached_reports: state.orchestrator.cache().len() }))
}

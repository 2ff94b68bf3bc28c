//! Axum router: URL paths to handlers.

use std::sync::Arc;

use axum::{
    routing::{delete, get, post},
    Router,
};
use tower_http::{compression::CompressionLayer, cors::CorsLayer, trace::TraceLayer};

use crate::handlers::{
    analyze::{analyze, invalidate},
    catalog::{experiments, images, lab_notes, literature, mutations, protocols},
    results::results,
    system::{health, stats},
};
use crate::state::{AppState, SharedState};

/// Build and return the full Axum router.
pub fn build_router(state: AppState) -> Router {
    let shared: SharedState = Arc::new(state);

    Router::new()
        // Pipeline
        .route("/analyze",               post(analyze))
        .route("/analyze/{mutation_id}", delete(invalidate))

        // Catalog
        .route("/mutations",   get(mutations))
        .route("/literature",  get(literature))
        .route("/experiments", get(experiments))
        .route("/protocols",   get(protocols))
        .route("/lab-notes",   get(lab_notes))
        .route("/images",      get(images))
        .route("/results",     get(results))

        // System
        .route("/stats",  get(stats))
        .route("/health", get(health))

        // Middleware
        .layer(CorsLayer::permissive())
        .layer(CompressionLayer::new())
        .layer(TraceLayer::new_for_http())
        .with_state(shared)
}

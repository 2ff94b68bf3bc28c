//! resistaid-web: HTTP API for ResistAID
//! Provides:
//!   - Mutation analysis (ranked antibody candidates) with cache invalidation
//!   - Catalog listings (mutations, literature, experiments, protocols, lab notes, images)
//!   - Persisted candidate results
//!   - Health and collection statistics

pub mod config;
pub mod error;
pub mod handlers;
pub mod router;
pub mod state;

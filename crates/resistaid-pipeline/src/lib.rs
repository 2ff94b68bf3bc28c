//! resistaid-pipeline: Retrieval, orchestration and report caching.
//!
//! [`Orchestrator::analyze`] runs one mutation through the scout, designer,
//! profiler and scorer and returns a ranked [`AnalysisReport`]. Reports are
//! cached per (mutation_id, K) until invalidated.
//!
//! [`AnalysisReport`]: resistaid_common::AnalysisReport

pub mod cache;
pub mod cancel;
pub mod clinical;
pub mod config;
pub mod ingest;
pub mod orchestrator;
pub mod report;
pub mod scout;
pub mod stage;

pub use cache::ReportCache;
pub use cancel::Cancellation;
pub use clinical::clinical_context;
pub use config::PipelineConfig;
pub use ingest::{index_catalog, Catalog};
pub use orchestrator::{AnalyzeOptions, Orchestrator};
pub use scout::{ScoutReport, SimilarityScout};
pub use stage::{RunStage, RunState};

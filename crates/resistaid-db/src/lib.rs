//! ResistAID vector store gateway
//!
//! Typed read/write access to the named collections the pipeline retrieves
//! from (mutation profiles, antibody sequences, literature abstracts, lab
//! records) and persists into (scored candidates). Every record is an
//! embedding vector plus a JSON payload.
//!
//! # Backends
//!
//! - [`MemoryStore`]: in-process, brute-force cosine search
//! - `LanceStore` (feature `lance`): embedded LanceDB tables
//!
//! # Example
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use resistaid_db::{initialize, MemoryStore, VectorStore, EMBEDDING_DIM};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let store: Arc<dyn VectorStore> = Arc::new(MemoryStore::new());
//!     initialize(store.as_ref(), EMBEDDING_DIM).await?;
//!     Ok(())
//! }
//! ```

pub mod collection;
pub mod error;
pub mod memory;
pub mod schema;
pub mod store;

#[cfg(feature = "lance")]
pub mod lance;

pub use collection::{initialize, TypedCollection};
pub use error::{DbError, Result};
pub use memory::MemoryStore;
pub use schema::{
    AntibodyTemplate, CollectionRecord, ExperimentRecord, ImageRecord, LabNote, LiteratureRecord,
    MutationProfile, ProtocolRecord, ALL_COLLECTIONS, ANTIBODY_SEQUENCES, EMBEDDING_DIM,
    EXPERIMENTS, IMAGES, LAB_NOTES, LITERATURE, MUTATION_PROFILES, PROTOCOLS, SCORED_CANDIDATES,
};
pub use store::{FieldCondition, PayloadFilter, StoredRecord, VectorStore};

#[cfg(feature = "lance")]
pub use lance::LanceStore;

//! Shared testing utilities for the ResistAID workspace.
//!
//! - [`fixtures`]: a small synthetic HER2 catalog (mutations, antibodies,
//!   literature, lab records)
//! - [`stores`]: a seeded in-memory store plus failing and slow store wrappers

pub mod fixtures;
pub mod stores;

pub use stores::{seeded_store, FailingStore, SlowStore, TEST_DIM};

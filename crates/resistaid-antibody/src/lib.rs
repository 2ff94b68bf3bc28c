//! resistaid-antibody: VH candidate design and biochemical profiling.
//!
//! The designer turns analog mutations and antibody templates into a fixed
//! number of heavy-chain candidates. The profiler computes sequence
//! descriptors (pI, GRAVY, instability index, aromaticity) and flags
//! manufacturing risks.

pub mod codon;
pub mod designer;
pub mod error;
pub mod profiler;
pub mod residues;
pub mod risks;
pub mod templates;

pub use designer::{fix_patterns, AntibodyDesigner, DesignerConfig};
pub use error::{DesignError, ProfileError};
pub use profiler::profile;
pub use templates::{default_framework_pool, Framework};

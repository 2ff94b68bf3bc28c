//! resistaid-ranker: Candidate scoring and ranking.
//!
//! Links each designed candidate to retrieved literature and experiments,
//! scores manufacturing feasibility from its biochemical profile and
//! scientific support from its linked evidence, then ranks.

pub mod evidence;
pub mod feasibility;
pub mod scorer;
pub mod support;
pub mod weights;

pub use evidence::{link_evidence, LinkerConfig};
pub use feasibility::feasibility_score;
pub use scorer::{rank_candidates, score_candidate};
pub use support::scientific_support_score;
pub use weights::ScoreWeights;

//! Combined candidate score and ranking.

use std::cmp::Ordering;

use resistaid_common::confidence::clamp_unit;
use resistaid_common::{BiochemicalProfile, Candidate, EvidenceBundle, FeasibilityCategory, ScoredCandidate};

use crate::feasibility::feasibility_score;
use crate::support::scientific_support_score;
use crate::weights::ScoreWeights;

/// Score one profiled candidate with its linked evidence.
///
/// combined = w1·feasibility + w2·support, with `weights` summing to 1.
pub fn score_candidate(
    candidate: Candidate,
    profile: BiochemicalProfile,
    evidence: EvidenceBundle,
    weights: &ScoreWeights,
) -> ScoredCandidate {
    let feasibility = feasibility_score(&profile);
    let support = scientific_support_score(&evidence);
    let combined = clamp_unit(weights.combine(feasibility, support));
    ScoredCandidate {
        candidate,
        profile,
        evidence,
        feasibility_score: feasibility,
        scientific_support_score: support,
        combined_score: combined,
        feasibility_category: FeasibilityCategory::from_score(feasibility),
    }
}

/// combined_score desc, then feasibility_score desc, then candidate_id asc.
pub fn compare_ranked(a: &ScoredCandidate, b: &ScoredCandidate) -> Ordering {
    b.combined_score
        .partial_cmp(&a.combined_score)
        .unwrap_or(Ordering::Equal)
        .then_with(|| {
            b.feasibility_score
                .partial_cmp(&a.feasibility_score)
                .unwrap_or(Ordering::Equal)
        })
        .then_with(|| a.candidate_id().cmp(b.candidate_id()))
}

pub fn rank_candidates(mut scored: Vec<ScoredCandidate>) -> Vec<ScoredCandidate> {
    scored.sort_by(compare_ranked);
    scored
}

#[cfg(test)]
mod tests {
    use super::*;
    use resistaid_common::{BiochemicalProperties, LinkedReference};

    fn candidate(id: &str) -> Candidate {
        Candidate {
            candidate_id: id.into(),
            cdr3: "ARDY".into(),
            framework: "VH3-23".into(),
            length: 4,
            biological_source: None,
            sequence: "ARDY".into(),
            genetic_code: None,
        }
    }

    fn profile(ii: f64, risks: usize) -> BiochemicalProfile {
        BiochemicalProfile {
            properties: BiochemicalProperties {
                isoelectric_point: 7.0,
                gravy: -0.2,
                instability_index: ii,
                aromaticity: 0.05,
                molecular_weight: 0.0,
                net_charge_ph7: 0.0,
            },
            manufacturing_risks: vec!["r".into(); risks],
        }
    }

    fn evidence(n: usize) -> EvidenceBundle {
        let mut b = EvidenceBundle::default();
        for i in 0..n {
            b.push(
                format!("s{i}"),
                LinkedReference {
                    citation_id: format!("{i}"),
                    source_collection: "literature_abstracts".into(),
                    similarity_score: 0.8,
                    relevance: 0.8,
                },
            );
        }
        b
    }

    #[test]
    fn test_combined_is_weighted_sum() {
        let w = ScoreWeights::new(0.7, 0.3);
        let s = score_candidate(candidate("a"), profile(45.0, 1), evidence(2), &w);
        let expected = 0.7 * s.feasibility_score + 0.3 * s.scientific_support_score;
        assert!((s.combined_score - expected).abs() < 1e-6);
        for v in [s.feasibility_score, s.scientific_support_score, s.combined_score] {
            assert!((0.0..=1.0).contains(&v));
        }
        assert_eq!(s.feasibility_category, FeasibilityCategory::from_score(s.feasibility_score));
    }

    #[test]
    fn test_rank_tie_breaks() {
        let w = ScoreWeights::default();
        let a = score_candidate(candidate("b"), profile(20.0, 0), evidence(0), &w);
        let b = score_candidate(candidate("a"), profile(20.0, 0), evidence(0), &w);
        let c = score_candidate(candidate("c"), profile(20.0, 0), evidence(3), &w);
        let ranked = rank_candidates(vec![a, b, c]);
        let ids: Vec<_> = ranked.iter().map(|s| s.candidate_id().to_string()).collect();
        assert_eq!(ids, vec!["c", "a", "b"]);
    }

    #[test]
    fn test_feasibility_breaks_combined_ties() {
        // Same combined score, different feasibility.
        let w = ScoreWeights::default();
        let mut hi = score_candidate(candidate("z"), profile(20.0, 0), evidence(0), &w);
        let mut lo = score_candidate(candidate("a"), profile(20.0, 0), evidence(0), &w);
        hi.combined_score = 0.5;
        lo.combined_score = 0.5;
        lo.feasibility_score = 0.4;
        let ranked = rank_candidates(vec![lo, hi]);
        assert_eq!(ranked[0].candidate_id(), "z");
    }
}

//! Scientific support from linked evidence.

use resistaid_common::confidence::aggregate_confidence;
use resistaid_common::EvidenceBundle;

/// Strength contributed by a reference with similarity 1.0.
pub const REFERENCE_STRENGTH: f64 = 0.45;

/// Noisy-OR over `REFERENCE_STRENGTH × similarity` per linked reference.
/// Five strong references reach ~0.95; no references gives 0.
pub fn scientific_support_score(bundle: &EvidenceBundle) -> f64 {
    let strengths: Vec<f64> = bundle
        .references
        .iter()
        .map(|r| REFERENCE_STRENGTH * r.similarity_score)
        .collect();
    aggregate_confidence(&strengths)
}

#[cfg(test)]
mod tests {
    use super::*;
    use resistaid_common::LinkedReference;

    fn bundle(sims: &[f64]) -> EvidenceBundle {
        let mut b = EvidenceBundle::default();
        for (i, &s) in sims.iter().enumerate() {
            b.push(
                format!("statement {i}"),
                LinkedReference {
                    citation_id: format!("PMID{i}"),
                    source_collection: "literature_abstracts".into(),
                    similarity_score: s,
                    relevance: s,
                },
            );
        }
        b
    }

    #[test]
    fn test_no_evidence_is_zero() {
        assert_eq!(scientific_support_score(&EvidenceBundle::default()), 0.0);
    }

    #[test]
    fn test_saturates_with_strong_references() {
        let one = scientific_support_score(&bundle(&[1.0]));
        let five = scientific_support_score(&bundle(&[1.0; 5]));
        assert!((one - 0.45).abs() < 1e-12);
        assert!(five > 0.94 && five < 0.96, "five {five}");
        assert!(scientific_support_score(&bundle(&[1.0; 20])) <= 1.0);
    }

    #[test]
    fn test_monotonic_in_references() {
        let a = scientific_support_score(&bundle(&[0.6, 0.5]));
        let b = scientific_support_score(&bundle(&[0.6, 0.5, 0.2]));
        assert!(b > a);
    }
}

//! Designer output fed straight into the profiler.

use std::collections::HashSet;

use pretty_assertions::assert_eq;
use resistaid_antibody::templates::{FR2, FR3, FR4};
use resistaid_antibody::{profile, AntibodyDesigner, DesignerConfig};
use resistaid_common::{MutationQuery, RetrievedRecord};
use serde_json::json;

const TRASTUZUMAB_VH: &str = "EVQLVESGGGLVQPGGSLRLSCAASGFNIKDTYIHWVRQAPGKGLEWVARIYPTNGYTRYADSVKGRFTISADTSKNTAYLQMNSLRAEDTAVYYCSRWGGDGFYAMDYWGQGTLVTVSS";

fn record(collection: &str, id: &str, payload: serde_json::Value, sim: f64) -> RetrievedRecord {
    RetrievedRecord {
        source_collection: collection.to_string(),
        record_id: id.to_string(),
        payload,
        similarity_score: sim,
    }
}

fn analogs() -> Vec<RetrievedRecord> {
    vec![
        record("mutation_profiles", "L755P", json!({"mutation_id": "L755P"}), 0.92),
        record("mutation_profiles", "T798I", json!({"mutation_id": "T798I"}), 0.61),
        record("mutation_profiles", "V842I", json!({"mutation_id": "V842I"}), 0.45),
    ]
}

fn templates() -> Vec<RetrievedRecord> {
    vec![
        record(
            "antibody_sequences",
            "AB-TRAS",
            json!({
                "antibody_id": "AB-TRAS",
                "name": "Trastuzumab",
                "sequence": TRASTUZUMAB_VH,
                "cdr1": "GFNIKDTYIH",
                "cdr2": "RIYPTNGYTRYADSVKG",
                "cdr3": "SRWGGDGFYAMDY",
                "framework": "VH3-23",
            }),
            0.8,
        ),
        record(
            "antibody_sequences",
            "AB-PERT",
            json!({"antibody_id": "AB-PERT", "name": "Pertuzumab", "cdr3": "ARNLGPSFYFDY", "framework": "VH3-23"}),
            0.7,
        ),
    ]
}

fn designer(k: usize) -> AntibodyDesigner {
    let config = DesignerConfig { num_candidates: k, ..Default::default() };
    AntibodyDesigner::new(config, &MutationQuery::new("L755S"))
}

#[test]
fn test_every_designed_candidate_profiles() {
    let candidates = designer(6).design(&analogs(), &templates()).unwrap();
    assert_eq!(candidates.len(), 6);

    let ids: HashSet<_> = candidates.iter().map(|c| c.candidate_id.clone()).collect();
    assert_eq!(ids.len(), 6);

    for c in &candidates {
        assert!(c.candidate_id.starts_with("DES-L755S-"));
        assert!(c.sequence.contains(FR2));
        assert!(c.sequence.contains(FR3));
        assert!(c.sequence.ends_with(FR4));
        assert!(c.sequence.contains(&c.cdr3));
        assert_eq!(c.length, c.sequence.len());
        assert_eq!(c.genetic_code.as_deref().map(str::len), Some(3 * c.length));
        assert!(!c.cdr3.contains("NG"));

        let p = profile(&c.sequence).unwrap();
        let props = &p.properties;
        assert!(props.isoelectric_point > 3.0 && props.isoelectric_point < 12.0);
        assert!((0.0..=1.0).contains(&props.aromaticity));
    }
}

#[test]
fn test_same_inputs_same_candidates() {
    let a = designer(5).design(&analogs(), &templates()).unwrap();
    let b = designer(5).design(&analogs(), &templates()).unwrap();
    assert_eq!(a, b);

    let other = AntibodyDesigner::new(DesignerConfig::default(), &MutationQuery::new("T798I"))
        .design(&analogs(), &templates())
        .unwrap();
    assert_ne!(
        a.iter().map(|c| &c.sequence).collect::<Vec<_>>(),
        other.iter().map(|c| &c.sequence).collect::<Vec<_>>()
    );
}

#[test]
fn test_template_candidates_vary_cdr3_only_in_core() {
    let candidates = designer(3).design(&analogs(), &templates()[..1]).unwrap();
    assert_eq!(candidates.len(), 3);
    for c in &candidates {
        let source = c.biological_source.as_deref().unwrap_or_default();
        assert!(source.starts_with("Trastuzumab"), "source {source}");
        assert!(c.sequence.starts_with("EVQLVESGGGLVQPGGSLRLSCAAS"));
        assert_eq!(c.cdr3.len(), "SRWGGDGFYAMDY".len());
        assert!(c.cdr3.starts_with("SR"));
        assert!(c.cdr3.ends_with("DY"));
        assert_ne!(c.cdr3, "SRWGGDGFYAMDY");
    }
}

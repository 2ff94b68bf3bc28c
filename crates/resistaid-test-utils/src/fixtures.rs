//! Synthetic HER2 resistance catalog.
//!
//! Identifiers are test values; PMIDs are in the 9000xxxx range and do not
//! refer to real articles.

use resistaid_db::{
    AntibodyTemplate, ExperimentRecord, ImageRecord, LabNote, LiteratureRecord, MutationProfile,
    ProtocolRecord,
};
use serde_json::json;

/// Trastuzumab heavy-chain variable domain.
pub const TRASTUZUMAB_VH: &str = "EVQLVESGGGLVQPGGSLRLSCAASGFNIKDTYIHWVRQAPGKGLEWVARIYPTNGYTRYADSVKGRFTISADTSKNTAYLQMNSLRAEDTAVYYCSRWGGDGFYAMDYWGQGTLVTVSS";

fn mutation(id: &str, position: u32, kind: &str, significance: &str, description: &str, refs: &[&str]) -> MutationProfile {
    MutationProfile {
        mutation_id: id.to_string(),
        gene: "ERBB2".to_string(),
        amino_acid_change: Some(format!("p.{id}")),
        protein_position: Some(position),
        mutation_type: Some(kind.to_string()),
        clinical_significance: Some(significance.to_string()),
        domain: Some("kinase domain".to_string()),
        description: Some(description.to_string()),
        pubmed_refs: refs.iter().map(|s| s.to_string()).collect(),
    }
}

pub fn mutation_profiles() -> Vec<MutationProfile> {
    vec![
        mutation("L755S", 755, "missense", "resistance", "Kinase-domain hotspot conferring lapatinib resistance", &["90000001", "90000002"]),
        mutation("L755P", 755, "missense", "resistance", "Kinase-domain substitution at the L755 hotspot", &["90000002"]),
        mutation("T798I", 798, "missense", "resistance", "Gatekeeper substitution reducing inhibitor binding", &["90000003"]),
        mutation("D769H", 769, "missense", "activating", "Activating substitution in the kinase domain", &["90000004"]),
        mutation("D769Y", 769, "missense", "activating", "Activating substitution at D769", &[]),
        mutation("V777L", 777, "missense", "activating", "Activating kinase-domain mutation with neratinib sensitivity", &["90000005"]),
        mutation("V842I", 842, "missense", "activating", "Activating substitution in the C-lobe", &[]),
        mutation("R678Q", 678, "missense", "uncertain", "Juxtamembrane substitution", &[]),
    ]
}

pub fn antibody_templates() -> Vec<AntibodyTemplate> {
    vec![
        AntibodyTemplate {
            antibody_id: "AB-TRAS".to_string(),
            name: "Trastuzumab".to_string(),
            target: Some("HER2 domain IV".to_string()),
            sequence: Some(TRASTUZUMAB_VH.to_string()),
            cdr1: Some("GFNIKDTYIH".to_string()),
            cdr2: Some("RIYPTNGYTRYADSVKG".to_string()),
            cdr3: "SRWGGDGFYAMDY".to_string(),
            framework: Some("VH3-23".to_string()),
            framework_sequence: None,
            affinity_nm: Some(0.1),
            source: Some("approved therapeutic".to_string()),
            pdb_id: Some("1N8Z".to_string()),
            mutation_context: vec!["L755S".to_string(), "V777L".to_string()],
        },
        AntibodyTemplate {
            antibody_id: "AB-PERT".to_string(),
            name: "Pertuzumab".to_string(),
            target: Some("HER2 domain II".to_string()),
            sequence: None,
            cdr1: Some("GFTFTDYTMD".to_string()),
            cdr2: Some("DVNPNSGGSIYNQRFKG".to_string()),
            cdr3: "ARNLGPSFYFDY".to_string(),
            framework: Some("VH3-23".to_string()),
            framework_sequence: None,
            affinity_nm: Some(0.6),
            source: Some("approved therapeutic".to_string()),
            pdb_id: Some("1S78".to_string()),
            mutation_context: vec!["T798I".to_string()],
        },
        AntibodyTemplate {
            antibody_id: "AB-MARG".to_string(),
            name: "Margetuximab".to_string(),
            target: Some("HER2 domain IV".to_string()),
            sequence: None,
            cdr1: None,
            cdr2: None,
            cdr3: "SRWGGDGFYAMDY".to_string(),
            framework: None,
            framework_sequence: Some("QVQLQESGPGLVKPSETLSLTCTVS".to_string()),
            affinity_nm: Some(0.2),
            source: Some("Fc-engineered variant".to_string()),
            pdb_id: None,
            mutation_context: vec!["D769H".to_string()],
        },
    ]
}

fn paper(pmid: &str, title: &str, abstract_text: &str, mentions: &[&str], year: i32) -> LiteratureRecord {
    LiteratureRecord {
        pmid: pmid.to_string(),
        title: title.to_string(),
        abstract_text: abstract_text.to_string(),
        mutation_mentions: mentions.iter().map(|s| s.to_string()).collect(),
        author: "Test Author".to_string(),
        year: Some(year),
    }
}

pub fn literature() -> Vec<LiteratureRecord> {
    vec![
        paper(
            "90000001",
            "L755S confers lapatinib resistance in HER2-positive breast cancer",
            "HER2 kinase-domain mutations arise under targeted therapy. The L755S substitution reduces lapatinib binding affinity and sustains downstream signalling.",
            &["L755S"],
            2019,
        ),
        paper(
            "90000002",
            "Structural basis of L755 hotspot resistance",
            "Molecular dynamics of L755S and L755P show a shifted alphaC helix. Antibody binding to the extracellular domain is preserved.",
            &["L755S", "L755P"],
            2021,
        ),
        paper(
            "90000003",
            "Gatekeeper T798I in HER2",
            "T798I blocks irreversible inhibitor binding through steric hindrance.",
            &["T798I"],
            2018,
        ),
        paper(
            "90000004",
            "Activating D769H mutations",
            "D769H increases kinase activity and remains sensitive to neratinib.",
            &["D769H"],
            2020,
        ),
        paper(
            "90000005",
            "V777L drives HER2 signalling",
            "V777L enhances dimerisation; trastuzumab binding affinity is unchanged.",
            &["V777L"],
            2022,
        ),
    ]
}

pub fn experiments() -> Vec<ExperimentRecord> {
    vec![
        ExperimentRecord {
            exp_id: "EXP-001".to_string(),
            outcome: "reduced phosphorylation".to_string(),
            notes: "L755S cells treated with trastuzumab variant showed reduced HER2 phosphorylation and tighter binding.".to_string(),
            measurements: json!({"ic50_nm": 12.5, "kd_nm": 0.8}),
            conditions: json!({"cell_line": "BT-474 L755S", "duration_h": 24}),
            mutation_context: Some("L755S".to_string()),
        },
        ExperimentRecord {
            exp_id: "EXP-002".to_string(),
            outcome: "no growth inhibition".to_string(),
            notes: "T798I cells resisted lapatinib at 1 uM".to_string(),
            measurements: json!({"viability_pct": 92}),
            conditions: json!({"cell_line": "SK-BR-3 T798I"}),
            mutation_context: Some("T798I".to_string()),
        },
    ]
}

pub fn protocols() -> Vec<ProtocolRecord> {
    vec![ProtocolRecord {
        protocol_id: "PROT-SPR".to_string(),
        target: "HER2".to_string(),
        name: "SPR affinity measurement".to_string(),
        steps: vec![
            "Immobilise HER2 ECD on a CM5 chip".to_string(),
            "Inject antibody dilution series".to_string(),
            "Fit 1:1 Langmuir model".to_string(),
        ],
        reagents: vec!["CM5 chip".to_string(), "HBS-EP buffer".to_string()],
    }]
}

pub fn lab_notes() -> Vec<LabNote> {
    vec![LabNote {
        note_id: "NOTE-1".to_string(),
        mutation_context: "L755S".to_string(),
        date: "2024-03-14".to_string(),
        text: "Expression titres for VH3-23 variants were acceptable.".to_string(),
        experimenter: "J. Doe".to_string(),
    }]
}

pub fn images() -> Vec<ImageRecord> {
    vec![
        ImageRecord {
            image_id: "IMG-1".to_string(),
            image_type: "western_blot".to_string(),
            description: "pHER2 blot for L755S line".to_string(),
            candidate_id: Some("DES-L755S-001-00000000".to_string()),
            path: "images/img-1.png".to_string(),
        },
        ImageRecord {
            image_id: "IMG-2".to_string(),
            image_type: "structure".to_string(),
            description: "HER2 kinase domain model".to_string(),
            candidate_id: None,
            path: "images/img-2.png".to_string(),
        },
    ]
}

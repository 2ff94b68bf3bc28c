//! Heavy-chain scaffold pieces and residue preferences.

use resistaid_common::MutationCode;
use serde::{Deserialize, Serialize};

/// FR2, FR3 and FR4 are shared across the default pool.
pub const FR2: &str = "WVRQAPGKGLEWV";
pub const FR3: &str = "RFTISADTSKNTAYLQMNSLRAEDTAVYYC";
pub const FR4: &str = "WGQGTLVTVSS";

/// A germline heavy-chain framework with its germline CDR1/CDR2.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Framework {
    pub name: String,
    pub fr1: String,
    pub cdr1: String,
    pub cdr2: String,
}

impl Framework {
    pub fn new(name: &str, fr1: &str, cdr1: &str, cdr2: &str) -> Self {
        Self {
            name: name.to_string(),
            fr1: fr1.to_string(),
            cdr1: cdr1.to_string(),
            cdr2: cdr2.to_string(),
        }
    }
}

/// Germline CDR1/CDR2 used when neither the template nor the pool supplies them.
pub const GERMLINE_CDR1: &str = "GFTFSSYAMS";
pub const GERMLINE_CDR2: &str = "AISGSGGSTYYADSVKG";

/// Default framework pool used for backfill.
pub fn default_framework_pool() -> Vec<Framework> {
    vec![
        Framework::new("VH3-23", "EVQLVESGGGLVQPGGSLRLSCAAS", "GFTFSSYAMS", "AISGSGGSTYYADSVKG"),
        Framework::new("VH1-69", "QVQLVQSGAEVKKPGASVKVSCKAS", "GGTFSSYAIS", "GIIPIFGTANYAQKFQG"),
        Framework::new("VH4-34", "QVQLQESGPGLVKPSETLSLTCTVS", "GGSFSGYYWS", "EINHSGSTNYNPSLKS"),
        Framework::new("VH3-07", "EVQLVESGGGLVQPGKSLRLSCAAS", "GFTFSSYWMS", "NIKQDGSEKYYVDSVKG"),
    ]
}

/// Assemble FR1-CDR1-FR2-CDR2-FR3-CDR3-FR4.
pub fn assemble_vh(fr1: &str, cdr1: &str, cdr2: &str, cdr3: &str) -> String {
    let mut s = String::with_capacity(fr1.len() + cdr1.len() + cdr2.len() + cdr3.len() + 54);
    for part in [fr1, cdr1, FR2, cdr2, FR3, cdr3, FR4] {
        s.push_str(part);
    }
    s
}

/// Residues favoured at paratope positions facing the mutated epitope.
///
/// Known HER2 resistance sites carry curated sets; other substitutions fall
/// back to a rule on the class of the incoming residue.
pub fn preferred_residues(mutation_id: &str, code: Option<MutationCode>) -> &'static [u8] {
    match mutation_id {
        "L755S" => return b"YFWRH",
        "T798I" => return b"DESTQ",
        "D769H" => return b"STNQY",
        "V777L" => return b"YWFHR",
        _ => {}
    }
    match code.map(|c| c.mutant) {
        Some('K' | 'R' | 'H') => b"DESYT",
        Some('D' | 'E') => b"RKHYS",
        Some('A' | 'V' | 'L' | 'I' | 'M' | 'F' | 'W' | 'Y' | 'C') => b"YWFHR",
        Some(_) => b"YFWRH",
        None => b"YSTDR",
    }
}

/// Small flexible residues used at CDR3 edges.
pub const CDR3_EDGE: &[u8] = b"GSAT";

/// Background residues for non-preferred CDR3 positions (no Cys or Asn).
pub const CDR3_BACKGROUND: &[u8] = b"ADEGHKLQRSTVY";

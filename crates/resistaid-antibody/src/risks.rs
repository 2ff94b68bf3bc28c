//! Manufacturing-risk rules.
//!
//! Rules run in a fixed order so the resulting list is stable for a given
//! sequence. Each rule emits at most one string.

use std::collections::HashSet;

use resistaid_common::BiochemicalProperties;

pub const INSTABILITY_THRESHOLD: f64 = 40.0;
pub const PI_RANGE: (f64, f64) = (5.0, 9.0);
pub const GRAVY_RANGE: (f64, f64) = (-1.0, 0.5);
pub const AROMATICITY_THRESHOLD: f64 = 0.15;
pub const CHARGE_DENSITY_THRESHOLD: f64 = 0.25;
pub const HYDROPHOBIC_STRETCH: usize = 5;
/// Expression-friendly length window for a VH/scFv format, inclusive.
pub const LENGTH_RANGE: (usize, usize) = (100, 250);
/// Minimum fraction of distinct dipeptides among all dipeptides.
pub const MIN_COMPLEXITY: f64 = 0.65;

/// X-Pro bonds cleaved by common proteases. Asp-Pro is flagged separately.
pub const PROTEASE_SITES: &[&str] = &["TP", "GP", "AP", "KP", "RP"];

/// Motifs known to cause expression, aggregation or cleavage problems.
pub const PROBLEMATIC_MOTIFS: &[&str] = &["CCC", "WWW", "KKKK", "DDDD", "EEEE", "RRRR", "GPGG", "GPGP"];

const HYDROPHOBIC: &[u8] = b"WFYILV";
const CHARGED: &[u8] = b"DEKRH";

pub fn assess_risks(seq: &[u8], props: &BiochemicalProperties) -> Vec<String> {
    let mut risks = Vec::new();

    if seq.len() < LENGTH_RANGE.0 || seq.len() > LENGTH_RANGE.1 {
        risks.push(format!(
            "Expression risk: length {} outside {}-{} residues",
            seq.len(),
            LENGTH_RANGE.0,
            LENGTH_RANGE.1
        ));
    }

    if props.instability_index > INSTABILITY_THRESHOLD {
        risks.push(format!(
            "High degradation risk: instability index {:.1} exceeds {:.0}",
            props.instability_index, INSTABILITY_THRESHOLD
        ));
    }
    if props.isoelectric_point < PI_RANGE.0 || props.isoelectric_point > PI_RANGE.1 {
        risks.push(format!(
            "Purification risk: extreme isoelectric point (pI {:.2})",
            props.isoelectric_point
        ));
    }
    if props.gravy > GRAVY_RANGE.1 {
        risks.push(format!("Aggregation risk: hydrophobic surface (GRAVY {:.2})", props.gravy));
    } else if props.gravy < GRAVY_RANGE.0 {
        risks.push(format!("Solubility risk: highly hydrophilic (GRAVY {:.2})", props.gravy));
    }
    if props.aromaticity > AROMATICITY_THRESHOLD {
        risks.push(format!(
            "Aggregation risk: high aromatic content ({:.1}%)",
            props.aromaticity * 100.0
        ));
    }

    let text = String::from_utf8_lossy(seq);
    for motif in PROBLEMATIC_MOTIFS {
        if text.contains(motif) {
            risks.push(format!("Problematic motif: {motif}"));
        }
    }

    let sequons = glycosylation_sites(seq);
    if !sequons.is_empty() {
        risks.push(format!("N-glycosylation sequon (N-X-S/T) at {}", positions(&sequons)));
    }
    let deamidation = dipeptide_sites(seq, b'N', b"GS");
    if !deamidation.is_empty() {
        risks.push(format!("Deamidation hotspot (NG/NS) at {}", positions(&deamidation)));
    }
    let isomerization = dipeptide_sites(seq, b'D', b"GS");
    if !isomerization.is_empty() {
        risks.push(format!("Isomerization hotspot (DG/DS) at {}", positions(&isomerization)));
    }
    let acid_labile = dipeptide_sites(seq, b'D', b"P");
    if !acid_labile.is_empty() {
        risks.push(format!("Acid-labile Asp-Pro bond at {}", positions(&acid_labile)));
    }

    let protease: Vec<&str> = PROTEASE_SITES.iter().copied().filter(|site| text.contains(*site)).collect();
    if !protease.is_empty() {
        risks.push(format!("Protease cleavage sites: {}", protease.join(", ")));
    }

    let met = seq.iter().filter(|&&r| r == b'M').count();
    let trp = seq.iter().filter(|&&r| r == b'W').count();
    if met > 3 || trp as f64 / seq.len() as f64 > 0.05 {
        risks.push(format!("Oxidation risk: {met} Met / {trp} Trp residues"));
    }

    let stretch = longest_run(seq, HYDROPHOBIC);
    if stretch >= HYDROPHOBIC_STRETCH {
        risks.push(format!("Aggregation risk: hydrophobic stretch of {stretch} residues"));
    }

    let cys = seq.iter().filter(|&&r| r == b'C').count();
    if cys % 2 == 1 {
        risks.push(format!("Unpaired cysteine ({cys} Cys)"));
    }

    let charged = seq.iter().filter(|r| CHARGED.contains(r)).count() as f64 / seq.len() as f64;
    if charged > CHARGE_DENSITY_THRESHOLD {
        risks.push(format!("High charge density ({:.2})", charged));
    }

    let complexity = sequence_complexity(seq);
    if complexity < MIN_COMPLEXITY {
        risks.push(format!("Low sequence complexity ({complexity:.2}), may express poorly"));
    }

    let head = &seq[..seq.len().min(20)];
    let count = |r: u8| head.iter().filter(|&&x| x == r).count();
    if count(b'L') > 5 && count(b'A') > 3 {
        risks.push("Signal peptide-like N-terminus, may affect secretion".to_string());
    }

    risks
}

/// Distinct dipeptides over all dipeptides; 0 for sequences shorter than 2.
pub fn sequence_complexity(seq: &[u8]) -> f64 {
    if seq.len() < 2 {
        return 0.0;
    }
    let distinct: HashSet<&[u8]> = seq.windows(2).collect();
    distinct.len() as f64 / (seq.len() - 1) as f64
}

/// 1-based positions of `N` in N-X-S/T sequons where X is not proline.
pub fn glycosylation_sites(seq: &[u8]) -> Vec<usize> {
    seq.windows(3)
        .enumerate()
        .filter(|(_, w)| w[0] == b'N' && w[1] != b'P' && (w[2] == b'S' || w[2] == b'T'))
        .map(|(i, _)| i + 1)
        .collect()
}

fn dipeptide_sites(seq: &[u8], first: u8, seconds: &[u8]) -> Vec<usize> {
    seq.windows(2)
        .enumerate()
        .filter(|(_, w)| w[0] == first && seconds.contains(&w[1]))
        .map(|(i, _)| i + 1)
        .collect()
}

fn longest_run(seq: &[u8], set: &[u8]) -> usize {
    let (mut best, mut cur) = (0, 0);
    for r in seq {
        if set.contains(r) {
            cur += 1;
            best = best.max(cur);
        } else {
            cur = 0;
        }
    }
    best
}

fn positions(sites: &[usize]) -> String {
    let label = if sites.len() == 1 { "position" } else { "positions" };
    let list = sites.iter().map(|p| p.to_string()).collect::<Vec<_>>().join(", ");
    format!("{label} {list}")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::profiler::profile;

    fn risks_of(seq: &str) -> Vec<String> {
        profile(seq).unwrap().manufacturing_risks
    }

    #[test]
    fn test_high_instability_flagged() {
        let r = risks_of("ACACACAC");
        assert!(r.iter().any(|s| s.starts_with("High degradation risk")), "{r:?}");
    }

    #[test]
    fn test_extreme_pi_flagged() {
        let r = risks_of("GSKKKKGS");
        assert!(r.iter().any(|s| s.starts_with("Purification risk")), "{r:?}");
        assert!(r.iter().any(|s| s == "Problematic motif: KKKK"), "{r:?}");
    }

    #[test]
    fn test_reference_vh_hotspots() {
        let r = risks_of("EVQLVESGGGLVQPGGSLRLSCAASGFNIKDTYIHWVRQAPGKGLEWVARIYPTNGYTRYADSVKGRFTISADTSKNTAYLQMNSLRAEDTAVYYCSRWGGDGFYAMDYWGQGTLVTVSS");
        assert!(!r.iter().any(|s| s.starts_with("High degradation risk")));
        assert!(!r.iter().any(|s| s.starts_with("Purification risk")));
        assert!(r.iter().any(|s| s.starts_with("Deamidation hotspot")), "{r:?}");
        assert!(r.iter().any(|s| s.starts_with("Isomerization hotspot")), "{r:?}");
        assert!(!r.iter().any(|s| s.starts_with("N-glycosylation")), "{r:?}");
    }

    #[test]
    fn test_sequon_excludes_proline() {
        assert_eq!(glycosylation_sites(b"ANGSANPT"), vec![2]);
        assert_eq!(glycosylation_sites(b"NPS"), Vec::<usize>::new());
    }

    #[test]
    fn test_hydrophobic_stretch_and_cysteine() {
        let r = risks_of("GSIVLFWGSCGS");
        assert!(r.iter().any(|s| s.contains("hydrophobic stretch of 5")), "{r:?}");
        assert!(r.iter().any(|s| s.starts_with("Unpaired cysteine")), "{r:?}");
    }

    const VH: &str = "EVQLVESGGGLVQPGGSLRLSCAASGFNIKDTYIHWVRQAPGKGLEWVARIYPTNGYTRYADSVKGRFTISADTSKNTAYLQMNSLRAEDTAVYYCSRWGGDGFYAMDYWGQGTLVTVSS";

    #[test]
    fn test_length_window() {
        assert!(risks_of("GSGS").iter().any(|s| s.starts_with("Expression risk: length 4")));
        assert!(!risks_of(VH).iter().any(|s| s.starts_with("Expression risk")));
        let long = VH.repeat(3);
        let r = risks_of(&long);
        assert!(r.iter().any(|s| s == "Expression risk: length 360 outside 100-250 residues"), "{r:?}");
    }

    #[test]
    fn test_low_complexity_flagged() {
        assert!((sequence_complexity(b"ABAB") - 2.0 / 3.0).abs() < 1e-12);
        assert_eq!(sequence_complexity(b"A"), 0.0);
        assert!(sequence_complexity(VH.as_bytes()) >= MIN_COMPLEXITY);

        let repetitive = "GS".repeat(60);
        let r = risks_of(&repetitive);
        assert!(r.iter().any(|s| s.starts_with("Low sequence complexity")), "{r:?}");
        assert!(!risks_of(VH).iter().any(|s| s.starts_with("Low sequence complexity")));
    }

    #[test]
    fn test_protease_sites_listed_in_order() {
        let r = risks_of("GSRPGSAPGSKPGS");
        assert!(r.iter().any(|s| s == "Protease cleavage sites: AP, KP, RP"), "{r:?}");
        let r = risks_of("GSTPGSGPGS");
        assert!(r.iter().any(|s| s == "Protease cleavage sites: TP, GP"), "{r:?}");
        assert!(!risks_of("GSQPGS").iter().any(|s| s.starts_with("Protease")));
    }

    #[test]
    fn test_signal_peptide_like_start() {
        let r = risks_of("MKLLALLAALLAVSGSGSGS");
        assert!(r.iter().any(|s| s.starts_with("Signal peptide-like")), "{r:?}");
        assert!(!risks_of(VH).iter().any(|s| s.starts_with("Signal peptide-like")));
    }

    #[test]
    fn test_rule_order_is_stable() {
        let a = risks_of("MMMMDPNGSKKKK");
        let b = risks_of("MMMMDPNGSKKKK");
        assert_eq!(a, b);
        let idx = |p: &str| a.iter().position(|s| s.starts_with(p)).unwrap();
        assert!(idx("Problematic motif") < idx("N-glycosylation"));
        assert!(idx("N-glycosylation") < idx("Oxidation risk"));
    }
}

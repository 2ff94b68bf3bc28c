//! Report aggregation: summary statistics and recommendations.

use std::collections::HashMap;

use resistaid_common::confidence::mean;
use resistaid_common::{EvidenceFound, ReportSummary, ScoredCandidate};

/// Feasibility at or above this marks a candidate ready for synthesis.
pub const SYNTHESIS_READY: f64 = 0.8;

/// Summary over ranked candidates.
pub fn summarise(ranked: &[ScoredCandidate]) -> ReportSummary {
    let feasibility: Vec<f64> = ranked.iter().map(|c| c.feasibility_score).collect();
    let support: Vec<f64> = ranked.iter().map(|c| c.scientific_support_score).collect();
    ReportSummary {
        candidates_generated: ranked.len(),
        average_feasibility: mean(&feasibility),
        average_scientific_support: mean(&support),
        top_score: ranked.first().map(|c| c.combined_score).unwrap_or(0.0),
    }
}

/// Practical next steps for the top of the ranking.
pub fn recommendations(ranked: &[ScoredCandidate], evidence: &EvidenceFound) -> Vec<String> {
    if ranked.is_empty() {
        return vec!["No viable candidates generated; consider a different design approach".to_string()];
    }
    let top = &ranked[..ranked.len().min(3)];
    let mut out = Vec::new();

    if let Some(best) = top.iter().find(|c| c.feasibility_score >= SYNTHESIS_READY) {
        out.push(format!(
            "Prioritize {} for synthesis (feasibility {:.2}, combined score {:.2})",
            best.candidate_id(),
            best.feasibility_score,
            best.combined_score
        ));
    }

    let common = common_risks(&top[..top.len().min(2)], 2);
    if !common.is_empty() {
        out.push(format!("Common issues to address: {}", common.join(", ")));
    }

    if evidence.relevant_papers == 0 || evidence.evidence_score < 0.2 {
        out.push(
            "Little prior evidence for this mutation; treat scores as exploratory and expand the literature catalog"
                .to_string(),
        );
    }
    if evidence.degraded {
        out.push("Some retrievals failed; re-run once the vector store is healthy".to_string());
    }

    out.push("Consider in vitro testing for the top 2-3 candidates".to_string());
    out.push("Validate binding with computational docking before synthesis".to_string());
    out
}

/// Risk labels (text before the first ':' or '(') by frequency, then name.
fn common_risks(candidates: &[ScoredCandidate], limit: usize) -> Vec<String> {
    let mut counts: HashMap<String, usize> = HashMap::new();
    for c in candidates {
        for risk in &c.profile.manufacturing_risks {
            let label = risk.split(&[':', '('][..]).next().unwrap_or(risk).trim().to_string();
            *counts.entry(label).or_default() += 1;
        }
    }
    let mut ranked: Vec<(String, usize)> = counts.into_iter().collect();
    ranked.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(&b.0)));
    ranked.into_iter().take(limit).map(|(label, _)| label).collect()
}

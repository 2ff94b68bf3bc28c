//! Evidence linker.
//!
//! Attaches retrieved literature and experiment records to a candidate as
//! (statement, citation) pairs. A record is linked only when it carries a
//! citation id and reaches `min_similarity`; experiments must also concern
//! the query mutation or a substitution at the same site. Nothing is
//! invented to fill the lists.

use std::cmp::Ordering;
use std::collections::HashSet;

use resistaid_common::confidence::clamp_unit;
use resistaid_common::{Candidate, EvidenceBundle, LinkedReference, MutationQuery, RetrievedRecord};
use resistaid_db::{ExperimentRecord, LiteratureRecord};
use serde::{Deserialize, Serialize};
use tracing::debug;

const GENERIC_TERMS: [&str; 3] = ["binding", "affinity", "resistance"];
const BINDING_TERMS: [&str; 2] = ["bind", "affinity"];

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LinkerConfig {
    #[serde(default = "default_max_statements")]
    pub max_statements: usize,
    #[serde(default = "default_similarity_weight")]
    pub similarity_weight: f64,
    #[serde(default = "default_keyword_weight")]
    pub keyword_weight: f64,
    #[serde(default = "default_min_similarity")]
    pub min_similarity: f64,
}

fn default_max_statements() -> usize { 5 }
fn default_similarity_weight() -> f64 { 0.6 }
fn default_keyword_weight() -> f64 { 0.4 }
fn default_min_similarity() -> f64 { 0.1 }

impl Default for LinkerConfig {
    fn default() -> Self {
        Self {
            max_statements: default_max_statements(),
            similarity_weight: default_similarity_weight(),
            keyword_weight: default_keyword_weight(),
            min_similarity: default_min_similarity(),
        }
    }
}

/// A record that passed the citation check, before ranking.
struct Linkable {
    reference: LinkedReference,
    statement: String,
}

pub fn link_evidence(
    candidate: &Candidate,
    query: &MutationQuery,
    literature: &[RetrievedRecord],
    experiments: &[RetrievedRecord],
    config: &LinkerConfig,
) -> EvidenceBundle {
    let keywords = keywords_for(candidate, query);
    let mutation = query.mutation_id.as_str();
    let mut linked = Vec::new();

    for record in literature.iter().filter(|r| r.similarity_score >= config.min_similarity) {
        let lit = match record.payload_as::<LiteratureRecord>() {
            Ok(l) if !l.pmid.trim().is_empty() => l,
            _ => {
                debug!(record_id = %record.record_id, "Literature record has no PMID, not linked");
                continue;
            }
        };
        let text = format!("{} {}", lit.title, lit.abstract_text);
        let statement = pick_sentence(&lit.abstract_text, mutation).unwrap_or_else(|| {
            format!(
                "{} (PMID {}) provides context for targeting {} with a {} scaffold.",
                lit.title.trim_end_matches('.'),
                lit.pmid.trim(),
                mutation,
                candidate.framework
            )
        });
        linked.push(Linkable {
            reference: reference(lit.pmid.trim(), record, &text, &keywords, config),
            statement,
        });
    }

    for record in experiments.iter().filter(|r| r.similarity_score >= config.min_similarity) {
        let exp = match record.payload_as::<ExperimentRecord>() {
            Ok(e) if !e.exp_id.trim().is_empty() => e,
            _ => {
                debug!(record_id = %record.record_id, "Experiment record has no id, not linked");
                continue;
            }
        };
        match exp.mutation_context.as_deref() {
            Some(ctx) if query.is_related(ctx) => {}
            other => {
                debug!(exp_id = %exp.exp_id, context = ?other, "Experiment concerns another mutation, not linked");
                continue;
            }
        }
        let text = format!("{} {}", exp.outcome, exp.notes);
        let statement = pick_sentence(&exp.notes, mutation).unwrap_or_else(|| {
            format!(
                "Experiment {} reported {} in a {} context.",
                exp.exp_id.trim(),
                exp.outcome.trim_end_matches('.'),
                exp.mutation_context.as_deref().unwrap_or_default()
            )
        });
        linked.push(Linkable {
            reference: reference(exp.exp_id.trim(), record, &text, &keywords, config),
            statement,
        });
    }

    linked.sort_by(|a, b| {
        b.reference
            .relevance
            .partial_cmp(&a.reference.relevance)
            .unwrap_or(Ordering::Equal)
            .then_with(|| a.reference.citation_id.cmp(&b.reference.citation_id))
    });

    let mut seen = HashSet::new();
    let mut bundle = EvidenceBundle::default();
    for l in linked {
        if bundle.len() >= config.max_statements {
            break;
        }
        if seen.insert(l.reference.citation_id.clone()) {
            bundle.push(l.statement, l.reference);
        }
    }
    bundle
}

fn reference(
    citation_id: &str,
    record: &RetrievedRecord,
    text: &str,
    keywords: &[String],
    config: &LinkerConfig,
) -> LinkedReference {
    let similarity = clamp_unit(record.similarity_score);
    let relevance = clamp_unit(
        config.similarity_weight * similarity + config.keyword_weight * keyword_overlap(text, keywords),
    );
    LinkedReference {
        citation_id: citation_id.to_string(),
        source_collection: record.source_collection.clone(),
        similarity_score: similarity,
        relevance,
    }
}

/// Lower-cased terms a relevant record is expected to mention.
pub fn keywords_for(candidate: &Candidate, query: &MutationQuery) -> Vec<String> {
    let mut terms = vec![query.mutation_id.to_lowercase(), candidate.framework.to_lowercase()];
    if let Some(domain) = &query.domain {
        terms.extend(
            domain
                .split(|c: char| !c.is_alphanumeric())
                .filter(|w| w.len() >= 4)
                .map(str::to_lowercase),
        );
    }
    for (residue, name) in [('Y', "tyrosine"), ('W', "tryptophan"), ('F', "phenylalanine")] {
        if candidate.cdr3.contains(residue) {
            terms.push(name.to_string());
        }
    }
    terms.extend(GENERIC_TERMS.iter().map(|t| t.to_string()));
    let mut seen = HashSet::new();
    terms.retain(|t| !t.is_empty() && seen.insert(t.clone()));
    terms
}

/// Fraction of `keywords` found in `text`, case-insensitive.
pub fn keyword_overlap(text: &str, keywords: &[String]) -> f64 {
    if keywords.is_empty() {
        return 0.0;
    }
    let lower = text.to_lowercase();
    let hits = keywords.iter().filter(|k| lower.contains(k.as_str())).count();
    hits as f64 / keywords.len() as f64
}

/// First sentence mentioning the mutation or a binding term.
fn pick_sentence(text: &str, mutation: &str) -> Option<String> {
    let mutation = mutation.to_lowercase();
    text.split(&['.', '!', '?'][..])
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .find(|s| {
            let lower = s.to_lowercase();
            lower.contains(&mutation) || BINDING_TERMS.iter().any(|t| lower.contains(t))
        })
        .map(|s| format!("{s}."))
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn candidate() -> Candidate {
        Candidate {
            candidate_id: "DES-L755S-001-00000000".into(),
            cdr3: "SRWGGDGFYAMDY".into(),
            framework: "VH3-23".into(),
            length: 120,
            biological_source: None,
            sequence: String::new(),
            genetic_code: None,
        }
    }

    fn lit(pmid: &str, abstract_text: &str, sim: f64) -> RetrievedRecord {
        RetrievedRecord {
            source_collection: "literature_abstracts".into(),
            record_id: format!("lit-{pmid}"),
            payload: json!({
                "pmid": pmid,
                "title": "HER2 kinase mutations.",
                "abstract": abstract_text,
                "mutation_mentions": ["L755S"],
            }),
            similarity_score: sim,
        }
    }

    #[test]
    fn test_statement_mentions_mutation() {
        let records = vec![lit(
            "1111",
            "HER2 is amplified in breast cancer. The L755S substitution confers lapatinib resistance. Other text.",
            0.8,
        )];
        let b = link_evidence(&candidate(), &MutationQuery::new("L755S"), &records, &[], &LinkerConfig::default());
        assert_eq!(b.len(), 1);
        assert_eq!(b.evidence_statements[0], "The L755S substitution confers lapatinib resistance.");
        assert_eq!(b.supporting_papers, vec!["1111".to_string()]);
    }

    #[test]
    fn test_fallback_statement_is_templated() {
        let records = vec![lit("2222", "Unrelated cohort description", 0.5)];
        let b = link_evidence(&candidate(), &MutationQuery::new("L755S"), &records, &[], &LinkerConfig::default());
        assert!(b.evidence_statements[0].contains("PMID 2222"));
        assert!(b.evidence_statements[0].contains("VH3-23"));
    }

    #[test]
    fn test_records_without_citation_skipped() {
        let mut missing = lit("", "L755S binding.", 0.9);
        missing.payload["pmid"] = json!("  ");
        let no_field = RetrievedRecord { payload: json!({"title": "x"}), ..lit("3", "", 0.9) };
        let b = link_evidence(
            &candidate(),
            &MutationQuery::new("L755S"),
            &[missing, no_field],
            &[],
            &LinkerConfig::default(),
        );
        assert!(b.is_empty());
        assert_eq!(b.evidence_statements.len(), b.supporting_papers.len());
    }

    #[test]
    fn test_ranked_by_relevance_and_capped() {
        let records: Vec<_> = (0..8)
            .map(|i| lit(&format!("{}", 100 + i), "L755S reduces binding affinity.", 0.1 * i as f64))
            .collect();
        let config = LinkerConfig { max_statements: 3, ..Default::default() };
        let b = link_evidence(&candidate(), &MutationQuery::new("L755S"), &records, &[], &config);
        assert_eq!(b.len(), 3);
        assert_eq!(b.supporting_papers, vec!["107", "106", "105"]);
        assert!(b.references.windows(2).all(|w| w[0].relevance >= w[1].relevance));
    }

    #[test]
    fn test_experiments_linked() {
        let exp = RetrievedRecord {
            source_collection: "experiments".into(),
            record_id: "EXP-7".into(),
            payload: json!({
                "exp_id": "EXP-7",
                "outcome": "reduced phosphorylation",
                "notes": "Cells were treated for 24h",
                "mutation_context": "L755S",
            }),
            similarity_score: 0.7,
        };
        let b = link_evidence(&candidate(), &MutationQuery::new("L755S"), &[], &[exp], &LinkerConfig::default());
        assert_eq!(b.supporting_papers, vec!["EXP-7"]);
        assert_eq!(b.evidence_statements[0], "Experiment EXP-7 reported reduced phosphorylation in a L755S context.");
    }

    fn experiment(id: &str, context: Option<&str>, sim: f64) -> RetrievedRecord {
        RetrievedRecord {
            source_collection: "experiments".into(),
            record_id: id.into(),
            payload: json!({
                "exp_id": id,
                "outcome": "binding retained",
                "notes": "",
                "mutation_context": context,
            }),
            similarity_score: sim,
        }
    }

    #[test]
    fn test_unrelated_experiments_not_cited() {
        let exps = vec![
            experiment("EXP-A", Some("T798I"), 0.9),
            experiment("EXP-B", None, 0.9),
            experiment("EXP-C", Some("L755P"), 0.6),
            experiment("EXP-D", Some("L755S"), 0.5),
        ];
        let b = link_evidence(&candidate(), &MutationQuery::new("L755S"), &[], &exps, &LinkerConfig::default());
        let mut cited = b.supporting_papers.clone();
        cited.sort();
        assert_eq!(cited, vec!["EXP-C", "EXP-D"]);

        let novel = link_evidence(&candidate(), &MutationQuery::new("Z999Q"), &[], &exps, &LinkerConfig::default());
        assert!(novel.is_empty());
    }

    #[test]
    fn test_weak_matches_below_floor_not_cited() {
        let records = vec![lit("4444", "L755S binding.", 0.05), lit("5555", "L755S binding.", 0.3)];
        let exps = vec![experiment("EXP-W", Some("L755S"), 0.02)];
        let b = link_evidence(&candidate(), &MutationQuery::new("L755S"), &records, &exps, &LinkerConfig::default());
        assert_eq!(b.supporting_papers, vec!["5555"]);
    }

    #[test]
    fn test_keywords_include_aromatic_names_and_domain() {
        let q = MutationQuery::new("L755S").with_domain("kinase domain");
        let k = keywords_for(&candidate(), &q);
        assert!(k.contains(&"tyrosine".to_string()));
        assert!(k.contains(&"tryptophan".to_string()));
        assert!(k.contains(&"kinase".to_string()));
        assert!(k.contains(&"l755s".to_string()));
    }
}

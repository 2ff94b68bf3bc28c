//! The vector store contract shared by every backend.

use async_trait::async_trait;
use resistaid_common::RetrievedRecord;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::Result;

/// A stored payload without its embedding, as returned by [`VectorStore::scroll`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StoredRecord {
    pub record_id: String,
    pub payload: Value,
}

/// Named collections of `(embedding, payload)` pairs with nearest-neighbour search.
///
/// Implementations never retry; callers decide how to treat
/// `StoreUnavailable` and `CollectionNotFound`.
#[async_trait]
pub trait VectorStore: Send + Sync {
    /// Create a collection with the given embedding dimension. No-op if it exists.
    async fn create_collection(&self, collection: &str, dim: usize) -> Result<()>;

    /// Names of all existing collections, sorted.
    async fn collections(&self) -> Result<Vec<String>>;

    /// Insert or replace the record with `record_id`.
    async fn upsert(
        &self,
        collection: &str,
        record_id: &str,
        embedding: Vec<f32>,
        payload: Value,
    ) -> Result<()>;

    /// Up to `top_k` records sorted by similarity descending (ties by record id).
    async fn search(
        &self,
        collection: &str,
        query_embedding: &[f32],
        top_k: usize,
        filter: Option<&PayloadFilter>,
    ) -> Result<Vec<RetrievedRecord>>;

    /// Up to `limit` payloads ordered by record id.
    async fn scroll(&self, collection: &str, limit: usize) -> Result<Vec<StoredRecord>>;

    async fn count(&self, collection: &str) -> Result<u64>;
}

// ── Payload filters ───────────────────────────────────────────────────────────

/// Exact-match condition on one top-level payload field.
///
/// Matches when the field equals `value`, or when the field is an array
/// containing `value`. Numbers and booleans compare by their JSON text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldCondition {
    pub key: String,
    pub value: String,
}

/// Every `must` condition holds and, when `should` is non-empty, at least
/// one `should` condition holds.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct PayloadFilter {
    pub must: Vec<FieldCondition>,
    #[serde(default)]
    pub should: Vec<FieldCondition>,
}

impl PayloadFilter {
    pub fn field(key: impl Into<String>, value: impl Into<String>) -> Self {
        Self::default().and(key, value)
    }

    pub fn and(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.must.push(FieldCondition { key: key.into(), value: value.into() });
        self
    }

    /// Field `key` equal to (or containing) any of `values`.
    pub fn any_of<I, V>(key: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: Into<String>,
    {
        let key = key.into();
        Self {
            must: Vec::new(),
            should: values
                .into_iter()
                .map(|v| FieldCondition { key: key.clone(), value: v.into() })
                .collect(),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.must.is_empty() && self.should.is_empty()
    }

    pub fn matches(&self, payload: &Value) -> bool {
        let holds = |c: &FieldCondition| {
            payload
                .get(&c.key)
                .map(|v| value_matches(v, &c.value))
                .unwrap_or(false)
        };
        self.must.iter().all(holds) && (self.should.is_empty() || self.should.iter().any(holds))
    }
}

fn value_matches(v: &Value, expected: &str) -> bool {
    match v {
        Value::Array(items) => items.iter().any(|item| scalar_matches(item, expected)),
        other => scalar_matches(other, expected),
    }
}

fn scalar_matches(v: &Value, expected: &str) -> bool {
    match v {
        Value::String(s) => s == expected,
        Value::Number(n) => n.to_string() == expected,
        Value::Bool(b) => b.to_string() == expected,
        _ => false,
    }
}

/// Scalar payload values rendered as filter tokens (`key=value`), one per
/// scalar or array element. Used by backends that filter with SQL predicates.
pub fn filter_tokens(payload: &Value) -> Vec<String> {
    let mut tokens = Vec::new();
    if let Value::Object(map) = payload {
        for (key, v) in map {
            let values: Vec<&Value> = match v {
                Value::Array(items) => items.iter().collect(),
                other => vec![other],
            };
            for item in values {
                let text = match item {
                    Value::String(s) => s.clone(),
                    Value::Number(n) => n.to_string(),
                    Value::Bool(b) => b.to_string(),
                    _ => continue,
                };
                tokens.push(format!("{key}={text}"));
            }
        }
    }
    tokens
}

// ── Similarity ────────────────────────────────────────────────────────────────

/// Cosine similarity mapped into [0, 1]. Zero vectors and anti-correlated
/// vectors score 0.
pub fn cosine_similarity(a: &[f32], b: &[f32]) -> f64 {
    let (mut dot, mut na, mut nb) = (0.0f64, 0.0f64, 0.0f64);
    for (x, y) in a.iter().zip(b.iter()) {
        let (x, y) = (*x as f64, *y as f64);
        dot += x * y;
        na += x * x;
        nb += y * y;
    }
    if na == 0.0 || nb == 0.0 {
        return 0.0;
    }
    (dot / (na.sqrt() * nb.sqrt())).clamp(0.0, 1.0)
}

/// Sort by similarity descending, ties by record id, then truncate.
pub fn rank_records(mut records: Vec<RetrievedRecord>, top_k: usize) -> Vec<RetrievedRecord> {
    records.sort_by(|a, b| {
        b.similarity_score
            .partial_cmp(&a.similarity_score)
            .unwrap_or(std::cmp::Ordering::Equal)
            .then_with(|| a.record_id.cmp(&b.record_id))
    });
    records.truncate(top_k);
    records
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_filter_matches_array_membership() {
        let payload = json!({"pmid": "111", "mutation_mentions": ["L755S", "T798I"]});
        assert!(PayloadFilter::field("mutation_mentions", "L755S").matches(&payload));
        assert!(!PayloadFilter::field("mutation_mentions", "D769H").matches(&payload));
    }

    #[test]
    fn test_filter_conjunction_and_numbers() {
        let payload = json!({"gene": "ERBB2", "protein_position": 755});
        let f = PayloadFilter::field("gene", "ERBB2").and("protein_position", "755");
        assert!(f.matches(&payload));
        let f = f.and("missing", "x");
        assert!(!f.matches(&payload));
    }

    #[test]
    fn test_any_of_needs_one_match() {
        let f = PayloadFilter::any_of("mutation_context", ["L755S", "L755P"]);
        assert!(f.matches(&json!({"mutation_context": "L755P"})));
        assert!(!f.matches(&json!({"mutation_context": "T798I"})));
        assert!(!f.matches(&json!({})));

        let f = f.and("outcome", "binding");
        assert!(f.matches(&json!({"mutation_context": "L755S", "outcome": "binding"})));
        assert!(!f.matches(&json!({"mutation_context": "L755S", "outcome": "none"})));
    }

    #[test]
    fn test_empty_filter_matches_everything() {
        assert!(PayloadFilter::default().matches(&json!({})));
    }

    #[test]
    fn test_cosine_bounds() {
        assert!((cosine_similarity(&[1.0, 0.0], &[2.0, 0.0]) - 1.0).abs() < 1e-9);
        assert_eq!(cosine_similarity(&[1.0, 0.0], &[-1.0, 0.0]), 0.0);
        assert_eq!(cosine_similarity(&[0.0, 0.0], &[1.0, 0.0]), 0.0);
        let s = cosine_similarity(&[1.0, 1.0], &[1.0, 0.0]);
        assert!((s - std::f64::consts::FRAC_1_SQRT_2).abs() < 1e-9);
    }

    #[test]
    fn test_filter_tokens() {
        let tokens = filter_tokens(&json!({"a": "x", "b": [1, 2], "c": {"nested": true}}));
        assert!(tokens.contains(&"a=x".to_string()));
        assert!(tokens.contains(&"b=1".to_string()));
        assert!(tokens.contains(&"b=2".to_string()));
        assert_eq!(tokens.len(), 3);
    }

    #[test]
    fn test_rank_records_ties_by_id() {
        let mk = |id: &str, s: f64| RetrievedRecord {
            source_collection: "c".into(),
            record_id: id.into(),
            payload: json!({}),
            similarity_score: s,
        };
        let ranked = rank_records(vec![mk("b", 0.5), mk("a", 0.5), mk("c", 0.9)], 2);
        let ids: Vec<_> = ranked.iter().map(|r| r.record_id.as_str()).collect();
        assert_eq!(ids, vec!["c", "a"]);
    }
}

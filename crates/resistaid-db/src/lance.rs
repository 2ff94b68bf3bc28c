//! LanceDB-backed vector store.
//!
//! One table per collection with columns `record_id`, `payload` (JSON text),
//! `filter_tokens` (`|key=value|` tokens for payload filters) and a
//! fixed-size `embedding` list. Search uses cosine distance.

use std::path::Path;
use std::sync::Arc;

use arrow_array::{
    Array, FixedSizeListArray, Float32Array, RecordBatch, RecordBatchIterator, StringArray,
};
use arrow_schema::{DataType, Field, Fields, Schema};
use async_trait::async_trait;
use futures::StreamExt;
use lancedb::connection::Connection;
use lancedb::query::{ExecutableQuery, QueryBase};
use lancedb::DistanceType;
use resistaid_common::RetrievedRecord;
use serde_json::Value;
use tracing::{debug, info};

use crate::error::{DbError, Result};
use crate::store::{
    filter_tokens, rank_records, FieldCondition, PayloadFilter, StoredRecord, VectorStore,
};

/// Main database handle.
#[derive(Clone)]
pub struct LanceStore {
    conn: Connection,
    path: String,
}

impl LanceStore {
    /// Open or create a database at the specified path.
    pub async fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path_str = path.as_ref().to_string_lossy().to_string();

        if !path.as_ref().exists() {
            std::fs::create_dir_all(path.as_ref())?;
        }

        let conn = lancedb::connect(&path_str)
            .execute()
            .await
            .map_err(|e| DbError::StoreUnavailable(format!("{path_str}: {e}")))?;

        info!(path = %path_str, "Opened LanceDB store");
        Ok(Self { conn, path: path_str })
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    async fn table_exists(&self, name: &str) -> Result<bool> {
        let tables = self.conn.table_names().execute().await?;
        Ok(tables.iter().any(|t| t == name))
    }

    async fn open_table(&self, name: &str) -> Result<lancedb::Table> {
        if !self.table_exists(name).await? {
            return Err(DbError::CollectionNotFound(name.to_string()));
        }
        Ok(self.conn.open_table(name).execute().await?)
    }

    async fn table_dim(table: &lancedb::Table) -> Result<usize> {
        let schema = table.schema().await?;
        let field = schema.field_with_name("embedding")?;
        match field.data_type() {
            DataType::FixedSizeList(_, n) => Ok(*n as usize),
            other => Err(DbError::Arrow(format!("unexpected embedding type {other:?}"))),
        }
    }
}

fn collection_schema(dim: usize) -> Arc<Schema> {
    let embedding_field = Field::new(
        "embedding",
        DataType::FixedSizeList(
            Arc::new(Field::new("item", DataType::Float32, true)),
            dim as i32,
        ),
        false,
    );
    let fields: Fields = vec![
        Field::new("record_id", DataType::Utf8, false),
        Field::new("payload", DataType::Utf8, false),
        Field::new("filter_tokens", DataType::Utf8, false),
        embedding_field,
    ]
    .into();
    Arc::new(Schema::new(fields))
}

fn to_record(record_id: &str, embedding: Vec<f32>, payload: &Value) -> Result<RecordBatch> {
    let dim = embedding.len();
    let schema = collection_schema(dim);
    let tokens = filter_tokens(payload)
        .into_iter()
        .map(|t| format!("|{t}|"))
        .collect::<String>();

    let values = Float32Array::from(embedding);
    let item = Arc::new(Field::new("item", DataType::Float32, true));
    let embedding = FixedSizeListArray::try_new(item, dim as i32, Arc::new(values), None)?;

    Ok(RecordBatch::try_new(
        schema,
        vec![
            Arc::new(StringArray::from(vec![record_id.to_string()])) as Arc<dyn Array>,
            Arc::new(StringArray::from(vec![payload.to_string()])),
            Arc::new(StringArray::from(vec![tokens])),
            Arc::new(embedding),
        ],
    )?)
}

fn string_column<'a>(batch: &'a RecordBatch, name: &str) -> Result<&'a StringArray> {
    batch
        .column_by_name(name)
        .and_then(|c| c.as_any().downcast_ref::<StringArray>())
        .ok_or_else(|| DbError::Arrow(format!("missing utf8 column {name}")))
}

fn quote(value: &str) -> String {
    value.replace('\'', "''")
}

/// `value` with LIKE wildcards and the escape character itself escaped.
fn like_literal(value: &str) -> String {
    let mut out = String::with_capacity(value.len());
    for c in value.chars() {
        if matches!(c, '\\' | '%' | '_') {
            out.push('\\');
        }
        out.push(c);
    }
    quote(&out)
}

fn token_predicate(c: &FieldCondition) -> String {
    format!(
        "filter_tokens LIKE '%|{}={}|%' ESCAPE '\\'",
        like_literal(&c.key),
        like_literal(&c.value)
    )
}

/// SQL predicate equivalent of [`PayloadFilter::matches`].
pub fn filter_sql(filter: &PayloadFilter) -> Option<String> {
    if filter.is_empty() {
        return None;
    }
    let mut clauses: Vec<String> = filter.must.iter().map(token_predicate).collect();
    if !filter.should.is_empty() {
        let any = filter.should.iter().map(token_predicate).collect::<Vec<_>>().join(" OR ");
        clauses.push(format!("({any})"));
    }
    Some(clauses.join(" AND "))
}

#[async_trait]
impl VectorStore for LanceStore {
    async fn create_collection(&self, collection: &str, dim: usize) -> Result<()> {
        if self.table_exists(collection).await? {
            return Ok(());
        }
        let schema = collection_schema(dim);
        let empty_iter = RecordBatchIterator::new(vec![], schema);
        self.conn.create_table(collection, empty_iter).execute().await?;
        debug!(collection, dim, "Created LanceDB table");
        Ok(())
    }

    async fn collections(&self) -> Result<Vec<String>> {
        let mut names = self.conn.table_names().execute().await?;
        names.sort();
        Ok(names)
    }

    async fn upsert(
        &self,
        collection: &str,
        record_id: &str,
        embedding: Vec<f32>,
        payload: Value,
    ) -> Result<()> {
        let table = self.open_table(collection).await?;
        let dim = Self::table_dim(&table).await?;
        if embedding.len() != dim {
            return Err(DbError::InvalidEmbeddingDimension { expected: dim, actual: embedding.len() });
        }

        let record = to_record(record_id, embedding, &payload)?;
        let schema = record.schema();

        table.delete(&format!("record_id = '{}'", quote(record_id))).await?;
        let iter = RecordBatchIterator::new(vec![Ok(record)], schema);
        table.add(iter).execute().await?;
        Ok(())
    }

    async fn search(
        &self,
        collection: &str,
        query_embedding: &[f32],
        top_k: usize,
        filter: Option<&PayloadFilter>,
    ) -> Result<Vec<RetrievedRecord>> {
        let table = self.open_table(collection).await?;
        let dim = Self::table_dim(&table).await?;
        if query_embedding.len() != dim {
            return Err(DbError::InvalidEmbeddingDimension {
                expected: dim,
                actual: query_embedding.len(),
            });
        }
        if top_k == 0 {
            return Ok(Vec::new());
        }

        let mut query = table
            .vector_search(query_embedding.to_vec())?
            .distance_type(DistanceType::Cosine)
            .limit(top_k);
        if let Some(sql) = filter.and_then(filter_sql) {
            query = query.only_if(sql);
        }
        let mut stream = query.execute().await?;

        let mut hits = Vec::new();
        while let Some(batch) = stream.next().await {
            let batch = batch?;
            let ids = string_column(&batch, "record_id")?;
            let payloads = string_column(&batch, "payload")?;
            let distances = batch
                .column_by_name("_distance")
                .and_then(|c| c.as_any().downcast_ref::<Float32Array>())
                .ok_or_else(|| DbError::Arrow("missing _distance column".to_string()))?;
            for row in 0..batch.num_rows() {
                let similarity = (1.0 - distances.value(row) as f64).clamp(0.0, 1.0);
                hits.push(RetrievedRecord {
                    source_collection: collection.to_string(),
                    record_id: ids.value(row).to_string(),
                    payload: serde_json::from_str(payloads.value(row))?,
                    similarity_score: similarity,
                });
            }
        }

        Ok(rank_records(hits, top_k))
    }

    async fn scroll(&self, collection: &str, limit: usize) -> Result<Vec<StoredRecord>> {
        let table = self.open_table(collection).await?;
        let mut stream = table.query().execute().await?;

        let mut rows = Vec::new();
        while let Some(batch) = stream.next().await {
            let batch = batch?;
            let ids = string_column(&batch, "record_id")?;
            let payloads = string_column(&batch, "payload")?;
            for row in 0..batch.num_rows() {
                rows.push(StoredRecord {
                    record_id: ids.value(row).to_string(),
                    payload: serde_json::from_str(payloads.value(row))?,
                });
            }
        }
        rows.sort_by(|a, b| a.record_id.cmp(&b.record_id));
        rows.truncate(limit);
        Ok(rows)
    }

    async fn count(&self, collection: &str) -> Result<u64> {
        let table = self.open_table(collection).await?;
        Ok(table.count_rows(None).await? as u64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_filter_sql_escapes_quotes() {
        let f = PayloadFilter::field("title", "O'Brien").and("gene", "ERBB2");
        let sql = filter_sql(&f).unwrap();
        assert_eq!(
            sql,
            "filter_tokens LIKE '%|title=O''Brien|%' ESCAPE '\\' AND filter_tokens LIKE '%|gene=ERBB2|%' ESCAPE '\\'"
        );
        assert!(filter_sql(&PayloadFilter::default()).is_none());
    }

    #[test]
    fn test_filter_sql_escapes_wildcards() {
        let sql = filter_sql(&PayloadFilter::field("note_id", "50%_a\\b")).unwrap();
        assert_eq!(sql, "filter_tokens LIKE '%|note_id=50\\%\\_a\\\\b|%' ESCAPE '\\'");
    }

    #[test]
    fn test_filter_sql_any_of_group() {
        let f = PayloadFilter::any_of("mutation_context", ["L755S", "L755P"]).and("gene", "ERBB2");
        let sql = filter_sql(&f).unwrap();
        assert_eq!(
            sql,
            "filter_tokens LIKE '%|gene=ERBB2|%' ESCAPE '\\' AND \
             (filter_tokens LIKE '%|mutation_context=L755S|%' ESCAPE '\\' OR \
             filter_tokens LIKE '%|mutation_context=L755P|%' ESCAPE '\\')"
        );
    }

    #[tokio::test]
    async fn test_lance_round_trip() {
        let dir = tempfile::tempdir().unwrap();
        let store = LanceStore::open(dir.path().join("db")).await.unwrap();
        store.create_collection("lit", 2).await.unwrap();
        store
            .upsert("lit", "p1", vec![1.0, 0.0], json!({"mutation_mentions": ["L755S"]}))
            .await
            .unwrap();
        store
            .upsert("lit", "p2", vec![0.0, 1.0], json!({"mutation_mentions": ["T798I"]}))
            .await
            .unwrap();
        assert_eq!(store.count("lit").await.unwrap(), 2);

        let f = PayloadFilter::field("mutation_mentions", "L755S");
        let hits = store.search("lit", &[1.0, 0.0], 5, Some(&f)).await.unwrap();
        assert_eq!(hits.len(), 1);
        assert_eq!(hits[0].record_id, "p1");

        let err = store.search("missing", &[1.0, 0.0], 5, None).await.unwrap_err();
        assert!(matches!(err, DbError::CollectionNotFound(_)));
    }
}

//! LanceDB storage engine.
//!
//! One LanceDB table per domain, all under a single store root. Tables use
//! the Document Schema as an Arrow schema:
//!
//! | Column | Type |
//! |--------|------|
//! | `text` | Utf8 |
//! | `vector` | FixedSizeList<Float32>(dimension) |
//! | `source` | Utf8 (nullable) |
//! | `metadata` | Utf8 (nullable) |
//!
//! Vector search uses LanceDB's default (squared L2) metric and reports
//! it in the `_distance` column.
//!
//! # Feature Gate
//!
//! This module requires the `store-lancedb` feature.

use std::sync::Arc;

use arrow_array::{
    Array, FixedSizeListArray, Float32Array, RecordBatch, RecordBatchIterator, StringArray,
};
use arrow_schema::{DataType, Field, Schema, SchemaRef};
use async_trait::async_trait;
use futures::TryStreamExt;
use lancedb::database::CreateTableMode;
use lancedb::query::{ExecutableQuery, QueryBase};
use lorekeep_core::schema::{
    DISTANCE_COLUMN, METADATA_COLUMN, SOURCE_COLUMN, TEXT_COLUMN, VECTOR_COLUMN,
};
use lorekeep_core::{DocumentRecord, Error, Result, StoredMatch};

use crate::embedding::{EmbeddingProvider, embed_checked};
use crate::engine::StorageEngine;

/// LanceDB-backed storage engine.
pub struct LancedbEngine {
    connection: lancedb::Connection,
    provider: Arc<dyn EmbeddingProvider>,
    schema: SchemaRef,
    uri: String,
}

impl LancedbEngine {
    /// Connect to (creating if needed) the store root at `db_path`.
    pub async fn connect(db_path: &str, provider: Arc<dyn EmbeddingProvider>) -> Result<Self> {
        std::fs::create_dir_all(db_path)?;

        let connection = lancedb::connect(db_path)
            .execute()
            .await
            .map_err(|e| Error::storage(format!("Failed to connect to LanceDB: {e}")))?;

        let schema = make_schema(provider.dimension() as i32);
        log::debug!("lancedb store opened at {db_path}");

        Ok(Self {
            connection,
            provider,
            schema,
            uri: db_path.to_string(),
        })
    }

    async fn open(&self, name: &str) -> Result<lancedb::Table> {
        self.connection
            .open_table(name)
            .execute()
            .await
            .map_err(|e| map_lance_error(name, "Failed to open table", e))
    }
}

/// Translate a LanceDB error, keeping "no such table" distinguishable.
fn map_lance_error(table: &str, context: &str, err: lancedb::Error) -> Error {
    match err {
        lancedb::Error::TableNotFound { .. } => Error::not_found(format!("domain '{table}'")),
        other => Error::storage(format!("{context} '{table}': {other}")),
    }
}

#[async_trait]
impl StorageEngine for LancedbEngine {
    async fn create_table(&self, name: &str) -> Result<()> {
        self.connection
            .create_empty_table(name, self.schema.clone())
            .mode(CreateTableMode::Overwrite)
            .execute()
            .await
            .map_err(|e| map_lance_error(name, "Failed to create table", e))?;
        Ok(())
    }

    async fn drop_table(&self, name: &str) -> Result<()> {
        self.connection
            .drop_table(name, &[])
            .await
            .map_err(|e| map_lance_error(name, "Failed to drop table", e))
    }

    #[allow(deprecated)]
    async fn table_names(&self) -> Result<Vec<String>> {
        self.connection
            .table_names()
            .execute()
            .await
            .map_err(|e| Error::storage(format!("Failed to list tables: {e}")))
    }

    async fn add(&self, table: &str, record: DocumentRecord) -> Result<()> {
        let handle = self.open(table).await?;
        let vector = embed_checked(self.provider.as_ref(), &record.text).await?;

        let batch = build_record_batch(&self.schema, &record, &vector)?;
        let batches = RecordBatchIterator::new(vec![Ok(batch)], self.schema.clone());

        handle
            .add(Box::new(batches))
            .execute()
            .await
            .map_err(|e| map_lance_error(table, "Failed to add row to", e))?;
        Ok(())
    }

    async fn nearest(&self, table: &str, query: &str, limit: usize) -> Result<Vec<StoredMatch>> {
        let handle = self.open(table).await?;
        let query_vector = embed_checked(self.provider.as_ref(), query).await?;

        let results = handle
            .vector_search(query_vector)
            .map_err(|e| map_lance_error(table, "Failed to create vector search on", e))?
            .limit(limit)
            .execute()
            .await
            .map_err(|e| map_lance_error(table, "Vector search failed on", e))?;

        let batches: Vec<RecordBatch> = results
            .try_collect()
            .await
            .map_err(|e| map_lance_error(table, "Failed to collect results from", e))?;

        let mut matches = Vec::new();
        for batch in &batches {
            matches.extend(parse_search_results(batch)?);
        }

        matches.sort_by(|a, b| a.distance.total_cmp(&b.distance));
        matches.truncate(limit);
        Ok(matches)
    }

    fn name(&self) -> &str {
        "lancedb"
    }
}

impl std::fmt::Debug for LancedbEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("LancedbEngine")
            .field("uri", &self.uri)
            .field("provider", &self.provider.name())
            .finish()
    }
}

// ============================================================================
// Arrow schema and batch construction
// ============================================================================

fn vector_item_field() -> Arc<Field> {
    Arc::new(Field::new("item", DataType::Float32, true))
}

/// Create the Arrow schema shared by every domain table.
fn make_schema(dimension: i32) -> SchemaRef {
    Arc::new(Schema::new(vec![
        Field::new(TEXT_COLUMN, DataType::Utf8, false),
        Field::new(
            VECTOR_COLUMN,
            DataType::FixedSizeList(vector_item_field(), dimension),
            false,
        ),
        Field::new(SOURCE_COLUMN, DataType::Utf8, true),
        Field::new(METADATA_COLUMN, DataType::Utf8, true),
    ]))
}

/// Build a one-row RecordBatch for `record` with its embedding.
fn build_record_batch(
    schema: &SchemaRef,
    record: &DocumentRecord,
    vector: &[f32],
) -> Result<RecordBatch> {
    let dimension = vector.len() as i32;
    let vector_array = FixedSizeListArray::try_new(
        vector_item_field(),
        dimension,
        Arc::new(Float32Array::from(vector.to_vec())),
        None,
    )
    .map_err(|e| Error::storage(format!("Failed to create vector array: {e}")))?;

    RecordBatch::try_new(
        schema.clone(),
        vec![
            Arc::new(StringArray::from(vec![record.text.as_str()])),
            Arc::new(vector_array),
            Arc::new(StringArray::from(vec![record.source.as_deref()])),
            Arc::new(StringArray::from(vec![record.metadata.as_deref()])),
        ],
    )
    .map_err(|e| Error::storage(format!("Failed to create RecordBatch: {e}")))
}

fn string_column<'a>(batch: &'a RecordBatch, name: &str) -> Result<&'a StringArray> {
    batch
        .column_by_name(name)
        .ok_or_else(|| Error::storage(format!("Missing '{name}' column in results")))?
        .as_any()
        .downcast_ref::<StringArray>()
        .ok_or_else(|| Error::storage(format!("'{name}' column is not StringArray")))
}

fn optional_value(column: &StringArray, row: usize) -> Option<String> {
    if column.is_null(row) {
        None
    } else {
        Some(column.value(row).to_string())
    }
}

/// Parse search results from a RecordBatch.
fn parse_search_results(batch: &RecordBatch) -> Result<Vec<StoredMatch>> {
    let text_col = string_column(batch, TEXT_COLUMN)?;
    let source_col = string_column(batch, SOURCE_COLUMN)?;
    let metadata_col = string_column(batch, METADATA_COLUMN)?;
    let distance_col = batch
        .column_by_name(DISTANCE_COLUMN)
        .and_then(|c| c.as_any().downcast_ref::<Float32Array>());

    let mut matches = Vec::with_capacity(batch.num_rows());
    for i in 0..batch.num_rows() {
        matches.push(StoredMatch {
            text: text_col.value(i).to_string(),
            source: optional_value(source_col, i),
            metadata: optional_value(metadata_col, i),
            distance: distance_col.map(|c| c.value(i)).unwrap_or(0.0),
        });
    }
    Ok(matches)
}

// ============================================================================
// Tests
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;
    use crate::embedding::MockEmbeddingProvider;
    use lorekeep_core::Document;

    fn record(text: &str, source: Option<&str>, metadata: Option<serde_json::Value>) -> DocumentRecord {
        DocumentRecord {
            text: text.to_string(),
            source: source.map(str::to_string),
            metadata: lorekeep_core::metadata::encode(metadata.as_ref()).unwrap(),
        }
    }

    async fn engine(dir: &tempfile::TempDir) -> LancedbEngine {
        let path = dir.path().join("store");
        let provider = Arc::new(MockEmbeddingProvider::new(8));
        LancedbEngine::connect(path.to_str().unwrap(), provider)
            .await
            .unwrap()
    }

    #[test]
    fn test_make_schema() {
        let schema = make_schema(1536);
        assert_eq!(schema.fields().len(), 4);
        assert_eq!(schema.field(0).name(), "text");
        assert_eq!(schema.field(1).name(), "vector");
        assert!(schema.field(2).is_nullable());
        assert!(schema.field(3).is_nullable());

        match schema.field(1).data_type() {
            DataType::FixedSizeList(_, size) => assert_eq!(*size, 1536),
            other => panic!("Expected FixedSizeList, got {:?}", other),
        }
    }

    #[test]
    fn test_build_record_batch_nulls() {
        let schema = make_schema(4);
        let batch = build_record_batch(&schema, &record("t", None, None), &[0.5; 4]).unwrap();

        assert_eq!(batch.num_rows(), 1);
        let parsed = parse_search_results(&batch).unwrap();
        assert_eq!(parsed[0].text, "t");
        assert!(parsed[0].source.is_none());
        assert!(parsed[0].metadata.is_none());
        // Without _distance column, distance defaults to 0
        assert_eq!(parsed[0].distance, 0.0);
    }

    #[test]
    fn test_build_record_batch_values() {
        let schema = make_schema(4);
        let rec = record("t", Some("obs1"), Some(serde_json::json!({"confidence": 0.9})));
        let batch = build_record_batch(&schema, &rec, &[0.5; 4]).unwrap();

        let parsed = parse_search_results(&batch).unwrap();
        assert_eq!(parsed[0].source.as_deref(), Some("obs1"));
        assert_eq!(parsed[0].metadata.as_deref(), Some(r#"{"confidence":0.9}"#));
    }

    #[test]
    fn test_build_record_batch_wrong_dimension() {
        let schema = make_schema(4);
        assert!(build_record_batch(&schema, &record("t", None, None), &[0.5; 3]).is_err());
    }

    #[tokio::test]
    async fn test_lancedb_create_add_search() {
        let dir = tempfile::tempdir().unwrap();
        let engine = engine(&dir).await;

        engine.create_table("notes").await.unwrap();
        let rec = Document::new("The sky is blue")
            .with_source("obs1")
            .into_record()
            .unwrap();
        engine.add("notes", rec).await.unwrap();

        let matches = engine.nearest("notes", "sky color", 5).await.unwrap();
        assert_eq!(matches.len(), 1);
        assert_eq!(matches[0].text, "The sky is blue");
        assert!(matches[0].distance >= 0.0);
    }

    #[tokio::test]
    async fn test_lancedb_overwrite_discards_rows() {
        let dir = tempfile::tempdir().unwrap();
        let engine = engine(&dir).await;

        engine.create_table("x").await.unwrap();
        engine.add("x", record("old", None, None)).await.unwrap();
        engine.create_table("x").await.unwrap();

        assert!(engine.nearest("x", "old", 5).await.unwrap().is_empty());
        assert_eq!(engine.table_names().await.unwrap(), vec!["x"]);
    }

    #[tokio::test]
    async fn test_lancedb_drop_and_missing() {
        let dir = tempfile::tempdir().unwrap();
        let engine = engine(&dir).await;

        engine.create_table("x").await.unwrap();
        engine.drop_table("x").await.unwrap();

        assert!(engine.drop_table("x").await.unwrap_err().is_not_found());
        assert!(engine.nearest("x", "q", 5).await.unwrap_err().is_not_found());
        assert!(
            engine
                .add("x", record("t", None, None))
                .await
                .unwrap_err()
                .is_not_found()
        );
    }
}

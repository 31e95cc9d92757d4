//! Storage engine trait and in-memory implementation.
//!
//! A storage engine persists rows of the Document Schema in named tables
//! and answers nearest-neighbour queries against them. The engine owns an
//! embedding provider and embeds both rows (on `add`) and queries (on
//! `nearest`), so the two always share one vector space.
//!
//! # Engines
//!
//! - `MemoryEngine`: process-local tables, exact search (always available)
//! - `LancedbEngine`: LanceDB tables on disk, ANN search (feature: `store-lancedb`)

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use lorekeep_core::{DocumentRecord, Error, Result, StoredMatch};
use tokio::sync::RwLock;

use crate::config::StoreConfig;
use crate::embedding::{EmbeddingProvider, embed_checked};

/// Trait for table-per-domain vector storage.
///
/// Engines are responsible for their own write serialization; callers
/// hold no locks across calls.
#[async_trait]
pub trait StorageEngine: Send + Sync {
    /// Create an empty table, destroying any existing table of that name.
    async fn create_table(&self, name: &str) -> Result<()>;

    /// Drop a table and all of its rows.
    ///
    /// Fails with `NotFound` when the table does not exist.
    async fn drop_table(&self, name: &str) -> Result<()>;

    /// Names of all live tables, each exactly once.
    async fn table_names(&self) -> Result<Vec<String>>;

    /// Whether a table exists.
    async fn has_table(&self, name: &str) -> Result<bool> {
        Ok(self.table_names().await?.iter().any(|n| n == name))
    }

    /// Embed `record.text` and append one row.
    ///
    /// All-or-nothing: if embedding fails, nothing is written.
    async fn add(&self, table: &str, record: DocumentRecord) -> Result<()>;

    /// Embed `query` and return at most `limit` rows by ascending distance.
    async fn nearest(&self, table: &str, query: &str, limit: usize) -> Result<Vec<StoredMatch>>;

    /// The engine name for diagnostics.
    fn name(&self) -> &str;
}

// ============================================================================
// MemoryEngine
// ============================================================================

struct StoredRow {
    record: DocumentRecord,
    vector: Vec<f32>,
}

/// In-memory storage engine.
///
/// Tables live in a `BTreeMap`, so `table_names` is sorted. Distances are
/// squared Euclidean, matching LanceDB's default metric.
pub struct MemoryEngine {
    provider: Arc<dyn EmbeddingProvider>,
    tables: RwLock<BTreeMap<String, Vec<StoredRow>>>,
}

impl MemoryEngine {
    /// Create an empty engine embedding with `provider`.
    pub fn new(provider: Arc<dyn EmbeddingProvider>) -> Self {
        Self {
            provider,
            tables: RwLock::new(BTreeMap::new()),
        }
    }

    /// Number of rows in a table.
    pub async fn row_count(&self, table: &str) -> Result<usize> {
        self.tables
            .read()
            .await
            .get(table)
            .map(Vec::len)
            .ok_or_else(|| missing_table(table))
    }
}

fn missing_table(name: &str) -> Error {
    Error::not_found(format!("domain '{name}'"))
}

fn squared_l2(a: &[f32], b: &[f32]) -> f32 {
    a.iter().zip(b).map(|(x, y)| (x - y) * (x - y)).sum()
}

#[async_trait]
impl StorageEngine for MemoryEngine {
    async fn create_table(&self, name: &str) -> Result<()> {
        self.tables.write().await.insert(name.to_string(), Vec::new());
        Ok(())
    }

    async fn drop_table(&self, name: &str) -> Result<()> {
        self.tables
            .write()
            .await
            .remove(name)
            .map(|_| ())
            .ok_or_else(|| missing_table(name))
    }

    async fn table_names(&self) -> Result<Vec<String>> {
        Ok(self.tables.read().await.keys().cloned().collect())
    }

    async fn has_table(&self, name: &str) -> Result<bool> {
        Ok(self.tables.read().await.contains_key(name))
    }

    async fn add(&self, table: &str, record: DocumentRecord) -> Result<()> {
        if !self.has_table(table).await? {
            return Err(missing_table(table));
        }

        let vector = embed_checked(self.provider.as_ref(), &record.text).await?;

        // The table may have been dropped while embedding.
        let mut tables = self.tables.write().await;
        let rows = tables.get_mut(table).ok_or_else(|| missing_table(table))?;
        rows.push(StoredRow { record, vector });
        Ok(())
    }

    async fn nearest(&self, table: &str, query: &str, limit: usize) -> Result<Vec<StoredMatch>> {
        if !self.has_table(table).await? {
            return Err(missing_table(table));
        }

        let query_vector = embed_checked(self.provider.as_ref(), query).await?;

        let tables = self.tables.read().await;
        let rows = tables.get(table).ok_or_else(|| missing_table(table))?;

        let mut matches: Vec<StoredMatch> = rows
            .iter()
            .map(|row| StoredMatch {
                text: row.record.text.clone(),
                source: row.record.source.clone(),
                metadata: row.record.metadata.clone(),
                distance: squared_l2(&query_vector, &row.vector),
            })
            .collect();

        matches.sort_by(|a, b| a.distance.total_cmp(&b.distance));
        matches.truncate(limit);
        Ok(matches)
    }

    fn name(&self) -> &str {
        "memory"
    }
}

impl std::fmt::Debug for MemoryEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MemoryEngine")
            .field("provider", &self.provider.name())
            .finish()
    }
}

// ============================================================================
// Factory
// ============================================================================

/// Build the storage engine named by `config.engine`.
///
/// The provider's dimension must equal `config.dimension`: one vector
/// length per deployment.
pub async fn create_storage_engine(
    config: &StoreConfig,
    provider: Arc<dyn EmbeddingProvider>,
) -> Result<Arc<dyn StorageEngine>> {
    if provider.dimension() != config.dimension {
        return Err(Error::config(format!(
            "embedding provider '{}' has dimension {} but store.dimension is {}",
            provider.name(),
            provider.dimension(),
            config.dimension
        )));
    }

    match config.engine.as_str() {
        "memory" => Ok(Arc::new(MemoryEngine::new(provider))),

        #[cfg(feature = "store-lancedb")]
        "lancedb" => {
            let engine = crate::lancedb::LancedbEngine::connect(&config.db_path, provider).await?;
            Ok(Arc::new(engine))
        }

        other => Err(Error::config(format!(
            "Unknown or disabled storage engine: '{other}'"
        ))),
    }
}

// ============================================================================
// Tests
// ============================================================================

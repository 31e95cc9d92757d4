//! The knowledge store handle.
//!
//! [`KnowledgeStore`] ties one storage engine and one configuration
//! together and exposes the five store operations. It is cheap to clone;
//! clones share the engine.

use std::sync::Arc;

use lorekeep_core::{Document, Result};

use crate::config::StoreConfig;
use crate::embedding::{MockEmbeddingProvider, create_embedding_provider};
use crate::engine::{MemoryEngine, StorageEngine, create_storage_engine};
use crate::types::{SearchItem, SearchRequest};
use crate::{ingest, registry, search};

/// Handle to a multi-domain knowledge store.
#[derive(Clone)]
pub struct KnowledgeStore {
    engine: Arc<dyn StorageEngine>,
    config: StoreConfig,
}

impl KnowledgeStore {
    /// Open the store described by `config`, building its embedding
    /// provider and storage engine.
    pub async fn open(config: StoreConfig) -> Result<Self> {
        let provider = create_embedding_provider(&config)?;
        let engine = create_storage_engine(&config, provider).await?;
        log::info!(
            "Opened knowledge store ({} engine, {} provider, dimension {})",
            engine.name(),
            config.provider,
            config.dimension
        );
        Ok(Self { engine, config })
    }

    /// Wrap an existing engine.
    pub fn with_engine(engine: Arc<dyn StorageEngine>, config: StoreConfig) -> Self {
        Self { engine, config }
    }

    /// A throwaway in-memory store using the mock provider.
    pub fn in_memory(dimension: usize) -> Self {
        let engine = MemoryEngine::new(Arc::new(MockEmbeddingProvider::new(dimension)));
        Self::with_engine(Arc::new(engine), StoreConfig::in_memory(dimension))
    }

    /// The store configuration.
    pub fn config(&self) -> &StoreConfig {
        &self.config
    }

    /// The underlying engine.
    pub fn engine(&self) -> &Arc<dyn StorageEngine> {
        &self.engine
    }

    /// Create a domain, replacing any existing domain of that name.
    pub async fn create_domain(&self, name: &str) -> Result<()> {
        registry::create(self.engine.as_ref(), name).await
    }

    /// Delete a domain and all its documents.
    pub async fn delete_domain(&self, name: &str) -> Result<()> {
        registry::delete(self.engine.as_ref(), name).await
    }

    /// Names of all domains.
    pub async fn list_domains(&self) -> Result<Vec<String>> {
        registry::list(self.engine.as_ref()).await
    }

    /// Add one document to a domain.
    pub async fn add_knowledge(&self, domain: &str, document: Document) -> Result<()> {
        ingest::add(self.engine.as_ref(), domain, document).await
    }

    /// Search one domain or fan out over all of them.
    pub async fn search(&self, request: &SearchRequest) -> Result<Vec<SearchItem>> {
        search::search(self.engine.as_ref(), &self.config, request).await
    }
}

impl std::fmt::Debug for KnowledgeStore {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("KnowledgeStore")
            .field("engine", &self.engine.name())
            .field("provider", &self.config.provider)
            .field("dimension", &self.config.dimension)
            .finish()
    }
}

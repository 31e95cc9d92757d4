//! Multi-domain knowledge store for Lorekeep.
//!
//! Knowledge is partitioned into named domains. Each domain is one table
//! of the fixed Document Schema inside a storage engine; documents are
//! embedded on the way in and searched by vector similarity on the way
//! out, either within one domain or fanned out across all of them.
//!
//! # Features
//!
//! - `store-lancedb`: LanceDB storage engine (on-disk tables, ANN search)
//! - `embed-openai`: OpenAI embeddings API provider
//! - `embed-fastembed`: Local embedding generation via fastembed
//!
//! # Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │                     lorekeep-store                          │
//! ├─────────────────────────────────────────────────────────────┤
//! │  KnowledgeStore (create / delete / list / add / search)     │
//! ├─────────────────────────────────────────────────────────────┤
//! │  registry (domains)  ingest (add)  search (fan-out)         │
//! ├─────────────────────────────────────────────────────────────┤
//! │  StorageEngine trait                                        │
//! │  ├── MemoryEngine (always available)                        │
//! │  └── LancedbEngine (feature: store-lancedb)                 │
//! ├─────────────────────────────────────────────────────────────┤
//! │  EmbeddingProvider trait                                    │
//! │  ├── MockEmbeddingProvider (always available)               │
//! │  ├── OpenAiEmbeddingProvider (feature: embed-openai)        │
//! │  └── FastEmbedProvider (feature: embed-fastembed)           │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! # Example
//!
//! ```rust,ignore
//! use lorekeep_core::Document;
//! use lorekeep_store::{KnowledgeStore, SearchRequest};
//!
//! let store = KnowledgeStore::in_memory(384);
//! store.create_domain("notes").await?;
//! store
//!     .add_knowledge("notes", Document::new("The sky is blue").with_source("obs1"))
//!     .await?;
//!
//! for item in store.search(&SearchRequest::new("sky color")).await? {
//!     if let Some(hit) = item.as_hit() {
//!         println!("[{}] {} ({:.3})", hit.domain, hit.text, hit.distance);
//!     }
//! }
//! ```

// Core modules (always available)
pub mod config;
pub mod embedding;
pub mod engine;
pub mod types;

// Store operations
pub mod ingest;
pub mod registry;
pub mod search;
pub mod store;

// Feature-gated modules
#[cfg(feature = "embed-fastembed")]
pub mod fastembed;

#[cfg(feature = "store-lancedb")]
pub mod lancedb;

#[cfg(feature = "embed-openai")]
pub mod openai;

// Re-exports: core types
pub use config::StoreConfig;
pub use types::{Hit, PartialFailure, SearchItem, SearchRequest};

// Re-exports: traits and implementations
pub use embedding::{EmbeddingProvider, MockEmbeddingProvider, create_embedding_provider};
pub use engine::{MemoryEngine, StorageEngine, create_storage_engine};

// Re-exports: store handle
pub use store::KnowledgeStore;

// Feature-gated re-exports
#[cfg(feature = "embed-fastembed")]
pub use crate::fastembed::FastEmbedProvider;

#[cfg(feature = "store-lancedb")]
pub use crate::lancedb::LancedbEngine;

#[cfg(feature = "embed-openai")]
pub use crate::openai::OpenAiEmbeddingProvider;

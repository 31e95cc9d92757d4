//! Store configuration.
//!
//! Controls engine and provider selection, the global vector dimension,
//! the store root, and fan-out search behaviour. Every field has a default
//! so partial TOML/JSON documents deserialize cleanly.

use std::time::Duration;

use lorekeep_core::DEFAULT_DIMENSION;
use serde::{Deserialize, Serialize};

/// Environment variable consulted when no API key is configured.
pub const OPENAI_API_KEY_ENV: &str = "OPENAI_API_KEY";

/// Knowledge store configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StoreConfig {
    /// Storage engine: "lancedb" or "memory". Defaults to "lancedb" when
    /// that engine is compiled in.
    pub engine: String,

    /// Embedding provider: "openai", "fastembed" or "mock". Defaults to the
    /// first one compiled in, in that order.
    pub provider: String,

    /// Embedding model name.
    pub model: String,

    /// Vector length shared by every document in every domain.
    pub dimension: usize,

    /// Store root directory (one table per domain beneath it).
    pub db_path: String,

    /// API key for hosted providers.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    /// Base URL override for hosted providers.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_base: Option<String>,

    /// Model cache directory for local providers.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cache_path: Option<String>,

    /// Per-domain result limit when a search does not give one.
    pub default_limit: usize,

    /// Upper bound on per-domain searches running at once.
    pub max_concurrent_searches: usize,

    /// Deadline for a single per-domain search, in milliseconds.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub search_timeout_ms: Option<u64>,
}

/// Engine used when none is configured: LanceDB when compiled in.
fn default_engine() -> &'static str {
    if cfg!(feature = "store-lancedb") {
        "lancedb"
    } else {
        "memory"
    }
}

/// Provider, model and dimension used when none is configured. Picks the
/// first compiled-in provider of openai, fastembed, mock.
fn default_embedding() -> (&'static str, &'static str, usize) {
    if cfg!(feature = "embed-openai") {
        ("openai", "text-embedding-3-small", DEFAULT_DIMENSION)
    } else if cfg!(feature = "embed-fastembed") {
        ("fastembed", "bge-small-en-v1.5", 384)
    } else {
        ("mock", "mock", DEFAULT_DIMENSION)
    }
}

impl Default for StoreConfig {
    fn default() -> Self {
        let (provider, model, dimension) = default_embedding();
        Self {
            engine: default_engine().to_string(),
            provider: provider.to_string(),
            model: model.to_string(),
            dimension,
            db_path: ".lancedb".to_string(),
            api_key: None,
            api_base: None,
            cache_path: None,
            default_limit: 5,
            max_concurrent_searches: 8,
            search_timeout_ms: None,
        }
    }
}

impl StoreConfig {
    /// In-memory engine with the mock provider.
    pub fn in_memory(dimension: usize) -> Self {
        Self {
            engine: "memory".to_string(),
            provider: "mock".to_string(),
            model: "mock".to_string(),
            dimension,
            ..Default::default()
        }
    }

    /// The configured API key, falling back to `OPENAI_API_KEY`.
    pub fn resolve_api_key(&self) -> Option<String> {
        self.api_key
            .clone()
            .or_else(|| std::env::var(OPENAI_API_KEY_ENV).ok())
            .filter(|k| !k.is_empty())
    }

    /// The per-domain search deadline, if any.
    pub fn search_timeout(&self) -> Option<Duration> {
        self.search_timeout_ms.map(Duration::from_millis)
    }

    /// Concurrency for fan-out, never below one.
    pub fn fan_out_width(&self) -> usize {
        self.max_concurrent_searches.max(1)
    }
}

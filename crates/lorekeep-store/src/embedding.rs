//! Embedding provider trait and mock implementation.
//!
//! An embedding provider turns text into a fixed-length vector. Documents
//! and queries must be embedded by the same provider so that they live in
//! the same vector space; the store enforces this by giving each storage
//! engine exactly one provider.
//!
//! # Providers
//!
//! - `MockEmbeddingProvider`: Deterministic hashed bag-of-words vectors for testing
//! - `OpenAiEmbeddingProvider`: OpenAI embeddings API (requires `embed-openai` feature)
//! - `FastEmbedProvider`: Local embedding via fastembed (requires `embed-fastembed` feature)

use std::sync::Arc;

use async_trait::async_trait;
use lorekeep_core::{Error, Result};

use crate::config::StoreConfig;

/// Trait for generating text embeddings.
///
/// Implementations wrap a specific embedding service or library and map
/// every failure (transport, quota, malformed response) to
/// [`Error::Upstream`]. The trait requires `Send + Sync` so a single
/// provider can be shared by concurrent per-domain searches.
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    /// Generate an embedding for a single text.
    async fn embed(&self, text: &str) -> Result<Vec<f32>>;

    /// Generate embeddings for a batch of texts.
    ///
    /// Default implementation calls `embed` for each text sequentially.
    async fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>> {
        let mut results = Vec::with_capacity(texts.len());
        for text in texts {
            results.push(self.embed(text).await?);
        }
        Ok(results)
    }

    /// The embedding dimension.
    fn dimension(&self) -> usize;

    /// The provider name for diagnostics.
    fn name(&self) -> &str;
}

/// Embed `text` and verify the vector has the provider's dimension.
///
/// A vector of the wrong length is a malformed upstream response.
pub async fn embed_checked(provider: &dyn EmbeddingProvider, text: &str) -> Result<Vec<f32>> {
    let vector = provider.embed(text).await?;
    if vector.len() != provider.dimension() {
        return Err(Error::upstream(format!(
            "{} returned a {}-dimensional vector, expected {}",
            provider.name(),
            vector.len(),
            provider.dimension()
        )));
    }
    Ok(vector)
}

/// A mock embedding provider for testing.
///
/// Lowercased words are hashed (FNV-1a) into buckets and the resulting
/// counts are normalized to a unit vector, so texts sharing words end up
/// closer together. Identical input always yields identical output.
pub struct MockEmbeddingProvider {
    dimension: usize,
}

impl MockEmbeddingProvider {
    /// Create a new mock provider with the given dimension.
    pub fn new(dimension: usize) -> Self {
        Self { dimension }
    }

    fn bag_of_words(&self, text: &str) -> Vec<f32> {
        let mut embedding = vec![0.0f32; self.dimension];
        if self.dimension == 0 {
            return embedding;
        }

        for word in text
            .split(|c: char| !c.is_alphanumeric())
            .filter(|w| !w.is_empty())
        {
            let bucket = fnv1a(&word.to_lowercase()) as usize % self.dimension;
            embedding[bucket] += 1.0;
        }

        let norm: f32 = embedding.iter().map(|x| x * x).sum::<f32>().sqrt();
        if norm > 0.0 {
            for val in &mut embedding {
                *val /= norm;
            }
        }
        embedding
    }
}

fn fnv1a(s: &str) -> u64 {
    s.bytes().fold(0xcbf2_9ce4_8422_2325, |hash, b| {
        (hash ^ u64::from(b)).wrapping_mul(0x0100_0000_01b3)
    })
}

#[async_trait]
impl EmbeddingProvider for MockEmbeddingProvider {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        Ok(self.bag_of_words(text))
    }

    async fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>> {
        Ok(texts.iter().map(|t| self.bag_of_words(t)).collect())
    }

    fn dimension(&self) -> usize {
        self.dimension
    }

    fn name(&self) -> &str {
        "mock"
    }
}

/// Build the embedding provider named by `config.provider`.
pub fn create_embedding_provider(config: &StoreConfig) -> Result<Arc<dyn EmbeddingProvider>> {
    match config.provider.as_str() {
        "mock" => Ok(Arc::new(MockEmbeddingProvider::new(config.dimension))),

        #[cfg(feature = "embed-openai")]
        "openai" => {
            let api_key = config.resolve_api_key().ok_or_else(|| {
                Error::config("provider 'openai' needs store.api_key or OPENAI_API_KEY")
            })?;
            let mut provider = crate::openai::OpenAiEmbeddingProvider::new(
                api_key,
                &config.model,
                config.dimension,
            );
            if let Some(ref url) = config.api_base {
                provider = provider.with_base_url(url);
            }
            Ok(Arc::new(provider))
        }

        #[cfg(feature = "embed-fastembed")]
        "fastembed" => {
            let provider =
                crate::fastembed::FastEmbedProvider::new(&config.model, config.cache_path.as_deref())?;
            if provider.dimension() != config.dimension {
                return Err(Error::config(format!(
                    "model '{}' produces {}-dimensional vectors but store.dimension is {}",
                    config.model,
                    provider.dimension(),
                    config.dimension
                )));
            }
            Ok(Arc::new(provider))
        }

        other => Err(Error::config(format!(
            "Unknown or disabled embedding provider: '{other}'"
        ))),
    }
}

// ============================================================================
// Tests
// ============================================================================

//! FastEmbed embedding provider.
//!
//! Local embedding generation with pre-trained ONNX models, for stores
//! that must not call out to a hosted API.
//!
//! `fastembed::TextEmbedding` needs `&mut self` to embed and is not
//! `Sync`, so it sits behind `Arc<Mutex<>>` and every call runs on
//! `tokio::task::spawn_blocking`.
//!
//! # Feature Gate
//!
//! This module requires the `embed-fastembed` feature.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use lorekeep_core::{Error, Result};

use crate::embedding::EmbeddingProvider;

/// Map a model name string to a fastembed `EmbeddingModel` variant.
fn resolve_model(name: &str) -> Result<fastembed::EmbeddingModel> {
    match name {
        "bge-small-en-v1.5" => Ok(fastembed::EmbeddingModel::BGESmallENV15),
        "bge-base-en-v1.5" => Ok(fastembed::EmbeddingModel::BGEBaseENV15),
        "bge-large-en-v1.5" => Ok(fastembed::EmbeddingModel::BGELargeENV15),
        "all-minilm-l6-v2" => Ok(fastembed::EmbeddingModel::AllMiniLML6V2),
        other => Err(Error::config(format!(
            "Unknown fastembed model: '{other}'. Supported: bge-small-en-v1.5, bge-base-en-v1.5, bge-large-en-v1.5, all-minilm-l6-v2"
        ))),
    }
}

/// FastEmbed-based embedding provider.
pub struct FastEmbedProvider {
    model: Arc<Mutex<fastembed::TextEmbedding>>,
    dimension: usize,
    model_name: String,
}

impl FastEmbedProvider {
    /// Load `model_name`, downloading it into `cache_path` if needed.
    pub fn new(model_name: &str, cache_path: Option<&str>) -> Result<Self> {
        let mut init = fastembed::TextInitOptions::new(resolve_model(model_name)?);
        if let Some(path) = cache_path {
            init = init.with_cache_dir(std::path::PathBuf::from(path));
        }

        let mut text_embedding = fastembed::TextEmbedding::try_new(init)
            .map_err(|e| Error::upstream(format!("Failed to load fastembed model: {e}")))?;

        let dimension = text_embedding
            .embed(vec!["dimension probe"], None)
            .map_err(|e| Error::upstream(format!("Failed to probe embedding dimension: {e}")))?
            .first()
            .map(Vec::len)
            .ok_or_else(|| Error::upstream("Empty probe embedding"))?;

        Ok(Self {
            model: Arc::new(Mutex::new(text_embedding)),
            dimension,
            model_name: model_name.to_string(),
        })
    }

    async fn run(&self, texts: Vec<String>) -> Result<Vec<Vec<f32>>> {
        let model = Arc::clone(&self.model);
        tokio::task::spawn_blocking(move || {
            let mut model = model
                .lock()
                .map_err(|e| Error::upstream(format!("fastembed mutex poisoned: {e}")))?;
            model
                .embed(texts, None)
                .map_err(|e| Error::upstream(format!("Embedding failed: {e}")))
        })
        .await
        .map_err(|e| Error::upstream(format!("Embedding task failed: {e}")))?
    }
}

#[async_trait]
impl EmbeddingProvider for FastEmbedProvider {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        self.run(vec![text.to_string()])
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| Error::upstream("No embedding returned"))
    }

    async fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>> {
        self.run(texts.iter().map(|t| t.to_string()).collect()).await
    }

    fn dimension(&self) -> usize {
        self.dimension
    }

    fn name(&self) -> &str {
        &self.model_name
    }
}

impl std::fmt::Debug for FastEmbedProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FastEmbedProvider")
            .field("model", &self.model_name)
            .field("dimension", &self.dimension)
            .finish()
    }
}

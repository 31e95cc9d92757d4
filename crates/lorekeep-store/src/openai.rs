//! OpenAI embedding provider.
//!
//! Calls the `/v1/embeddings` endpoint over HTTPS. Every failure mode
//! (transport error, non-success status, malformed body) surfaces as
//! [`Error::Upstream`]; retries are left to the caller.
//!
//! # Feature Gate
//!
//! This module requires the `embed-openai` feature.

use async_trait::async_trait;
use lorekeep_core::{Error, Result};
use serde::Deserialize;

use crate::embedding::EmbeddingProvider;

/// Default API base URL.
pub const DEFAULT_API_BASE: &str = "https://api.openai.com/v1";

/// Embedding provider backed by the OpenAI embeddings API.
pub struct OpenAiEmbeddingProvider {
    api_key: String,
    model: String,
    dimension: usize,
    base_url: String,
    client: reqwest::Client,
}

#[derive(Debug, Deserialize)]
struct EmbeddingResponse {
    data: Vec<EmbeddingData>,
}

#[derive(Debug, Deserialize)]
struct EmbeddingData {
    index: usize,
    embedding: Vec<f32>,
}

impl OpenAiEmbeddingProvider {
    /// Creates a new provider.
    ///
    /// # Arguments
    ///
    /// * `api_key` - OpenAI API key
    /// * `model` - Model ID (e.g., "text-embedding-3-small")
    /// * `dimension` - Vector length the model is expected to return
    pub fn new(api_key: impl Into<String>, model: impl Into<String>, dimension: usize) -> Self {
        Self {
            api_key: api_key.into(),
            model: model.into(),
            dimension,
            base_url: DEFAULT_API_BASE.to_string(),
            client: reqwest::Client::new(),
        }
    }

    /// Point the provider at a different API base (proxies, compatible servers).
    pub fn with_base_url(mut self, url: impl Into<String>) -> Self {
        self.base_url = url.into().trim_end_matches('/').to_string();
        self
    }

    fn endpoint(&self) -> String {
        format!("{}/embeddings", self.base_url)
    }

    async fn request(&self, input: &[&str]) -> Result<Vec<Vec<f32>>> {
        let body = serde_json::json!({
            "model": self.model,
            "input": input,
        });

        let response = self
            .client
            .post(self.endpoint())
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| Error::upstream(format!("Failed to call OpenAI embeddings API: {e}")))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            return Err(Error::upstream(format!(
                "OpenAI embeddings API error {status}: {error_text}"
            )));
        }

        let parsed: EmbeddingResponse = response
            .json()
            .await
            .map_err(|e| Error::upstream(format!("Failed to parse embeddings response: {e}")))?;

        order_embeddings(parsed, input.len())
    }
}

/// Put returned embeddings back in input order and check the count.
fn order_embeddings(response: EmbeddingResponse, expected: usize) -> Result<Vec<Vec<f32>>> {
    let mut data = response.data;
    if data.len() != expected {
        return Err(Error::upstream(format!(
            "expected {expected} embeddings, received {}",
            data.len()
        )));
    }
    data.sort_by_key(|d| d.index);
    Ok(data.into_iter().map(|d| d.embedding).collect())
}

#[async_trait]
impl EmbeddingProvider for OpenAiEmbeddingProvider {
    async fn embed(&self, text: &str) -> Result<Vec<f32>> {
        self.request(&[text])
            .await?
            .into_iter()
            .next()
            .ok_or_else(|| Error::upstream("No embedding returned"))
    }

    async fn embed_batch(&self, texts: &[&str]) -> Result<Vec<Vec<f32>>> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }
        self.request(texts).await
    }

    fn dimension(&self) -> usize {
        self.dimension
    }

    fn name(&self) -> &str {
        &self.model
    }
}

impl std::fmt::Debug for OpenAiEmbeddingProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenAiEmbeddingProvider")
            .field("model", &self.model)
            .field("dimension", &self.dimension)
            .field("base_url", &self.base_url)
            .finish()
    }
}

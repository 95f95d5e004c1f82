//! Embedding function abstraction.
//!
//! The index pins one embedding function per namespace; queries must use
//! the same function the corpus was indexed with, so the trait exposes the
//! model name for the index to verify.

use std::time::Duration;

use async_trait::async_trait;
use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

use crate::error::RetrievalError;

/// Trait for embedding generation.
#[async_trait]
pub trait Embedder: Send + Sync {
    /// Generate an embedding for a single text.
    async fn embed(&self, text: &str) -> Result<Vec<f32>, RetrievalError>;

    /// Generate embeddings for multiple texts in one call.
    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, RetrievalError>;

    /// Name of the embedding model, used for namespace pinning.
    fn model_name(&self) -> &str;

    /// Embedding dimension.
    fn dimension(&self) -> usize;
}

/// OpenAI-compatible embedding client.
pub struct OpenAiEmbedder {
    client: reqwest::Client,
    api_key: SecretString,
    model: String,
    dimension: usize,
    base_url: String,
}

#[derive(Serialize)]
struct EmbeddingRequest<'a> {
    input: &'a [String],
    model: &'a str,
}

#[derive(Deserialize)]
struct EmbeddingResponse {
    data: Vec<EmbeddingData>,
}

#[derive(Deserialize)]
struct EmbeddingData {
    embedding: Vec<f32>,
}

impl OpenAiEmbedder {
    /// Create an embedder. `model` defaults to `text-embedding-3-large`,
    /// matching the model the company directory was indexed with.
    pub fn new(api_key: SecretString, model: Option<String>, base_url: Option<String>) -> Self {
        let model = model.unwrap_or_else(|| "text-embedding-3-large".to_string());
        let dimension = match model.as_str() {
            "text-embedding-3-large" => 3072,
            "text-embedding-ada-002" | "text-embedding-3-small" => 1536,
            _ => 768,
        };

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(30))
            .build()
            .unwrap_or_default();

        Self {
            client,
            api_key,
            model,
            dimension,
            base_url: base_url.unwrap_or_else(|| "https://api.openai.com/v1".to_string()),
        }
    }

    async fn request(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, RetrievalError> {
        let response = self
            .client
            .post(format!("{}/embeddings", self.base_url))
            .bearer_auth(self.api_key.expose_secret())
            .json(&EmbeddingRequest {
                input: texts,
                model: &self.model,
            })
            .send()
            .await
            .map_err(|e| RetrievalError::Backend(format!("embedding request failed: {e}")))?;

        if !response.status().is_success() {
            return Err(RetrievalError::Backend(format!(
                "embedding backend returned {}",
                response.status()
            )));
        }

        let body: EmbeddingResponse = response
            .json()
            .await
            .map_err(|e| RetrievalError::Backend(format!("invalid embedding response: {e}")))?;

        if body.data.len() != texts.len() {
            return Err(RetrievalError::Backend(format!(
                "embedding count mismatch: sent {}, got {}",
                texts.len(),
                body.data.len()
            )));
        }

        Ok(body.data.into_iter().map(|d| d.embedding).collect())
    }
}

#[async_trait]
impl Embedder for OpenAiEmbedder {
    async fn embed(&self, text: &str) -> Result<Vec<f32>, RetrievalError> {
        let mut vectors = self.embed_batch(&[text.to_string()]).await?;
        vectors
            .pop()
            .ok_or_else(|| RetrievalError::Backend("empty embedding response".to_string()))
    }

    async fn embed_batch(&self, texts: &[String]) -> Result<Vec<Vec<f32>>, RetrievalError> {
        if texts.is_empty() {
            return Ok(Vec::new());
        }
        self.request(texts).await
    }

    fn model_name(&self) -> &str {
        &self.model
    }

    fn dimension(&self) -> usize {
        self.dimension
    }
}

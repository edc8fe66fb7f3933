//! Embedding client for an Ollama-compatible embedding service.
//!
//! One `POST` per call with a JSON body `{"model": .., "prompt": ..}`; the
//! service answers `{"embedding": [..]}`. There is no retry, batching, or
//! caching. Every returned vector is checked against [`EMBEDDING_DIM`]
//! before it is handed to the caller.
//!
//! Also provides the packed float codec used for the store's BLOB column:
//! - [`vec_to_blob`]: encode a `Vec<f32>` as little-endian bytes
//! - [`blob_to_vec`]: decode a BLOB back into a `Vec<f32>`

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tokio_util::sync::CancellationToken;

use crate::config::EmbeddingConfig;
use crate::error::EmbeddingError;

/// Width of every stored embedding (`nomic-embed-text`).
pub const EMBEDDING_DIM: usize = 768;

/// A source of embedding vectors.
#[async_trait]
pub trait EmbeddingProvider: Send + Sync {
    /// Returns the model identifier (e.g. `"nomic-embed-text"`).
    fn model_name(&self) -> &str;

    /// Embed `text`, aborting early if `cancel` fires.
    ///
    /// The returned vector always has exactly [`EMBEDDING_DIM`] entries.
    async fn embed(&self, text: &str, cancel: &CancellationToken)
        -> Result<Vec<f32>, EmbeddingError>;
}

#[derive(Serialize)]
struct EmbeddingRequest<'a> {
    model: &'a str,
    prompt: &'a str,
}

#[derive(Deserialize)]
struct EmbeddingResponse {
    embedding: Vec<f64>,
}

/// Embedding provider backed by a local Ollama instance.
///
/// Requires Ollama to be running with the model pulled
/// (e.g. `ollama pull nomic-embed-text`).
pub struct OllamaProvider {
    client: reqwest::Client,
    url: String,
    model: String,
}

impl OllamaProvider {
    pub fn new(config: &EmbeddingConfig) -> Result<Self, EmbeddingError> {
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(EmbeddingError::Network)?;

        Ok(Self {
            client,
            url: config.url.clone(),
            model: config.model.clone(),
        })
    }

    async fn request(&self, text: &str) -> Result<Vec<f32>, EmbeddingError> {
        let body = EmbeddingRequest {
            model: &self.model,
            prompt: text,
        };

        let response = self
            .client
            .post(&self.url)
            .json(&body)
            .send()
            .await
            .map_err(EmbeddingError::Network)?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(EmbeddingError::BadStatus {
                status: status.as_u16(),
                body,
            });
        }

        let bytes = response.bytes().await.map_err(EmbeddingError::Network)?;
        parse_embedding_response(&bytes)
    }
}

#[async_trait]
impl EmbeddingProvider for OllamaProvider {
    fn model_name(&self) -> &str {
        &self.model
    }

    async fn embed(
        &self,
        text: &str,
        cancel: &CancellationToken,
    ) -> Result<Vec<f32>, EmbeddingError> {
        tokio::select! {
            biased;
            _ = cancel.cancelled() => Err(EmbeddingError::Cancelled),
            result = self.request(text) => result,
        }
    }
}

/// Decode a service response and enforce the dimension gate.
pub fn parse_embedding_response(body: &[u8]) -> Result<Vec<f32>, EmbeddingError> {
    let parsed: EmbeddingResponse =
        serde_json::from_slice(body).map_err(|e| EmbeddingError::Decode(e.to_string()))?;

    if parsed.embedding.len() != EMBEDDING_DIM {
        return Err(EmbeddingError::DimensionMismatch {
            got: parsed.embedding.len(),
            want: EMBEDDING_DIM,
        });
    }

    Ok(parsed.embedding.into_iter().map(|v| v as f32).collect())
}

/// Encode a float vector as a BLOB (little-endian f32 bytes).
///
/// Each `f32` is stored as 4 bytes, producing a BLOB of `vec.len() × 4`
/// bytes, the packed layout sqlite vector extensions read.
///
/// ```rust
/// use lit::embedding::{vec_to_blob, blob_to_vec};
///
/// let v = vec![1.0f32, -2.5, 3.125];
/// let blob = vec_to_blob(&v);
/// assert_eq!(blob.len(), 12);
/// assert_eq!(blob_to_vec(&blob), v);
/// ```
pub fn vec_to_blob(vec: &[f32]) -> Vec<u8> {
    let mut bytes = Vec::with_capacity(vec.len() * 4);
    for &v in vec {
        bytes.extend_from_slice(&v.to_le_bytes());
    }
    bytes
}

/// Decode a BLOB back into a float vector.
pub fn blob_to_vec(blob: &[u8]) -> Vec<f32> {
    blob.chunks_exact(4)
        .map(|chunk| f32::from_le_bytes([chunk[0], chunk[1], chunk[2], chunk[3]]))
        .collect()
}

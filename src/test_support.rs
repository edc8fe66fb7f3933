//! Shared fixtures for unit tests: a mock embedding service and a
//! deterministic fake embedding.

use axum::routing::post;
use axum::{Json, Router};

use crate::config::EmbeddingConfig;
use crate::embedding::EMBEDDING_DIM;

/// Deterministic stand-in for a model: identical text gives an identical
/// vector, so a query equal to a stored document has distance zero.
pub fn fake_embedding(text: &str) -> Vec<f32> {
    let mut vec = vec![0.0f32; EMBEDDING_DIM];
    for (i, b) in text.bytes().enumerate() {
        vec[i % EMBEDDING_DIM] += b as f32 / 255.0;
    }
    vec
}

/// A vector pointing along one axis, scaled by `magnitude`.
pub fn axis_vector(axis: usize, magnitude: f32) -> Vec<f32> {
    let mut vec = vec![0.0f32; EMBEDDING_DIM];
    vec[axis] = magnitude;
    vec
}

async fn fake_embed(Json(body): Json<serde_json::Value>) -> Json<serde_json::Value> {
    let prompt = body["prompt"].as_str().unwrap_or_default();
    Json(serde_json::json!({ "embedding": fake_embedding(prompt) }))
}

/// Serve `router` (or the default fake model) on an ephemeral port and
/// return the embeddings endpoint URL.
pub async fn spawn_embedding_server(router: Option<Router>) -> String {
    let router =
        router.unwrap_or_else(|| Router::new().route("/api/embeddings", post(fake_embed)));
    let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
    let addr = listener.local_addr().unwrap();
    tokio::spawn(async move {
        axum::serve(listener, router).await.unwrap();
    });
    format!("http://{}/api/embeddings", addr)
}

pub fn test_embedding_config(url: &str) -> EmbeddingConfig {
    EmbeddingConfig {
        url: url.to_string(),
        model: "test-embed".to_string(),
        timeout_secs: 5,
    }
}

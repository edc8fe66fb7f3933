//! Error types for the ingestion and retrieval pipeline.
//!
//! Each component reports failures through its own enum so callers can
//! decide what is fatal. The walker catches every variant at the file
//! boundary; the CLI wraps whatever reaches it in `anyhow`.

use thiserror::Error;

/// Failures while obtaining an embedding from the embedding service.
#[derive(Debug, Error)]
pub enum EmbeddingError {
    #[error("embedding request failed: {0}")]
    Network(#[source] reqwest::Error),

    #[error("embedding service returned status {status}: {body}")]
    BadStatus { status: u16, body: String },

    #[error("failed to decode embedding response: {0}")]
    Decode(String),

    #[error("unexpected embedding dimension: got {got}, want {want}")]
    DimensionMismatch { got: usize, want: usize },

    #[error("embedding request cancelled")]
    Cancelled,
}

/// Failures in the vector store.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("failed to open store at {path}: {source}")]
    Open {
        path: String,
        #[source]
        source: sqlx::Error,
    },

    #[error("failed to insert document: {0}")]
    Write(#[source] sqlx::Error),

    #[error("search query failed: {0}")]
    Query(#[source] sqlx::Error),

    #[error("embedding has {got} dimensions, store expects {want}")]
    DimensionMismatch { got: usize, want: usize },
}

/// Failures while reading a local file or fetching a remote source.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("failed to read {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to fetch {url}: {message}")]
    Network { url: String, message: String },

    #[error("bad status code {status} from {url}")]
    BadStatus { url: String, status: u16 },

    #[error("failed to convert page content: {0}")]
    Convert(String),

    #[error("failed to get captions for {url}: {message}")]
    Captions { url: String, message: String },
}

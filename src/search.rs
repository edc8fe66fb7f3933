use anyhow::{Context, Result};
use tokio_util::sync::CancellationToken;

use crate::config::Config;
use crate::embedding::{EmbeddingProvider, OllamaProvider};
use crate::models::SearchHit;
use crate::store::{SqliteStore, VectorStore};

pub const NO_RESULTS: &str = "No results found.";

/// `lit search <query>`
pub async fn run_search(config: &Config, query: &str, cancel: &CancellationToken) -> Result<()> {
    let store = SqliteStore::open(&config.db.path)
        .await
        .context("Failed to initialize database")?;
    let embedder = OllamaProvider::new(&config.embedding)?;

    let result = search_documents(&embedder, &store, query, config.retrieval.limit, cancel).await;
    store.close().await;

    print!("{}", render_results(&result?));
    Ok(())
}

/// Embed `query` and return the `limit` nearest stored documents.
///
/// Every query, blank or not, goes to the embedding service. Any embedding
/// or store failure is returned.
pub async fn search_documents(
    embedder: &dyn EmbeddingProvider,
    store: &dyn VectorStore,
    query: &str,
    limit: i64,
    cancel: &CancellationToken,
) -> Result<Vec<SearchHit>> {
    let embedding = embedder
        .embed(query, cancel)
        .await
        .context("Failed to create query embedding")?;

    let hits = store
        .query(&embedding, limit)
        .await
        .context("Search failed")?;
    Ok(hits)
}

/// Ranked output: `1. <path> (<distance>)` per hit, or the no-results line.
pub fn render_results(hits: &[SearchHit]) -> String {
    if hits.is_empty() {
        return format!("{}\n", NO_RESULTS);
    }

    let mut out = String::from("Search Results:\n");
    for (i, hit) in hits.iter().enumerate() {
        out.push_str(&format!("{}. {} ({:.4})\n", i + 1, hit.path, hit.distance));
    }
    out
}

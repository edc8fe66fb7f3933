//! Vector store: persisted documents plus nearest-neighbour lookup.
//!
//! The [`VectorStore`] trait is the only contract the walker and query
//! runner rely on: append a `(path, content, embedding)` record, and rank
//! stored records by distance to a query vector. [`SqliteStore`] backs it
//! with a single SQLite table whose `embedding` column holds the packed
//! f32 array produced by [`vec_to_blob`].
//!
//! Distance is Euclidean (L2), ascending, with ties broken by insertion
//! order.

use async_trait::async_trait;
use sqlx::{Row, SqlitePool};
use std::cmp::Ordering;
use std::path::Path;

use crate::db;
use crate::embedding::{blob_to_vec, vec_to_blob, EMBEDDING_DIM};
use crate::error::StoreError;
use crate::migrate;
use crate::models::SearchHit;

/// Abstract vector index.
///
/// | Method | Purpose |
/// |--------|---------|
/// | [`insert`](VectorStore::insert) | Append one document record |
/// | [`query`](VectorStore::query) | Nearest records to an embedding |
/// | [`count`](VectorStore::count) | Number of stored records |
#[async_trait]
pub trait VectorStore: Send + Sync {
    /// Append a record and return its id.
    ///
    /// An embedding whose length is not [`EMBEDDING_DIM`] is rejected
    /// before anything is written.
    async fn insert(&self, path: &str, content: &str, embedding: &[f32])
        -> Result<i64, StoreError>;

    /// Return at most `limit` records, nearest first.
    async fn query(&self, embedding: &[f32], limit: i64) -> Result<Vec<SearchHit>, StoreError>;

    async fn count(&self) -> Result<i64, StoreError>;
}

/// SQLite implementation of [`VectorStore`].
pub struct SqliteStore {
    pool: SqlitePool,
}

impl SqliteStore {
    /// Open the store at `db_path`, creating the file and schema if needed.
    ///
    /// Idempotent: opening an existing store leaves its schema and rows
    /// untouched.
    pub async fn open(db_path: &Path) -> Result<Self, StoreError> {
        let pool = db::connect(db_path).await?;
        migrate::run_migrations(&pool, &db_path.display().to_string()).await?;
        Ok(Self { pool })
    }

    pub async fn close(&self) {
        self.pool.close().await;
    }
}

#[async_trait]
impl VectorStore for SqliteStore {
    async fn insert(
        &self,
        path: &str,
        content: &str,
        embedding: &[f32],
    ) -> Result<i64, StoreError> {
        check_dimension(embedding)?;

        let result = sqlx::query("INSERT INTO documents (path, content, embedding) VALUES (?, ?, ?)")
            .bind(path)
            .bind(content)
            .bind(vec_to_blob(embedding))
            .execute(&self.pool)
            .await
            .map_err(StoreError::Write)?;

        Ok(result.last_insert_rowid())
    }

    async fn query(&self, embedding: &[f32], limit: i64) -> Result<Vec<SearchHit>, StoreError> {
        check_dimension(embedding)?;
        if limit < 1 {
            return Ok(Vec::new());
        }

        let rows = sqlx::query("SELECT id, path, embedding FROM documents")
            .fetch_all(&self.pool)
            .await
            .map_err(StoreError::Query)?;

        let mut hits: Vec<SearchHit> = rows
            .iter()
            .map(|row| {
                let blob: Vec<u8> = row.get("embedding");
                SearchHit {
                    id: row.get("id"),
                    path: row.get("path"),
                    distance: l2_distance(embedding, &blob_to_vec(&blob)),
                }
            })
            .collect();

        hits.sort_by(|a, b| {
            a.distance
                .partial_cmp(&b.distance)
                .unwrap_or(Ordering::Equal)
                .then(a.id.cmp(&b.id))
        });
        hits.truncate(limit as usize);

        Ok(hits)
    }

    async fn count(&self) -> Result<i64, StoreError> {
        sqlx::query_scalar("SELECT COUNT(*) FROM documents")
            .fetch_one(&self.pool)
            .await
            .map_err(StoreError::Query)
    }
}

/// A stored row read back in full.
#[cfg(test)]
#[derive(Debug, Clone)]
pub(crate) struct StoredDocument {
    pub id: i64,
    pub path: String,
    pub content: String,
    pub embedding: Vec<f32>,
}

#[cfg(test)]
impl SqliteStore {
    pub(crate) async fn get_document(&self, id: i64) -> Result<Option<StoredDocument>, StoreError> {
        let row = sqlx::query("SELECT id, path, content, embedding FROM documents WHERE id = ?")
            .bind(id)
            .fetch_optional(&self.pool)
            .await
            .map_err(StoreError::Query)?;

        Ok(row.map(|row| {
            let blob: Vec<u8> = row.get("embedding");
            StoredDocument {
                id: row.get("id"),
                path: row.get("path"),
                content: row.get("content"),
                embedding: blob_to_vec(&blob),
            }
        }))
    }

    pub(crate) fn pool(&self) -> &SqlitePool {
        &self.pool
    }
}

fn check_dimension(embedding: &[f32]) -> Result<(), StoreError> {
    if embedding.len() != EMBEDDING_DIM {
        return Err(StoreError::DimensionMismatch {
            got: embedding.len(),
            want: EMBEDDING_DIM,
        });
    }
    Ok(())
}

/// Euclidean distance, accumulated in f32.
fn l2_distance(a: &[f32], b: &[f32]) -> f64 {
    let sum: f32 = a
        .iter()
        .zip(b.iter())
        .map(|(x, y)| (x - y) * (x - y))
        .sum();
    sum.sqrt() as f64
}

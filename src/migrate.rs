use sqlx::SqlitePool;

use crate::embedding::EMBEDDING_DIM;
use crate::error::StoreError;

/// Create the `documents` table if it does not exist yet.
///
/// Safe to run on every start. The CHECK constraint pins the packed
/// embedding to exactly `EMBEDDING_DIM` little-endian f32 values.
pub async fn run_migrations(pool: &SqlitePool, db_label: &str) -> Result<(), StoreError> {
    let open_err = |source: sqlx::Error| StoreError::Open {
        path: db_label.to_string(),
        source,
    };

    sqlx::query(&format!(
        r#"
        CREATE TABLE IF NOT EXISTS documents (
            id INTEGER PRIMARY KEY AUTOINCREMENT,
            path TEXT NOT NULL,
            content TEXT NOT NULL,
            embedding BLOB NOT NULL CHECK (length(embedding) = {})
        )
        "#,
        EMBEDDING_DIM * 4
    ))
    .execute(pool)
    .await
    .map_err(open_err)?;

    sqlx::query("CREATE INDEX IF NOT EXISTS idx_documents_path ON documents(path)")
        .execute(pool)
        .await
        .map_err(open_err)?;

    Ok(())
}

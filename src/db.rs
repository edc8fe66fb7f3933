//! SQLite connection handling.
//!
//! The database file and its parent directories are created on first use.
//! One pool is opened per process and shared by every read and write; it
//! holds a single connection so writes are serialized in call order.

use sqlx::sqlite::{SqliteConnectOptions, SqliteJournalMode, SqlitePool, SqlitePoolOptions};
use std::path::Path;

use crate::error::StoreError;

/// Open (creating if missing) the SQLite database at `db_path`.
///
/// # Errors
///
/// Returns [`StoreError::Open`] if the parent directory cannot be created
/// or the database cannot be opened.
pub async fn connect(db_path: &Path) -> Result<SqlitePool, StoreError> {
    let open_err = |source: sqlx::Error| StoreError::Open {
        path: db_path.display().to_string(),
        source,
    };

    if let Some(parent) = db_path.parent() {
        std::fs::create_dir_all(parent).map_err(|e| open_err(sqlx::Error::Io(e)))?;
    }

    let options = SqliteConnectOptions::new()
        .filename(db_path)
        .create_if_missing(true)
        .journal_mode(SqliteJournalMode::Wal);

    SqlitePoolOptions::new()
        .max_connections(1)
        .connect_with(options)
        .await
        .map_err(open_err)
}

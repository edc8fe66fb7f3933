//! Ingestion pipeline orchestration.
//!
//! Coordinates the `add` flow: discover files → classify → read → embed →
//! store. Files are processed one at a time in visitation order. A failure
//! on one file (stat, read, embed, or insert) is logged with its path and
//! the run moves on to the next file; only a failed store open stops the
//! command.

use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};
use walkdir::WalkDir;

use crate::classify::is_indexable;
use crate::config::Config;
use crate::embedding::{EmbeddingProvider, OllamaProvider};
use crate::fetch::{decode_text, read_file, Fetcher, Source};
use crate::store::{SqliteStore, VectorStore};

/// Per-run counts, printed after `add`.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct IngestReport {
    pub added: u64,
    pub skipped: u64,
    pub failed: u64,
}

enum FileOutcome {
    Added,
    Skipped,
}

/// Drives the per-file pipeline against one embedder and one store.
pub struct Ingestor<'a> {
    embedder: &'a dyn EmbeddingProvider,
    store: &'a dyn VectorStore,
    fetcher: &'a Fetcher,
    cancel: &'a CancellationToken,
}

impl<'a> Ingestor<'a> {
    pub fn new(
        embedder: &'a dyn EmbeddingProvider,
        store: &'a dyn VectorStore,
        fetcher: &'a Fetcher,
        cancel: &'a CancellationToken,
    ) -> Self {
        Self {
            embedder,
            store,
            fetcher,
            cancel,
        }
    }

    /// Ingest every root: a URL, a single file, or a directory walked
    /// recursively.
    pub async fn ingest(&self, roots: &[String]) -> IngestReport {
        let mut report = IngestReport::default();

        for root in roots {
            let local = match Source::parse(root) {
                Source::Local(local) => local,
                remote => {
                    let result = self.add_remote(root, &remote).await;
                    record(&mut report, root, result);
                    continue;
                }
            };

            let path = match absolute(&local) {
                Ok(path) => path,
                Err(e) => {
                    let error = format!("{:#}", e);
                    warn!(path = %root, error = %error, "failed to resolve path");
                    report.failed += 1;
                    continue;
                }
            };

            match tokio::fs::metadata(&path).await {
                Err(e) => {
                    warn!(path = %path.display(), error = %e, "failed to stat file");
                    report.failed += 1;
                }
                Ok(meta) if meta.is_dir() => self.ingest_dir(&path, &mut report).await,
                Ok(_) => {
                    let result = self.add_file(&path).await;
                    record(&mut report, &path.display().to_string(), result);
                }
            }
        }

        report
    }

    async fn ingest_dir(&self, dir: &Path, report: &mut IngestReport) {
        for entry in WalkDir::new(dir).sort_by_file_name() {
            let entry = match entry {
                Ok(entry) => entry,
                Err(e) => {
                    let at = e
                        .path()
                        .map(|p| p.display().to_string())
                        .unwrap_or_else(|| dir.display().to_string());
                    warn!(path = %at, error = %e, "failed to walk directory entry");
                    report.failed += 1;
                    continue;
                }
            };
            if entry.file_type().is_dir() {
                continue;
            }

            let result = self.add_file(entry.path()).await;
            record(report, &entry.path().display().to_string(), result);
        }
    }

    async fn add_file(&self, path: &Path) -> Result<FileOutcome> {
        let meta = tokio::fs::metadata(path)
            .await
            .with_context(|| format!("failed to stat file {}", path.display()))?;
        if meta.is_dir() {
            return Ok(FileOutcome::Skipped);
        }

        let bytes = read_file(path).await?;
        if !is_indexable(&bytes) {
            debug!(path = %path.display(), "skipping binary file");
            return Ok(FileOutcome::Skipped);
        }

        let path_str = path.display().to_string();
        let id = self.index(&path_str, &decode_text(&bytes)).await?;
        info!(path = %path_str, id, "document added");
        Ok(FileOutcome::Added)
    }

    async fn add_remote(&self, url: &str, source: &Source) -> Result<FileOutcome> {
        let fetched = self.fetcher.fetch(source, self.cancel).await?;
        let id = self.index(url, &fetched.content).await?;
        info!(
            path = %url,
            id,
            title = fetched.title.as_deref().unwrap_or(""),
            "document added"
        );
        Ok(FileOutcome::Added)
    }

    async fn index(&self, path: &str, content: &str) -> Result<i64> {
        let embedding = self
            .embedder
            .embed(content, self.cancel)
            .await
            .context("failed to create embedding")?;
        let id = self.store.insert(path, content, &embedding).await?;
        Ok(id)
    }
}

fn record(report: &mut IngestReport, path: &str, result: Result<FileOutcome>) {
    match result {
        Ok(FileOutcome::Added) => report.added += 1,
        Ok(FileOutcome::Skipped) => report.skipped += 1,
        Err(e) => {
            let error = format!("{:#}", e);
            warn!(path = %path, error = %error, "failed to add document");
            report.failed += 1;
        }
    }
}

fn absolute(path: &Path) -> Result<PathBuf> {
    if path.is_absolute() {
        return Ok(path.to_path_buf());
    }
    let cwd = std::env::current_dir().context("failed to read current directory")?;
    Ok(cwd.join(path))
}

/// `lit add <path>...`
pub async fn run_add(config: &Config, paths: &[String], cancel: &CancellationToken) -> Result<()> {
    let store = SqliteStore::open(&config.db.path)
        .await
        .context("Failed to initialize database")?;
    let embedder = OllamaProvider::new(&config.embedding)?;
    let fetcher = Fetcher::new(&config.fetch)?;
    info!(model = embedder.model_name(), db = %config.db.path.display(), "adding documents");

    let report = Ingestor::new(&embedder, &store, &fetcher, cancel)
        .ingest(paths)
        .await;

    println!("add");
    println!("  added: {}", report.added);
    println!("  skipped: {}", report.skipped);
    println!("  failed: {}", report.failed);
    println!("ok");

    store.close().await;
    Ok(())
}

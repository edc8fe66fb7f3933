//! # lit CLI
//!
//! ## Usage
//!
//! ```bash
//! lit --config ./lit.toml <command>
//! ```
//!
//! ## Commands
//!
//! | Command | Description |
//! |---------|-------------|
//! | `lit add <path>...` | Index files, directories, and URLs |
//! | `lit search "<query>"` | Print the five nearest documents |
//!
//! Ctrl-C cancels the in-flight embedding request and stops the run.

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use tokio_util::sync::CancellationToken;

use lit::config::{self, DEFAULT_CONFIG_PATH};
use lit::{ingest, logging, search};

/// lit: a local document indexer with semantic search.
#[derive(Parser)]
#[command(
    name = "lit",
    about = "Index local documents and search them by meaning",
    version
)]
struct Cli {
    /// Path to configuration file (TOML).
    ///
    /// Built-in defaults are used when the default file does not exist.
    #[arg(long, global = true, default_value = DEFAULT_CONFIG_PATH)]
    config: PathBuf,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Add files, directories, or URLs to the index.
    ///
    /// Directories are walked recursively. Binary files are skipped and
    /// per-file failures are reported without stopping the run.
    Add {
        /// Files, directories, web pages, or video links.
        #[arg(required = true)]
        paths: Vec<String>,
    },

    /// Search the index for documents closest to a query.
    Search {
        /// Free-text query.
        query: String,
    },
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let cfg = config::resolve_config(&cli.config)?;
    logging::init(&cfg.logging);

    let cancel = CancellationToken::new();
    let watcher = cancel.clone();
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            tracing::warn!("interrupt received, cancelling");
            watcher.cancel();
        }
    });

    match cli.command {
        Commands::Add { paths } => {
            ingest::run_add(&cfg, &paths, &cancel).await?;
        }
        Commands::Search { query } => {
            search::run_search(&cfg, &query, &cancel).await?;
        }
    }

    Ok(())
}

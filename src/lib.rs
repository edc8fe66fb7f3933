//! # lit
//!
//! A local document indexer with semantic search.
//!
//! `lit` walks files and directories, skips anything that looks binary,
//! embeds each text document through an HTTP embedding service, and stores
//! the text and its vector in a single SQLite file. Queries are embedded
//! the same way and answered with the nearest stored documents.
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────┐   ┌────────────┐   ┌───────────┐   ┌──────────┐
//! │  Walker     │──▶│ Classifier │──▶│ Embedding │──▶│  SQLite  │
//! │ paths/URLs  │   │ text/bin   │   │  service  │   │  vectors │
//! └─────────────┘   └────────────┘   └───────────┘   └────┬─────┘
//!                                                         │
//!                                                         ▼
//!                                                   ┌──────────┐
//!                                                   │  search  │
//!                                                   └──────────┘
//! ```
//!
//! ## Quick Start
//!
//! ```bash
//! lit add ./notes ~/papers/summary.md   # index files and directories
//! lit add https://example.com/post      # index a web page
//! lit search "vector databases"         # top five matches
//! ```
//!
//! ## Modules
//!
//! | Module | Purpose |
//! |--------|---------|
//! | [`classify`] | Text/binary classification |
//! | [`config`] | TOML configuration parsing |
//! | [`fetch`] | Local file, web page, and video caption retrieval |
//! | [`youtube`] | Video caption lookup |
//! | [`embedding`] | Embedding service client |
//! | [`store`] | Vector store trait and SQLite implementation |
//! | [`ingest`] | `add` command: recursive ingestion |
//! | [`search`] | `search` command: nearest-neighbour query |
//! | [`db`] | Database connection |
//! | [`migrate`] | Schema creation |
//! | [`models`] | Core data types |
//! | [`error`] | Error types |
//! | [`logging`] | Tracing subscriber setup |

pub mod classify;
pub mod config;
pub mod db;
pub mod embedding;
pub mod error;
pub mod fetch;
pub mod ingest;
pub mod logging;
pub mod migrate;
pub mod models;
pub mod search;
pub mod store;
pub mod youtube;

#[cfg(test)]
mod test_support;

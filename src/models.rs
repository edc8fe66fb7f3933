//! Core data models used throughout lit.
//!
//! These types carry fetched content into `add` and ranked hits out of
//! `search`.

/// A nearest-neighbour result, ordered by ascending `distance`.
#[derive(Debug, Clone, PartialEq)]
pub struct SearchHit {
    pub id: i64,
    pub path: String,
    pub distance: f64,
}

/// Content produced by the fetcher for one source.
#[derive(Debug, Clone, Default)]
pub struct Fetched {
    pub content: String,
    pub title: Option<String>,
}

// src/ingest/types.rs
use anyhow::Result;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use sha2::{Digest, Sha256};
use std::time::Duration;

/// One entry as a feed reported it, before normalization.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RawEntry {
    pub title: Option<String>,
    pub link: Option<String>,
    pub published_at: Option<DateTime<Utc>>,
}

/// A normalized trend item. Built fresh on every fetch.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Trend {
    pub id: String,
    pub title: String,
    pub link: String,
    pub source: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub published_at: Option<DateTime<Utc>>,
}

impl Trend {
    pub fn new(
        source: &str,
        title: String,
        link: String,
        published_at: Option<DateTime<Utc>>,
    ) -> Self {
        Self {
            id: trend_id(source, &link),
            title,
            link,
            source: source.to_string(),
            published_at,
        }
    }
}

/// Stable id: first 8 bytes of SHA-256 over `source \n link`, hex encoded.
pub fn trend_id(source: &str, link: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(source.as_bytes());
    hasher.update(b"\n");
    hasher.update(link.as_bytes());
    let digest = hasher.finalize();
    let mut out = String::with_capacity(16);
    for b in digest.iter().take(8) {
        use std::fmt::Write as _;
        let _ = write!(&mut out, "{:02x}", b);
    }
    out
}

#[async_trait::async_trait]
pub trait SourceProvider: Send + Sync {
    async fn fetch_latest(&self) -> Result<Vec<RawEntry>>;
    /// Label copied into `Trend::source`.
    fn name(&self) -> &str;
}

/// Why a single source was left out of a fetch. Logged, never returned to clients.
#[derive(Debug, thiserror::Error)]
pub enum SourceError {
    #[error("timed out after {0:?}")]
    Timeout(Duration),
    #[error(transparent)]
    Provider(#[from] anyhow::Error),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SourceFailure {
    pub source: String,
    pub reason: String,
}

#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error("no trend sources configured")]
    NoSources,
    #[error("all {attempted} trend sources failed: {}", summarize(.failures))]
    AllSourcesFailed {
        attempted: usize,
        failures: Vec<SourceFailure>,
    },
}

fn summarize(failures: &[SourceFailure]) -> String {
    failures
        .iter()
        .map(|f| format!("{} ({})", f.source, f.reason))
        .collect::<Vec<_>>()
        .join("; ")
}

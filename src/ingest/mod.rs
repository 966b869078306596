// src/ingest/mod.rs
pub mod feed;
pub mod providers;
pub mod types;

use crate::config::AppConfig;
use crate::ingest::providers::RssFeedProvider;
use crate::ingest::types::{
    FetchError, RawEntry, SourceError, SourceFailure, SourceProvider, Trend,
};
use crate::links::canonical_link;
use futures_util::future::join_all;
use metrics::{counter, describe_counter, describe_histogram, histogram};
use once_cell::sync::OnceCell;
use std::collections::HashSet;
use std::time::{Duration, Instant};

/// One-time metrics registration (so series show up on /metrics).
fn ensure_metrics_described() {
    static ONCE: OnceCell<()> = OnceCell::new();
    ONCE.get_or_init(|| {
        describe_counter!("trends_fetch_total", "Trend fetch calls.");
        describe_counter!("trends_entries_total", "Entries parsed from source feeds.");
        describe_counter!(
            "trends_filtered_total",
            "Entries dropped for a missing title or link."
        );
        describe_counter!("trends_dedup_total", "Entries collapsed as duplicates.");
        describe_counter!(
            "trends_source_errors_total",
            "Sources skipped due to network, parse or timeout errors."
        );
        describe_histogram!("trends_source_fetch_ms", "Per-source fetch time in milliseconds.");
        describe_histogram!("trends_source_parse_ms", "Feed parse time in milliseconds.");
    });
}

/// Normalize display text: decode entities, strip tags, collapse whitespace.
pub fn normalize_text(s: &str) -> String {
    let mut out = html_escape::decode_html_entities(s).to_string();

    static RE_TAGS: OnceCell<regex::Regex> = OnceCell::new();
    let re_tags = RE_TAGS.get_or_init(|| regex::Regex::new(r"(?is)</?[^>]+>").unwrap());
    out = re_tags.replace_all(&out, "").to_string();

    static RE_WS: OnceCell<regex::Regex> = OnceCell::new();
    let re_ws = RE_WS.get_or_init(|| regex::Regex::new(r"\s+").unwrap());
    out = re_ws.replace_all(&out, " ").to_string();
    out.trim().to_string()
}

/// Turn one source's raw entries into trends, newest first, undated last.
/// Returns the trends and how many entries were dropped.
pub fn normalize_entries(source: &str, raw: Vec<RawEntry>) -> (Vec<Trend>, usize) {
    let mut dropped = 0usize;
    let mut out = Vec::with_capacity(raw.len());
    for ev in raw {
        let title = ev.title.as_deref().map(normalize_text).unwrap_or_default();
        let link = ev.link.as_deref().map(str::trim).unwrap_or_default();
        if title.is_empty() || link.is_empty() {
            dropped += 1;
            continue;
        }
        out.push(Trend::new(source, title, link.to_string(), ev.published_at));
    }
    // Stable: undated entries keep feed order among themselves.
    out.sort_by(|a, b| b.published_at.cmp(&a.published_at));
    (out, dropped)
}

/// Keep the first occurrence per id and per canonical link, then cap at `limit`.
/// Input order is the priority order. Returns the kept trends and the dedup count.
pub fn dedup_and_truncate(trends: Vec<Trend>, limit: usize) -> (Vec<Trend>, usize) {
    let mut seen_ids: HashSet<String> = HashSet::new();
    let mut seen_links: HashSet<String> = HashSet::new();
    let mut keep = Vec::with_capacity(trends.len().min(limit));
    let mut dedup_out = 0usize;

    for t in trends {
        let fresh_id = seen_ids.insert(t.id.clone());
        let fresh_link = seen_links.insert(canonical_link(&t.link));
        if !(fresh_id && fresh_link) {
            dedup_out += 1;
            continue;
        }
        if keep.len() < limit {
            keep.push(t);
        }
    }
    (keep, dedup_out)
}

/// Fans out to every provider and merges the results.
pub struct TrendFetcher {
    providers: Vec<Box<dyn SourceProvider>>,
    timeout: Duration,
}

impl TrendFetcher {
    pub fn new(providers: Vec<Box<dyn SourceProvider>>, timeout: Duration) -> Self {
        Self { providers, timeout }
    }

    /// HTTP providers for every configured source, sharing one client.
    pub fn from_config(cfg: &AppConfig) -> anyhow::Result<Self> {
        let client = reqwest::Client::builder()
            .user_agent(cfg.fetch.user_agent.clone())
            .connect_timeout(Duration::from_millis(cfg.fetch.timeout_ms))
            .build()?;
        let providers = cfg
            .sources
            .iter()
            .map(|s| Box::new(RssFeedProvider::from_config(s, client.clone())) as Box<dyn SourceProvider>)
            .collect();
        Ok(Self::new(providers, Duration::from_millis(cfg.fetch.timeout_ms)))
    }

    pub fn source_count(&self) -> usize {
        self.providers.len()
    }

    async fn fetch_one(&self, p: &dyn SourceProvider) -> Result<Vec<RawEntry>, SourceError> {
        let t0 = Instant::now();
        let res = match tokio::time::timeout(self.timeout, p.fetch_latest()).await {
            Ok(Ok(v)) => Ok(v),
            Ok(Err(e)) => Err(SourceError::Provider(e)),
            Err(_) => Err(SourceError::Timeout(self.timeout)),
        };
        histogram!("trends_source_fetch_ms").record(t0.elapsed().as_secs_f64() * 1_000.0);
        res
    }

    /// Query all sources once and return at most `limit` unique trends.
    ///
    /// Order: configured source priority, then newest first within a source.
    /// Fails only when no source produced a parsable response.
    pub async fn fetch_trends(&self, limit: usize) -> Result<Vec<Trend>, FetchError> {
        ensure_metrics_described();
        counter!("trends_fetch_total").increment(1);

        if self.providers.is_empty() {
            return Err(FetchError::NoSources);
        }

        let results = join_all(self.providers.iter().map(|p| self.fetch_one(p.as_ref()))).await;

        let mut merged = Vec::new();
        let mut failures = Vec::new();
        let mut filtered_cnt = 0usize;
        for (p, res) in self.providers.iter().zip(results) {
            match res {
                Ok(raw) => {
                    let (mut trends, dropped) = normalize_entries(p.name(), raw);
                    filtered_cnt += dropped;
                    merged.append(&mut trends);
                }
                Err(e) => {
                    tracing::warn!(target: "ingest", error = %e, source = p.name(), "source skipped");
                    counter!("trends_source_errors_total", "source" => p.name().to_string())
                        .increment(1);
                    failures.push(SourceFailure {
                        source: p.name().to_string(),
                        reason: format!("{e:#}"),
                    });
                }
            }
        }

        if failures.len() == self.providers.len() {
            return Err(FetchError::AllSourcesFailed {
                attempted: self.providers.len(),
                failures,
            });
        }

        let (kept, dedup_cnt) = dedup_and_truncate(merged, limit);

        counter!("trends_filtered_total").increment(filtered_cnt as u64);
        counter!("trends_dedup_total").increment(dedup_cnt as u64);
        tracing::debug!(
            target: "ingest",
            kept = kept.len(),
            filtered = filtered_cnt,
            dedup = dedup_cnt,
            skipped = failures.len(),
            "fetch complete"
        );

        Ok(kept)
    }
}

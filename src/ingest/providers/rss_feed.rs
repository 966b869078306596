// src/ingest/providers/rss_feed.rs
use anyhow::{Context, Result};
use async_trait::async_trait;
use metrics::{counter, histogram};

use crate::config::SourceConfig;
use crate::ingest::feed::parse_feed;
use crate::ingest::types::{RawEntry, SourceProvider};

/// A configured RSS/Atom source, either fetched over HTTP or parsed from an owned fixture.
pub struct RssFeedProvider {
    name: String,
    mode: Mode,
}

enum Mode {
    Fixture(String),
    Http { url: String, client: reqwest::Client },
}

impl RssFeedProvider {
    pub fn from_fixture(name: &str, xml: &str) -> Self {
        Self {
            name: name.to_string(),
            mode: Mode::Fixture(xml.to_string()),
        }
    }

    /// `client` is shared across sources; build it once with the configured user agent.
    pub fn from_url(name: &str, url: &str, client: reqwest::Client) -> Self {
        Self {
            name: name.to_string(),
            mode: Mode::Http {
                url: url.to_string(),
                client,
            },
        }
    }

    pub fn from_config(cfg: &SourceConfig, client: reqwest::Client) -> Self {
        Self::from_url(&cfg.name, &cfg.url, client)
    }

    fn parse_items_from_str(&self, s: &str) -> Result<Vec<RawEntry>> {
        let t0 = std::time::Instant::now();
        let out = parse_feed(s).with_context(|| format!("parsing feed of {}", self.name))?;

        let ms = t0.elapsed().as_secs_f64() * 1_000.0;
        histogram!("trends_source_parse_ms").record(ms);
        counter!("trends_entries_total").increment(out.len() as u64);
        Ok(out)
    }
}

#[async_trait]
impl SourceProvider for RssFeedProvider {
    async fn fetch_latest(&self) -> Result<Vec<RawEntry>> {
        match &self.mode {
            Mode::Fixture(s) => self.parse_items_from_str(s),
            Mode::Http { url, client } => {
                let resp = client
                    .get(url)
                    .send()
                    .await
                    .with_context(|| format!("{} http get()", self.name))?
                    .error_for_status()
                    .with_context(|| format!("{} http status", self.name))?;
                let body = resp
                    .text()
                    .await
                    .with_context(|| format!("{} http .text()", self.name))?;
                self.parse_items_from_str(&body)
            }
        }
    }

    fn name(&self) -> &str {
        &self.name
    }
}

// src/ingest/feed.rs
//! RSS 2.0 / Atom payload parsing into `RawEntry`.

use anyhow::{anyhow, Result};
use chrono::{DateTime, Utc};
use quick_xml::de::from_str;
use serde::Deserialize;

use crate::ingest::types::RawEntry;

#[derive(Debug, Deserialize)]
struct Rss {
    channel: Channel,
}

#[derive(Debug, Deserialize)]
struct Channel {
    #[serde(rename = "item", default)]
    item: Vec<Item>,
}

#[derive(Debug, Deserialize)]
struct Item {
    title: Option<String>,
    link: Option<String>,
    #[serde(rename = "pubDate")]
    pub_date: Option<String>,
}

#[derive(Debug, Deserialize)]
struct Atom {
    #[serde(rename = "entry", default)]
    entry: Vec<Entry>,
}

#[derive(Debug, Deserialize)]
struct Entry {
    title: Option<AtomText>,
    #[serde(default)]
    link: Vec<AtomLink>,
    published: Option<String>,
    updated: Option<String>,
}

#[derive(Debug, Deserialize)]
struct AtomText {
    #[serde(rename = "$text", default)]
    value: String,
}

#[derive(Debug, Deserialize)]
struct AtomLink {
    #[serde(rename = "@href")]
    href: Option<String>,
    #[serde(rename = "@rel")]
    rel: Option<String>,
}

impl Entry {
    fn alternate_href(&self) -> Option<String> {
        self.link
            .iter()
            .find(|l| matches!(l.rel.as_deref(), None | Some("alternate")))
            .or_else(|| self.link.first())
            .and_then(|l| l.href.clone())
    }
}

/// Parse a feed body. RSS is tried first, then Atom; neither is an error.
pub fn parse_feed(body: &str) -> Result<Vec<RawEntry>> {
    let xml = scrub_html_entities_for_xml(body);

    let rss_err = match from_str::<Rss>(&xml) {
        Ok(rss) => {
            return Ok(rss
                .channel
                .item
                .into_iter()
                .map(|it| RawEntry {
                    title: it.title,
                    link: it.link,
                    published_at: it.pub_date.as_deref().and_then(parse_timestamp),
                })
                .collect())
        }
        Err(e) => e,
    };

    if looks_like_atom(&xml) {
        let atom: Atom =
            from_str(&xml).map_err(|e| anyhow!("parsing atom feed: {e}"))?;
        return Ok(atom
            .entry
            .into_iter()
            .map(|e| {
                let link = e.alternate_href();
                let published_at = e
                    .published
                    .as_deref()
                    .and_then(parse_timestamp)
                    .or_else(|| e.updated.as_deref().and_then(parse_timestamp));
                RawEntry {
                    title: e.title.map(|t| t.value),
                    link,
                    published_at,
                }
            })
            .collect());
    }

    Err(anyhow!("parsing rss feed: {rss_err}"))
}

fn looks_like_atom(xml: &str) -> bool {
    xml.contains("<feed") && !xml.contains("<rss")
}

/// RFC 2822 (RSS) or RFC 3339 (Atom). Unparsable stamps count as absent.
pub fn parse_timestamp(ts: &str) -> Option<DateTime<Utc>> {
    let ts = ts.trim();
    DateTime::parse_from_rfc2822(ts)
        .or_else(|_| DateTime::parse_from_rfc3339(ts))
        .ok()
        .map(|dt| dt.with_timezone(&Utc))
}

/// HTML-only entities that XML parsers reject.
fn scrub_html_entities_for_xml(s: &str) -> String {
    s.replace("&nbsp;", " ")
        .replace("&ndash;", "-")
        .replace("&mdash;", "-")
        .replace("&ldquo;", "\"")
        .replace("&rdquo;", "\"")
        .replace("&lsquo;", "'")
        .replace("&rsquo;", "'")
        .replace("&hellip;", "...")
}

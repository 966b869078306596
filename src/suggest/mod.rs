// src/suggest/mod.rs
//! Caption + hashtag suggestions derived from a trend title.
//!
//! Everything here is a pure function of (title, link, config): no randomness, no I/O.

pub mod keywords;
pub mod variants;

use serde::{Deserialize, Serialize};
use std::collections::{HashMap, HashSet};

use crate::config::TextConfig;
use crate::ingest::types::Trend;

pub use keywords::tokenize;

/// Number of variants produced per trend.
pub const VARIANT_COUNT: usize = 3;
pub const DEFAULT_TOP_HASHTAGS: usize = 10;

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PostVariant {
    pub caption: String,
    pub hashtags: Vec<String>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PostSuggestion {
    pub trend_id: String,
    pub variants: Vec<PostVariant>,
}

/// Holds the compiled text configuration (stopword set, caps, brand tags).
#[derive(Debug, Clone)]
pub struct Suggester {
    cfg: TextConfig,
    stopwords: HashSet<String>,
}

impl Suggester {
    pub fn new(cfg: TextConfig) -> Self {
        let stopwords = cfg.stopwords.iter().map(|w| w.to_lowercase()).collect();
        Self { cfg, stopwords }
    }

    pub fn config(&self) -> &TextConfig {
        &self.cfg
    }

    pub fn extract_keywords(&self, title: &str) -> Vec<String> {
        keywords::extract(title, &self.stopwords, &self.cfg)
    }

    pub fn post_variants(&self, title: &str, link: &str, keywords: &[String]) -> Vec<PostVariant> {
        variants::build(title, link, keywords, &self.cfg)
    }

    pub fn suggest(&self, trend: &Trend) -> PostSuggestion {
        let kws = self.extract_keywords(&trend.title);
        PostSuggestion {
            trend_id: trend.id.clone(),
            variants: self.post_variants(&trend.title, &trend.link, &kws),
        }
    }
}

impl Default for Suggester {
    fn default() -> Self {
        Self::new(TextConfig::default())
    }
}

/// Most frequent hashtags across all variants; ties keep first appearance.
pub fn top_hashtags(suggestions: &[PostSuggestion], n: usize) -> Vec<String> {
    let mut order: Vec<&str> = Vec::new();
    let mut freq: HashMap<&str, usize> = HashMap::new();
    for tag in suggestions
        .iter()
        .flat_map(|s| s.variants.iter())
        .flat_map(|v| v.hashtags.iter())
    {
        let c = freq.entry(tag.as_str()).or_insert(0);
        if *c == 0 {
            order.push(tag.as_str());
        }
        *c += 1;
    }
    // Stable sort keeps first-appearance order for equal counts.
    order.sort_by(|a, b| freq[b].cmp(&freq[a]));
    order.into_iter().take(n).map(str::to_string).collect()
}

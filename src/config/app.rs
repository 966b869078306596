// src/config/app.rs
use anyhow::{anyhow, Context, Result};
use serde::Deserialize;
use std::collections::HashSet;
use std::fs;
use std::path::{Path, PathBuf};

pub const DEFAULT_CONFIG_PATH: &str = "config/app.toml";
pub const ENV_CONFIG_PATH: &str = "TRENDS_CONFIG_PATH";

/// Root of `config/app.toml`. Every section falls back to its defaults.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub fetch: FetchConfig,
    /// Order is the source priority used for merging and dedup.
    pub sources: Vec<SourceConfig>,
    pub text: TextConfig,
    pub poster: PosterConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct FetchConfig {
    /// Per-source bound; an expired source is treated as failed.
    pub timeout_ms: u64,
    pub default_limit: usize,
    pub suggestions_limit: usize,
    pub max_limit: usize,
    pub user_agent: String,
}

impl Default for FetchConfig {
    fn default() -> Self {
        Self {
            timeout_ms: 8_000,
            default_limit: 24,
            suggestions_limit: 18,
            max_limit: 100,
            user_agent: "interior-trends-agent/0.1 (+rss)".to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct SourceConfig {
    pub name: String,
    pub url: String,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct TextConfig {
    pub min_token_len: usize,
    pub max_keywords: usize,
    pub max_hashtags: usize,
    pub brand_hashtags: Vec<String>,
    pub stopwords: Vec<String>,
}

impl Default for TextConfig {
    fn default() -> Self {
        Self {
            min_token_len: 3,
            max_keywords: 6,
            max_hashtags: 8,
            brand_hashtags: vec![
                "#InteriorDesign".to_string(),
                "#HomeDecor".to_string(),
                "#DesignTrends".to_string(),
            ],
            stopwords: DEFAULT_STOPWORDS.iter().map(|s| s.to_string()).collect(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct PosterConfig {
    pub default_width: u32,
    pub default_height: u32,
    pub max_width: u32,
    pub max_height: u32,
    pub max_title_len: usize,
    pub badge_label: String,
    pub font_path: Option<PathBuf>,
}

impl Default for PosterConfig {
    fn default() -> Self {
        Self {
            default_width: 1080,
            default_height: 1350,
            max_width: 4096,
            max_height: 4096,
            max_title_len: 120,
            badge_label: "Interior Trends".to_string(),
            font_path: None,
        }
    }
}

const DEFAULT_STOPWORDS: &[&str] = &[
    "a", "about", "after", "all", "also", "an", "and", "any", "are", "as", "at", "be", "been",
    "before", "best", "but", "by", "can", "could", "did", "do", "does", "for", "from", "get",
    "had", "has", "have", "her", "his", "how", "in", "into", "is", "it", "its", "just", "like",
    "make", "makes", "more", "most", "new", "not", "now", "of", "on", "or", "our", "out", "over",
    "should", "so", "than", "that", "the", "their", "them", "these", "they", "this", "those",
    "through", "to", "top", "under", "up", "use", "ways", "was", "we", "were", "what", "when",
    "where", "which", "while", "who", "why", "will", "with", "without", "year", "you", "your",
];

const DEFAULT_SOURCES: &[(&str, &str)] = &[
    ("Dezeen", "https://www.dezeen.com/interiors/feed/"),
    ("ArchDaily", "https://www.archdaily.com/search/feed/articles/category/interior-design"),
    ("Apartment Therapy", "https://www.apartmenttherapy.com/design.rss"),
    ("Design Milk", "https://design-milk.com/category/interior-design/feed/"),
];

impl AppConfig {
    /// Built-in defaults, including the stock source list.
    pub fn builtin() -> Self {
        Self {
            sources: DEFAULT_SOURCES
                .iter()
                .map(|(name, url)| SourceConfig {
                    name: name.to_string(),
                    url: url.to_string(),
                })
                .collect(),
            ..Self::default()
        }
    }

    /// Load using env var + fallbacks:
    /// 1) $TRENDS_CONFIG_PATH (must exist)
    /// 2) config/app.toml
    /// 3) built-in defaults
    pub fn load_default() -> Result<Self> {
        if let Ok(p) = std::env::var(ENV_CONFIG_PATH) {
            let pb = PathBuf::from(p);
            if !pb.exists() {
                return Err(anyhow!("{ENV_CONFIG_PATH} points to non-existent path"));
            }
            return Self::load_from(&pb);
        }
        let default_p = PathBuf::from(DEFAULT_CONFIG_PATH);
        if default_p.exists() {
            return Self::load_from(&default_p);
        }
        Ok(Self::builtin())
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("reading config from {}", path.display()))?;
        Self::from_toml_str(&content).with_context(|| format!("parsing {}", path.display()))
    }

    /// Parse and sanitize. A file without `[[sources]]` keeps the stock list.
    pub fn from_toml_str(s: &str) -> Result<Self> {
        #[derive(Deserialize)]
        struct Probe {
            sources: Option<toml::Value>,
        }
        let mut cfg: AppConfig = toml::from_str(s)?;
        let probe: Probe = toml::from_str(s)?;
        if probe.sources.is_none() {
            cfg.sources = Self::builtin().sources;
        }
        cfg.sanitize();
        Ok(cfg)
    }

    fn sanitize(&mut self) {
        self.sources = clean_sources(std::mem::take(&mut self.sources));

        let fetch_defaults = FetchConfig::default();
        if self.fetch.timeout_ms == 0 {
            self.fetch.timeout_ms = fetch_defaults.timeout_ms;
        }
        if self.fetch.max_limit == 0 {
            self.fetch.max_limit = fetch_defaults.max_limit;
        }
        if self.fetch.default_limit == 0 {
            self.fetch.default_limit = fetch_defaults.default_limit;
        }
        if self.fetch.suggestions_limit == 0 {
            self.fetch.suggestions_limit = fetch_defaults.suggestions_limit;
        }
        self.fetch.default_limit = self.fetch.default_limit.min(self.fetch.max_limit);
        self.fetch.suggestions_limit = self.fetch.suggestions_limit.min(self.fetch.max_limit);

        let poster_defaults = PosterConfig::default();
        if self.poster.default_width == 0 {
            self.poster.default_width = poster_defaults.default_width;
        }
        if self.poster.default_height == 0 {
            self.poster.default_height = poster_defaults.default_height;
        }
        self.poster.max_width = self.poster.max_width.max(self.poster.default_width);
        self.poster.max_height = self.poster.max_height.max(self.poster.default_height);
        // Room for at least one char plus the marker.
        self.poster.max_title_len = self.poster.max_title_len.max(2);

        self.text.stopwords = self
            .text
            .stopwords
            .iter()
            .map(|w| w.trim().to_lowercase())
            .filter(|w| !w.is_empty())
            .collect();
    }
}

fn clean_sources(items: Vec<SourceConfig>) -> Vec<SourceConfig> {
    let mut seen = HashSet::new();
    let mut out = Vec::with_capacity(items.len());
    for it in items {
        let name = it.name.trim();
        let url = it.url.trim();
        if name.is_empty() || url.is_empty() {
            continue;
        }
        if seen.insert(url.to_string()) {
            out.push(SourceConfig {
                name: name.to_string(),
                url: url.to_string(),
            });
        }
    }
    out
}

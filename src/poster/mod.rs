// src/poster/mod.rs
//! Poster rendering: query defaults, fixed layout, PNG rasterization.
//!
//! Rendering never surfaces bad input as an error: missing or invalid parameters fall back
//! to configured defaults, and a failed render falls back to a bare gradient.

pub mod layout;
pub mod raster;

use ab_glyph::FontArc;
use anyhow::Result;
use metrics::{counter, describe_counter};
use once_cell::sync::OnceCell;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use tracing::{debug, info, warn};

use crate::config::PosterConfig;
use crate::links::{display_domain, first_query_value};
use layout::{ApproxMeasure, PosterLayout};
use raster::FontMeasure;

pub const DEFAULT_TITLE: &str = "Interior Trends";
pub const DEFAULT_SOURCE: &str = "Trend Source";
pub const TRUNCATION_MARKER: char = '…';
pub const ENV_FONT_PATH: &str = "POSTER_FONT_PATH";

const SYSTEM_FONTS: &[&str] = &[
    "/usr/share/fonts/truetype/dejavu/DejaVuSans-Bold.ttf",
    "/usr/share/fonts/dejavu/DejaVuSans-Bold.ttf",
    "/usr/share/fonts/truetype/liberation/LiberationSans-Bold.ttf",
    "/usr/share/fonts/liberation-sans/LiberationSans-Bold.ttf",
    "/Library/Fonts/Arial Bold.ttf",
    "/System/Library/Fonts/Supplemental/Arial Bold.ttf",
    "C:\\Windows\\Fonts\\arialbd.ttf",
];

fn ensure_metrics_described() {
    static ONCE: OnceCell<()> = OnceCell::new();
    ONCE.get_or_init(|| {
        describe_counter!("posters_rendered_total", "Posters rendered from request parameters.");
        describe_counter!(
            "poster_render_fallback_total",
            "Renders replaced by the plain gradient fallback."
        );
    });
}

/// Raw query string values, all optional.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PosterQuery {
    pub title: Option<String>,
    pub source: Option<String>,
    pub url: Option<String>,
    pub w: Option<String>,
    pub h: Option<String>,
    pub download: Option<String>,
}

impl PosterQuery {
    /// First value per parameter; `width`/`height` are accepted for `w`/`h`.
    pub fn from_query_str(raw: Option<&str>) -> Self {
        Self {
            title: first_query_value(raw, &["title"]),
            source: first_query_value(raw, &["source"]),
            url: first_query_value(raw, &["url"]),
            w: first_query_value(raw, &["w", "width"]),
            h: first_query_value(raw, &["h", "height"]),
            download: first_query_value(raw, &["download"]),
        }
    }
}

/// Validated render input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PosterParams {
    pub title: String,
    pub source: String,
    /// Hostname shown in the footer; `None` omits the line.
    pub domain: Option<String>,
    pub width: u32,
    pub height: u32,
    pub download: bool,
}

impl PosterParams {
    pub fn from_query(q: &PosterQuery, cfg: &PosterConfig) -> Self {
        let title = non_blank(q.title.as_deref()).unwrap_or(DEFAULT_TITLE);
        let source = non_blank(q.source.as_deref()).unwrap_or(DEFAULT_SOURCE);
        let domain = non_blank(q.url.as_deref()).and_then(display_domain);
        if q.url.as_deref().is_some_and(|u| !u.trim().is_empty()) && domain.is_none() {
            debug!(target: "poster", url = ?q.url, "unparsable url, omitting domain line");
        }
        Self {
            title: truncate_title(title, cfg.max_title_len),
            source: source.to_string(),
            domain,
            width: parse_dimension("w", q.w.as_deref(), cfg.default_width, cfg.max_width),
            height: parse_dimension("h", q.h.as_deref(), cfg.default_height, cfg.max_height),
            download: matches!(
                q.download.as_deref().map(str::trim),
                Some("1") | Some("true")
            ),
        }
    }
}

fn non_blank(s: Option<&str>) -> Option<&str> {
    s.map(str::trim).filter(|s| !s.is_empty())
}

/// Positive integer or `default`; values above `max` are clamped.
pub fn parse_dimension(name: &str, raw: Option<&str>, default: u32, max: u32) -> u32 {
    match raw.map(str::trim).map(str::parse::<i64>) {
        Some(Ok(n)) if n > 0 => u32::try_from(n).unwrap_or(u32::MAX).min(max),
        None => default,
        Some(_) => {
            debug!(target: "poster", param = name, raw = ?raw, default, "invalid dimension, using default");
            default
        }
    }
}

/// At most `max_len` chars; clipped titles end with the truncation marker.
pub fn truncate_title(title: &str, max_len: usize) -> String {
    if title.chars().count() <= max_len {
        return title.to_string();
    }
    let mut out: String = title.chars().take(max_len.saturating_sub(1)).collect();
    out.push(TRUNCATION_MARKER);
    out
}

/// First readable font among the configured path, `$POSTER_FONT_PATH`, and common system fonts.
pub fn load_font(cfg: &PosterConfig) -> Option<FontArc> {
    let candidates = cfg
        .font_path
        .clone()
        .into_iter()
        .chain(std::env::var(ENV_FONT_PATH).ok().map(PathBuf::from))
        .chain(SYSTEM_FONTS.iter().map(PathBuf::from));
    for path in candidates {
        if let Some(font) = try_font(&path) {
            info!(target: "poster", path = %path.display(), "poster font loaded");
            return Some(font);
        }
    }
    warn!(target: "poster", "no poster font found; posters will render without text");
    None
}

pub(crate) fn try_font(path: &Path) -> Option<FontArc> {
    let bytes = std::fs::read(path).ok()?;
    match FontArc::try_from_vec(bytes) {
        Ok(f) => Some(f),
        Err(e) => {
            warn!(target: "poster", path = %path.display(), error = %e, "invalid font file");
            None
        }
    }
}

pub struct PosterRenderer {
    cfg: PosterConfig,
    font: Option<FontArc>,
}

impl PosterRenderer {
    pub fn new(cfg: PosterConfig, font: Option<FontArc>) -> Self {
        Self { cfg, font }
    }

    pub fn from_config(cfg: &PosterConfig) -> Self {
        Self::new(cfg.clone(), load_font(cfg))
    }

    pub fn config(&self) -> &PosterConfig {
        &self.cfg
    }

    pub fn has_font(&self) -> bool {
        self.font.is_some()
    }

    pub fn params(&self, q: &PosterQuery) -> PosterParams {
        PosterParams::from_query(q, &self.cfg)
    }

    pub fn layout(&self, p: &PosterParams) -> PosterLayout {
        match &self.font {
            Some(f) => layout::compute(p, &self.cfg.badge_label, &FontMeasure(f)),
            None => layout::compute(p, &self.cfg.badge_label, &ApproxMeasure),
        }
    }

    /// PNG bytes for `p`. CPU bound; call through `render_async` from handlers.
    pub fn render(&self, p: &PosterParams) -> Result<Vec<u8>> {
        let layout = self.layout(p);
        let img = raster::draw(&layout, self.font.as_ref());
        raster::encode_png(img)
    }

    /// Default-size gradient with no text.
    pub fn render_fallback(&self) -> Result<Vec<u8>> {
        raster::encode_png(raster::gradient(
            self.cfg.default_width,
            self.cfg.default_height,
        ))
    }

    /// Render on the blocking pool; a panic or encode error yields the fallback image.
    pub async fn render_async(self: Arc<Self>, p: PosterParams) -> Result<Vec<u8>> {
        ensure_metrics_described();
        let renderer = self.clone();
        let res = tokio::task::spawn_blocking(move || renderer.render(&p)).await;
        let err = match res {
            Ok(Ok(png)) => {
                counter!("posters_rendered_total").increment(1);
                return Ok(png);
            }
            Ok(Err(e)) => format!("{e:#}"),
            Err(join) => format!("render task failed: {join}"),
        };
        warn!(target: "poster", error = %err, "poster render failed, using fallback");
        counter!("poster_render_fallback_total").increment(1);
        tokio::task::spawn_blocking(move || self.render_fallback()).await?
    }
}

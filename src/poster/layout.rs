// src/poster/layout.rs
//! Fixed poster template, computed in pixel space before anything is drawn.
//!
//! Base geometry is designed for 1080×1350 and scaled by `min(w/1080, h/1350)`.

use super::PosterParams;

pub const BASE_WIDTH: f32 = 1080.0;
pub const BASE_HEIGHT: f32 = 1350.0;
pub const TILE_LABEL: &str = "Poster";
const ELLIPSIS: char = '…';

/// Text advance measurement; backed by the loaded font, or an estimate without one.
pub trait Measure {
    fn width(&self, text: &str, px: f32) -> f32;
}

/// Average-glyph estimate used when no font is available.
pub struct ApproxMeasure;

impl Measure for ApproxMeasure {
    fn width(&self, text: &str, px: f32) -> f32 {
        text.chars().count() as f32 * px * 0.55
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct TextRun {
    pub text: String,
    /// Left edge.
    pub x: f32,
    /// Top of the line box.
    pub y: f32,
    pub size: f32,
    pub alpha: f32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct RoundedRect {
    pub x: f32,
    pub y: f32,
    pub w: f32,
    pub h: f32,
    pub radius: f32,
    pub alpha: f32,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PosterLayout {
    pub width: u32,
    pub height: u32,
    pub badge: RoundedRect,
    pub badge_text: TextRun,
    pub title_lines: Vec<TextRun>,
    pub source: TextRun,
    pub domain: Option<TextRun>,
    pub tile: RoundedRect,
    pub tile_text: TextRun,
}

pub fn compute(p: &PosterParams, badge_label: &str, m: &dyn Measure) -> PosterLayout {
    let w = p.width as f32;
    let h = p.height as f32;
    let s = (w / BASE_WIDTH).min(h / BASE_HEIGHT);
    let pad = 60.0 * s;

    // Badge pill.
    let badge_px = 32.0 * s;
    let badge_h = badge_px * 1.2 + 20.0 * s;
    let badge = RoundedRect {
        x: pad,
        y: pad,
        w: m.width(badge_label, badge_px) + 32.0 * s,
        h: badge_h,
        radius: badge_h / 2.0,
        alpha: 0.14,
    };
    let badge_text = TextRun {
        text: badge_label.to_string(),
        x: pad + 16.0 * s,
        y: pad + 10.0 * s,
        size: badge_px,
        alpha: 1.0,
    };

    // Footer: decorative tile on the right, source/domain column centered against it.
    let tile_side = 180.0 * s;
    let tile = RoundedRect {
        x: w - pad - tile_side,
        y: h - pad - tile_side,
        w: tile_side,
        h: tile_side,
        radius: 24.0 * s,
        alpha: 0.12,
    };
    let tile_px = 18.0 * s;
    let tile_text = TextRun {
        text: TILE_LABEL.to_string(),
        x: tile.x + (tile_side - m.width(TILE_LABEL, tile_px)) / 2.0,
        y: tile.y + (tile_side - tile_px * 1.2) / 2.0,
        size: tile_px,
        alpha: 1.0,
    };

    let source_px = 28.0 * s;
    let domain_px = 22.0 * s;
    let mut col_h = source_px * 1.2;
    if p.domain.is_some() {
        col_h += 6.0 * s + domain_px * 1.2;
    }
    let col_y = tile.y + (tile_side - col_h) / 2.0;
    let source = TextRun {
        text: p.source.clone(),
        x: pad,
        y: col_y,
        size: source_px,
        alpha: 0.9,
    };
    let domain = p.domain.as_ref().map(|d| TextRun {
        text: d.clone(),
        x: pad,
        y: col_y + source_px * 1.2 + 6.0 * s,
        size: domain_px,
        alpha: 0.85,
    });

    // Title block between the badge and the footer.
    let title_px = 64.0 * s;
    let line_h = title_px * 1.05;
    let title_y = pad + badge_h + 24.0 * s;
    let bottom = tile.y.min(col_y) - 24.0 * s;
    let max_lines = (((bottom - title_y) / line_h).floor().max(1.0)) as usize;
    let lines = fit_lines(
        wrap_words(&p.title, (w - 2.0 * pad).max(1.0), title_px, m),
        max_lines,
    );
    let title_lines = lines
        .into_iter()
        .enumerate()
        .map(|(i, text)| TextRun {
            text,
            x: pad,
            y: title_y + i as f32 * line_h,
            size: title_px,
            alpha: 1.0,
        })
        .collect();

    PosterLayout {
        width: p.width,
        height: p.height,
        badge,
        badge_text,
        title_lines,
        source,
        domain,
        tile,
        tile_text,
    }
}

/// Greedy word wrap. A single word wider than the box gets its own line.
pub fn wrap_words(text: &str, max_w: f32, px: f32, m: &dyn Measure) -> Vec<String> {
    let mut lines = Vec::new();
    let mut cur = String::new();
    for word in text.split_whitespace() {
        if cur.is_empty() {
            cur.push_str(word);
            continue;
        }
        let candidate = format!("{cur} {word}");
        if m.width(&candidate, px) <= max_w {
            cur = candidate;
        } else {
            lines.push(std::mem::take(&mut cur));
            cur.push_str(word);
        }
    }
    if !cur.is_empty() {
        lines.push(cur);
    }
    lines
}

/// Keep `max` lines; the last kept line gets an ellipsis when lines were dropped.
fn fit_lines(mut lines: Vec<String>, max: usize) -> Vec<String> {
    if lines.len() > max {
        lines.truncate(max);
        if let Some(last) = lines.last_mut() {
            if !last.ends_with(ELLIPSIS) {
                last.push(ELLIPSIS);
            }
        }
    }
    lines
}

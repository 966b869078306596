// src/poster/raster.rs
use ab_glyph::{point, Font, FontArc, PxScale, ScaleFont};
use anyhow::{Context, Result};
use image::{DynamicImage, ImageOutputFormat, Rgb, RgbImage};
use std::io::Cursor;

use super::layout::{Measure, PosterLayout, RoundedRect, TextRun};

/// sky-500 → violet-600 (40%) → rose-500.
const GRADIENT: [(f32, [u8; 3]); 3] = [
    (0.0, [0x0e, 0xa5, 0xe9]),
    (0.4, [0x7c, 0x3a, 0xed]),
    (1.0, [0xf4, 0x3f, 0x5e]),
];
const WHITE: [u8; 3] = [0xff, 0xff, 0xff];

pub struct FontMeasure<'a>(pub &'a FontArc);

impl Measure for FontMeasure<'_> {
    fn width(&self, text: &str, px: f32) -> f32 {
        let scaled = self.0.as_scaled(PxScale::from(px));
        let mut w = 0.0;
        let mut prev = None;
        for c in text.chars() {
            let id = scaled.glyph_id(c);
            if let Some(p) = prev {
                w += scaled.kern(p, id);
            }
            w += scaled.h_advance(id);
            prev = Some(id);
        }
        w
    }
}

pub fn draw(layout: &PosterLayout, font: Option<&FontArc>) -> RgbImage {
    let mut img = gradient(layout.width, layout.height);

    fill_rounded_rect(&mut img, &layout.badge);
    fill_rounded_rect(&mut img, &layout.tile);

    if let Some(font) = font {
        draw_text(&mut img, font, &layout.badge_text);
        for line in &layout.title_lines {
            draw_text(&mut img, font, line);
        }
        draw_text(&mut img, font, &layout.source);
        if let Some(d) = &layout.domain {
            draw_text(&mut img, font, d);
        }
        draw_text(&mut img, font, &layout.tile_text);
    }
    img
}

/// 135° linear gradient from the top-left to the bottom-right corner.
pub fn gradient(width: u32, height: u32) -> RgbImage {
    let wx = (width.max(2) - 1) as f32;
    let hy = (height.max(2) - 1) as f32;
    RgbImage::from_fn(width, height, |x, y| {
        let t = (x as f32 / wx + y as f32 / hy) / 2.0;
        Rgb(gradient_at(t))
    })
}

fn gradient_at(t: f32) -> [u8; 3] {
    let t = t.clamp(0.0, 1.0);
    for pair in GRADIENT.windows(2) {
        let (t0, c0) = pair[0];
        let (t1, c1) = pair[1];
        if t <= t1 {
            let f = if t1 > t0 { (t - t0) / (t1 - t0) } else { 0.0 };
            return [
                lerp(c0[0], c1[0], f),
                lerp(c0[1], c1[1], f),
                lerp(c0[2], c1[2], f),
            ];
        }
    }
    GRADIENT[GRADIENT.len() - 1].1
}

fn lerp(a: u8, b: u8, f: f32) -> u8 {
    (a as f32 + (b as f32 - a as f32) * f).round() as u8
}

fn blend(img: &mut RgbImage, x: i64, y: i64, color: [u8; 3], alpha: f32) {
    if x < 0 || y < 0 || x >= img.width() as i64 || y >= img.height() as i64 || alpha <= 0.0 {
        return;
    }
    let a = alpha.min(1.0);
    let px = img.get_pixel_mut(x as u32, y as u32);
    for (ch, c) in px.0.iter_mut().zip(color) {
        *ch = (c as f32 * a + *ch as f32 * (1.0 - a)).round() as u8;
    }
}

/// White translucent rounded box with a one-pixel soft edge on the corners.
fn fill_rounded_rect(img: &mut RgbImage, r: &RoundedRect) {
    let radius = r.radius.min(r.w / 2.0).min(r.h / 2.0).max(0.0);
    let x0 = r.x.floor() as i64;
    let y0 = r.y.floor() as i64;
    let x1 = (r.x + r.w).ceil() as i64;
    let y1 = (r.y + r.h).ceil() as i64;
    for y in y0..y1 {
        for x in x0..x1 {
            let fx = x as f32 + 0.5;
            let fy = y as f32 + 0.5;
            // max/min rather than clamp: the bounds can cross by an ulp.
            let cx = fx.max(r.x + radius).min(r.x + r.w - radius);
            let cy = fy.max(r.y + radius).min(r.y + r.h - radius);
            let d = ((fx - cx).powi(2) + (fy - cy).powi(2)).sqrt();
            let coverage = (radius - d + 0.5).clamp(0.0, 1.0);
            let inside = fx >= r.x && fx <= r.x + r.w && fy >= r.y && fy <= r.y + r.h;
            if inside {
                blend(img, x, y, WHITE, r.alpha * coverage);
            }
        }
    }
}

fn draw_text(img: &mut RgbImage, font: &FontArc, run: &TextRun) {
    if run.text.is_empty() || run.size <= 0.0 {
        return;
    }
    let scale = PxScale::from(run.size);
    let scaled = font.as_scaled(scale);
    let baseline = run.y + scaled.ascent();
    let mut caret = run.x;
    let mut prev = None;
    for c in run.text.chars() {
        let id = scaled.glyph_id(c);
        if let Some(p) = prev {
            caret += scaled.kern(p, id);
        }
        let glyph = id.with_scale_and_position(scale, point(caret, baseline));
        caret += scaled.h_advance(id);
        prev = Some(id);

        if let Some(outlined) = font.outline_glyph(glyph) {
            let bounds = outlined.px_bounds();
            outlined.draw(|gx, gy, cov| {
                let x = bounds.min.x as i64 + gx as i64;
                let y = bounds.min.y as i64 + gy as i64;
                blend(img, x, y, WHITE, run.alpha * cov);
            });
        }
    }
}

pub fn encode_png(img: RgbImage) -> Result<Vec<u8>> {
    let mut buf = Vec::new();
    DynamicImage::ImageRgb8(img)
        .write_to(&mut Cursor::new(&mut buf), ImageOutputFormat::Png)
        .context("encoding poster png")?;
    Ok(buf)
}

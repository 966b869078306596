// src/suggest/variants.rs
use std::collections::HashSet;

use super::{PostVariant, VARIANT_COUNT};
use crate::config::TextConfig;
use crate::links::display_domain;

/// `#keyword` for each keyword, then the brand tags; case-insensitive dedup, capped.
pub fn hashtags(keywords: &[String], cfg: &TextConfig) -> Vec<String> {
    let mut seen = HashSet::new();
    keywords
        .iter()
        .chain(cfg.brand_hashtags.iter())
        .filter_map(|raw| {
            let body = raw.trim().trim_start_matches('#');
            (!body.is_empty()).then(|| format!("#{body}"))
        })
        .filter(|tag| seen.insert(tag.to_lowercase()))
        .take(cfg.max_hashtags)
        .collect()
}

fn captions(title: &str, domain: Option<&str>) -> [String; VARIANT_COUNT] {
    let alert = match domain {
        Some(d) => format!("Trend alert: {title}. Read more on {d}"),
        None => format!("Trend alert: {title}."),
    };
    let saving = match domain {
        Some(d) => format!("Saving this for the next room refresh: {title} (via {d})"),
        None => format!("Saving this for the next room refresh: {title}"),
    };
    [
        format!("{title} — would you try this look at home?"),
        alert,
        saving,
    ]
}

pub(crate) fn build(
    title: &str,
    link: &str,
    keywords: &[String],
    cfg: &TextConfig,
) -> Vec<PostVariant> {
    let title = title.trim();
    let domain = display_domain(link);
    let tags = hashtags(keywords, cfg);
    captions(title, domain.as_deref())
        .into_iter()
        .map(|caption| PostVariant {
            caption,
            hashtags: tags.clone(),
        })
        .collect()
}

// src/suggest/keywords.rs
use once_cell::sync::Lazy;
use regex::Regex;
use std::collections::HashSet;

use crate::config::TextConfig;

// Runs of Unicode letters/digits; everything else is a boundary.
static RE_TOKEN: Lazy<Regex> = Lazy::new(|| Regex::new(r"[\p{L}\p{N}]+").expect("token regex"));

/// Lowercased alphanumeric tokens in input order.
pub fn tokenize(input: &str) -> Vec<String> {
    RE_TOKEN
        .find_iter(input)
        .map(|m| m.as_str().to_lowercase())
        .collect()
}

pub(crate) fn extract(title: &str, stopwords: &HashSet<String>, cfg: &TextConfig) -> Vec<String> {
    let mut seen = HashSet::new();
    let mut out = Vec::new();
    for tok in tokenize(title) {
        if out.len() >= cfg.max_keywords {
            break;
        }
        if tok.chars().count() < cfg.min_token_len {
            continue;
        }
        if tok.chars().all(|c| c.is_numeric()) || stopwords.contains(&tok) {
            continue;
        }
        if seen.insert(tok.clone()) {
            out.push(tok);
        }
    }
    out
}

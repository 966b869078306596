// src/links.rs
//! URL helpers shared by the fetcher (dedup keys) and the text/poster stages (domain lines).

use url::Url;

/// Hostname without a leading `www.`; `None` for anything that isn't an absolute URL with a host.
pub fn display_domain(raw: &str) -> Option<String> {
    let url = Url::parse(raw.trim()).ok()?;
    let host = url.host_str()?;
    let host = host.strip_prefix("www.").unwrap_or(host);
    if host.is_empty() {
        return None;
    }
    Some(host.to_string())
}

/// Key under which two links count as the same article.
///
/// Lowercased host without `www.`, no fragment, no `utm_*` params, no trailing slash.
/// Unparsable links are compared by their trimmed text.
pub fn canonical_link(raw: &str) -> String {
    let trimmed = raw.trim();
    let Ok(mut url) = Url::parse(trimmed) else {
        return trimmed.to_string();
    };
    url.set_fragment(None);

    let kept: Vec<(String, String)> = url
        .query_pairs()
        .filter(|(k, _)| !k.to_ascii_lowercase().starts_with("utm_"))
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect();
    if kept.is_empty() {
        url.set_query(None);
    } else {
        url.query_pairs_mut().clear().extend_pairs(kept);
    }

    let host = url
        .host_str()
        .map(|h| h.strip_prefix("www.").unwrap_or(h).to_ascii_lowercase())
        .unwrap_or_default();
    let path = url.path().trim_end_matches('/');
    match url.query() {
        Some(q) => format!("{host}{path}?{q}"),
        None => format!("{host}{path}"),
    }
}

/// Value of the first query pair whose key is one of `keys`.
///
/// Repeated keys and aliases never conflict: the earliest occurrence wins.
pub fn first_query_value(raw: Option<&str>, keys: &[&str]) -> Option<String> {
    url::form_urlencoded::parse(raw?.as_bytes())
        .find(|(k, _)| keys.iter().any(|key| k == key))
        .map(|(_, v)| v.into_owned())
}

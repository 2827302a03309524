//! URL normalization and validation helpers.
//!
//! Normalized URLs are the currency of deduplication: the visited set, the
//! agent's temp storage, and link dedup all key on the normalized form.

use url::Url;

/// Canonicalize a URL for dedup purposes.
///
/// Lowercases the host, drops the fragment and query string, and trims a
/// trailing `/` from the path unless the path is just `/`. Strings that do
/// not parse as URLs pass through unchanged.
///
/// Dropping the query string means `?lang=en` variants of a page collapse
/// into a single visited entry.
#[must_use]
pub fn normalize_url(raw: &str) -> String {
    let Ok(mut url) = Url::parse(raw) else {
        return raw.to_string();
    };

    url.set_fragment(None);
    url.set_query(None);

    if let Some(host) = url.host_str() {
        let lowered = host.to_ascii_lowercase();
        if lowered != host {
            // set_host only fails for cannot-be-a-base URLs, which already
            // have a host here.
            let _ = url.set_host(Some(&lowered));
        }
    }

    let path = url.path();
    if path != "/" && path.ends_with('/') {
        let trimmed = path.trim_end_matches('/').to_string();
        url.set_path(&trimmed);
    }

    url.to_string()
}

/// Origin key (`scheme://host[:port]`) used by the robots cache.
#[must_use]
pub fn origin_of(url: &Url) -> String {
    url.origin().ascii_serialization()
}

/// Whether a string is an absolute http(s) URL worth fetching.
#[must_use]
pub fn is_valid_url(url: &str) -> bool {
    if url.is_empty() {
        return false;
    }

    match Url::parse(url) {
        Ok(parsed) => matches!(parsed.scheme(), "http" | "https"),
        Err(_) => false,
    }
}

/// Collapse runs of whitespace into single spaces and trim the ends.
#[must_use]
pub fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Truncate to at most `max_chars` characters on a char boundary.
#[must_use]
pub fn truncate_chars(text: &str, max_chars: usize) -> String {
    if text.chars().count() <= max_chars {
        text.to_string()
    } else {
        text.chars().take(max_chars).collect()
    }
}

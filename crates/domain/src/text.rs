//! Text helpers shared by the stores, the matcher and the renderer

use regex::Regex;
use std::sync::LazyLock;

static LINK_PATTERN: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r#"https?://[^\s<>"]+|www\.[^\s<>"]+"#).expect("link pattern is valid")
});

/// Canonical form of a keyword or forbidden word.
///
/// Trims, collapses internal whitespace to single spaces and lowercases.
/// Returns `None` when nothing is left.
pub fn normalize_term(raw: &str) -> Option<String> {
    let joined = raw.split_whitespace().collect::<Vec<_>>().join(" ");
    if joined.is_empty() {
        None
    } else {
        Some(joined.to_lowercase())
    }
}

/// Case-insensitive substring test of an already-normalized term against a title
pub fn title_contains(title_lower: &str, term: &str) -> bool {
    !term.is_empty() && title_lower.contains(term)
}

/// Truncate to at most `max` characters, respecting char boundaries
pub fn truncate_chars(text: &str, max: usize) -> &str {
    match text.char_indices().nth(max) {
        Some((byte_idx, _)) => &text[..byte_idx],
        None => text,
    }
}

/// First http(s) or www link in `body`
pub fn extract_first_link(body: &str) -> Option<String> {
    LINK_PATTERN.find(body).map(|m| m.as_str().to_string())
}

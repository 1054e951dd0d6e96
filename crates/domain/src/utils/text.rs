//! Plain-text helpers for event descriptions.

use once_cell::sync::Lazy;
use regex::Regex;

#[allow(clippy::expect_used)]
static LINE_BREAK_TAG: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)<\s*(?:br\s*/?|/p|/div|/li)\s*>").expect("valid line break regex"));

#[allow(clippy::expect_used)]
static ANY_TAG: Lazy<Regex> = Lazy::new(|| Regex::new(r"<[^>]*>").expect("valid tag regex"));

#[allow(clippy::expect_used)]
static BLANK_LINES: Lazy<Regex> = Lazy::new(|| Regex::new(r"\n{3,}").expect("valid blank line regex"));

/// Convert an HTML-ish description to plain text.
#[must_use]
pub fn strip_html(input: &str) -> String {
    let with_breaks = LINE_BREAK_TAG.replace_all(input, "\n");
    let without_tags = ANY_TAG.replace_all(&with_breaks, "");
    let decoded = without_tags
        .replace("&nbsp;", " ")
        .replace("&lt;", "<")
        .replace("&gt;", ">")
        .replace("&quot;", "\"")
        .replace("&#39;", "'")
        .replace("&amp;", "&");
    BLANK_LINES.replace_all(decoded.trim(), "\n\n").into_owned()
}

/// Truncate to at most `max_chars` characters, suffix included.
#[must_use]
pub fn truncate_chars(input: &str, max_chars: usize, suffix: &str) -> String {
    if input.chars().count() <= max_chars {
        return input.to_string();
    }
    let keep = max_chars.saturating_sub(suffix.chars().count());
    let mut out: String = input.chars().take(keep).collect();
    out.truncate(out.trim_end().len());
    out.push_str(suffix);
    out
}

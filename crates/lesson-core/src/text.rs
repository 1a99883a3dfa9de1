//! Text helpers for titles and descriptions.
//!
//! Authored content is full of multi-byte characters (emoji, `×`, `÷`), and
//! `&str[..n]` panics when `n` falls inside one. Truncation here always snaps
//! to a char boundary.

/// Truncate a string to at most `max_bytes` bytes at a char boundary.
#[inline]
pub fn truncate_str(s: &str, max_bytes: usize) -> &str {
    if s.len() <= max_bytes {
        return s;
    }
    let mut end = max_bytes;
    while end > 0 && !s.is_char_boundary(end) {
        end -= 1;
    }
    &s[..end]
}

/// Truncate `s` and append `suffix` if the original exceeds `max_bytes`.
///
/// The result is at most `max_bytes` bytes long, suffix included.
pub fn truncate_with_suffix(s: &str, max_bytes: usize, suffix: &str) -> String {
    if s.len() <= max_bytes {
        return s.to_owned();
    }
    let body_budget = max_bytes.saturating_sub(suffix.len());
    let prefix = truncate_str(s, body_budget);
    format!("{prefix}{suffix}")
}

/// Case-insensitive substring test. `needle_lower` must already be lowercase.
pub fn contains_lowercase(haystack: &str, needle_lower: &str) -> bool {
    haystack.to_lowercase().contains(needle_lower)
}

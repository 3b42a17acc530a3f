//! Slug normalization for page URL segments.

use regex::Regex;
use std::sync::OnceLock;

static STRIP: OnceLock<Regex> = OnceLock::new();
static COLLAPSE: OnceLock<Regex> = OnceLock::new();

/// Normalize a raw slug into a URL-safe segment.
///
/// Lowercases, drops everything that is not alphanumeric, underscore,
/// hyphen or whitespace, then collapses runs of whitespace and hyphens
/// into a single hyphen. Leading and trailing hyphens/underscores are
/// trimmed.
///
/// ```
/// use page_store::slug::slugify;
///
/// assert_eq!(slugify("Hello, World!"), "hello-world");
/// ```
pub fn slugify(raw: &str) -> String {
    let strip = STRIP.get_or_init(|| Regex::new(r"[^\w\s-]").expect("valid regex"));
    let collapse = COLLAPSE.get_or_init(|| Regex::new(r"[-\s]+").expect("valid regex"));

    let lowered = raw.to_lowercase();
    let stripped = strip.replace_all(&lowered, "");
    let collapsed = collapse.replace_all(stripped.trim(), "-");

    collapsed.trim_matches(|c| c == '-' || c == '_').to_string()
}

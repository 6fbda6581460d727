use once_cell::sync::Lazy;
use regex::Regex;

static EMAIL: Lazy<Regex> = Lazy::new(|| Regex::new(r"[\w.\-]+@[\w.\-]+").unwrap());
static LONG_DIGITS: Lazy<Regex> = Lazy::new(|| Regex::new(r"\b\d{6,}\b").unwrap());
static PATH: Lazy<Regex> = Lazy::new(|| Regex::new(r"(/[A-Za-z0-9_\-.]+)+").unwrap());
static HTML_TAG: Lazy<Regex> = Lazy::new(|| Regex::new(r"<[^>]+>").unwrap());

/// Strips secrets-shaped substrings before the message reaches a provider or
/// a cache key. Total and idempotent.
///
/// Pass order is load-bearing: digit runs are masked before paths so that a
/// numeric path segment cannot survive inside a partially-masked path.
pub fn redact(message: &str) -> String {
    let s = EMAIL.replace_all(message, "[REDACTED_EMAIL]");
    let s = LONG_DIGITS.replace_all(&s, "[REDACTED_NUM]");
    let s = PATH.replace_all(&s, "[REDACTED_PATH]");
    let s = HTML_TAG.replace_all(&s, "[REDACTED_HTML]");
    s.into_owned()
}

//! Contact-string normalization and free-text linkification.
//!
//! Normalization only ever changes an `href`. The characters a reader sees are
//! always the characters the user typed.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::Serialize;

static EMAIL: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("valid email regex"));

/// Absolute URLs, bare `www.` hosts and email addresses, in that order of preference.
static LINK_TOKEN: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r#"(?i)https?://[^\s<>"']+|www\.[^\s<>"']+|[A-Za-z0-9._%+\-]+@[A-Za-z0-9.\-]+\.[A-Za-z]{2,}"#,
    )
    .expect("valid link regex")
});

const SCHEMES: &[&str] = &["http://", "https://", "mailto:", "tel:"];

/// Sentence punctuation that usually ends a sentence rather than a link.
const TRAILING_PUNCTUATION: &[char] = &['.', ',', ';', ':', '!', '?', ')'];

/// A unit of linkified text.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Segment {
    Text { value: String },
    Link { display: String, href: String },
}

/// Turns a contact value into an `href`.
///
/// Empty stays empty; known schemes pass through; `local@domain.tld` gets
/// `mailto:`; anything else gets `https://`. Idempotent.
pub fn normalize_url(raw: &str) -> String {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return String::new();
    }
    if has_scheme(trimmed) {
        return trimmed.to_string();
    }
    if EMAIL.is_match(trimmed) {
        return format!("mailto:{trimmed}");
    }
    format!("https://{trimmed}")
}

/// Turns a phone number into a `tel:` href, keeping digits and a leading `+`.
pub fn normalize_tel(raw: &str) -> String {
    let trimmed = raw.trim();
    let number = strip_prefix_ignore_case(trimmed, "tel:").unwrap_or(trimmed).trim_start();

    let digits: String = number.chars().filter(char::is_ascii_digit).collect();
    if digits.is_empty() {
        return String::new();
    }
    if number.starts_with('+') {
        format!("tel:+{digits}")
    } else {
        format!("tel:{digits}")
    }
}

/// Splits `text` into plain and link segments.
///
/// Concatenating the display text of the result always yields `text`.
pub fn linkify(text: &str) -> Vec<Segment> {
    let mut segments = Vec::new();
    let mut plain_start = 0;

    for found in LINK_TOKEN.find_iter(text) {
        let token = found.as_str().trim_end_matches(TRAILING_PUNCTUATION);
        if token.is_empty() {
            continue;
        }
        let link_end = found.start() + token.len();

        if found.start() > plain_start {
            segments.push(Segment::Text {
                value: text[plain_start..found.start()].to_string(),
            });
        }
        segments.push(Segment::Link {
            display: token.to_string(),
            href: normalize_url(token),
        });
        plain_start = link_end;
    }

    if plain_start < text.len() {
        segments.push(Segment::Text {
            value: text[plain_start..].to_string(),
        });
    }
    segments
}

fn has_scheme(value: &str) -> bool {
    SCHEMES
        .iter()
        .any(|scheme| strip_prefix_ignore_case(value, scheme).is_some())
}

fn strip_prefix_ignore_case<'a>(value: &'a str, prefix: &str) -> Option<&'a str> {
    let head = value.get(..prefix.len())?;
    head.eq_ignore_ascii_case(prefix)
        .then(|| &value[prefix.len()..])
}

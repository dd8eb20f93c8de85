//! URL normalization for user-submitted links.
//!
//! Users may paste `example.com/page` without a scheme; such input is stored
//! as `https://example.com/page`. Input that already carries `http://` or
//! `https://` (in any letter case) is kept verbatim.

use regex::Regex;
use std::sync::LazyLock;
use url::Url;

/// Matches an explicit HTTP(S) scheme prefix, case-insensitively.
static SCHEME_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^https?://").expect("static regex compiles"));

/// Errors that can occur during URL normalization.
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum UrlNormalizationError {
    #[error("URL is required")]
    Empty,

    #[error("Invalid URL format: {0}")]
    InvalidFormat(String),
}

/// Adds `https://` to input that has no HTTP(S) scheme.
///
/// Trims surrounding whitespace. Empty input stays empty.
///
/// # Examples
///
/// ```ignore
/// assert_eq!(with_default_scheme("example.com"), "https://example.com");
/// assert_eq!(with_default_scheme("http://x.com"), "http://x.com");
/// assert_eq!(with_default_scheme("HTTPS://X.COM"), "HTTPS://X.COM");
/// ```
pub fn with_default_scheme(input: &str) -> String {
    let trimmed = input.trim();
    if trimmed.is_empty() || SCHEME_REGEX.is_match(trimmed) {
        return trimmed.to_string();
    }
    format!("https://{trimmed}")
}

/// Normalizes a submitted URL and checks that it is usable as a redirect target.
///
/// The returned string is exactly [`with_default_scheme`]'s output; parsing is
/// only used to reject input that could never be redirected to.
///
/// # Errors
///
/// Returns [`UrlNormalizationError::Empty`] for blank input.
/// Returns [`UrlNormalizationError::InvalidFormat`] if the prefixed value is
/// not an absolute URL with a host.
pub fn normalize_url(input: &str) -> Result<String, UrlNormalizationError> {
    let normalized = with_default_scheme(input);
    if normalized.is_empty() {
        return Err(UrlNormalizationError::Empty);
    }

    let parsed =
        Url::parse(&normalized).map_err(|e| UrlNormalizationError::InvalidFormat(e.to_string()))?;

    if parsed.host_str().is_none_or(str::is_empty) {
        return Err(UrlNormalizationError::InvalidFormat(
            "missing host".to_string(),
        ));
    }

    Ok(normalized)
}

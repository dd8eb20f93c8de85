//! Short code generation and custom code sanitization.
//!
//! Random codes carry no collision pre-check: uniqueness is enforced by the
//! store at insert time and surfaced as [`crate::error::AppError::CodeTaken`].

use rand::Rng;
use rand::distr::Alphanumeric;

/// Number of characters in a generated code.
pub const CODE_LENGTH: usize = 6;

/// Generates a random short code.
///
/// Each of the [`CODE_LENGTH`] characters is drawn independently and
/// uniformly from `a-z`, `A-Z` and `0-9` (62 symbols).
///
/// # Examples
///
/// ```ignore
/// let code = generate_code();
/// assert_eq!(code.len(), 6);
/// assert!(code.chars().all(|c| c.is_ascii_alphanumeric()));
/// ```
pub fn generate_code() -> String {
    rand::rng()
        .sample_iter(&Alphanumeric)
        .take(CODE_LENGTH)
        .map(char::from)
        .collect()
}

/// Sanitizes user input into a custom code.
///
/// Lowercases the input and drops every character outside `a-z`, `0-9` and
/// `-`. Used by the interactive front-ends before a code is submitted; the
/// public API passes codes through untouched.
///
/// # Examples
///
/// ```ignore
/// assert_eq!(sanitize_custom_code("My Promo_2024!"), "mypromo2024");
/// assert_eq!(sanitize_custom_code("summer-sale"), "summer-sale");
/// ```
pub fn sanitize_custom_code(input: &str) -> String {
    input
        .chars()
        .flat_map(char::to_lowercase)
        .filter(|c| c.is_ascii_lowercase() || c.is_ascii_digit() || *c == '-')
        .collect()
}

/// Treats blank custom codes as absent. Other codes are returned untouched.
pub fn non_blank(code: Option<String>) -> Option<String> {
    code.filter(|c| !c.trim().is_empty())
}

//! DTOs for link shortening endpoint.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use validator::Validate;

use crate::domain::entities::ShortLink;

/// Request to shorten a single URL.
///
/// Field names follow the widget's camelCase payload.
#[derive(Debug, Deserialize, Validate)]
#[serde(rename_all = "camelCase")]
pub struct ShortenRequest {
    /// The URL to shorten. A missing scheme is completed with `https://`.
    #[validate(
        required(message = "URL is required"),
        length(min = 1, message = "URL is required")
    )]
    pub url: Option<String>,

    /// Optional custom short code, passed through as submitted.
    #[validate(length(max = 64, message = "Custom code must not exceed 64 characters"))]
    pub custom_code: Option<String>,
}

/// Created short link.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ShortenResponse {
    pub short_code: String,
    pub original_url: String,
    pub expiry_date: DateTime<Utc>,
    pub short_url: String,
}

impl ShortenResponse {
    pub fn new(link: ShortLink, short_url: String) -> Self {
        Self {
            short_code: link.short_code,
            original_url: link.original_url,
            expiry_date: link.expiry_date,
            short_url,
        }
    }
}

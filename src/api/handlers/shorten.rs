//! Handler for link shortening endpoint.

use axum::{
    Json,
    extract::{State, rejection::JsonRejection},
};
use validator::Validate;

use crate::api::dto::shorten::{ShortenRequest, ShortenResponse};
use crate::error::AppError;
use crate::state::AppState;

/// Creates a short link for one URL.
///
/// # Endpoint
///
/// `POST /api/shorten`
///
/// Open to any origin (CORS) so the embeddable widget can call it from
/// third-party pages. No authentication.
///
/// # Request Body
///
/// ```json
/// {
///   "url": "example.com/some/page",
///   "customCode": "my-link"
/// }
/// ```
///
/// # Response
///
/// ```json
/// {
///   "shortCode": "my-link",
///   "originalUrl": "https://example.com/some/page",
///   "expiryDate": "2025-02-01T10:00:00Z",
///   "shortUrl": "https://urlai.example/my-link"
/// }
/// ```
///
/// # Errors
///
/// Returns 400 Bad Request if the body is malformed or the URL is missing or invalid.
/// Returns 409 Conflict if the short code is already taken.
/// Returns 500 Internal Server Error if the store fails.
pub async fn shorten_handler(
    State(state): State<AppState>,
    payload: Result<Json<ShortenRequest>, JsonRejection>,
) -> Result<Json<ShortenResponse>, AppError> {
    let Json(payload) = payload?;
    payload.validate()?;

    let url = payload.url.unwrap_or_default();

    let link = state
        .link_service
        .create_short_link(&url, payload.custom_code)
        .await?;

    let short_url = state.link_service.short_url(&link.short_code);

    Ok(Json(ShortenResponse::new(link, short_url)))
}

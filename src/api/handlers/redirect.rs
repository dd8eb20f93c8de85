//! Handler for short URL redirect.

use axum::{
    extract::{Path, State},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};
use tracing::{debug, error};

use crate::error::AppError;
use crate::state::AppState;

/// Redirects a short code to its original URL.
///
/// # Endpoint
///
/// `GET /{code}`
///
/// # Request Flow
///
/// 1. Look up the code in the store
/// 2. If the link has expired, delete it
/// 3. Return 302 Found to the original URL
///
/// # Errors
///
/// Failures never surface as error statuses: the visitor is sent back to
/// the home page with an `error` query parameter instead.
///
/// - Unknown code: `/?error=not-found`
/// - Expired link: `/?error=expired`
/// - Store failure: `/?error=unavailable`
pub async fn redirect_handler(
    Path(code): Path<String>,
    State(state): State<AppState>,
) -> Response {
    match state.link_service.resolve(&code).await {
        Ok(original_url) => {
            debug!(%code, "Redirecting");
            found(&original_url)
        }
        Err(e) => {
            let reason = match &e {
                AppError::NotFound { .. } => "not-found",
                AppError::Expired { .. } => "expired",
                other => {
                    error!(%code, error = %other, "Failed to resolve short link");
                    "unavailable"
                }
            };
            found(&format!("/?error={reason}"))
        }
    }
}

/// Builds a `302 Found` response.
fn found(location: &str) -> Response {
    (StatusCode::FOUND, [(header::LOCATION, location.to_string())]).into_response()
}

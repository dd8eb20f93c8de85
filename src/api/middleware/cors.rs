//! Cross-origin policy for the public shorten endpoint.

use axum::http::{Method, header};
use std::time::Duration;
use tower_http::cors::{Any, CorsLayer};

/// How long browsers may cache a preflight answer.
const PREFLIGHT_MAX_AGE: Duration = Duration::from_secs(3600);

/// Creates the CORS middleware for `/api`.
///
/// Any origin may call the API: the widget runs on third-party pages whose
/// origins are not known in advance. Credentials are never allowed, so the
/// wildcard origin is accepted by browsers.
pub fn layer() -> CorsLayer {
    CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::ACCEPT])
        .max_age(PREFLIGHT_MAX_AGE)
}

//! API route configuration.
//!
//! The API is public: no authentication, any origin allowed via
//! [`crate::api::middleware::cors`].

use crate::api::handlers::shorten_handler;
use crate::api::middleware::cors;
use crate::state::AppState;
use axum::{Router, routing::post};

/// Public API routes, mounted under `/api`.
///
/// # Endpoints
///
/// - `POST /shorten` - Create a short link (used by the widget)
pub fn public_routes() -> Router<AppState> {
    Router::new()
        .route("/shorten", post(shorten_handler))
        .layer(cors::layer())
}

//! Top-level router configuration combining API and web routes.
//!
//! # Route Structure
//!
//! - `GET  /`                  - Home page (web)
//! - `POST /`                  - Create a link from the home page form
//! - `POST /links/{id}/delete` - Delete a link
//! - `GET|POST /inject`        - Widget injection tool
//! - `GET  /health`            - Health check: store, cache
//! - `GET  /urlai-widget.js`   - Embeddable widget script
//! - `/api/*`                  - Public REST API (CORS open)
//! - `GET  /{code}`            - Short link redirect
//!
//! Static segments win over `/{code}`, so a link whose code is `health` or
//! `inject` cannot be reached through the redirect route.
//!
//! # Middleware
//!
//! - **Tracing** - Structured request/response logging
//! - **CORS** - Any origin, on `/api` only
//! - **Path normalization** - Trailing slash handling

use crate::api;
use crate::api::handlers::{health_handler, redirect_handler, widget_handler};
use crate::api::middleware::tracing;
use crate::state::AppState;
use crate::utils::widget_injector::WIDGET_SCRIPT_NAME;
use crate::web;
use axum::Router;
use axum::routing::get;
use tower::Layer;
use tower_http::normalize_path::{NormalizePath, NormalizePathLayer};

/// Constructs the application router with all routes and middleware.
pub fn app_router(state: AppState) -> NormalizePath<Router> {
    let router = Router::new()
        .merge(web::routes::public_routes())
        .route("/health", get(health_handler))
        .route(&format!("/{WIDGET_SCRIPT_NAME}"), get(widget_handler))
        .nest("/api", api::routes::public_routes())
        .route("/{code}", get(redirect_handler))
        .with_state(state)
        .layer(tracing::layer());

    NormalizePathLayer::trim_trailing_slash().layer(router)
}

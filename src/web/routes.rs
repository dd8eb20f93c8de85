//! Web page route configuration.

use crate::state::AppState;
use crate::web::handlers::{
    create_link_handler, delete_link_handler, home_handler, inject_form_handler, inject_handler,
};
use axum::{
    Router,
    routing::{get, post},
};

/// Browser-facing routes. No authentication.
///
/// # Endpoints
///
/// - `GET  /`                   - Home page: creation form and listing
/// - `POST /`                   - Create a link from the form
/// - `POST /links/{id}/delete`  - Delete a link
/// - `GET  /inject`             - Widget injection tool
/// - `POST /inject`             - Upload an HTML page, download it with the widget
pub fn public_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(home_handler).post(create_link_handler))
        .route("/links/{id}/delete", post(delete_link_handler))
        .route("/inject", get(inject_form_handler).post(inject_handler))
}

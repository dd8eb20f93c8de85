//! Handler serving the embeddable widget script.

use askama::Template;
use axum::{
    extract::State,
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};
use tracing::error;

use crate::state::AppState;
use crate::utils::widget_injector::WIDGET_SCRIPT_NAME;

/// The widget script, rendered with the service origin baked in.
///
/// Exposes `window.URLAIWidget.shorten(options)` and
/// `window.URLAIWidget.createButton(containerId)`.
#[derive(Template)]
#[template(path = "urlai-widget.js", escape = "none")]
pub struct WidgetScript<'a> {
    pub base_url: &'a str,
    pub script_name: &'a str,
}

/// Serves the widget script.
///
/// # Endpoint
///
/// `GET /urlai-widget.js`
pub async fn widget_handler(State(state): State<AppState>) -> Response {
    let script = WidgetScript {
        base_url: state.link_service.public_base_url(),
        script_name: WIDGET_SCRIPT_NAME,
    };

    match script.render() {
        Ok(body) => (
            [
                (header::CONTENT_TYPE, "application/javascript; charset=utf-8"),
                (header::CACHE_CONTROL, "public, max-age=300"),
            ],
            body,
        )
            .into_response(),
        Err(e) => {
            error!(error = %e, "Failed to render widget script");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

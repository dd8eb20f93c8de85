//! Widget injection tool.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::{Multipart, State},
    http::{StatusCode, header},
    response::{IntoResponse, Response},
};
use tracing::{debug, warn};

use crate::state::AppState;
use crate::utils::widget_injector::{inject_widget, injected_file_name, widget_script_tag};

/// Multipart field carrying the uploaded page.
const FILE_FIELD: &str = "file";

/// Template for the injection page.
#[derive(Template, WebTemplate)]
#[template(path = "inject.html")]
pub struct InjectTemplate {
    pub script_tag: String,
    pub error: Option<String>,
}

impl InjectTemplate {
    fn new(state: &AppState, error: Option<String>) -> Self {
        Self {
            script_tag: widget_script_tag(state.link_service.public_base_url()),
            error,
        }
    }
}

/// Renders the injection page.
///
/// # Endpoint
///
/// `GET /inject`
pub async fn inject_form_handler(State(state): State<AppState>) -> InjectTemplate {
    InjectTemplate::new(&state, None)
}

/// Returns the uploaded HTML page with the widget script inserted.
///
/// # Endpoint
///
/// `POST /inject` (multipart, field `file`)
///
/// The script tag goes before `</body>`, or at the end when there is no body
/// tag. A page already referencing the widget is returned unchanged. The
/// result is sent as an attachment named `{stem}-with-urlai.html`.
///
/// # Errors
///
/// Re-renders the page with 400 Bad Request when no file is sent, the file
/// is not `.html`, or it is not UTF-8 text.
pub async fn inject_handler(State(state): State<AppState>, multipart: Multipart) -> Response {
    match read_upload(multipart).await {
        Ok((file_name, html)) => {
            let injected = inject_widget(&html, state.link_service.public_base_url());
            let download = injected_file_name(&file_name);
            debug!(%file_name, %download, "Widget injected");

            (
                [
                    (header::CONTENT_TYPE, "text/html; charset=utf-8".to_string()),
                    (
                        header::CONTENT_DISPOSITION,
                        format!("attachment; filename=\"{download}\""),
                    ),
                ],
                injected,
            )
                .into_response()
        }
        Err(message) => (
            StatusCode::BAD_REQUEST,
            InjectTemplate::new(&state, Some(message.to_string())),
        )
            .into_response(),
    }
}

/// Reads the uploaded file name and its text.
async fn read_upload(mut multipart: Multipart) -> Result<(String, String), &'static str> {
    loop {
        let field = match multipart.next_field().await {
            Ok(Some(field)) => field,
            Ok(None) => return Err("Please select an HTML file"),
            Err(e) => {
                warn!(error = %e, "Malformed upload");
                return Err("Failed to read the uploaded file");
            }
        };

        if field.name() != Some(FILE_FIELD) {
            continue;
        }

        let file_name = field.file_name().unwrap_or_default().to_string();
        if !file_name.to_ascii_lowercase().ends_with(".html") {
            return Err("Please select an HTML file");
        }

        let bytes = field.bytes().await.map_err(|e| {
            warn!(error = %e, "Failed to read upload body");
            "Failed to read the uploaded file"
        })?;

        let html = String::from_utf8(bytes.to_vec()).map_err(|_| "The file is not valid UTF-8 text")?;
        return Ok((file_name, html));
    }
}

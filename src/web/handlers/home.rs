//! Home page: creation form and link listing.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Query, State},
    response::{IntoResponse, Redirect, Response},
};
use serde::Deserialize;
use tracing::warn;

use crate::domain::entities::ShortLink;
use crate::state::AppState;
use crate::utils::code_generator::sanitize_custom_code;

/// Query parameters the home page understands.
///
/// `error` is set by the redirect and delete handlers, `created` by a
/// successful form submission.
#[derive(Debug, Default, Deserialize)]
pub struct HomeQuery {
    pub error: Option<String>,
    pub created: Option<String>,
}

/// Submitted creation form.
#[derive(Debug, Default, Deserialize)]
#[serde(default)]
pub struct CreateLinkForm {
    pub url: String,
    pub custom_code: String,
}

/// One row of the listing.
#[derive(Debug, Clone)]
pub struct LinkView {
    pub id: String,
    pub short_url: String,
    pub original_url: String,
    pub expires_on: String,
}

impl LinkView {
    fn new(link: ShortLink, short_url: String) -> Self {
        Self {
            id: link.id,
            short_url,
            original_url: link.original_url,
            expires_on: link.expiry_date.format("%b %-d, %Y").to_string(),
        }
    }
}

/// Template for the home page.
#[derive(Template, WebTemplate)]
#[template(path = "index.html")]
pub struct HomeTemplate {
    pub url: String,
    pub custom_code: String,
    pub error: Option<String>,
    pub created: Option<String>,
    pub links: Vec<LinkView>,
}

/// Renders the home page.
///
/// # Endpoint
///
/// `GET /`
///
/// Listing the links first deletes every expired one.
pub async fn home_handler(
    State(state): State<AppState>,
    Query(query): Query<HomeQuery>,
) -> HomeTemplate {
    let error = query
        .error
        .as_deref()
        .map(|reason| redirect_error_message(reason).to_string());
    let created = query
        .created
        .as_deref()
        .map(|code| state.link_service.short_url(code));

    render(&state, CreateLinkForm::default(), error, created).await
}

/// Creates a link from the home page form.
///
/// # Endpoint
///
/// `POST /`
///
/// The custom code is sanitized (lowercased, anything outside `a-z`, `0-9`
/// and `-` dropped). On success redirects (303) to `/?created={code}`;
/// otherwise re-renders the page with the submitted values and the error,
/// using the error's HTTP status.
pub async fn create_link_handler(
    State(state): State<AppState>,
    Form(form): Form<CreateLinkForm>,
) -> Response {
    let custom_code = sanitize_custom_code(&form.custom_code);

    match state
        .link_service
        .create_short_link(&form.url, Some(custom_code.clone()))
        .await
    {
        Ok(link) => Redirect::to(&format!("/?created={}", link.short_code)).into_response(),
        Err(e) => {
            let status = e.status_code();
            let form = CreateLinkForm {
                url: form.url,
                custom_code,
            };
            let page = render(&state, form, Some(e.to_string()), None).await;
            (status, page).into_response()
        }
    }
}

async fn render(
    state: &AppState,
    form: CreateLinkForm,
    mut error: Option<String>,
    created: Option<String>,
) -> HomeTemplate {
    let links = match state.link_service.list_links().await {
        Ok(links) => links
            .into_iter()
            .map(|link| {
                let short_url = state.link_service.short_url(&link.short_code);
                LinkView::new(link, short_url)
            })
            .collect(),
        Err(e) => {
            warn!(error = %e, "Failed to load links for home page");
            error.get_or_insert_with(|| "Could not load your links".to_string());
            Vec::new()
        }
    };

    HomeTemplate {
        url: form.url,
        custom_code: form.custom_code,
        error,
        created,
        links,
    }
}

/// User-facing text for an `error` query parameter.
pub fn redirect_error_message(reason: &str) -> &'static str {
    match reason {
        "not-found" => "Short link not found",
        "expired" => "This short link has expired",
        "unavailable" => "The link service is unavailable, try again later",
        "delete-failed" => "Could not delete the link",
        _ => "Something went wrong",
    }
}

//! Link deletion from the home page.

use axum::{
    extract::{Path, State},
    response::Redirect,
};
use tracing::error;

use crate::state::AppState;

/// Deletes a link and returns to the home page.
///
/// # Endpoint
///
/// `POST /links/{id}/delete`
///
/// No ownership check. Unknown ids are accepted. A store failure sends the
/// visitor back with `?error=delete-failed`.
pub async fn delete_link_handler(
    Path(id): Path<String>,
    State(state): State<AppState>,
) -> Redirect {
    match state.link_service.delete_link(&id).await {
        Ok(()) => Redirect::to("/"),
        Err(e) => {
            error!(%id, error = %e, "Failed to delete link");
            Redirect::to("/?error=delete-failed")
        }
    }
}

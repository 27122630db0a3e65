//! Public addresses of published sites.

use axum::extract::{Path, State};
use axum::http::header::LOCATION;
use axum::http::StatusCode;
use axum::response::{Html, IntoResponse, Response};
use sitegen_core::error::CoreError;
use sitegen_core::publishing::PublicSite;
use sitegen_core::types::DbId;

use crate::error::AppResult;
use crate::state::AppState;

/// GET /sites/{id}
///
/// Redirects to the uploaded page while the site is live, serves the paused
/// page once a trial has run out. Trial expiry is checked on every request.
pub async fn view(State(state): State<AppState>, Path(id): Path<DbId>) -> AppResult<Response> {
    match state.pipeline.view_site(id).await? {
        PublicSite::Live { public_url } => {
            Ok((StatusCode::FOUND, [(LOCATION, public_url)]).into_response())
        }
        PublicSite::Paused { html } => Ok(Html(html).into_response()),
        PublicSite::NotFound => Err(CoreError::NotFound {
            entity: "Published site",
            id,
        }
        .into()),
    }
}

//! Handlers for publishing a previewed project and reading its trial.

use axum::extract::{Path, State};
use axum::Json;
use serde::Serialize;
use sitegen_core::error::CoreError;
use sitegen_core::publishing::trial::{trial_status, TrialStatus};
use sitegen_core::store::PublishedSite;
use sitegen_core::types::{DbId, Timestamp};

use super::load_owned;
use crate::error::AppResult;
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

#[derive(Debug, Serialize)]
pub struct PublishResponse {
    pub site: PublishedSite,
    /// `None` for tiers without a trial.
    pub trial_ends_at: Option<Timestamp>,
    pub already_published: bool,
}

/// POST /api/v1/projects/{id}/publish
///
/// The pipeline commits the project itself, atomically with the publish log
/// entry, so nothing is saved here.
pub async fn publish(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<PublishResponse>>> {
    let _guard = state.locks.acquire(id).await;
    let mut project = load_owned(&state, &auth.user, id).await?;

    let outcome = state.pipeline.publish(&mut project, &auth.user).await?;
    tracing::info!(
        project_id = id,
        user_id = auth.user.id,
        version = outcome.site.version,
        already_published = outcome.already_published,
        "Publish request completed",
    );

    Ok(Json(DataResponse::new(PublishResponse {
        site: outcome.site,
        trial_ends_at: outcome.trial_ends_at,
        already_published: outcome.already_published,
    })))
}

/// GET /api/v1/projects/{id}/trial
pub async fn trial(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<TrialStatus>>> {
    load_owned(&state, &auth.user, id).await?;
    let record = state
        .store
        .get_project_row(id)
        .await?
        .ok_or(CoreError::NotFound {
            entity: "Project",
            id,
        })?;

    Ok(Json(DataResponse::new(trial_status(
        &record,
        auth.user.plan,
        state.clock.now(),
    ))))
}

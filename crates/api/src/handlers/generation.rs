//! Handlers that drive the generation gateway.
//!
//! The project is saved whether the call succeeds or not: a failed stage has
//! already moved it to `Error`, and the client must see that state.

use axum::extract::{Path, State};
use axum::Json;
use sitegen_core::project::Project;
use sitegen_core::types::DbId;

use super::{load_owned, persist_if_changed};
use crate::error::AppResult;
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

/// POST /api/v1/projects/{id}/plan
pub async fn generate_plan(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<Project>>> {
    let _guard = state.locks.acquire(id).await;
    let before = load_owned(&state, &auth.user, id).await?;
    let mut project = before.clone();

    let result = state.gateway.generate_plan(&mut project, &auth.user).await;
    persist_if_changed(&state, &before, &project).await?;
    result?;

    Ok(Json(DataResponse::new(project)))
}

/// POST /api/v1/projects/{id}/generate
pub async fn generate_site(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<Project>>> {
    let _guard = state.locks.acquire(id).await;
    let before = load_owned(&state, &auth.user, id).await?;
    let mut project = before.clone();

    let result = state.gateway.generate_site(&mut project, &auth.user).await;
    persist_if_changed(&state, &before, &project).await?;
    result?;

    Ok(Json(DataResponse::new(project)))
}

/// POST /api/v1/projects/{id}/generate-and-render
pub async fn generate_and_render(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<Project>>> {
    let _guard = state.locks.acquire(id).await;
    let before = load_owned(&state, &auth.user, id).await?;
    let mut project = before.clone();

    let result = state
        .gateway
        .generate_and_render(&mut project, &auth.user)
        .await;
    persist_if_changed(&state, &before, &project).await?;
    result?;

    Ok(Json(DataResponse::new(project)))
}

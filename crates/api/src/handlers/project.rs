//! Handlers for the `/projects` resource and its AI-free lifecycle steps.

use axum::extract::{Path, State};
use axum::http::StatusCode;
use axum::Json;
use serde::{Deserialize, Serialize};
use sitegen_core::brand_memory::BrandMemory;
use sitegen_core::error::CoreError;
use sitegen_core::generation::ImageSlotEdit;
use sitegen_core::lifecycle::{flow, TextEdit};
use sitegen_core::plans::ensure_can_create_project;
use sitegen_core::project::Project;
use sitegen_core::types::DbId;

use super::{load_owned, mutate};
use crate::error::{AppError, AppResult};
use crate::middleware::auth::AuthUser;
use crate::response::DataResponse;
use crate::state::AppState;

/// Body of `POST /projects`. Brand memory may be supplied up front.
#[derive(Debug, Default, Deserialize)]
pub struct CreateProjectRequest {
    #[serde(default)]
    pub brand_memory: Option<BrandMemory>,
}

#[derive(Debug, Deserialize)]
pub struct TextEditRequest {
    pub edits: Vec<TextEdit>,
}

#[derive(Debug, Serialize)]
pub struct TextEditResponse {
    /// Occurrences replaced across all edits.
    pub replaced: usize,
    pub project: Project,
}

/// POST /api/v1/projects
///
/// Runs under the owner's lock so two concurrent requests cannot both pass
/// the project cap.
pub async fn create(
    State(state): State<AppState>,
    auth: AuthUser,
    Json(input): Json<CreateProjectRequest>,
) -> AppResult<(StatusCode, Json<DataResponse<Project>>)> {
    let user = &auth.user;
    let _creating = state.user_locks.acquire(user.id).await;
    let existing = state.store.count_projects_for_user(user.id).await?;
    ensure_can_create_project(&state.settings.plans, user.plan, existing)?;
    if let Some(memory) = &input.brand_memory {
        memory.validate()?;
    }

    let mut project = state.store.create_project(user.id, state.clock.now()).await?;
    if let Some(memory) = input.brand_memory {
        let _guard = state.locks.acquire(project.id).await;
        flow::attach_brand_memory(&mut project, memory, state.clock.now())?;
        state.store.save_project(&project).await?;
    }

    tracing::info!(project_id = project.id, user_id = user.id, "Project created via API");
    Ok((StatusCode::CREATED, Json(DataResponse::new(project))))
}

/// GET /api/v1/projects
pub async fn list(
    State(state): State<AppState>,
    auth: AuthUser,
) -> AppResult<Json<DataResponse<Vec<Project>>>> {
    let projects = state.store.list_projects_for_user(auth.user.id).await?;
    Ok(Json(DataResponse::new(projects)))
}

/// GET /api/v1/projects/{id}
pub async fn get_by_id(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<Project>>> {
    let project = load_owned(&state, &auth.user, id).await?;
    Ok(Json(DataResponse::new(project)))
}

/// DELETE /api/v1/projects/{id}
pub async fn delete(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<StatusCode> {
    let _guard = state.locks.acquire(id).await;
    load_owned(&state, &auth.user, id).await?;
    if state.store.delete_project(id).await? {
        Ok(StatusCode::NO_CONTENT)
    } else {
        Err(AppError::Core(CoreError::NotFound {
            entity: "Project",
            id,
        }))
    }
}

/// PUT /api/v1/projects/{id}/brand-memory
pub async fn set_brand_memory(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<DbId>,
    Json(memory): Json<BrandMemory>,
) -> AppResult<Json<DataResponse<Project>>> {
    let ((), project) = mutate(&state, &auth.user, id, |project, now| {
        flow::attach_brand_memory(project, memory, now)
    })
    .await?;
    Ok(Json(DataResponse::new(project)))
}

/// POST /api/v1/projects/{id}/approve
pub async fn approve(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<Project>>> {
    let ((), project) = mutate(&state, &auth.user, id, flow::approve_plan).await?;
    Ok(Json(DataResponse::new(project)))
}

/// POST /api/v1/projects/{id}/preview
pub async fn preview(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<Project>>> {
    let ((), project) = mutate(&state, &auth.user, id, flow::move_to_preview).await?;
    Ok(Json(DataResponse::new(project)))
}

/// POST /api/v1/projects/{id}/restart
pub async fn restart(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<DbId>,
) -> AppResult<Json<DataResponse<Project>>> {
    let ((), project) = mutate(&state, &auth.user, id, flow::restart).await?;
    Ok(Json(DataResponse::new(project)))
}

/// POST /api/v1/projects/{id}/text-edits
pub async fn apply_text_edits(
    State(state): State<AppState>,
    auth: AuthUser,
    Path(id): Path<DbId>,
    Json(input): Json<TextEditRequest>,
) -> AppResult<Json<DataResponse<TextEditResponse>>> {
    if input.edits.is_empty() {
        return Err(AppError::BadRequest("At least one edit is required".into()));
    }
    let (replaced, project) = mutate(&state, &auth.user, id, |project, now| {
        flow::apply_text_edits(project, &input.edits, now)
    })
    .await?;
    Ok(Json(DataResponse::new(TextEditResponse { replaced, project })))
}

/// PUT /api/v1/projects/{id}/images/{slot}
pub async fn set_image_slot(
    State(state): State<AppState>,
    auth: AuthUser,
    Path((id, slot)): Path<(DbId, String)>,
    Json(edit): Json<ImageSlotEdit>,
) -> AppResult<Json<DataResponse<Project>>> {
    let gateway = &state.gateway;
    let (_version, project) = mutate(&state, &auth.user, id, |project, _now| {
        gateway.set_image_slot(project, &slot, &edit)
    })
    .await?;
    Ok(Json(DataResponse::new(project)))
}

//! Request handlers.
//!
//! Every handler that changes a project holds that project's lock from load
//! to save, so the core never sees two concurrent mutations of one project.

pub mod generation;
pub mod project;
pub mod publish;
pub mod sites;

use sitegen_core::error::CoreError;
use sitegen_core::project::{Project, User};
use sitegen_core::types::{DbId, Timestamp};

use crate::error::AppResult;
use crate::state::AppState;

/// Load project `id` if `user` owns it.
///
/// Another user's project is reported as missing.
pub(crate) async fn load_owned(state: &AppState, user: &User, id: DbId) -> AppResult<Project> {
    match state.store.get_project(id).await? {
        Some(project) if project.is_owned_by(user.id) => Ok(project),
        _ => Err(CoreError::NotFound {
            entity: "Project",
            id,
        }
        .into()),
    }
}

/// Save `after` unless it is identical to `before`.
///
/// Called on the error path too: failed generations force the project into
/// `Error` and that state must be persisted.
pub(crate) async fn persist_if_changed(
    state: &AppState,
    before: &Project,
    after: &Project,
) -> AppResult<()> {
    if before != after {
        state.store.save_project(after).await?;
    }
    Ok(())
}

/// Run a synchronous lifecycle step on project `id` under its lock.
///
/// Returns the step's result together with the project as saved.
pub(crate) async fn mutate<T>(
    state: &AppState,
    user: &User,
    id: DbId,
    step: impl FnOnce(&mut Project, Timestamp) -> Result<T, CoreError>,
) -> AppResult<(T, Project)> {
    let _guard = state.locks.acquire(id).await;
    let before = load_owned(state, user, id).await?;
    let mut project = before.clone();

    let result = step(&mut project, state.clock.now());
    persist_if_changed(state, &before, &project).await?;
    Ok((result?, project))
}

//! Route definitions for the `/projects` resource.

use axum::routing::{get, post, put};
use axum::Router;

use crate::handlers::{generation, project, publish};
use crate::state::AppState;

/// Routes mounted at `/projects`.
///
/// ```text
/// GET    /                          -> list
/// POST   /                          -> create
/// GET    /{id}                      -> get_by_id
/// DELETE /{id}                      -> delete
/// PUT    /{id}/brand-memory         -> set_brand_memory
/// POST   /{id}/plan                 -> generate_plan
/// POST   /{id}/approve              -> approve
/// POST   /{id}/generate             -> generate_site
/// POST   /{id}/generate-and-render  -> generate_and_render
/// POST   /{id}/preview              -> preview
/// POST   /{id}/restart              -> restart
/// POST   /{id}/text-edits           -> apply_text_edits
/// PUT    /{id}/images/{slot}        -> set_image_slot
/// POST   /{id}/publish              -> publish
/// GET    /{id}/trial                -> trial
/// ```
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(project::list).post(project::create))
        .route("/{id}", get(project::get_by_id).delete(project::delete))
        .route("/{id}/brand-memory", put(project::set_brand_memory))
        .route("/{id}/plan", post(generation::generate_plan))
        .route("/{id}/approve", post(project::approve))
        .route("/{id}/generate", post(generation::generate_site))
        .route(
            "/{id}/generate-and-render",
            post(generation::generate_and_render),
        )
        .route("/{id}/preview", post(project::preview))
        .route("/{id}/restart", post(project::restart))
        .route("/{id}/text-edits", post(project::apply_text_edits))
        .route("/{id}/images/{slot}", put(project::set_image_slot))
        .route("/{id}/publish", post(publish::publish))
        .route("/{id}/trial", get(publish::trial))
}

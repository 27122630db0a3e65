pub mod health;
pub mod project;
pub mod sites;

use axum::Router;

use crate::state::AppState;

/// Build the `/api/v1` route tree.
///
/// Route hierarchy:
///
/// ```text
/// /projects                                  list, create
/// /projects/{id}                             get, delete
/// /projects/{id}/brand-memory                attach brand memory (PUT)
/// /projects/{id}/plan                        generate plan (POST)
/// /projects/{id}/approve                     approve plan (POST)
/// /projects/{id}/generate                    generate free-form site (POST)
/// /projects/{id}/generate-and-render         template flow (POST)
/// /projects/{id}/preview                     move to preview (POST)
/// /projects/{id}/restart                     leave error state (POST)
/// /projects/{id}/text-edits                  literal text edits (POST)
/// /projects/{id}/images/{slot}               image slot edit (PUT)
/// /projects/{id}/publish                     publish (POST)
/// /projects/{id}/trial                       trial (GET)
/// ```
pub fn api_routes() -> Router<AppState> {
    Router::new().nest("/projects", project::router())
}

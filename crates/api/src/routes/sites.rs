use axum::routing::get;
use axum::Router;

use crate::handlers::sites;
use crate::state::AppState;

/// Public site addresses (root level, no authentication).
pub fn router() -> Router<AppState> {
    Router::new().route("/sites/{id}", get(sites::view))
}

//! Application router shared by `main.rs` and the integration tests.

use std::any::Any;
use std::path::Path;
use std::time::Duration;

use axum::http::header::{AUTHORIZATION, CONTENT_TYPE};
use axum::http::{HeaderValue, Method, Request, StatusCode};
use axum::response::{IntoResponse, Response};
use axum::Router;
use tower_http::catch_panic::CatchPanicLayer;
use tower_http::cors::CorsLayer;
use tower_http::request_id::{MakeRequestUuid, PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::services::ServeDir;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::{DefaultOnResponse, TraceLayer};
use tracing::Level;

use crate::config::ServerConfig;
use crate::error::AppError;
use crate::routes;
use crate::state::AppState;

/// Path prefix for pages uploaded to local storage.
pub const PUBLISHED_PREFIX: &str = "/published";

/// Build the application [`Router`].
///
/// CORS covers `/api/v1` only. Health, `/sites` and `/published` are plain
/// navigations and need no cross-origin access. Every route shares the
/// outer stack, listed outermost first:
///
/// 1. Assign an `x-request-id`
/// 2. Trace the request inside a span carrying that id
/// 3. Copy the id onto the response
/// 4. Turn panics into the JSON 500 body
/// 5. Request timeout
pub fn build_app_router(
    state: AppState,
    config: &ServerConfig,
    published_dir: Option<&Path>,
) -> Router {
    let api = routes::api_routes().layer(build_cors_layer(config));

    let mut app = Router::new()
        .merge(routes::health::router())
        .merge(routes::sites::router())
        .nest("/api/v1", api);

    if let Some(dir) = published_dir {
        app = app.nest_service(PUBLISHED_PREFIX, ServeDir::new(dir));
    }

    app
        // -- Applied bottom-up --
        .layer(TimeoutLayer::with_status_code(
            StatusCode::REQUEST_TIMEOUT,
            Duration::from_secs(config.request_timeout_secs),
        ))
        .layer(CatchPanicLayer::custom(panic_response))
        .layer(PropagateRequestIdLayer::x_request_id())
        .layer(
            TraceLayer::new_for_http()
                .make_span_with(|request: &Request<_>| {
                    let request_id = request
                        .headers()
                        .get("x-request-id")
                        .and_then(|v| v.to_str().ok())
                        .unwrap_or_default();
                    tracing::info_span!(
                        "request",
                        method = %request.method(),
                        uri = %request.uri(),
                        request_id,
                    )
                })
                .on_response(DefaultOnResponse::new().level(Level::INFO)),
        )
        .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid))
        .with_state(state)
}

/// Same body as any other internal error, so clients see one shape.
fn panic_response(panic: Box<dyn Any + Send + 'static>) -> Response {
    let detail = panic
        .downcast_ref::<&str>()
        .map(|s| s.to_string())
        .or_else(|| panic.downcast_ref::<String>().cloned())
        .unwrap_or_else(|| "unknown panic".to_string());
    AppError::InternalError(format!("handler panicked: {detail}")).into_response()
}

/// CORS for the JSON API. Auth travels in a bearer header, so no
/// credentials mode.
///
/// Panics at startup if any configured origin is invalid.
pub fn build_cors_layer(config: &ServerConfig) -> CorsLayer {
    let origins: Vec<HeaderValue> = config
        .cors_origins
        .iter()
        .map(|o| {
            o.parse()
                .unwrap_or_else(|e| panic!("Invalid CORS origin '{o}': {e}"))
        })
        .collect();

    CorsLayer::new()
        .allow_origin(origins)
        .allow_methods([Method::GET, Method::POST, Method::PUT, Method::DELETE])
        .allow_headers([CONTENT_TYPE, AUTHORIZATION])
        .max_age(Duration::from_secs(3600))
}

//! Shared harness for API integration tests.
//!
//! Builds the production router over the in-memory project store, in-memory
//! site storage, a manual clock, stub AI stages, and the shipped templates.

#![allow(dead_code)]

use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use axum::body::Body;
use axum::http::{Method, Request, Response};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::Value;
use tower::ServiceExt;

use sitegen_api::auth::jwt::{generate_access_token, JwtConfig};
use sitegen_api::config::{GenerationSettings, ServerConfig};
use sitegen_api::router::build_app_router;
use sitegen_api::state::{AppState, Components};
use sitegen_core::brand_memory::BrandMemory;
use sitegen_core::clock::ManualClock;
use sitegen_core::generation::{Collaborators, CopyWriter, SiteGenerator, SitePlanner, StageFailure};
use sitegen_core::images::SeededPlaceholderSource;
use sitegen_core::plans::PlanTier;
use sitegen_core::project::User;
use sitegen_core::publishing::InMemorySiteStorage;
use sitegen_core::site_plan::{SectionPlan, SitePlan};
use sitegen_core::store::InMemoryProjectStore;
use sitegen_templates::{HandlebarsRenderer, TemplateCatalog};

pub const PAGE: &str = r##"<!DOCTYPE html>
<html lang="en">
<head><title>Acme</title></head>
<body>
<nav><button id="menu-btn">Menu</button><ul id="nav-links"><li><a href="#hero">Home</a></li></ul></nav>
<section id="hero"><h1>Fresh bread daily</h1></section>
<footer>Acme Bakery</footer>
</body>
</html>"##;

pub const HERO_HEADING: &str = "Bread worth waking up for";

/// Build a test `ServerConfig` with safe defaults.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        cors_origins: vec!["http://localhost:5173".to_string()],
        request_timeout_secs: 30,
        shutdown_timeout_secs: 30,
        jwt: JwtConfig {
            secret: "test-secret-that-is-long-enough-for-hmac".to_string(),
            access_token_expiry_mins: 15,
        },
    }
}

// ---------------------------------------------------------------------------
// Stub AI stages
// ---------------------------------------------------------------------------

struct StubPlanner;

#[async_trait]
impl SitePlanner for StubPlanner {
    async fn plan(&self, memory: &BrandMemory) -> Result<SitePlan, StageFailure> {
        Ok(SitePlan::new(
            memory.business_name.clone(),
            vec![
                SectionPlan::new("hero", "Welcome"),
                SectionPlan::new("visit", "Visit us"),
            ],
        ))
    }
}

/// Returns [`PAGE`], then either a stylesheet or a CSS stage failure.
pub struct StubGenerator {
    pub fail_css: bool,
}

#[async_trait]
impl SiteGenerator for StubGenerator {
    async fn generate_html(
        &self,
        _plan: &SitePlan,
        _memory: &BrandMemory,
    ) -> Result<String, StageFailure> {
        Ok(PAGE.to_string())
    }

    async fn generate_css(&self, _html: &str, memory: &BrandMemory) -> Result<String, StageFailure> {
        if self.fail_css {
            return Err(StageFailure::Request("upstream returned 503".into()));
        }
        Ok(format!("body {{ color: {}; }}", memory.primary_color))
    }
}

/// Picks the shipped `starter` template.
struct StubCopyWriter;

#[async_trait]
impl CopyWriter for StubCopyWriter {
    async fn write_copy(
        &self,
        memory: &BrandMemory,
        catalog_summary: &str,
    ) -> Result<SitePlan, StageFailure> {
        if !catalog_summary.contains("- ID: starter") {
            return Err(StageFailure::Schema("starter template missing".into()));
        }
        let mut plan = SitePlan::new(
            memory.business_name.clone(),
            vec![SectionPlan::new("faq", "Faq")],
        );
        plan.selected_template = Some("starter".into());
        plan.active_sections = vec!["faq".into()];
        plan.set_copy("hero_heading", HERO_HEADING);
        plan.set_copy("about_heading", "Our story");
        plan.set_copy(
            "faq_list",
            r#"[{"question":"Do you bake gluten free?","answer":"Every Friday."}]"#,
        );
        Ok(plan)
    }
}

// ---------------------------------------------------------------------------
// App
// ---------------------------------------------------------------------------

/// A running router plus handles on its in-memory collaborators.
pub struct TestApp {
    pub router: Router,
    pub config: ServerConfig,
    pub store: Arc<InMemoryProjectStore>,
    pub storage: Arc<InMemorySiteStorage>,
    pub clock: Arc<ManualClock>,
}

impl TestApp {
    pub fn token(&self, user: &User) -> String {
        generate_access_token(user, &self.config.jwt).expect("token generation should succeed")
    }

    /// Move past the AI cooldown.
    pub fn wait_cooldown(&self) {
        self.clock.advance(chrono::Duration::seconds(31));
    }
}

pub fn build_test_app() -> TestApp {
    build_test_app_with(StubGenerator { fail_css: false })
}

/// Build the full application router with all middleware layers.
///
/// This mirrors `main.rs` so integration tests exercise the same middleware
/// stack that production uses.
pub fn build_test_app_with(generator: StubGenerator) -> TestApp {
    let config = test_config();
    let settings = GenerationSettings {
        cooldown_secs: 30,
        ..GenerationSettings::default()
    };

    let store = Arc::new(InMemoryProjectStore::new());
    let storage = Arc::new(InMemorySiteStorage::new("https://sites.test"));
    let clock = Arc::new(ManualClock::new(chrono::Utc::now()));

    let templates = PathBuf::from(env!("CARGO_MANIFEST_DIR")).join("../../templates");
    let catalog = TemplateCatalog::load(templates).expect("shipped templates load");
    let renderer = HandlebarsRenderer::new(
        Arc::new(catalog),
        Arc::new(SeededPlaceholderSource::default()),
    )
    .expect("shipped templates compile");

    let state = AppState::new(
        config.clone(),
        settings,
        Components {
            store: store.clone(),
            storage: storage.clone(),
            collaborators: Collaborators {
                planner: Arc::new(StubPlanner),
                generator: Arc::new(generator),
                copy_writer: Arc::new(StubCopyWriter),
                renderer: Arc::new(renderer),
            },
            clock: clock.clone(),
            pool: None,
        },
    );

    TestApp {
        router: build_app_router(state, &config, None),
        config,
        store,
        storage,
        clock,
    }
}

pub fn user(id: i64, plan: PlanTier) -> User {
    User {
        id,
        email: format!("user{id}@acme.test"),
        plan,
    }
}

pub fn acme_memory() -> Value {
    serde_json::json!({
        "business_name": "Acme Bakery",
        "website_type": "bakery",
        "primary_goal": "walk-ins",
        "contact_email": "hello@acme.test"
    })
}

// ---------------------------------------------------------------------------
// Requests
// ---------------------------------------------------------------------------

pub async fn send(
    app: &TestApp,
    method: Method,
    uri: &str,
    token: Option<&str>,
    body: Option<Value>,
) -> Response<Body> {
    let mut builder = Request::builder().method(method).uri(uri);
    if let Some(token) = token {
        builder = builder.header("authorization", format!("Bearer {token}"));
    }
    let request = match body {
        Some(json) => builder
            .header("content-type", "application/json")
            .body(Body::from(json.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };
    app.router.clone().oneshot(request).await.unwrap()
}

pub async fn get(app: &TestApp, uri: &str) -> Response<Body> {
    send(app, Method::GET, uri, None, None).await
}

pub async fn get_auth(app: &TestApp, uri: &str, token: &str) -> Response<Body> {
    send(app, Method::GET, uri, Some(token), None).await
}

pub async fn post_auth(app: &TestApp, uri: &str, token: &str) -> Response<Body> {
    send(app, Method::POST, uri, Some(token), None).await
}

pub async fn post_json_auth(app: &TestApp, uri: &str, token: &str, body: Value) -> Response<Body> {
    send(app, Method::POST, uri, Some(token), Some(body)).await
}

pub async fn put_json_auth(app: &TestApp, uri: &str, token: &str, body: Value) -> Response<Body> {
    send(app, Method::PUT, uri, Some(token), Some(body)).await
}

pub async fn body_json(response: Response<Body>) -> Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

pub async fn body_text(response: Response<Body>) -> String {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    String::from_utf8(bytes.to_vec()).unwrap()
}

/// Create a project with Acme's brand memory and return its id.
pub async fn create_project(app: &TestApp, token: &str) -> i64 {
    let response = post_json_auth(
        app,
        "/api/v1/projects",
        token,
        serde_json::json!({ "brand_memory": acme_memory() }),
    )
    .await;
    assert_eq!(response.status(), axum::http::StatusCode::CREATED);
    body_json(response).await["data"]["id"].as_i64().unwrap()
}

//! HTTP-level tests for the project lifecycle endpoints.

mod common;

use axum::http::header::LOCATION;
use axum::http::{Method, StatusCode};
use common::{
    acme_memory, body_json, body_text, build_test_app, build_test_app_with, create_project, get,
    get_auth, post_auth, post_json_auth, put_json_auth, send, user, StubGenerator, HERO_HEADING,
};
use serde_json::json;
use sitegen_core::plans::PlanTier;
use sitegen_core::store::ProjectStore;

// ---------------------------------------------------------------------------
// Authentication
// ---------------------------------------------------------------------------

#[tokio::test]
async fn missing_token_is_unauthorized() {
    let app = build_test_app();
    let response = get(&app, "/api/v1/projects").await;

    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
    assert_eq!(body_json(response).await["code"], "UNAUTHORIZED");
}

#[tokio::test]
async fn garbage_token_is_unauthorized() {
    let app = build_test_app();
    let response = get_auth(&app, "/api/v1/projects", "not-a-jwt").await;
    assert_eq!(response.status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn other_users_project_is_not_found() {
    let app = build_test_app();
    let owner = app.token(&user(1, PlanTier::Paid));
    let stranger = app.token(&user(2, PlanTier::Paid));
    let id = create_project(&app, &owner).await;

    let response = get_auth(&app, &format!("/api/v1/projects/{id}"), &stranger).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);

    let response = post_auth(&app, &format!("/api/v1/projects/{id}/plan"), &stranger).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

// ---------------------------------------------------------------------------
// Project CRUD
// ---------------------------------------------------------------------------

#[tokio::test]
async fn create_with_memory_reaches_memory_ready() {
    let app = build_test_app();
    let token = app.token(&user(1, PlanTier::Paid));

    let response = post_json_auth(
        &app,
        "/api/v1/projects",
        &token,
        json!({ "brand_memory": acme_memory() }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::CREATED);

    let json = body_json(response).await;
    assert_eq!(json["data"]["state"], "memory_ready");
    assert_eq!(json["data"]["brand_memory"]["business_name"], "Acme Bakery");
    assert_eq!(json["data"]["brand_memory"]["primary_color"], "#2563eb");
}

#[tokio::test]
async fn create_then_attach_memory() {
    let app = build_test_app();
    let token = app.token(&user(1, PlanTier::Paid));

    let response = post_json_auth(&app, "/api/v1/projects", &token, json!({})).await;
    assert_eq!(response.status(), StatusCode::CREATED);
    let json = body_json(response).await;
    assert_eq!(json["data"]["state"], "draft");
    let id = json["data"]["id"].as_i64().unwrap();

    let response = put_json_auth(
        &app,
        &format!("/api/v1/projects/{id}/brand-memory"),
        &token,
        acme_memory(),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    assert_eq!(body_json(response).await["data"]["state"], "memory_ready");
}

#[tokio::test]
async fn blank_business_name_is_rejected() {
    let app = build_test_app();
    let token = app.token(&user(1, PlanTier::Paid));

    let response = post_json_auth(
        &app,
        "/api/v1/projects",
        &token,
        json!({ "brand_memory": {"business_name": " ", "website_type": "bakery", "primary_goal": "walk-ins"} }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["code"], "VALIDATION_ERROR");
    assert!(app.store.list_projects_for_user(1).await.unwrap().is_empty());
}

#[tokio::test]
async fn uploaded_assets_are_checked_and_labeled() {
    let app = build_test_app();
    let token = app.token(&user(1, PlanTier::Paid));
    let id = create_project(&app, &token).await;
    let uri = format!("/api/v1/projects/{id}/brand-memory");

    let mut memory = acme_memory();
    memory["labeled_assets"] = json!([{"url": "http://cdn.test/a.jpg", "width": 800, "height": 800}]);
    let response = put_json_auth(&app, &uri, &token, memory.clone()).await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["code"], "VALIDATION_ERROR");

    memory["labeled_assets"] = json!([
        {"url": "https://cdn.test/a.jpg", "width": 800, "height": 800},
        {"url": "/uploads/b.jpg", "width": 600, "height": 1200},
        {"url": "/uploads/c.jpg", "width": 800, "height": 800},
    ]);
    memory["services"] = json!("bread, cakes");
    let response = put_json_auth(&app, &uri, &token, memory).await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    let assets = &json["data"]["brand_memory"]["labeled_assets"];
    assert_eq!(assets[0]["label"], "hero");
    assert_eq!(assets[1]["label"], "portrait");
    assert_eq!(assets[1]["orientation"], "portrait");
    assert_eq!(assets[2]["label"], "product");
    assert_eq!(json["data"]["brand_memory"]["services"], json!(["bread", "cakes"]));
}

#[tokio::test]
async fn free_tier_project_limit() {
    let app = build_test_app();
    let token = app.token(&user(1, PlanTier::Free));
    create_project(&app, &token).await;

    let response = post_json_auth(&app, "/api/v1/projects", &token, json!({})).await;
    assert_eq!(response.status(), StatusCode::PAYMENT_REQUIRED);
    let json = body_json(response).await;
    assert_eq!(json["code"], "PROJECT_LIMIT_REACHED");
    assert_eq!(json["plan"], "free");
}

#[tokio::test]
async fn concurrent_creates_respect_project_limit() {
    let app = build_test_app();
    let token = app.token(&user(1, PlanTier::Free));

    let (a, b) = tokio::join!(
        post_json_auth(&app, "/api/v1/projects", &token, json!({})),
        post_json_auth(&app, "/api/v1/projects", &token, json!({})),
    );
    let mut statuses = [a.status(), b.status()];
    statuses.sort();
    assert_eq!(statuses, [StatusCode::CREATED, StatusCode::PAYMENT_REQUIRED]);
    assert_eq!(app.store.count_projects_for_user(1).await.unwrap(), 1);
}

#[tokio::test]
async fn list_and_delete() {
    let app = build_test_app();
    let token = app.token(&user(1, PlanTier::Paid));
    let first = create_project(&app, &token).await;
    let second = create_project(&app, &token).await;

    let json = body_json(get_auth(&app, "/api/v1/projects", &token).await).await;
    let ids: Vec<i64> = json["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|p| p["id"].as_i64().unwrap())
        .collect();
    assert_eq!(ids.len(), 2);
    assert!(ids.contains(&first) && ids.contains(&second));

    let response = send(
        &app,
        Method::DELETE,
        &format!("/api/v1/projects/{first}"),
        Some(&token),
        None,
    )
    .await;
    assert_eq!(response.status(), StatusCode::NO_CONTENT);

    let response = get_auth(&app, &format!("/api/v1/projects/{first}"), &token).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

// ---------------------------------------------------------------------------
// Free-form generation and publishing
// ---------------------------------------------------------------------------

#[tokio::test]
async fn draft_to_published_and_trial_pause() {
    let app = build_test_app();
    let token = app.token(&user(1, PlanTier::Free));
    let id = create_project(&app, &token).await;
    let base = format!("/api/v1/projects/{id}");

    let json = body_json(post_auth(&app, &format!("{base}/plan"), &token).await).await;
    assert_eq!(json["data"]["state"], "plan_ready");
    assert_eq!(json["data"]["ai_usage"]["planner_calls"], 1);
    assert_eq!(json["data"]["site_plan"]["page_title"], "Acme Bakery");

    let json = body_json(post_auth(&app, &format!("{base}/approve"), &token).await).await;
    assert_eq!(json["data"]["state"], "plan_approved");

    app.wait_cooldown();
    let json = body_json(post_auth(&app, &format!("{base}/generate"), &token).await).await;
    assert_eq!(json["data"]["state"], "site_generated");
    assert_eq!(json["data"]["ai_usage"]["generation_calls"], 1);
    assert_eq!(json["data"]["site_version"]["version"], 1);

    let json = body_json(post_auth(&app, &format!("{base}/preview"), &token).await).await;
    assert_eq!(json["data"]["state"], "preview");

    let response = post_auth(&app, &format!("{base}/publish"), &token).await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"]["already_published"], false);
    assert_eq!(json["data"]["site"]["version"], 1);
    assert!(json["data"]["trial_ends_at"].is_string());
    let public_url = json["data"]["site"]["public_url"].as_str().unwrap().to_string();
    assert_eq!(app.storage.len(), 1);

    let json = body_json(get_auth(&app, &base, &token).await).await;
    assert_eq!(json["data"]["state"], "published");
    assert!(json["data"]["published_at"].is_string());

    // Publishing again is idempotent.
    let json = body_json(post_auth(&app, &format!("{base}/publish"), &token).await).await;
    assert_eq!(json["data"]["already_published"], true);
    assert_eq!(app.storage.len(), 1);

    let response = get(&app, &format!("/sites/{id}")).await;
    assert_eq!(response.status(), StatusCode::FOUND);
    assert_eq!(response.headers()[LOCATION], public_url.as_str());

    app.clock.advance(chrono::Duration::days(16));
    let response = get(&app, &format!("/sites/{id}")).await;
    assert_eq!(response.status(), StatusCode::OK);
    assert!(body_text(response).await.contains("Acme Bakery"));
}

#[tokio::test]
async fn trial_status_follows_publish_and_pause() {
    let app = build_test_app();
    let token = app.token(&user(1, PlanTier::Free));
    let id = create_project(&app, &token).await;
    let base = format!("/api/v1/projects/{id}");

    let json = body_json(get_auth(&app, &format!("{base}/trial"), &token).await).await;
    assert_eq!(json["data"]["plan"], "free");
    assert!(json["data"]["trial_ends_at"].is_null());
    assert_eq!(json["data"]["is_trial_active"], false);
    assert_eq!(json["data"]["days_remaining"], 0);

    post_auth(&app, &format!("{base}/plan"), &token).await;
    post_auth(&app, &format!("{base}/approve"), &token).await;
    app.wait_cooldown();
    post_auth(&app, &format!("{base}/generate"), &token).await;
    post_auth(&app, &format!("{base}/preview"), &token).await;
    let response = post_auth(&app, &format!("{base}/publish"), &token).await;
    assert_eq!(response.status(), StatusCode::OK);

    let response = get_auth(&app, &format!("{base}/trial"), &token).await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert!(json["data"]["trial_ends_at"].is_string());
    assert_eq!(json["data"]["is_trial_active"], true);
    assert_eq!(json["data"]["is_trial_expired"], false);
    assert_eq!(json["data"]["days_remaining"], 15);
    assert_eq!(json["data"]["is_paused"], false);

    app.clock.advance(chrono::Duration::days(16));
    get(&app, &format!("/sites/{id}")).await;

    let json = body_json(get_auth(&app, &format!("{base}/trial"), &token).await).await;
    assert_eq!(json["data"]["is_trial_active"], false);
    assert_eq!(json["data"]["is_trial_expired"], true);
    assert_eq!(json["data"]["days_remaining"], 0);
    assert_eq!(json["data"]["is_paused"], true);

    let other = app.token(&user(2, PlanTier::Free));
    let response = get_auth(&app, &format!("{base}/trial"), &other).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn unpublished_site_is_not_found() {
    let app = build_test_app();
    let token = app.token(&user(1, PlanTier::Paid));
    let id = create_project(&app, &token).await;

    let response = get(&app, &format!("/sites/{id}")).await;
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn out_of_order_step_conflicts() {
    let app = build_test_app();
    let token = app.token(&user(1, PlanTier::Paid));
    let id = create_project(&app, &token).await;

    let response = post_auth(&app, &format!("/api/v1/projects/{id}/approve"), &token).await;
    assert_eq!(response.status(), StatusCode::CONFLICT);
    let json = body_json(response).await;
    assert_eq!(json["code"], "INVALID_STATE_TRANSITION");
    assert_eq!(json["from"], "memory_ready");
    assert_eq!(json["to"], "plan_approved");
}

#[tokio::test]
async fn cooldown_between_ai_calls() {
    let app = build_test_app();
    let token = app.token(&user(1, PlanTier::Paid));
    let id = create_project(&app, &token).await;
    let base = format!("/api/v1/projects/{id}");

    post_auth(&app, &format!("{base}/plan"), &token).await;
    post_auth(&app, &format!("{base}/approve"), &token).await;

    let response = post_auth(&app, &format!("{base}/generate"), &token).await;
    assert_eq!(response.status(), StatusCode::TOO_MANY_REQUESTS);
    let json = body_json(response).await;
    assert_eq!(json["code"], "AI_COOLDOWN_ACTIVE");
    assert_eq!(json["retry_after_secs"], 30);

    // Nothing changed.
    let json = body_json(get_auth(&app, &base, &token).await).await;
    assert_eq!(json["data"]["state"], "plan_approved");
    assert_eq!(json["data"]["ai_usage"]["generation_calls"], 0);
}

#[tokio::test]
async fn free_plan_quota_is_enforced_after_memory_edit() {
    let app = build_test_app();
    let token = app.token(&user(1, PlanTier::Free));
    let id = create_project(&app, &token).await;
    let base = format!("/api/v1/projects/{id}");

    post_auth(&app, &format!("{base}/plan"), &token).await;

    // Re-editing the memory sends the project back to memory_ready.
    let json = body_json(
        put_json_auth(&app, &format!("{base}/brand-memory"), &token, acme_memory()).await,
    )
    .await;
    assert_eq!(json["data"]["state"], "memory_ready");
    assert_eq!(json["data"]["ai_usage"]["planner_calls"], 1);

    app.wait_cooldown();
    let response = post_auth(&app, &format!("{base}/plan"), &token).await;
    assert_eq!(response.status(), StatusCode::PAYMENT_REQUIRED);
    let json = body_json(response).await;
    assert_eq!(json["code"], "AI_LIMIT_EXCEEDED");
    assert_eq!(json["action"], "planner");

    let json = body_json(get_auth(&app, &base, &token).await).await;
    assert_eq!(json["data"]["ai_usage"]["planner_calls"], 1);
}

#[tokio::test]
async fn css_failure_is_persisted_as_error_and_restartable() {
    let app = build_test_app_with(StubGenerator { fail_css: true });
    let token = app.token(&user(1, PlanTier::Paid));
    let id = create_project(&app, &token).await;
    let base = format!("/api/v1/projects/{id}");

    post_auth(&app, &format!("{base}/plan"), &token).await;
    post_auth(&app, &format!("{base}/approve"), &token).await;
    app.wait_cooldown();

    let response = post_auth(&app, &format!("{base}/generate"), &token).await;
    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    let json = body_json(response).await;
    assert_eq!(json["code"], "AI_GENERATION_FAILED");
    assert_eq!(json["stage"], "css_generator");

    let json = body_json(get_auth(&app, &base, &token).await).await;
    assert_eq!(json["data"]["state"], "error");
    assert_eq!(json["data"]["ai_usage"]["generation_calls"], 0);

    let json = body_json(post_auth(&app, &format!("{base}/restart"), &token).await).await;
    assert_eq!(json["data"]["state"], "draft");
    assert_eq!(json["data"]["brand_memory"]["business_name"], "Acme Bakery");
}

// ---------------------------------------------------------------------------
// Template flow and edits
// ---------------------------------------------------------------------------

#[tokio::test]
async fn template_flow_with_image_and_text_edits() {
    let app = build_test_app();
    let token = app.token(&user(1, PlanTier::Paid));
    let id = create_project(&app, &token).await;
    let base = format!("/api/v1/projects/{id}");

    let response = post_auth(&app, &format!("{base}/generate-and-render"), &token).await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"]["state"], "site_generated");
    assert_eq!(json["data"]["template_id"], "starter");
    assert_eq!(json["data"]["ai_usage"]["generation_calls"], 1);
    assert!(json["data"]["site_version"]["html"]
        .as_str()
        .unwrap()
        .contains(HERO_HEADING));

    let response = put_json_auth(
        &app,
        &format!("{base}/images/hero"),
        &token,
        json!({ "override_url": "https://cdn.acme.test/storefront.jpg" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["data"]["site_version"]["version"], 2);
    assert!(json["data"]["site_version"]["html"]
        .as_str()
        .unwrap()
        .contains("https://cdn.acme.test/storefront.jpg"));

    let response = post_json_auth(
        &app,
        &format!("{base}/text-edits"),
        &token,
        json!({ "edits": [{ "old_text": HERO_HEADING, "new_text": "Sourdough since 1998" }] }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert!(json["data"]["replaced"].as_u64().unwrap() >= 1);
    let html = json["data"]["project"]["site_version"]["html"].as_str().unwrap();
    assert!(html.contains("Sourdough since 1998"));
    assert!(!html.contains(HERO_HEADING));
}

#[tokio::test]
async fn text_edit_with_markup_is_rejected() {
    let app = build_test_app();
    let token = app.token(&user(1, PlanTier::Paid));
    let id = create_project(&app, &token).await;
    let base = format!("/api/v1/projects/{id}");
    post_auth(&app, &format!("{base}/generate-and-render"), &token).await;

    let response = post_json_auth(
        &app,
        &format!("{base}/text-edits"),
        &token,
        json!({ "edits": [{ "old_text": HERO_HEADING, "new_text": "<script>x</script>" }] }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["code"], "VALIDATION_ERROR");
}

#[tokio::test]
async fn image_override_must_be_https() {
    let app = build_test_app();
    let token = app.token(&user(1, PlanTier::Paid));
    let id = create_project(&app, &token).await;
    let base = format!("/api/v1/projects/{id}");
    post_auth(&app, &format!("{base}/generate-and-render"), &token).await;

    let response = put_json_auth(
        &app,
        &format!("{base}/images/hero"),
        &token,
        json!({ "override_url": "http://insecure.test/x.jpg" }),
    )
    .await;
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);

    let json = body_json(get_auth(&app, &base, &token).await).await;
    assert_eq!(json["data"]["site_version"]["version"], 1);
}

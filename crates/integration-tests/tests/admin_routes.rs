//! Integration tests for the admin HTTP surface.
//!
//! Requests are sent straight into the router with `tower::ServiceExt::oneshot`.
//! Sessions live in an in-memory store and synchronization runs against
//! in-memory seams, so no server, database or Shopify credentials are needed.

#![allow(clippy::unwrap_used, clippy::indexing_slicing)]

use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use axum::body::{Body, to_bytes};
use axum::http::{Method, Request, StatusCode, header};
use serde_json::{Value, json};
use skateshop_admin::middleware::SESSION_COOKIE_NAME;
use skateshop_admin::sync::RemoteError;
use skateshop_core::{EntityKind, SyncOutcome};
use skateshop_integration_tests::{
    MemoryActivityLog, MemoryStore, ScriptedRemote, TEST_PASSWORD, TEST_USERNAME, product,
    promotion, sync_service, test_app, test_state,
};
use tower::ServiceExt;

struct Harness {
    app: Router,
    log: Arc<MemoryActivityLog>,
    service: skateshop_admin::sync::SyncService,
}

fn harness(remote: ScriptedRemote) -> Harness {
    let log = Arc::new(MemoryActivityLog::new());
    let service = sync_service(Arc::new(remote), Arc::new(MemoryStore::new()), log.clone());
    let app = test_app(test_state(service.clone(), log.clone()));
    Harness { app, log, service }
}

async fn send(app: &Router, request: Request<Body>) -> (StatusCode, Option<String>, Value) {
    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let cookie = response
        .headers()
        .get(header::SET_COOKIE)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.split(';').next())
        .map(String::from);
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
    (status, cookie, body)
}

fn get(uri: &str, cookie: Option<&str>) -> Request<Body> {
    let mut builder = Request::builder().method(Method::GET).uri(uri);
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    builder.body(Body::empty()).unwrap()
}

fn post_json(uri: &str, cookie: Option<&str>, body: &Value) -> Request<Body> {
    let mut builder = Request::builder()
        .method(Method::POST)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json");
    if let Some(cookie) = cookie {
        builder = builder.header(header::COOKIE, cookie);
    }
    builder.body(Body::from(body.to_string())).unwrap()
}

async fn login(app: &Router) -> String {
    let (status, cookie, body) = send(
        app,
        post_json(
            "/auth/login",
            None,
            &json!({ "username": TEST_USERNAME, "password": TEST_PASSWORD }),
        ),
    )
    .await;
    assert_eq!(status, StatusCode::OK, "login failed: {body}");
    cookie.expect("login sets a session cookie")
}

// ============================================================================
// Health
// ============================================================================

#[tokio::test]
async fn test_health_is_public() {
    let h = harness(ScriptedRemote::new());

    let response = h.app.clone().oneshot(get("/health", None)).await.unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    assert_eq!(&bytes[..], b"ok");
}

// ============================================================================
// Authentication
// ============================================================================

#[tokio::test]
async fn test_sync_requires_session() {
    let h = harness(ScriptedRemote::new());

    let (status, _, body) = send(&h.app, get("/sync", None)).await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["success"], false);
    assert_eq!(body["message"], "Authentication required");
    assert!(h.log.entries().is_empty());
}

#[tokio::test]
async fn test_wrong_password_is_rejected() {
    let h = harness(ScriptedRemote::new());

    let (status, cookie, body) = send(
        &h.app,
        post_json(
            "/auth/login",
            None,
            &json!({ "username": TEST_USERNAME, "password": "nope" }),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(body["success"], false);
    assert!(cookie.is_none());
}

#[tokio::test]
async fn test_login_sets_named_cookie() {
    let h = harness(ScriptedRemote::new());

    let cookie = login(&h.app).await;

    assert!(cookie.starts_with(&format!("{SESSION_COOKIE_NAME}=")));
}

#[tokio::test]
async fn test_logout_ends_session() {
    let h = harness(ScriptedRemote::new());
    let cookie = login(&h.app).await;

    let (status, _, _) = send(&h.app, post_json("/auth/logout", Some(&cookie), &json!({}))).await;
    assert_eq!(status, StatusCode::OK);

    let (status, _, _) = send(&h.app, get("/activity", Some(&cookie))).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
}

// ============================================================================
// Synchronization
// ============================================================================

#[tokio::test]
async fn test_full_sync_returns_summary_and_logs_actor() {
    let h = harness(
        ScriptedRemote::new().with_records(EntityKind::Product, vec![product("p1"), product("p2")]),
    );
    let cookie = login(&h.app).await;

    let (status, _, body) = send(&h.app, get("/sync", Some(&cookie))).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], true);
    let results = body["data"]["results"].as_array().unwrap();
    assert_eq!(results.len(), EntityKind::ALL.len());
    assert_eq!(results[0]["entity_kind"], "product");
    assert_eq!(results[0]["items_written"], 2);

    let entries = h.log.entries();
    assert_eq!(entries.len(), EntityKind::ALL.len());
    assert!(entries.iter().all(|e| e.actor_id.as_deref() == Some(TEST_USERNAME)));
}

#[tokio::test]
async fn test_partial_failure_is_ok_with_mixed_outcomes() {
    let h = harness(ScriptedRemote::new().then(
        EntityKind::Order,
        Err(RemoteError::Protocol("orders query failed".to_string())),
    ));
    let cookie = login(&h.app).await;

    let (status, _, body) = send(&h.app, get("/sync", Some(&cookie))).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["success"], false);
    assert!(body["message"].as_str().unwrap().contains("order"));
    let orders = body["data"]["results"]
        .as_array()
        .unwrap()
        .iter()
        .find(|r| r["entity_kind"] == "order")
        .unwrap();
    assert_eq!(orders["outcome"], SyncOutcome::Error.as_str());
}

#[tokio::test]
async fn test_authentication_failure_is_500() {
    let h = harness(ScriptedRemote::new().then(
        EntityKind::Product,
        Err(RemoteError::Authentication("token revoked".to_string())),
    ));
    let cookie = login(&h.app).await;

    let (status, _, body) = send(&h.app, get("/sync", Some(&cookie))).await;

    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(body["success"], false);
    assert_eq!(h.log.entries().len(), 1);
}

#[tokio::test]
async fn test_sync_finishes_after_client_disconnects() {
    let h = harness(
        ScriptedRemote::new()
            .with_delay(Duration::from_millis(40))
            .with_records(EntityKind::Product, vec![product("p1")]),
    );
    let cookie = login(&h.app).await;

    let request = h.app.clone().oneshot(get("/sync", Some(&cookie)));
    let dropped = tokio::time::timeout(Duration::from_millis(60), request).await;
    assert!(dropped.is_err(), "the run should still be in progress");

    let mut entries = h.log.entries();
    for _ in 0..100 {
        if entries.len() == EntityKind::ALL.len() {
            break;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
        entries = h.log.entries();
    }

    let kinds: Vec<EntityKind> = entries.iter().map(|e| e.entity_kind).collect();
    assert_eq!(kinds, EntityKind::ALL.to_vec());
    assert!(entries.iter().all(|e| e.outcome == SyncOutcome::Success));

    let mut released = false;
    for _ in 0..50 {
        if h.service.guard().try_acquire(&EntityKind::ALL).is_ok() {
            released = true;
            break;
        }
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    assert!(released, "the run never released its lock");
}

#[tokio::test]
async fn test_promotion_sync_only_touches_promotions() {
    let h = harness(
        ScriptedRemote::new()
            .with_records(EntityKind::Product, vec![product("p1")])
            .with_records(EntityKind::Promotion, vec![promotion("spring")]),
    );
    let cookie = login(&h.app).await;

    let (status, _, body) = send(&h.app, post_json("/sync/promotions", Some(&cookie), &json!({}))).await;

    assert_eq!(status, StatusCode::OK);
    let results = body["data"]["results"].as_array().unwrap();
    assert_eq!(results.len(), 1);
    assert_eq!(results[0]["entity_kind"], "promotion");
    assert_eq!(results[0]["items_written"], 1);
}

#[tokio::test]
async fn test_overlapping_sync_is_conflict() {
    let h = harness(ScriptedRemote::new());
    let cookie = login(&h.app).await;
    let _permit = h.service.guard().try_acquire(&[EntityKind::Promotion]).unwrap();

    let (status, _, body) = send(&h.app, post_json("/sync/promotions", Some(&cookie), &json!({}))).await;

    assert_eq!(status, StatusCode::CONFLICT);
    assert_eq!(body["success"], false);
    assert!(body["message"].as_str().unwrap().contains("promotion"));
}

// ============================================================================
// Activity log
// ============================================================================

#[tokio::test]
async fn test_activity_filters_by_kind() {
    let h = harness(ScriptedRemote::new());
    let cookie = login(&h.app).await;
    send(&h.app, get("/sync", Some(&cookie))).await;

    let (status, _, body) = send(&h.app, get("/activity?entity_kind=customer", Some(&cookie))).await;

    assert_eq!(status, StatusCode::OK);
    let entries = body["data"].as_array().unwrap();
    assert_eq!(entries.len(), 1);
    assert_eq!(entries[0]["action"], "sync.customer");
}

#[tokio::test]
async fn test_activity_rejects_unknown_kind() {
    let h = harness(ScriptedRemote::new());
    let cookie = login(&h.app).await;

    let (status, _, body) = send(&h.app, get("/activity?entity_kind=skateboard", Some(&cookie))).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["success"], false);
}

#[tokio::test]
async fn test_stats_window_must_be_ordered() {
    let h = harness(ScriptedRemote::new());
    let cookie = login(&h.app).await;

    let (status, _, _) = send(
        &h.app,
        get(
            "/activity/stats?from=2026-03-02T00:00:00Z&to=2026-03-01T00:00:00Z",
            Some(&cookie),
        ),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_stats_count_outcomes() {
    let h = harness(ScriptedRemote::new().then(
        EntityKind::Collection,
        Err(RemoteError::Protocol("bad collection".to_string())),
    ));
    let cookie = login(&h.app).await;
    send(&h.app, get("/sync", Some(&cookie))).await;

    let (status, _, body) = send(&h.app, get("/activity/stats", Some(&cookie))).await;

    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["total_runs"], 5);
    assert_eq!(body["data"]["error_count"], 1);
    assert_eq!(body["data"]["success_count"], 4);
}

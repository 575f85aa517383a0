use std::sync::Arc;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use tower::ServiceExt;

use server::routes;
use server::state::ServerState;
use service::creations::repository::mock::MockCreationRepository;
use service::creations::{StagedStore, StoreOptions};

fn cors() -> tower_http::cors::CorsLayer { tower_http::cors::CorsLayer::very_permissive() }

async fn build_app(repo: Arc<MockCreationRepository>) -> Router {
    let store = StagedStore::initialize(repo, StoreOptions::default()).await;
    let state = ServerState { store: Arc::new(store) };
    routes::build_router(state, cors())
}

async fn send(app: &Router, method: &str, uri: &str, body: Option<Value>) -> anyhow::Result<(StatusCode, Value)> {
    let builder = Request::builder().method(method).uri(uri);
    let req = match body {
        Some(b) => builder
            .header("content-type", "application/json")
            .body(Body::from(serde_json::to_vec(&b)?))?,
        None => builder.body(Body::empty())?,
    };
    let resp = app.clone().oneshot(req).await?;
    let status = resp.status();
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await?;
    let json = if bytes.is_empty() { Value::Null } else { serde_json::from_slice(&bytes)? };
    Ok((status, json))
}

#[tokio::test]
async fn set_get_commit_flow() -> anyhow::Result<()> {
    let repo = Arc::new(MockCreationRepository::default());
    let app = build_app(repo.clone()).await;

    let (status, body) = send(&app, "POST", "/store/set", Some(json!({
        "creation_id": "a1",
        "value": {"prompts": ["cat"], "image": "xx"}
    }))).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"ok": true}));

    let (_, body) = send(&app, "GET", "/store/get?creation_id=a1", None).await?;
    assert_eq!(body, json!({"ok": true, "value": {"prompts": ["cat"], "image": "xx"}}));

    let (_, body) = send(&app, "GET", "/store/cart", None).await?;
    assert_eq!(body["items"]["a1"]["prompts"], json!(["cat"]));

    let (status, body) = send(&app, "POST", "/store/commit", None).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["ok"], json!(true));
    assert_eq!(body["committed"]["a1"]["image"], json!("xx"));
    assert_eq!(repo.upsert_calls(), 1);

    let (_, body) = send(&app, "GET", "/store/get?creation_id=a1", None).await?;
    assert!(body["value"]["created_at"].is_string());

    let (_, body) = send(&app, "GET", "/store/cart", None).await?;
    assert_eq!(body["items"], json!({}));

    let (_, body) = send(&app, "GET", "/history", None).await?;
    assert_eq!(body["history"]["a1"]["prompts"], json!(["cat"]));
    assert_eq!(body["load"]["status"], json!("loaded"));
    Ok(())
}

#[tokio::test]
async fn get_unknown_id_returns_null_value() -> anyhow::Result<()> {
    let app = build_app(Arc::new(MockCreationRepository::default())).await;
    let (status, body) = send(&app, "GET", "/store/get?creation_id=nope", None).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"ok": true, "value": null}));
    Ok(())
}

#[tokio::test]
async fn delete_and_rollback_clear_staging() -> anyhow::Result<()> {
    let repo = Arc::new(MockCreationRepository::default());
    let app = build_app(repo.clone()).await;

    send(&app, "POST", "/store/set", Some(json!({"creation_id": "a", "value": {"prompts": ["x"]}}))).await?;
    send(&app, "POST", "/store/set", Some(json!({"creation_id": "b", "value": {"prompts": ["y"]}}))).await?;

    let (status, _) = send(&app, "POST", "/store/delete", Some(json!({"creation_id": "a"}))).await?;
    assert_eq!(status, StatusCode::OK);
    let (_, body) = send(&app, "GET", "/store/cart", None).await?;
    assert_eq!(body["items"].as_object().map(|m| m.len()), Some(1));

    let (status, body) = send(&app, "POST", "/store/rollback", None).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"ok": true}));
    let (_, body) = send(&app, "GET", "/store/cart", None).await?;
    assert_eq!(body["items"], json!({}));
    assert_eq!(repo.upsert_calls(), 0);
    Ok(())
}

#[tokio::test]
async fn failed_commit_is_502_and_keeps_cart() -> anyhow::Result<()> {
    let repo = Arc::new(MockCreationRepository::default());
    let app = build_app(repo.clone()).await;

    send(&app, "POST", "/store/set", Some(json!({"creation_id": "k", "value": {"prompts": ["v"], "image": null}}))).await?;
    repo.fail_upsert(true);

    let (status, body) = send(&app, "POST", "/store/commit", None).await?;
    assert_eq!(status, StatusCode::BAD_GATEWAY);
    assert_eq!(body["ok"], json!(false));
    assert!(body["error"].as_str().unwrap_or_default().contains("commit failed"));
    assert_eq!(body["code"], json!(2101));

    let (_, body) = send(&app, "GET", "/store/cart", None).await?;
    assert_eq!(body["items"]["k"]["prompts"], json!(["v"]));

    repo.fail_upsert(false);
    let (status, body) = send(&app, "POST", "/store/commit", None).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["committed"]["k"]["prompts"], json!(["v"]));
    Ok(())
}

#[tokio::test]
async fn empty_commit_returns_empty_map() -> anyhow::Result<()> {
    let repo = Arc::new(MockCreationRepository::default());
    let app = build_app(repo.clone()).await;

    let (status, body) = send(&app, "POST", "/store/commit", None).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"ok": true, "committed": {}}));
    assert_eq!(repo.upsert_calls(), 0);
    Ok(())
}

#[tokio::test]
async fn bad_payloads_are_400() -> anyhow::Result<()> {
    let app = build_app(Arc::new(MockCreationRepository::default())).await;

    let (status, body) = send(&app, "POST", "/store/set", Some(json!({"creation_id": "  "}))).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["ok"], json!(false));
    assert_eq!(body["code"], json!(2001));

    let (status, body) = send(&app, "POST", "/store/set", Some(json!({"value": {}}))).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body.get("code").is_none());

    let (status, _) = send(&app, "GET", "/store/get", None).await?;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    Ok(())
}

#[tokio::test]
async fn failed_load_is_visible_in_history() -> anyhow::Result<()> {
    let repo = Arc::new(MockCreationRepository::default());
    repo.fail_select(true);
    let app = build_app(repo).await;

    let (status, body) = send(&app, "GET", "/history", None).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["history"], json!({}));
    assert_eq!(body["load"]["status"], json!("failed"));
    Ok(())
}

#[tokio::test]
async fn health_and_metrics() -> anyhow::Result<()> {
    let app = build_app(Arc::new(MockCreationRepository::default())).await;
    let (status, body) = send(&app, "GET", "/health", None).await?;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"status": "ok"}));

    send(&app, "POST", "/store/commit", None).await?;
    let req = Request::builder().uri("/metrics").body(Body::empty())?;
    let resp = app.clone().oneshot(req).await?;
    assert_eq!(resp.status(), StatusCode::OK);
    let bytes = axum::body::to_bytes(resp.into_body(), usize::MAX).await?;
    let text = String::from_utf8(bytes.to_vec())?;
    assert!(text.contains("creation_store_commits_total"));
    Ok(())
}

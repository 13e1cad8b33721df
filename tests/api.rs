//! End-to-end router tests driven through `tower::ServiceExt::oneshot`,
//! with an in-memory backend standing in for a real database.

use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use axum::body::{to_bytes, Body};
use axum::http::{header, Request, StatusCode};
use axum::Router;
use chrono::Utc;
use serde_json::{json, Value};
use tower::ServiceExt;

use itemsrv::config::{AppConfig, DbConfig};
use itemsrv::db::{Database, DbResult, ItemBackend};
use itemsrv::dblog::DbLog;
use itemsrv::models::Item;
use itemsrv::state::AppState;

struct MemoryBackend {
    items: Mutex<Vec<Item>>,
}

impl MemoryBackend {
    fn new() -> Self {
        Self {
            items: Mutex::new(Vec::new()),
        }
    }
}

#[async_trait]
impl ItemBackend for MemoryBackend {
    async fn list_tables(&self) -> DbResult<Vec<String>> {
        Ok(vec!["items".into()])
    }

    async fn ensure_items(&self) -> DbResult<()> {
        Ok(())
    }

    async fn list_items(&self) -> DbResult<Vec<Item>> {
        Ok(self.items.lock().unwrap().clone())
    }

    async fn get_item(&self, id: i64) -> DbResult<Option<Item>> {
        Ok(self.items.lock().unwrap().iter().find(|i| i.id == id).cloned())
    }

    async fn create_item(&self, name: &str) -> DbResult<Item> {
        let mut items = self.items.lock().unwrap();
        let id = items.iter().map(|i| i.id).max().unwrap_or(0) + 1;
        let item = Item {
            id,
            name: name.to_string(),
            created_at: Some(Utc::now()),
        };
        items.push(item.clone());
        Ok(item)
    }

    async fn ping(&self) -> DbResult<()> {
        Ok(())
    }
}

fn configured_config() -> AppConfig {
    AppConfig {
        port: 3000,
        db: DbConfig {
            db_type: Some("POSTGRESQL".into()),
            host: Some("db".into()),
            name: Some("app".into()),
            password: Some("hunter2".into()),
            ..Default::default()
        },
    }
}

fn app() -> Router {
    let config = configured_config();
    let log = Arc::new(DbLog::new());
    let db = Database::with_backend(config.db.clone(), Arc::new(MemoryBackend::new()), log.clone());
    let state = AppState::from_parts(config, db, log);
    itemsrv::build_router(Arc::new(state))
}

fn unconfigured_app() -> Router {
    let state = AppState::new(AppConfig::default());
    itemsrv::build_router(Arc::new(state))
}

async fn body_json(response: axum::response::Response) -> Value {
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    serde_json::from_slice(&bytes).unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

fn post_json(uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

#[tokio::test]
async fn health_always_succeeds() {
    let response = app().oneshot(get("/api/health")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["status"], "ok");
    let ts = body["timestamp"].as_str().unwrap();
    assert!(chrono::DateTime::parse_from_rfc3339(ts).is_ok());
}

#[tokio::test]
async fn health_succeeds_without_configuration() {
    let response = unconfigured_app().oneshot(get("/api/health")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
}

#[tokio::test]
async fn config_masks_password() {
    let response = app().oneshot(get("/api/config")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["env"]["DB_PASSWORD"], "********");
    assert_eq!(body["env"]["DB_HOST"], "db");
    assert_eq!(body["env"]["DB_PORT"], "(unset)");
}

#[tokio::test]
async fn create_and_fetch_round_trip() {
    let app = app();

    let response = app
        .clone()
        .oneshot(post_json("/api/items", json!({ "name": "widget" })))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::CREATED);
    let created = body_json(response).await;
    let id = created["id"].as_i64().unwrap();
    assert_eq!(created["name"], "widget");
    let created_at = created["createdAt"].as_str().unwrap();
    assert!(chrono::DateTime::parse_from_rfc3339(created_at).is_ok());

    let response = app.oneshot(get(&format!("/api/items/{id}"))).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let fetched = body_json(response).await;
    assert_eq!(fetched["name"], "widget");
    assert_eq!(fetched["id"], id);
}

#[tokio::test]
async fn list_returns_items_in_id_order() {
    let app = app();
    for name in ["a", "b", "c"] {
        let response = app
            .clone()
            .oneshot(post_json("/api/items", json!({ "name": name })))
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::CREATED);
    }

    let response = app.oneshot(get("/api/items")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    let ids: Vec<i64> = body
        .as_array()
        .unwrap()
        .iter()
        .map(|i| i["id"].as_i64().unwrap())
        .collect();
    assert_eq!(ids, vec![1, 2, 3]);
}

#[tokio::test]
async fn missing_name_is_400() {
    let response = app()
        .oneshot(post_json("/api/items", json!({})))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn blank_name_is_400() {
    let response = app()
        .oneshot(post_json("/api/items", json!({ "name": "   " })))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn unknown_id_is_404() {
    let response = app().oneshot(get("/api/items/42")).await.unwrap();
    assert_eq!(response.status(), StatusCode::NOT_FOUND);
    let body = body_json(response).await;
    assert_eq!(body["error"], "Not found");
}

#[tokio::test]
async fn non_numeric_id_is_400() {
    let response = app().oneshot(get("/api/items/abc")).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn unconfigured_item_routes_are_gated_with_503() {
    let app = unconfigured_app();

    let response = app.clone().oneshot(get("/api/items")).await.unwrap();
    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);

    let response = app
        .oneshot(post_json("/api/items", json!({ "name": "widget" })))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::SERVICE_UNAVAILABLE);
}

#[tokio::test]
async fn unconfigured_tables_reports_error_in_body() {
    let response = unconfigured_app().oneshot(get("/api/tables")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert!(!body["error"].as_str().unwrap().is_empty());
}

#[tokio::test]
async fn tables_lists_backend_tables() {
    let response = app().oneshot(get("/api/tables")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    assert_eq!(body["tables"], json!(["items"]));
}

#[tokio::test]
async fn logs_expose_first_ping_success() {
    let app = app();
    // The gate pings before the handler; the first success is logged once.
    app.clone().oneshot(get("/api/items")).await.unwrap();
    app.clone().oneshot(get("/api/items")).await.unwrap();

    let response = app.oneshot(get("/api/logs")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);
    let body = body_json(response).await;
    let pings: Vec<&Value> = body["logs"]
        .as_array()
        .unwrap()
        .iter()
        .filter(|e| e["message"].as_str().unwrap().starts_with("Ping OK"))
        .collect();
    assert_eq!(pings.len(), 1);
    assert_eq!(pings[0]["isError"], false);
}

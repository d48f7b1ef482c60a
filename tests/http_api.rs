//! HTTP contract tests: the router driven in-process with `oneshot`.
//!
//! ```bash
//! cargo test --test http_api
//! ```

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use axum::body::{to_bytes, Body};
use axum::http::{Method, Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use tower::ServiceExt;

use hybrid_inventory::http::{create_router, AppState};
use hybrid_inventory::storage::memory::{InMemoryBackupBuffer, InMemoryDocumentStore, InMemoryPrimaryStore};
use hybrid_inventory::storage::redis::RedisBackupBuffer;
use hybrid_inventory::storage::sql::{SqlItemStore, SqlPoolConfig};
use hybrid_inventory::{BackupBuffer, InventoryService, Item, LabService, PrimaryStore, StorageError, StoredItem};

/// Primary store that is always unreachable.
struct DownPrimary;

#[async_trait]
impl PrimaryStore for DownPrimary {
    async fn list(&self) -> Result<Vec<StoredItem>, StorageError> {
        Err(StorageError::Unavailable("connection refused".into()))
    }
    async fn create(&self, _item: &Item) -> Result<StoredItem, StorageError> {
        Err(StorageError::Unavailable("connection refused".into()))
    }
    async fn update(&self, _id: i64, _item: &Item) -> Result<StoredItem, StorageError> {
        Err(StorageError::Unavailable("connection refused".into()))
    }
    async fn delete(&self, _id: i64) -> Result<(), StorageError> {
        Err(StorageError::Unavailable("connection refused".into()))
    }
}

fn router_with(primary: Arc<dyn PrimaryStore>, backup: Arc<InMemoryBackupBuffer>) -> Router {
    create_router(AppState::new(
        InventoryService::new(primary, backup),
        LabService::new(Arc::new(InMemoryDocumentStore::new())),
    ))
}

fn healthy_router() -> Router {
    router_with(Arc::new(InMemoryPrimaryStore::new()), Arc::new(InMemoryBackupBuffer::new()))
}

async fn send(router: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(body) => builder
            .header("content-type", "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let value = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, value)
}

fn item_json(code: &str) -> Value {
    json!({"code": code, "type": "Computer", "status": "Operational", "area": "Lab 1"})
}

// =============================================================================
// Health
// =============================================================================

#[tokio::test]
async fn test_health() {
    let (status, body) = send(&healthy_router(), Method::GET, "/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"status": "ok"}));
}

// =============================================================================
// Global items
// =============================================================================

#[tokio::test]
async fn test_item_crud_on_primary() {
    let router = healthy_router();

    let (status, body) = send(&router, Method::POST, "/laboratories/items", Some(item_json("PC-1"))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["source"], "PRIMARY");
    assert_eq!(body["status"], "success");
    assert_eq!(body["data"]["code"], "PC-1");

    let (status, body) = send(&router, Method::GET, "/laboratories/items", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["source"], "PRIMARY");
    assert!(body.get("message").is_none());
    assert_eq!(body["data"][0]["name"], "PC-1");
    let id = body["data"][0]["id"].as_i64().unwrap();

    let (status, body) = send(
        &router,
        Method::PUT,
        &format!("/laboratories/items/{}", id),
        Some(item_json("PC-1b")),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "updated");

    let (status, body) = send(&router, Method::DELETE, &format!("/laboratories/items/{}", id), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "deleted");
    assert_eq!(body["id"], id);
}

#[tokio::test]
async fn test_name_alias_accepted_on_create() {
    let router = healthy_router();
    let payload = json!({"name": "PR-7", "type": "Printer", "status": "Broken", "area": "Office"});

    let (status, body) = send(&router, Method::POST, "/laboratories/items", Some(payload)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["data"]["code"], "PR-7");
}

#[tokio::test]
async fn test_degraded_create_and_emergency_list() {
    let backup = Arc::new(InMemoryBackupBuffer::new());
    let router = router_with(Arc::new(DownPrimary), backup.clone());

    let (status, body) = send(&router, Method::GET, "/laboratories/items", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, json!({"source": "BACKUP_EMPTY", "message": "no backup data", "data": []}));

    let (status, body) = send(&router, Method::POST, "/laboratories/items", Some(item_json("PC-2"))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(
        body,
        json!({
            "source": "BACKUP",
            "status": "degraded",
            "message": "store saturated, buffered temporarily",
            "data": item_json("PC-2"),
        })
    );
    assert_eq!(backup.len(), 1);

    let (status, body) = send(&router, Method::GET, "/laboratories/items", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["source"], "BACKUP");
    assert_eq!(body["message"], "emergency mode");
    assert_eq!(body["data"], json!([item_json("PC-2")]));
}

/// Nothing listens on port 1, so every connect attempt is refused.
fn unreachable_primary() -> Arc<SqlItemStore> {
    let pool = SqlPoolConfig {
        max_connections: 1,
        acquire_timeout: Duration::from_secs(1),
    };
    Arc::new(SqlItemStore::connect_lazy("mysql://inventory:pw@127.0.0.1:1/inventory", &pool).unwrap())
}

#[tokio::test]
async fn test_primary_down_from_startup_still_falls_back() {
    let backup = Arc::new(InMemoryBackupBuffer::new());
    let router = router_with(unreachable_primary(), backup.clone());

    let (status, body) = send(&router, Method::GET, "/laboratories/items", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["source"], "BACKUP_EMPTY");

    let (status, body) = send(&router, Method::POST, "/laboratories/items", Some(item_json("PC-3"))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "degraded");
    assert_eq!(backup.len(), 1);

    let (status, body) = send(&router, Method::GET, "/laboratories/items", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["source"], "BACKUP");
    assert_eq!(body["data"], json!([item_json("PC-3")]));
}

#[tokio::test]
async fn test_both_stores_down_from_startup_is_500() {
    let backup = Arc::new(RedisBackupBuffer::connect_lazy("redis://127.0.0.1:1", None, "backup_items").unwrap());
    let router = create_router(AppState::new(
        InventoryService::new(unreachable_primary(), backup),
        LabService::new(Arc::new(InMemoryDocumentStore::new())),
    ));

    let (status, body) = send(&router, Method::GET, "/laboratories/items", None).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(body["detail"].is_string());

    let (status, _) = send(&router, Method::POST, "/laboratories/items", Some(item_json("PC-4"))).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
}

#[tokio::test]
async fn test_update_delete_have_no_fallback() {
    let backup = Arc::new(InMemoryBackupBuffer::new());
    backup.push(&Item::new("B", "t", "s", "a").to_backup_entry().unwrap()).await.unwrap();
    let router = router_with(Arc::new(DownPrimary), backup.clone());

    let (status, body) = send(&router, Method::PUT, "/laboratories/items/1", Some(item_json("x"))).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(body["detail"].is_string());

    let (status, _) = send(&router, Method::DELETE, "/laboratories/items/1", None).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(backup.len(), 1);
}

#[tokio::test]
async fn test_missing_item_is_404() {
    let router = healthy_router();

    let (status, body) = send(&router, Method::PUT, "/laboratories/items/77", Some(item_json("x"))).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["detail"], "item not found");

    let (status, _) = send(&router, Method::DELETE, "/laboratories/items/77", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_non_numeric_item_id_is_400() {
    let (status, body) = send(&healthy_router(), Method::DELETE, "/laboratories/items/abc", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert!(body["detail"].as_str().unwrap().contains("abc"));
}

#[tokio::test]
async fn test_malformed_body_is_422() {
    let router = healthy_router();
    let (status, body) = send(&router, Method::POST, "/laboratories/items", Some(json!({"code": "x"}))).await;
    assert_eq!(status, StatusCode::UNPROCESSABLE_ENTITY);
    assert!(body["detail"].is_string());
}

// =============================================================================
// Laboratories
// =============================================================================

async fn create_lab(router: &Router) -> String {
    let (status, body) = send(
        router,
        Method::POST,
        "/laboratories/",
        Some(json!({"name": "Electronics", "location": "Building B", "capacity": 30})),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["items"], json!([]));
    assert_eq!(body["capacity"], 30);
    body["id"].as_str().unwrap().to_string()
}

#[tokio::test]
async fn test_lab_lifecycle() {
    let router = healthy_router();
    let lab_id = create_lab(&router).await;
    assert_eq!(lab_id.len(), 24);

    let (status, body) = send(&router, Method::GET, "/laboratories/", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body.as_array().unwrap().len(), 1);

    let (status, body) = send(&router, Method::GET, &format!("/laboratories/{}", lab_id), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["name"], "Electronics");

    let (status, body) = send(&router, Method::DELETE, &format!("/laboratories/{}", lab_id), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "laboratory deleted");

    let (status, body) = send(&router, Method::GET, &format!("/laboratories/{}", lab_id), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["detail"], "laboratory not found");
}

#[tokio::test]
async fn test_nested_items_and_maintenance() {
    let router = healthy_router();
    let lab_id = create_lab(&router).await;

    let (status, first) = send(
        &router,
        Method::PUT,
        &format!("/laboratories/{}/add-item", lab_id),
        Some(json!({"code": "OSC-1", "type": "Oscilloscope", "status": "Operational", "area": "Bench 2", "acquisition_date": "2024-03-01"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(first["item"]["maintenance_history"], json!([]));
    assert_eq!(first["item"]["acquisition_date"], "2024-03-01");
    let first_id = first["item"]["id"].as_str().unwrap().to_string();

    let (_, second) = send(
        &router,
        Method::PUT,
        &format!("/laboratories/{}/add-item", lab_id),
        Some(item_json("PC-5")),
    )
    .await;
    let second_id = second["item"]["id"].as_str().unwrap().to_string();
    assert_ne!(first_id, second_id);

    let (status, body) = send(
        &router,
        Method::POST,
        &format!("/laboratories/{}/items/{}/maintenance", lab_id, first_id),
        Some(json!({"date": "2024-05-10", "technician": "Ana", "type": "preventive", "description": "calibration"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "maintenance recorded");
    assert_eq!(body["record"]["technician"], "Ana");
    assert!(body["record"]["id"].is_string());

    let (status, body) = send(
        &router,
        Method::PUT,
        &format!("/laboratories/{}/items/{}", lab_id, second_id),
        Some(json!({"code": "PC-5", "type": "Computer", "status": "Broken", "area": "Lab 1"})),
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "item updated");

    let (_, lab) = send(&router, Method::GET, &format!("/laboratories/{}", lab_id), None).await;
    let items = lab["items"].as_array().unwrap();
    assert_eq!(items.len(), 2);
    assert_eq!(items[0]["maintenance_history"].as_array().unwrap().len(), 1);
    assert_eq!(items[1]["maintenance_history"], json!([]));
    assert_eq!(items[1]["status"], "Broken");

    let (status, body) = send(
        &router,
        Method::DELETE,
        &format!("/laboratories/{}/items/{}", lab_id, first_id),
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["message"], "item removed");

    let (_, lab) = send(&router, Method::GET, &format!("/laboratories/{}", lab_id), None).await;
    assert_eq!(lab["items"].as_array().unwrap().len(), 1);
    assert_eq!(lab["items"][0]["id"], second_id);
}

#[tokio::test]
async fn test_invalid_lab_id_is_400() {
    let router = healthy_router();

    let (status, _) = send(&router, Method::GET, "/laboratories/not-an-id", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(&router, Method::DELETE, "/laboratories/xyz", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);

    let (status, _) = send(&router, Method::PUT, "/laboratories/xyz/add-item", Some(item_json("a"))).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_unknown_nested_item_is_404() {
    let router = healthy_router();
    let lab_id = create_lab(&router).await;

    let (status, body) = send(
        &router,
        Method::POST,
        &format!("/laboratories/{}/items/ghost/maintenance", lab_id),
        Some(json!({"technician": "Ana"})),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["detail"], "item not found");

    let (status, _) = send(&router, Method::DELETE, &format!("/laboratories/{}/items/ghost", lab_id), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_add_item_to_missing_lab_is_404() {
    let router = healthy_router();
    let (status, body) = send(
        &router,
        Method::PUT,
        "/laboratories/65f0a1b2c3d4e5f607182930/add-item",
        Some(item_json("PC-1")),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["detail"], "laboratory not found");
}

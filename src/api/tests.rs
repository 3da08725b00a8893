use std::sync::Arc;

use axum::body::Body;
use axum::http::{header, Method, Request, StatusCode};
use axum::Router;
use http_body_util::BodyExt;
use serde_json::{json, Value};
use tower::ServiceExt;

use super::create_router;
use crate::allocator::{AssetStore, StoreError};
use crate::storage::models::{AssetRecord, CustomerAssetCounter};
use crate::storage::Database;
use crate::testutil::{test_state, test_state_with_store};

/// Numbers assets from the real database but cannot store them.
struct UnwritableAssets {
    db: Database,
}

#[async_trait::async_trait]
impl AssetStore for UnwritableAssets {
    async fn list_asset_ids_with_prefix(&self, prefix: &str) -> Result<Vec<String>, StoreError> {
        AssetStore::list_asset_ids_with_prefix(&self.db, prefix).await
    }

    async fn get_counter(
        &self,
        customer_id: &str,
    ) -> Result<Option<CustomerAssetCounter>, StoreError> {
        AssetStore::get_counter(&self.db, customer_id).await
    }

    async fn put_counter(&self, customer_id: &str, next_counter: u64) -> Result<(), StoreError> {
        AssetStore::put_counter(&self.db, customer_id, next_counter).await
    }

    async fn insert_asset(&self, _asset: AssetRecord) -> Result<AssetRecord, StoreError> {
        Err(StoreError::Backend("asset table unavailable".to_string()))
    }
}

async fn send(app: &Router, method: Method, uri: &str, body: Option<Value>) -> (StatusCode, Value) {
    let builder = Request::builder().method(method).uri(uri);
    let request = match body {
        Some(body) => builder
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap(),
        None => builder.body(Body::empty()).unwrap(),
    };

    let response = app.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    let json = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap()
    };
    (status, json)
}

fn certificate(customer_id: &str) -> Value {
    json!({
        "job_id": "job-100",
        "customer_id": customer_id,
        "equipment": "gloves",
        "name": "Class 0 rubber gloves",
        "file_url": "https://files.example/certs/100.pdf",
        "result": "pass",
        "form": { "size": "10", "voltage_class": 0 },
        "created_by": "tech-7",
        "technician": "J. Rivera"
    })
}

fn asset(customer_code: &str) -> Value {
    json!({
        "job_id": "job-200",
        "customer_id": "customer-uuid",
        "name": "Line hose 3m",
        "file_url": "https://files.example/certs/200.pdf",
        "created_by": "tech-7",
        "asset_customer_code": customer_code
    })
}

#[tokio::test]
async fn test_health() {
    let dir = tempfile::tempdir().unwrap();
    let app = create_router(test_state(&dir));

    let (status, json) = send(&app, Method::GET, "/_internal/health", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["status"], "success");
    assert_eq!(json["data"]["status"], "ok");
}

#[tokio::test]
async fn test_next_asset_id_follows_created_assets() {
    let dir = tempfile::tempdir().unwrap();
    let app = create_router(test_state(&dir));

    let (status, json) = send(&app, Method::GET, "/customers/42/next-asset-id", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["data"]["asset_id"], "42-1");

    for expected in ["42-1", "42-2"] {
        let (status, json) = send(&app, Method::POST, "/assets", Some(asset("42"))).await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(json["data"]["asset_id"], expected);
    }

    let (_, json) = send(&app, Method::GET, "/customers/42/next-asset-id", None).await;
    assert_eq!(json["data"]["asset_id"], "42-3");

    // Previewing keeps the advisory counter ahead of the scan
    let (status, json) = send(&app, Method::GET, "/customers/42/counter", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["data"]["next_counter"], 4);
}

#[tokio::test]
async fn test_uuid_customer_id_uses_fallback_code() {
    let dir = tempfile::tempdir().unwrap();
    let app = create_router(test_state(&dir));

    let (_, json) = send(
        &app,
        Method::GET,
        "/customers/3f2a9c1e-8d4b-4f6a-9e2d-1b7c5a0e4d93/next-asset-id",
        None,
    )
    .await;
    assert_eq!(json["data"]["asset_id"], "1-1");
}

#[tokio::test]
async fn test_counter_not_found() {
    let dir = tempfile::tempdir().unwrap();
    let app = create_router(test_state(&dir));

    let (status, json) = send(&app, Method::GET, "/customers/99/counter", None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(json["status"], "fail");
}

#[tokio::test]
async fn test_deleted_asset_leaves_gap() {
    let dir = tempfile::tempdir().unwrap();
    let app = create_router(test_state(&dir));

    let mut ids = Vec::new();
    for _ in 0..3 {
        let (_, json) = send(&app, Method::POST, "/assets", Some(asset("5"))).await;
        ids.push(json["data"]["id"].as_str().unwrap().to_string());
    }

    let (status, _) = send(&app, Method::DELETE, &format!("/assets/{}", ids[1]), None).await;
    assert_eq!(status, StatusCode::OK);

    let (_, json) = send(&app, Method::POST, "/assets", Some(asset("5"))).await;
    assert_eq!(json["data"]["asset_id"], "5-4");

    let (status, _) = send(&app, Method::GET, &format!("/assets/{}", ids[1]), None).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_create_asset_validation() {
    let dir = tempfile::tempdir().unwrap();
    let app = create_router(test_state(&dir));

    let mut body = asset("5");
    body["name"] = json!("   ");
    let (status, json) = send(&app, Method::POST, "/assets", Some(body)).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(json["status"], "fail");
    assert_eq!(json["data"]["message"], "name must not be empty");

    let mut body = asset("5");
    body["parent_report_id"] = json!("missing-report");
    let (status, _) = send(&app, Method::POST, "/assets", Some(body)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_create_asset_without_code() {
    let dir = tempfile::tempdir().unwrap();
    let app = create_router(test_state(&dir));

    let mut body = asset("5");
    body.as_object_mut().unwrap().remove("asset_customer_code");
    let (status, json) = send(&app, Method::POST, "/assets", Some(body)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["data"]["asset_id"], Value::Null);
}

#[tokio::test]
async fn test_malformed_json_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let app = create_router(test_state(&dir));

    let request = Request::builder()
        .method(Method::POST)
        .uri("/assets")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{not json"))
        .unwrap();
    let response = app.oneshot(request).await.unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_save_certificate_creates_asset_and_history() {
    let dir = tempfile::tempdir().unwrap();
    let app = create_router(test_state(&dir));

    let (status, json) = send(&app, Method::POST, "/certificates", Some(certificate("7"))).await;
    assert_eq!(status, StatusCode::OK);
    let data = &json["data"];
    assert_eq!(data["warnings"], json!([]));
    assert_eq!(data["asset"]["asset_id"], "7-1");
    assert_eq!(data["asset"]["report_id"], data["report"]["id"]);
    assert_eq!(data["test_entry"]["result"], "pass");
    assert_eq!(data["report"]["form"]["size"], "10");

    let asset_id = data["asset"]["id"].as_str().unwrap();
    let (status, json) = send(&app, Method::GET, &format!("/assets/{asset_id}/tests"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["data"].as_array().unwrap().len(), 1);
    assert_eq!(json["data"][0]["technician"], "J. Rivera");

    let report_id = data["report"]["id"].as_str().unwrap();
    let (status, json) =
        send(&app, Method::GET, &format!("/certificates/{report_id}"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["data"]["equipment"], "gloves");

    // A second certificate for the same customer gets the next number
    let (_, json) = send(&app, Method::POST, "/certificates", Some(certificate("7"))).await;
    assert_eq!(json["data"]["asset"]["asset_id"], "7-2");
}

#[tokio::test]
async fn test_save_certificate_when_asset_cannot_be_stored() {
    let dir = tempfile::tempdir().unwrap();
    let state = test_state_with_store(&dir, |db| {
        Arc::new(UnwritableAssets { db }) as Arc<dyn AssetStore>
    });
    let app = create_router(Arc::clone(&state));

    let (status, json) = send(&app, Method::POST, "/certificates", Some(certificate("7"))).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["status"], "success");

    let data = &json["data"];
    assert_eq!(data["asset"], Value::Null);
    assert_eq!(data["test_entry"], Value::Null);
    let warnings = data["warnings"].as_array().unwrap();
    assert_eq!(warnings.len(), 1);
    let warning = warnings[0].as_str().unwrap();
    assert!(warning.starts_with("Certificate saved, but the asset record could not be created"));
    assert!(warning.contains("asset table unavailable"));

    // The report itself was kept
    let report_id = data["report"]["id"].as_str().unwrap();
    let (status, json) =
        send(&app, Method::GET, &format!("/certificates/{report_id}"), None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["data"]["job_id"], "job-100");
    assert!(state.db.get_all_assets().unwrap().is_empty());
}

#[tokio::test]
async fn test_create_asset_surfaces_store_failure() {
    let dir = tempfile::tempdir().unwrap();
    let app = create_router(test_state_with_store(&dir, |db| {
        Arc::new(UnwritableAssets { db }) as Arc<dyn AssetStore>
    }));

    let (status, json) = send(&app, Method::POST, "/assets", Some(asset("5"))).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert_eq!(json["status"], "error");
    assert_eq!(json["message"], "asset table unavailable");

    // Id previews are unaffected
    let (status, json) = send(&app, Method::GET, "/customers/5/next-asset-id", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["data"]["asset_id"], "5-1");
}

#[tokio::test]
async fn test_append_and_list_test_history() {
    let dir = tempfile::tempdir().unwrap();
    let app = create_router(test_state(&dir));

    let (_, json) = send(&app, Method::POST, "/assets", Some(asset("8"))).await;
    let id = json["data"]["id"].as_str().unwrap().to_string();

    for result in ["pass", "fail"] {
        let (status, _) = send(
            &app,
            Method::POST,
            &format!("/assets/{id}/tests"),
            Some(json!({ "job_id": "job-300", "result": result })),
        )
        .await;
        assert_eq!(status, StatusCode::OK);
    }

    let (_, json) = send(&app, Method::GET, &format!("/assets/{id}/tests"), None).await;
    let results: Vec<&str> = json["data"]
        .as_array()
        .unwrap()
        .iter()
        .map(|e| e["result"].as_str().unwrap())
        .collect();
    assert_eq!(results, vec!["pass", "fail"]);

    let (status, _) = send(
        &app,
        Method::POST,
        "/assets/no-such-asset/tests",
        Some(json!({ "job_id": "job-300", "result": "pass" })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn test_list_assets_paginated() {
    let dir = tempfile::tempdir().unwrap();
    let app = create_router(test_state(&dir));

    for code in ["11", "11", "11", "12"] {
        let mut body = asset(code);
        body["customer_id"] = json!(format!("customer-{code}"));
        send(&app, Method::POST, "/assets", Some(body)).await;
    }

    let (status, json) = send(
        &app,
        Method::GET,
        "/assets?customer_id=customer-11&limit=2&offset=1",
        None,
    )
    .await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["data"]["pagination"]["total"], 3);
    assert_eq!(json["data"]["items"].as_array().unwrap().len(), 2);

    let (status, _) = send(&app, Method::GET, "/assets?limit=0", None).await;
    assert_eq!(status, StatusCode::BAD_REQUEST);
}

#[tokio::test]
async fn test_admin_purge() {
    let dir = tempfile::tempdir().unwrap();
    let app = create_router(test_state(&dir));

    send(&app, Method::POST, "/certificates", Some(certificate("3"))).await;

    let (status, json) = send(&app, Method::DELETE, "/admin/purge", None).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(json["data"]["assets_deleted"], 1);
    assert_eq!(json["data"]["reports_deleted"], 1);
    assert_eq!(json["data"]["test_entries_deleted"], 1);

    let (_, json) = send(&app, Method::GET, "/customers/3/next-asset-id", None).await;
    assert_eq!(json["data"]["asset_id"], "3-1");
}

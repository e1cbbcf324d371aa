//! Integration tests for mdash-layout API endpoints
//!
//! Tests cover:
//! - /appcomponent envelope on success and failure
//! - /appinfo listing and HTTP error mapping
//! - /breadcrumb trails over SQLite
//! - /health (no state required)

use std::sync::Arc;

use axum::{
    body::Body,
    http::{Request, StatusCode},
};
use mdash_common::config::ServiceConfig;
use mdash_common::db::{init_memory_database, insert_entity, insert_metric, Entity, MetricRow};
use serde_json::Value;
use sqlx::SqlitePool;
use tower::util::ServiceExt; // for `oneshot` method
use uuid::Uuid;

use mdash_layout::store::SqliteLayoutStore;
use mdash_layout::{build_router, AppState};

struct Fixture {
    framework: Entity,
    service: Entity,
}

/// Test helper: framework -> service, with two metrics on the service
async fn setup_test_db() -> (SqlitePool, Fixture) {
    let pool = init_memory_database()
        .await
        .expect("Should create in-memory database");

    let framework = Entity {
        id: Uuid::new_v4(),
        parent_id: None,
        name: "Payments".to_string(),
        entity_type: "framework".to_string(),
        has_child: true,
        deep_link_id: "payments".to_string(),
    };
    let service = Entity {
        id: Uuid::new_v4(),
        parent_id: Some(framework.id),
        name: "Checkout".to_string(),
        entity_type: "service".to_string(),
        has_child: false,
        deep_link_id: "checkout".to_string(),
    };
    insert_entity(&pool, &framework).await.unwrap();
    insert_entity(&pool, &service).await.unwrap();

    for (id, sort, layout) in [
        (
            "error_rate",
            2,
            r#"[{"graphType": {"containerName": "Errors", "sort": 2, "colSpan": 6}}]"#,
        ),
        (
            "p99_latency",
            1,
            r#"[{"graphType": {"containerName": "Latency", "sort": 1, "colSpan": 12}}]"#,
        ),
    ] {
        insert_metric(
            &pool,
            &MetricRow {
                metric_id: id.to_string(),
                text: id.replace('_', " "),
                parent_entity_id: service.id,
                entity_name: String::new(),
                entity_type: String::new(),
                has_child: false,
                deep_link_id: String::new(),
                metric_name: id.to_string(),
                metric_type: "timeseries".to_string(),
                metric_unit: "ms".to_string(),
                min_threshold: 0.0,
                max_threshold: 250.0,
                sort,
                graph_layout_json: layout.to_string(),
            },
        )
        .await
        .unwrap();
    }

    (pool, Fixture { framework, service })
}

/// Test helper: Create app over the pool with default config
fn setup_app(db: SqlitePool) -> axum::Router {
    let store = Arc::new(SqliteLayoutStore::new(db));
    build_router(AppState::new(store, &ServiceConfig::default()))
}

fn test_request(uri: &str) -> Request<Body> {
    Request::builder()
        .method("GET")
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

async fn extract_json(body: Body) -> Value {
    let bytes = axum::body::to_bytes(body, usize::MAX)
        .await
        .expect("Should read body");
    serde_json::from_slice(&bytes).expect("Should parse JSON")
}

// =============================================================================
// Health
// =============================================================================

#[tokio::test]
async fn test_health_endpoint() {
    let (db, _) = setup_test_db().await;
    let app = setup_app(db);

    let response = app.oneshot(test_request("/health")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = extract_json(response.into_body()).await;
    assert_eq!(body["status"], "ok");
    assert_eq!(body["module"], "mdash-layout");
    assert!(body["version"].is_string());
}

// =============================================================================
// /appcomponent
// =============================================================================

#[tokio::test]
async fn test_appcomponent_by_app_id() {
    let (db, fixture) = setup_test_db().await;
    let app = setup_app(db);

    let uri = format!(
        "/appcomponent?app_id={}&time_range=24h&drill_level=2",
        fixture.service.id
    );
    let response = app.oneshot(test_request(&uri)).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = extract_json(response.into_body()).await;
    assert_eq!(body["status"], 200);
    assert_eq!(body["message"], "success");

    let data = &body["data"];
    assert_eq!(data["entity_id"], fixture.service.id.to_string());
    assert_eq!(data["time_range"], "24h");
    assert_eq!(data["drill_level"], "2");

    let layout = data["layout"].as_array().unwrap();
    assert_eq!(layout.len(), 2);
    assert_eq!(layout[0]["metric_id"], "p99_latency");
    assert_eq!(layout[0]["entity_name"], "Checkout");
    assert_eq!(layout[0]["graph_layout"][0]["graphType"]["colSpan"], 12);
    assert_eq!(layout[1]["metric_id"], "error_rate");

    let containers = data["containers"].as_array().unwrap();
    assert_eq!(containers[0]["container_name"], "Latency");
    assert_eq!(containers[1]["container_name"], "Errors");
}

#[tokio::test]
async fn test_appcomponent_component_id_fallback() {
    let (db, fixture) = setup_test_db().await;
    let app = setup_app(db);

    let uri = format!("/appcomponent?app_id=&component_id={}", fixture.service.id);
    let response = app.oneshot(test_request(&uri)).await.unwrap();

    let body = extract_json(response.into_body()).await;
    assert_eq!(body["status"], 200);
    assert_eq!(body["data"]["entity_id"], fixture.service.id.to_string());
}

#[tokio::test]
async fn test_appcomponent_root_sentinel() {
    let (db, fixture) = setup_test_db().await;
    let app = setup_app(db);

    let response = app.oneshot(test_request("/appcomponent")).await.unwrap();

    let body = extract_json(response.into_body()).await;
    assert_eq!(body["status"], 200);
    assert_eq!(body["data"]["entity_id"], Uuid::nil().to_string());
    let children = body["data"]["children"].as_array().unwrap();
    assert_eq!(children.len(), 1);
    assert_eq!(children[0]["id"], fixture.framework.id.to_string());
    assert_eq!(children[0]["type"], "framework");
    assert!(body["data"]["layout"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_appcomponent_invalid_id_in_envelope() {
    let (db, _) = setup_test_db().await;
    let app = setup_app(db);

    let response = app
        .oneshot(test_request("/appcomponent?app_id=bogus"))
        .await
        .unwrap();

    // Envelope handler never fails at the HTTP level
    assert_eq!(response.status(), StatusCode::OK);

    let body = extract_json(response.into_body()).await;
    assert_eq!(body["status"], 400);
    assert!(body["message"].as_str().unwrap().contains("Invalid entity id"));
    assert!(body["data"].is_null());
}

#[tokio::test]
async fn test_appcomponent_query_error_in_envelope() {
    let (db, _) = setup_test_db().await;
    sqlx::query("DROP TABLE metric").execute(&db).await.unwrap();
    let app = setup_app(db);

    let response = app.oneshot(test_request("/appcomponent")).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = extract_json(response.into_body()).await;
    assert_eq!(body["status"], 500);
    assert!(body["message"].as_str().unwrap().contains("fetch_metrics"));
}

// =============================================================================
// /appinfo
// =============================================================================

#[tokio::test]
async fn test_appinfo_lists_children() {
    let (db, fixture) = setup_test_db().await;
    let app = setup_app(db);

    let uri = format!("/appinfo?app_id={}&level=1", fixture.framework.id);
    let response = app.oneshot(test_request(&uri)).await.unwrap();
    assert_eq!(response.status(), StatusCode::OK);

    let body = extract_json(response.into_body()).await;
    let rows = body.as_array().unwrap();
    assert_eq!(rows.len(), 1);
    assert_eq!(rows[0]["entity_id"], fixture.service.id.to_string());
    assert_eq!(rows[0]["level"], "1");
    let metric_ids = rows[0]["metric_ids"].as_array().unwrap();
    assert_eq!(metric_ids[0], "p99_latency");
    assert_eq!(metric_ids[1], "error_rate");
}

#[tokio::test]
async fn test_appinfo_metric_filter_excludes() {
    let (db, fixture) = setup_test_db().await;
    let app = setup_app(db);

    let uri = format!(
        "/appinfo?component_id={}&metric_id=throughput",
        fixture.framework.id
    );
    let response = app.oneshot(test_request(&uri)).await.unwrap();

    let body = extract_json(response.into_body()).await;
    assert!(body.as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_appinfo_query_error_is_http_500() {
    let (db, _) = setup_test_db().await;
    sqlx::query("DROP TABLE metric").execute(&db).await.unwrap();
    let app = setup_app(db);

    let response = app.oneshot(test_request("/appinfo")).await.unwrap();
    assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);

    let body = extract_json(response.into_body()).await;
    assert_eq!(body["error"]["code"], "QUERY_ERROR");
}

#[tokio::test]
async fn test_appinfo_invalid_id_is_http_400() {
    let (db, _) = setup_test_db().await;
    let app = setup_app(db);

    let response = app
        .oneshot(test_request("/appinfo?app_id=nope"))
        .await
        .unwrap();
    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
}

// =============================================================================
// /breadcrumb
// =============================================================================

#[tokio::test]
async fn test_breadcrumb_root_first() {
    let (db, fixture) = setup_test_db().await;
    let app = setup_app(db);

    let uri = format!("/breadcrumb?entity_id={}", fixture.service.id);
    let response = app.oneshot(test_request(&uri)).await.unwrap();

    let body = extract_json(response.into_body()).await;
    assert_eq!(body["status"], 200);
    assert_eq!(body["data"]["depth"], 2);
    let entities = body["data"]["entities"].as_array().unwrap();
    assert_eq!(entities[0]["name"], "Payments");
    assert_eq!(entities[1]["name"], "Checkout");
}

#[tokio::test]
async fn test_breadcrumb_unknown_entity_is_empty() {
    let (db, _) = setup_test_db().await;
    let app = setup_app(db);

    let uri = format!("/breadcrumb?entity_id={}", Uuid::new_v4());
    let response = app.oneshot(test_request(&uri)).await.unwrap();

    let body = extract_json(response.into_body()).await;
    assert_eq!(body["status"], 200);
    assert_eq!(body["data"]["depth"], 0);
    assert!(body["data"]["entities"].as_array().unwrap().is_empty());
}

#[tokio::test]
async fn test_breadcrumb_invalid_id() {
    let (db, _) = setup_test_db().await;
    let app = setup_app(db);

    let response = app
        .oneshot(test_request("/breadcrumb?entity_id=xyz"))
        .await
        .unwrap();

    let body = extract_json(response.into_body()).await;
    assert_eq!(body["status"], 400);
}

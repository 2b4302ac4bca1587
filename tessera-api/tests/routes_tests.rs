//! HTTP surface tests driven through the router with `oneshot`.

use std::sync::Arc;

use axum::{
    body::{to_bytes, Body},
    http::{header, Method, Request, StatusCode},
    Router,
};
use serde_json::{json, Value};
use tessera_api::{
    create_api_router, ApiConfig, AppState, ListRecordsResponse, RecordService, USER_ID_HEADER,
};
use tessera_core::NameValidator;
use tessera_search::IndexSynchronizer;
use tessera_test_utils::*;
use tower::ServiceExt;

struct TestApp {
    router: Router,
    store: Arc<InMemoryRecordStore>,
    index: Arc<InMemorySearchIndex>,
}

fn app_with(config: ApiConfig) -> TestApp {
    let store = Arc::new(InMemoryRecordStore::new());
    let index = Arc::new(InMemorySearchIndex::new());
    let records = Arc::new(RecordService::new(
        store.clone(),
        Arc::new(InMemoryRecordCache::new()),
        Arc::new(NameValidator),
    ));
    let sync = Arc::new(IndexSynchronizer::new(store.clone(), index.clone()));
    TestApp {
        router: create_api_router(AppState::new(records, sync), &config),
        store,
        index,
    }
}

fn app() -> TestApp {
    app_with(ApiConfig::default())
}

async fn send(router: &Router, request: Request<Body>) -> (StatusCode, Value) {
    let response = router.clone().oneshot(request).await.unwrap();
    let status = response.status();
    let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    let body = if bytes.is_empty() {
        Value::Null
    } else {
        serde_json::from_slice(&bytes).unwrap_or(Value::Null)
    };
    (status, body)
}

fn json_request(method: Method, uri: &str, body: Value) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .header(USER_ID_HEADER, "alice")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn empty_request(method: Method, uri: &str) -> Request<Body> {
    Request::builder()
        .method(method)
        .uri(uri)
        .body(Body::empty())
        .unwrap()
}

async fn create(router: &Router, name: &str) -> Value {
    let (status, body) = send(
        router,
        json_request(Method::POST, "/api/v1/todos", json!({ "name": name })),
    )
    .await;
    assert_eq!(status, StatusCode::CREATED);
    body
}

#[tokio::test]
async fn create_returns_view_with_actor() {
    let app = app();
    let body = create(&app.router, "buy milk").await;

    assert_eq!(body["name"], "buy milk");
    assert_eq!(body["created_by"], "alice");
    assert_eq!(body["updated_by"], "alice");
    assert!(body["id"].as_str().is_some_and(|id| !id.is_empty()));
    assert!(body.get("deleted_at").is_none());
}

#[tokio::test]
async fn create_without_actor_header_is_anonymous() {
    let app = app();
    let request = Request::builder()
        .method(Method::POST)
        .uri("/api/v1/todos")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(json!({ "name": "x" }).to_string()))
        .unwrap();
    let (status, body) = send(&app.router, request).await;

    assert_eq!(status, StatusCode::CREATED);
    assert_eq!(body["created_by"], "anonymous");
}

#[tokio::test]
async fn blank_or_missing_name_is_bad_request() {
    let app = app();
    for payload in [json!({ "name": "  " }), json!({})] {
        let (status, body) = send(
            &app.router,
            json_request(Method::POST, "/api/v1/todos", payload),
        )
        .await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
        assert_eq!(body["code"], "VALIDATION_FAILED");
    }
    assert_eq!(app.store.calls().create, 0);
}

#[tokio::test]
async fn get_update_delete_cycle() {
    let app = app();
    let created = create(&app.router, "buy milk").await;
    let id = created["id"].as_str().unwrap().to_string();
    let uri = format!("/api/v1/todos/{}", id);

    let (status, body) = send(&app.router, empty_request(Method::GET, &uri)).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, created);

    let update = Request::builder()
        .method(Method::PUT)
        .uri(&uri)
        .header(header::CONTENT_TYPE, "application/json")
        .header(USER_ID_HEADER, "bob")
        .body(Body::from(json!({ "name": "buy bread" }).to_string()))
        .unwrap();
    let (status, body) = send(&app.router, update).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["name"], "buy bread");
    assert_eq!(body["created_by"], "alice");
    assert_eq!(body["updated_by"], "bob");

    let (status, _) = send(&app.router, empty_request(Method::DELETE, &uri)).await;
    assert_eq!(status, StatusCode::NO_CONTENT);

    let (status, _) = send(&app.router, empty_request(Method::DELETE, &uri)).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn unknown_id_is_not_found() {
    let app = app();
    let (status, body) = send(&app.router, empty_request(Method::GET, "/api/v1/todos/nope")).await;
    assert_eq!(status, StatusCode::NOT_FOUND);
    assert_eq!(body["code"], "RECORD_NOT_FOUND");

    let (status, _) = send(
        &app.router,
        json_request(Method::PUT, "/api/v1/todos/nope", json!({ "name": "x" })),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn list_pages_with_metadata() {
    let app = app();
    for i in 0..12 {
        create(&app.router, &format!("record {}", i)).await;
    }

    let (status, body) = send(
        &app.router,
        empty_request(Method::GET, "/api/v1/todos?page=2&limit=5"),
    )
    .await;
    assert_eq!(status, StatusCode::OK);

    let list: ListRecordsResponse = serde_json::from_value(body).unwrap();
    assert_eq!(list.data.len(), 5);
    assert_eq!(list.data[0].name, "record 5");
    assert_eq!(
        list.meta,
        PageMetadata {
            record: 5,
            page: 2,
            previous: 1,
            next: 3,
            limit: 5,
            total: 12,
        }
    );
}

#[tokio::test]
async fn list_defaults_and_filters() {
    let app = app();
    create(&app.router, "buy milk").await;
    create(&app.router, "walk dog").await;
    create(&app.router, "buy bread").await;

    let (_, body) = send(&app.router, empty_request(Method::GET, "/api/v1/todos")).await;
    assert_eq!(body["meta"]["page"], 1);
    assert_eq!(body["meta"]["limit"], DEFAULT_PAGE_LIMIT);
    assert_eq!(body["meta"]["total"], 3);

    let (_, body) = send(
        &app.router,
        empty_request(Method::GET, "/api/v1/todos?name=BUY"),
    )
    .await;
    assert_eq!(body["meta"]["total"], 2);
    assert_eq!(body["data"][0]["name"], "buy milk");
    assert_eq!(body["data"][1]["name"], "buy bread");
}

#[tokio::test]
async fn repopulate_rebuilds_index() {
    let app = app();
    create(&app.router, "a").await;
    create(&app.router, "b").await;

    let (status, body) = send(
        &app.router,
        empty_request(Method::POST, "/api/v1/admin/repopulate"),
    )
    .await;
    assert_eq!(status, StatusCode::ACCEPTED);
    assert_eq!(body["indexed"], 2);
    assert_eq!(body["failed"], 0);
    assert_eq!(app.index.documents(RECORD_MODEL).unwrap().len(), 2);
}

#[tokio::test]
async fn repopulate_route_can_be_disabled() {
    let app = app_with(ApiConfig {
        admin_repopulate: false,
        ..ApiConfig::default()
    });
    let (status, _) = send(
        &app.router,
        empty_request(Method::POST, "/api/v1/admin/repopulate"),
    )
    .await;
    assert_eq!(status, StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn health_reports_ok() {
    let app = app();
    let (status, body) = send(&app.router, empty_request(Method::GET, "/health")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body["status"], "ok");
}

#[tokio::test]
async fn malformed_query_is_json_bad_request() {
    let app = app();
    let (status, body) = send(
        &app.router,
        empty_request(Method::GET, "/api/v1/todos?page=abc"),
    )
    .await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "INVALID_INPUT");
    assert!(body["details"]["reason"].as_str().is_some());
    assert_eq!(app.store.calls().count, 0);
}

#[tokio::test]
async fn malformed_json_body_is_json_bad_request() {
    let app = app();
    let request = Request::builder()
        .method(Method::POST)
        .uri("/api/v1/todos")
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from("{\"name\": "))
        .unwrap();
    let (status, body) = send(&app.router, request).await;

    assert_eq!(status, StatusCode::BAD_REQUEST);
    assert_eq!(body["code"], "INVALID_INPUT");
    assert_eq!(app.store.calls().create, 0);
}

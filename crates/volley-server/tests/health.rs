//! Integration tests for the health endpoint and the middleware stack.

mod common;

use axum::http::StatusCode;
use common::{body_json, get, post_json};
use serde_json::json;

#[tokio::test]
async fn health_check_returns_ok_with_counts() {
    let t = common::build_test_app();
    let response = get(&t.app, "/health").await;

    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(response).await;
    assert_eq!(json["status"], "ok");
    assert!(json["version"].is_string());
    assert_eq!(json["queue_depth"], 0);
    assert_eq!(json["tasks"]["queued"], 0);
    assert_eq!(json["tasks"]["completed"], 0);
}

#[tokio::test]
async fn health_counts_submitted_tasks() {
    let t = common::build_test_app();
    let response = post_json(&t.app, "/receive-data", json!({ "target": "10.0.0.1" })).await;
    assert_eq!(response.status(), StatusCode::OK);

    let json = body_json(get(&t.app, "/health").await).await;
    let tasks = &json["tasks"];
    let total = ["queued", "running", "completed", "failed"]
        .iter()
        .map(|k| tasks[*k].as_u64().unwrap())
        .sum::<u64>();
    assert_eq!(total, 3);
}

#[tokio::test]
async fn unknown_route_returns_404() {
    let t = common::build_test_app();
    let response = get(&t.app, "/this-route-does-not-exist").await;

    assert_eq!(response.status(), StatusCode::NOT_FOUND);
}

#[tokio::test]
async fn response_contains_x_request_id_header() {
    let t = common::build_test_app();
    let response = get(&t.app, "/health").await;

    let request_id = response
        .headers()
        .get("x-request-id")
        .expect("Response must contain an x-request-id header");
    assert_eq!(request_id.to_str().unwrap().len(), 36);
}

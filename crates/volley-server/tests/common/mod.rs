#![allow(dead_code)]

use std::sync::Arc;

use axum::Router;
use axum::body::Body;
use axum::http::{Request, Response};
use http_body_util::BodyExt;
use tower::ServiceExt;

use volley_core::{Engine, EngineBuilder, HandlerKind, HandlerSpec, WorkerPool};
use volley_server::config::ServerConfig;
use volley_server::router::build_app;
use volley_server::state::AppState;

/// Every handler runs `echo`, so a task's output is its own argument list.
pub fn test_config() -> ServerConfig {
    ServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
        request_timeout_secs: 30,
        shutdown_timeout_secs: 5,
        handlers: HandlerKind::ALL
            .map(|kind| HandlerSpec::new(kind, "echo"))
            .to_vec(),
        working_dir: None,
    }
}

/// Handle to a running test app. Keep `pool` alive for the whole test:
/// dropping it stops the workers.
pub struct TestApp {
    pub app: Router,
    pub engine: Arc<Engine>,
    pub pool: WorkerPool,
}

pub fn build_test_app() -> TestApp {
    let config = test_config();
    let engine = Arc::new(
        EngineBuilder::new()
            .handlers(config.handlers.iter().cloned())
            .build()
            .unwrap(),
    );
    let pool = engine.start_workers();

    let state = AppState {
        engine: Arc::clone(&engine),
        config: Arc::new(config),
    };

    TestApp {
        app: build_app(state),
        engine,
        pool,
    }
}

pub async fn get(app: &Router, uri: &str) -> Response<Body> {
    let request = Request::builder().uri(uri).body(Body::empty()).unwrap();
    app.clone().oneshot(request).await.unwrap()
}

pub async fn post_json(app: &Router, uri: &str, body: serde_json::Value) -> Response<Body> {
    let request = Request::builder()
        .method("POST")
        .uri(uri)
        .header("content-type", "application/json")
        .body(Body::from(body.to_string()))
        .unwrap();
    app.clone().oneshot(request).await.unwrap()
}

pub async fn body_json(response: Response<Body>) -> serde_json::Value {
    let bytes = response.into_body().collect().await.unwrap().to_bytes();
    serde_json::from_slice(&bytes).unwrap()
}

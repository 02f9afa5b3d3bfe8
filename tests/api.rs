//! Backend API tests: in-process via `oneshot` and over a real socket.

use std::time::Duration;

use axum::body::{to_bytes, Body};
use axum::http::{Method, Request, StatusCode};
use serde_json::{json, Value};
use tower::ServiceExt;

use spa_shell::config::ApiConfig;
use spa_shell::http::X_REQUEST_ID;
use spa_shell::query::{ApiFetcher, QueryCache, QueryError, QueryKey};
use spa_shell::ApiServer;

mod common;

async fn call(method: Method, uri: &str) -> (StatusCode, Value) {
    let router = ApiServer::build_router(&ApiConfig::default());
    let response = router
        .oneshot(Request::builder().method(method).uri(uri).body(Body::empty()).unwrap())
        .await
        .unwrap();
    let status = response.status();
    let body = to_bytes(response.into_body(), usize::MAX).await.unwrap();
    (status, serde_json::from_slice(&body).unwrap())
}

async fn get(uri: &str) -> (StatusCode, Value) {
    call(Method::GET, uri).await
}

#[tokio::test]
async fn test_health() {
    assert_eq!(get("/health").await, (StatusCode::OK, json!({ "status": "ok" })));
}

#[tokio::test]
async fn test_sum() {
    assert_eq!(get("/sum?a=1&b=2").await, (StatusCode::OK, json!({ "result": 3 })));
    assert_eq!(get("/sum?a=1.5&b=2").await, (StatusCode::OK, json!({ "result": 3.5 })));
    assert_eq!(get("/sum?a=-4&b=4").await, (StatusCode::OK, json!({ "result": 0 })));
}

#[tokio::test]
async fn test_sum_invalid_params() {
    let invalid = (StatusCode::BAD_REQUEST, json!({ "error": "Invalid query params" }));
    for uri in ["/sum", "/sum?a=1", "/sum?a=1&b=two", "/sum?a=NaN&b=1", "/sum?a=&b=1"] {
        assert_eq!(get(uri).await, invalid, "{}", uri);
    }
}

#[tokio::test]
async fn test_not_found() {
    let not_found = (StatusCode::NOT_FOUND, json!({ "error": "Not Found" }));
    assert_eq!(get("/missing").await, not_found);
    assert_eq!(get("/health/extra").await, not_found);
    assert_eq!(call(Method::POST, "/health").await, not_found);
    assert_eq!(call(Method::DELETE, "/sum?a=1&b=2").await, not_found);
}

#[tokio::test]
async fn test_head_is_not_routed() {
    let router = ApiServer::build_router(&ApiConfig::default());
    for uri in ["/health", "/sum?a=1&b=2"] {
        let response = router
            .clone()
            .oneshot(Request::builder().method(Method::HEAD).uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND, "{}", uri);
    }
}

#[tokio::test]
async fn test_request_id_echoed() {
    let router = ApiServer::build_router(&ApiConfig::default());
    let response = router
        .clone()
        .oneshot(
            Request::builder()
                .uri("/health")
                .header(X_REQUEST_ID, "req-42")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();
    assert_eq!(response.headers()[X_REQUEST_ID], "req-42");

    let response = router
        .oneshot(Request::builder().uri("/health").body(Body::empty()).unwrap())
        .await
        .unwrap();
    let generated = response.headers()[X_REQUEST_ID].to_str().unwrap();
    assert!(uuid::Uuid::parse_str(generated).is_ok());
}

#[tokio::test]
async fn test_live_round_trip_through_cache() {
    let (addr, shutdown, handle) = common::start_api().await;
    let fetcher = ApiFetcher::new(&format!("http://{}", addr), Duration::from_secs(5)).unwrap();
    let cache = QueryCache::new(std::sync::Arc::new(fetcher));

    let value = cache.resolve(&QueryKey::from("/sum?a=2&b=40")).await.unwrap();
    assert_eq!(*value, json!({ "result": 42 }));

    let err = cache.resolve(&QueryKey::from("/sum?a=2")).await.unwrap_err();
    assert_eq!(
        err,
        QueryError::Status {
            status: 400,
            message: "Invalid query params".into()
        }
    );

    let res = reqwest::get(format!("http://{}/nope", addr)).await.unwrap();
    assert_eq!(res.status(), reqwest::StatusCode::NOT_FOUND);

    drop(cache);
    shutdown.trigger();
    tokio::time::timeout(Duration::from_secs(5), handle)
        .await
        .unwrap()
        .unwrap();
}

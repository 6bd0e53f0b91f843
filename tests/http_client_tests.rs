//! Retry and error classification of the shared HTTP call primitive.

mod common;

use std::collections::HashMap;
use std::time::Duration;

use axum::extract::{Query, State};
use axum::http::{HeaderMap, StatusCode};
use axum::routing::{get, post};
use axum::{Json, Router};
use reqwest::Method;
use serde_json::{json, Value};

use common::{closed_port_url, fast_client, serve, HitCounter};
use docconnect::connector::http::CallRequest;

#[tokio::test]
async fn test_always_timing_out_endpoint_is_attempted_exactly_max_retries_times() {
    let hits = HitCounter::default();
    let app = Router::new()
        .route(
            "/slow",
            post(|State(hits): State<HitCounter>| async move {
                hits.hit();
                tokio::time::sleep(Duration::from_secs(2)).await;
                Json(json!({"ok": true}))
            }),
        )
        .with_state(hits.clone());
    let base = serve(app).await;

    let client = fast_client(Duration::from_millis(100), 3);
    let err = client
        .call(&format!("{}/slow", base), &json!({"x": 1}), &[], Method::POST)
        .await
        .unwrap_err();

    assert!(err.is_connection(), "unexpected error: {}", err);
    assert!(err.to_string().contains("3 attempt"));
    assert_eq!(hits.count(), 3);
}

#[tokio::test]
async fn test_recovers_when_a_later_attempt_succeeds() {
    let hits = HitCounter::default();
    let app = Router::new()
        .route(
            "/flaky",
            post(|State(hits): State<HitCounter>| async move {
                if hits.hit() == 1 {
                    tokio::time::sleep(Duration::from_secs(2)).await;
                }
                Json(json!({"attempt": "ok"}))
            }),
        )
        .with_state(hits.clone());
    let base = serve(app).await;

    let client = fast_client(Duration::from_millis(200), 3);
    let value = client
        .call(&format!("{}/flaky", base), &json!({}), &[], Method::POST)
        .await
        .unwrap();

    assert_eq!(value, json!({"attempt": "ok"}));
    assert_eq!(hits.count(), 2);
}

#[tokio::test]
async fn test_http_error_status_is_not_retried() {
    let hits = HitCounter::default();
    let app = Router::new()
        .route(
            "/broken",
            post(|State(hits): State<HitCounter>| async move {
                hits.hit();
                (StatusCode::INTERNAL_SERVER_ERROR, "model crashed")
            }),
        )
        .with_state(hits.clone());
    let base = serve(app).await;

    let client = fast_client(Duration::from_secs(2), 3);
    let err = client
        .call(&format!("{}/broken", base), &json!({}), &[], Method::POST)
        .await
        .unwrap_err();

    assert!(err.is_processing());
    assert!(err.to_string().contains("model crashed"));
    assert_eq!(hits.count(), 1);
}

#[tokio::test]
async fn test_undecodable_body_is_processing_error() {
    let app = Router::new().route("/text", get(|| async { "not json" }));
    let base = serve(app).await;

    let client = fast_client(Duration::from_secs(2), 3);
    let err = client
        .call(&format!("{}/text", base), &json!({}), &[], Method::GET)
        .await
        .unwrap_err();
    assert!(err.is_processing());
}

#[tokio::test]
async fn test_refused_connection_surfaces_as_connection_error() {
    let client = fast_client(Duration::from_secs(1), 2);
    let err = client
        .call(&format!("{}/embed", closed_port_url().await), &json!({}), &[], Method::POST)
        .await
        .unwrap_err();
    assert!(err.is_connection());
    assert!(err.to_string().contains("2 attempt"));
}

#[tokio::test]
async fn test_get_sends_payload_as_query_and_post_as_body() {
    let app = Router::new().route(
        "/echo",
        get(|Query(params): Query<HashMap<String, String>>| async move { Json(json!(params)) }).post(
            |headers: HeaderMap, Json(body): Json<Value>| async move {
                let auth = headers
                    .get("authorization")
                    .and_then(|v| v.to_str().ok())
                    .unwrap_or_default()
                    .to_string();
                Json(json!({"body": body, "auth": auth}))
            },
        ),
    );
    let base = serve(app).await;
    let client = fast_client(Duration::from_secs(2), 1);
    let url = format!("{}/echo", base);

    let query = client
        .call(&url, &json!({"lang": "eng", "psm": 3}), &[], Method::GET)
        .await
        .unwrap();
    assert_eq!(query, json!({"lang": "eng", "psm": "3"}));

    let headers = vec![("Authorization".to_string(), "Bearer k".to_string())];
    let echoed = client
        .call(&url, &json!({"inputs": ["a"]}), &headers, Method::POST)
        .await
        .unwrap();
    assert_eq!(echoed, json!({"body": {"inputs": ["a"]}, "auth": "Bearer k"}));
}

#[tokio::test]
async fn test_probe_uses_no_retries() {
    let hits = HitCounter::default();
    let app = Router::new()
        .route(
            "/health",
            get(|State(hits): State<HitCounter>| async move {
                hits.hit();
                StatusCode::SERVICE_UNAVAILABLE
            }),
        )
        .with_state(hits.clone());
    let base = serve(app).await;

    let client = fast_client(Duration::from_secs(2), 3);
    let status = client.probe(&format!("{}/health", base)).await.unwrap();
    assert_eq!(status.as_u16(), 503);
    assert_eq!(hits.count(), 1);

    let request = CallRequest::get(format!("{}/health", base));
    assert!(client.send(&request).await.unwrap_err().is_processing());
}

#[tokio::test]
async fn test_health_request_makes_a_single_attempt() {
    let hits = HitCounter::default();
    let app = Router::new()
        .route(
            "/embeddings",
            post(|State(hits): State<HitCounter>| async move {
                hits.hit();
                (StatusCode::BAD_GATEWAY, "upstream down")
            }),
        )
        .with_state(hits.clone());
    let base = serve(app).await;

    let client = fast_client(Duration::from_secs(30), 3);
    let request = CallRequest::post(format!("{}/embeddings", base)).json(json!({"input": ["x"]}));
    let err = client.probe_send(&request).await.unwrap_err();

    assert!(err.is_processing());
    assert!(err.to_string().contains("upstream down"));
    assert_eq!(hits.count(), 1);

    let refused = CallRequest::post(format!("{}/embeddings", closed_port_url().await));
    assert!(client.probe_send(&refused).await.unwrap_err().is_connection());
}

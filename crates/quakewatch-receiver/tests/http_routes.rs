//! End-to-end route tests against the axum router.

#![allow(clippy::unwrap_used)]
#![allow(clippy::expect_used)]
#![allow(clippy::panic)]

mod common;

use std::fs;

use axum::body::{to_bytes, Body};
use axum::http::{header, Request, StatusCode};
use axum::Router;
use serde_json::{json, Value};
use tower::ServiceExt;

use quakewatch_receiver::router::build_router;

fn post(uri: &str, body: &str) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri(uri)
        .header(header::CONTENT_TYPE, "application/json")
        .body(Body::from(body.to_string()))
        .unwrap()
}

fn get(uri: &str) -> Request<Body> {
    Request::builder().uri(uri).body(Body::empty()).unwrap()
}

async fn send(router: &Router, req: Request<Body>) -> (StatusCode, String) {
    let resp = router.clone().oneshot(req).await.unwrap();
    let status = resp.status();
    let bytes = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    (status, String::from_utf8(bytes.to_vec()).unwrap())
}

const QUAKE: &str = r#"{"alerts":[{"status":"firing","labels":{"alertname":"M7Quake","severity":"critical"},"annotations":{"summary":"Large quake"},"startsAt":"2024-01-01T00:00:00Z"}]}"#;

#[tokio::test]
async fn critical_alert_is_acknowledged_and_logged() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("alerts.log");
    let (state, _console) = common::app_state(&path);
    let router = build_router(state);

    let (status, body) = send(&router, post("/critical", QUAKE)).await;
    assert_eq!(status, StatusCode::OK);
    let body: Value = serde_json::from_str(&body).unwrap();
    assert_eq!(body, json!({"status": "critical alert received"}));

    let log = fs::read_to_string(&path).unwrap();
    assert_eq!(log.matches("ALERT [critical] - ").count(), 1);
    assert!(log.contains("M7Quake"));
    assert!(log.contains("critical"));
    assert!(log.contains("Large quake"));
}

#[tokio::test]
async fn every_route_acknowledges_its_classification() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("alerts.log");
    let (state, console) = common::app_state(&path);
    let router = build_router(state);

    for (uri, ack, tag) in [
        ("/", "received", "GENERAL"),
        ("/critical", "critical alert received", "CRITICAL"),
        ("/warning", "warning alert received", "WARNING"),
        ("/quakewatch", "quakewatch alert received", "QUAKEWATCH"),
    ] {
        let (status, body) = send(&router, post(uri, QUAKE)).await;
        assert_eq!(status, StatusCode::OK, "{uri}");
        let body: Value = serde_json::from_str(&body).unwrap();
        assert_eq!(body["status"], ack);
        assert!(console.text().contains(&format!("ALERT RECEIVED [{tag}]")));
    }

    let log = fs::read_to_string(&path).unwrap();
    for class in ["general", "critical", "warning", "quakewatch"] {
        assert!(log.contains(&format!("ALERT [{class}] - M7Quake - Large quake")));
    }
}

#[tokio::test]
async fn empty_object_is_accepted_without_log_records() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("alerts.log");
    let (state, _console) = common::app_state(&path);
    let router = build_router(state);

    let (status, body) = send(&router, post("/", "{}")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(serde_json::from_str::<Value>(&body).unwrap(), json!({"status": "received"}));
    assert_eq!(fs::read_to_string(&path).unwrap(), "");
}

#[tokio::test]
async fn non_json_body_is_a_500_and_counted() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("alerts.log");
    let (state, _console) = common::app_state(&path);
    let router = build_router(state);

    let (status, body) = send(&router, post("/quakewatch", "this is not json")).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    let body: Value = serde_json::from_str(&body).unwrap();
    assert!(body["error"].as_str().unwrap().starts_with("malformed payload"));

    let (_, metrics) = send(&router, get("/metrics")).await;
    assert!(metrics.contains("quakewatch_errors_total{error_type=\"malformed_payload\"} 1.0\n"));
    assert!(metrics.contains(
        "quakewatch_requests_total{endpoint=\"/quakewatch\",method=\"POST\",status=\"500\"} 1.0\n"
    ));
    assert_eq!(fs::read_to_string(&path).unwrap(), "");
}

#[tokio::test]
async fn log_write_failure_is_a_500_and_counted() {
    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("alerts.log");
    // A non-empty directory squats on the only backup slot, so rotation cannot clear it.
    let blocker = dir.path().join("alerts.log.1");
    fs::create_dir(&blocker).unwrap();
    fs::write(blocker.join("keep"), "x").unwrap();

    let (state, _console) = common::app_state_with(&path, 64, 1);
    let router = build_router(state);

    let (status, _) = send(&router, post("/critical", QUAKE)).await;
    assert_eq!(status, StatusCode::OK, "first record lands in the empty file");
    let before = fs::read_to_string(&path).unwrap();

    let (status, body) = send(&router, post("/critical", QUAKE)).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    let body: Value = serde_json::from_str(&body).unwrap();
    assert!(body["error"].as_str().unwrap().starts_with("alert log write failed"));

    let (_, metrics) = send(&router, get("/metrics")).await;
    assert!(metrics.contains("quakewatch_errors_total{error_type=\"sink_write\"} 1.0\n"));
    assert!(metrics.contains(
        "quakewatch_requests_total{endpoint=\"/critical\",method=\"POST\",status=\"500\"} 1.0\n"
    ));
    assert_eq!(fs::read_to_string(&path).unwrap(), before);
}

#[tokio::test]
async fn non_object_payload_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let (state, _console) = common::app_state(&dir.path().join("alerts.log"));
    let router = build_router(state);

    let (status, body) = send(&router, post("/warning", r#"{"alerts":"nope"}"#)).await;
    assert_eq!(status, StatusCode::INTERNAL_SERVER_ERROR);
    assert!(serde_json::from_str::<Value>(&body).unwrap()["error"].is_string());
}

#[tokio::test]
async fn health_is_static_json() {
    let dir = tempfile::tempdir().unwrap();
    let (state, _console) = common::app_state(&dir.path().join("alerts.log"));
    let router = build_router(state);

    let (status, body) = send(&router, get("/health")).await;
    assert_eq!(status, StatusCode::OK);
    assert_eq!(body, r#"{"status":"healthy","service":"alert-webhook-receiver"}"#);
}

#[tokio::test]
async fn metrics_exposition_lists_vocabulary_and_requests() {
    let dir = tempfile::tempdir().unwrap();
    let (state, _console) = common::app_state(&dir.path().join("alerts.log"));
    let router = build_router(state);

    send(&router, post("/critical", QUAKE)).await;

    let resp = router.clone().oneshot(get("/metrics")).await.unwrap();
    assert_eq!(resp.status(), StatusCode::OK);
    let content_type = resp.headers()[header::CONTENT_TYPE].to_str().unwrap().to_string();
    assert!(content_type.starts_with("text/plain; version=0.0.4"));
    let body = to_bytes(resp.into_body(), usize::MAX).await.unwrap();
    let body = String::from_utf8(body.to_vec()).unwrap();

    for help in [
        "# HELP quakewatch_requests_total Total number of requests",
        "# HELP quakewatch_request_duration_seconds Request duration in seconds",
        "# HELP quakewatch_active_connections Number of active connections",
        "# HELP quakewatch_data_points_processed_total Total number of data points processed",
        "# HELP quakewatch_api_calls_total Total number of API calls",
        "# HELP quakewatch_errors_total Total number of errors",
        "# HELP quakewatch_earthquakes_total Total number of earthquakes processed",
        "# HELP quakewatch_earthquake_magnitude Earthquake magnitude distribution",
    ] {
        assert!(body.contains(help), "missing {help}");
    }

    assert!(body.contains(
        "quakewatch_requests_total{endpoint=\"/critical\",method=\"POST\",status=\"200\"} 1.0\n"
    ));
    assert!(body.contains(
        "quakewatch_request_duration_seconds_count{endpoint=\"/critical\",method=\"POST\"} 1\n"
    ));
    assert!(body.contains("quakewatch_api_calls_total{api_name=\"alert_critical\"} 1.0\n"));
    assert!(body.contains("quakewatch_data_points_processed_total 1.0\n"));
    // Only the in-flight scrape itself is active.
    assert!(body.contains("quakewatch_active_connections 1.0\n"));
    assert!(body.contains("quakewatch_earthquake_magnitude_bucket{le=\"10.0\"} 0\n"));
}

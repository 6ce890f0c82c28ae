//! Operational HTTP endpoints.
//!
//! - `/health`  : liveness (static; does not probe the alert log)
//! - `/metrics` : Prometheus text format

use axum::{
    extract::State,
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;

use crate::app_state::AppState;
use crate::obs::RequestTimer;

pub const SERVICE_NAME: &str = "alert-webhook-receiver";

#[derive(Debug, Serialize)]
struct Health {
    status: &'static str,
    service: &'static str,
}

pub async fn health(State(state): State<AppState>) -> Response {
    let mut timer = RequestTimer::start(state.metrics(), "GET", "/health");
    timer.set_status(StatusCode::OK.as_u16());
    (
        StatusCode::OK,
        Json(Health {
            status: "healthy",
            service: SERVICE_NAME,
        }),
    )
        .into_response()
}

pub async fn metrics(State(state): State<AppState>) -> Response {
    let mut timer = RequestTimer::start(state.metrics(), "GET", "/metrics");
    let body = state.metrics().render();
    timer.set_status(StatusCode::OK.as_u16());

    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4; charset=utf-8")],
        body,
    )
        .into_response()
}

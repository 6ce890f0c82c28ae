//! Axum router wiring.
//!
//! One POST route per alert classification, plus `/health` and `/metrics`.

use axum::{
    routing::{get, post},
    Router,
};

use crate::{app_state::AppState, ops, transport::webhook};

pub fn build_router(state: AppState) -> Router {
    Router::new()
        .route("/", post(webhook::receive_general))
        .route("/critical", post(webhook::receive_critical))
        .route("/warning", post(webhook::receive_warning))
        .route("/quakewatch", post(webhook::receive_quakewatch))
        .route("/health", get(ops::health))
        .route("/metrics", get(ops::metrics))
        .with_state(state)
}

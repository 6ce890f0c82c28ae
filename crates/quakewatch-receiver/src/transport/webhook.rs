//! Alertmanager webhook handlers.
//!
//! Responsibilities:
//! - Decode the body once into an `AlertBatch` (schema-tolerant)
//! - Tag the batch with the route's classification
//! - Run ingestion on the blocking pool and wait for the file write
//! - Map failures to `{"error": ...}` with 500 and count them by error kind

use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use bytes::Bytes;
use serde::Serialize;

use quakewatch_core::error::{QuakeWatchError, Result};
use quakewatch_core::{AlertBatch, Classification};

use crate::app_state::AppState;
use crate::obs::RequestTimer;

#[derive(Debug, Serialize)]
struct Ack {
    status: &'static str,
}

#[derive(Debug, Serialize)]
struct ErrorBody {
    error: String,
}

pub async fn receive_general(State(app): State<AppState>, body: Bytes) -> Response {
    receive(app, Classification::General, body).await
}

pub async fn receive_critical(State(app): State<AppState>, body: Bytes) -> Response {
    receive(app, Classification::Critical, body).await
}

pub async fn receive_warning(State(app): State<AppState>, body: Bytes) -> Response {
    receive(app, Classification::Warning, body).await
}

pub async fn receive_quakewatch(State(app): State<AppState>, body: Bytes) -> Response {
    receive(app, Classification::Quakewatch, body).await
}

async fn receive(app: AppState, class: Classification, body: Bytes) -> Response {
    let mut timer = RequestTimer::start(app.metrics(), "POST", class.route());
    app.metrics().increment_api_calls(&format!("alert_{class}"));

    let response = match ingest(&app, class, body).await {
        Ok(alerts) => {
            app.metrics().increment_data_points_processed(alerts as u64);
            (StatusCode::OK, Json(Ack { status: class.ack() })).into_response()
        }
        Err(e) => {
            tracing::error!(classification = %class, error = %e, "error processing alert");
            app.metrics().increment_error_count(e.kind().as_str());
            (
                StatusCode::INTERNAL_SERVER_ERROR,
                Json(ErrorBody { error: e.to_string() }),
            )
                .into_response()
        }
    };

    timer.set_status(response.status().as_u16());
    response
}

async fn ingest(app: &AppState, class: Classification, body: Bytes) -> Result<usize> {
    let batch = AlertBatch::from_slice(&body)?;
    let ingestor = app.ingestor();
    tokio::task::spawn_blocking(move || ingestor.ingest(&batch, class))
        .await
        .map_err(|e| QuakeWatchError::Internal(format!("ingest task failed: {e}")))?
}

//! HTTP routes.
//!
//! | Route | Handler |
//! |-------|---------|
//! | `POST /` | push receiver; the body is read as raw bytes whatever its content type |
//! | `GET /health` | liveness |
//! | `GET /metrics` | Prometheus text exposition |

use crate::domain::error::{ApiError, SuccessResponse};
use crate::middleware::{TimeoutLayer, TracingLayer};
use axum::{
    body::Bytes,
    extract::{DefaultBodyLimit, State},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use pg_01_push_verification::PushReceiverApi;
use std::sync::Arc;
use std::time::Duration;
use tower::ServiceBuilder;
use tracing::error;

/// Application state shared across handlers
#[derive(Clone)]
pub struct AppState {
    pub receiver: Arc<dyn PushReceiverApi>,
}

/// Router construction settings.
#[derive(Debug, Clone, Copy)]
pub struct RouterSettings {
    pub request_timeout: Duration,
    pub max_body_bytes: usize,
}

/// Build the gateway router with its middleware stack.
pub fn build_router(receiver: Arc<dyn PushReceiverApi>, settings: RouterSettings) -> Router {
    let state = AppState { receiver };

    let middleware = ServiceBuilder::new()
        .layer(TracingLayer::new())
        .layer(TimeoutLayer::new(settings.request_timeout));

    Router::new()
        .route("/", post(receive_push))
        .route("/health", get(health_check))
        .route("/metrics", get(metrics))
        .layer(DefaultBodyLimit::max(settings.max_body_bytes))
        .layer(middleware)
        .with_state(state)
}

/// Handle one push message
async fn receive_push(State(state): State<AppState>, body: Bytes) -> Response {
    match state.receiver.receive(&body).await {
        Ok(ack) => (StatusCode::OK, Json(SuccessResponse::from(ack))).into_response(),
        Err(e) => ApiError::from(e).into_response(),
    }
}

/// Health check endpoint
async fn health_check() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "ok" }))
}

/// Prometheus metrics endpoint
async fn metrics() -> Response {
    match pg_telemetry::encode_metrics() {
        Ok(text) => (
            [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
            text,
        )
            .into_response(),
        Err(e) => {
            error!(error = %e, "Failed to encode metrics");
            StatusCode::INTERNAL_SERVER_ERROR.into_response()
        }
    }
}

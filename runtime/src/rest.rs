// Copyright 2026 Cortex Contributors
// SPDX-License-Identifier: Apache-2.0

//! HTTP REST API for Harvest.
//!
//! A thin adapter: decode the JSON request, hand it to the [`Pipeline`],
//! encode the response or map the error to a status code.

use crate::error::RequestError;
use crate::pipeline::Pipeline;
use crate::protocol::{self, ExtractionRequest};
use axum::extract::rejection::JsonRejection;
use axum::extract::State;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use serde_json::Value;
use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;
use tower_http::cors::{Any, CorsLayer};
use tracing::{error, info, warn};

/// State shared by all handlers.
pub struct AppState {
    pub pipeline: Arc<Pipeline>,
    pub started_at: Instant,
}

impl AppState {
    pub fn new(pipeline: Arc<Pipeline>) -> Self {
        Self {
            pipeline,
            started_at: Instant::now(),
        }
    }
}

/// Build the axum Router with all REST endpoints.
pub fn router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health))
        .route("/api/v1/status", get(handle_status))
        .route("/api/parse", post(handle_extract))
        .route("/api/v1/extract", post(handle_extract))
        .layer(cors)
        .with_state(state)
}

/// Serve the REST API on `addr` until `shutdown` resolves.
pub async fn start<F>(addr: SocketAddr, state: Arc<AppState>, shutdown: F) -> anyhow::Result<()>
where
    F: Future<Output = ()> + Send + 'static,
{
    let app = router(state);
    let listener = tokio::net::TcpListener::bind(addr).await?;
    info!("REST API listening on http://{}", listener.local_addr()?);

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown)
        .await?;
    Ok(())
}

/// A pipeline error rendered as an HTTP response.
struct ApiError(RequestError);

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = if self.0.is_client_error() {
            StatusCode::BAD_REQUEST
        } else {
            StatusCode::INTERNAL_SERVER_ERROR
        };
        (status, Json(protocol::error_body(&self.0))).into_response()
    }
}

// ── Handlers ────────────────────────────────────────────────────

async fn health() -> Json<Value> {
    Json(serde_json::json!({ "status": "ok" }))
}

async fn handle_status(State(state): State<Arc<AppState>>) -> Json<Value> {
    let renderer = state.pipeline.renderer();
    Json(serde_json::json!({
        "running": true,
        "version": env!("CARGO_PKG_VERSION"),
        "uptime_seconds": state.started_at.elapsed().as_secs_f64(),
        "chromium_available": renderer.is_available(),
        "active_contexts": renderer.active_contexts(),
        "sites": state.pipeline.registry().policies().len(),
    }))
}

async fn handle_extract(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<ExtractionRequest>, JsonRejection>,
) -> Response {
    let Json(req) = match payload {
        Ok(p) => p,
        Err(rejection) => {
            warn!("rejected malformed request: {rejection}");
            return ApiError(RequestError::InvalidInput(rejection.body_text())).into_response();
        }
    };

    match state.pipeline.handle(&req).await {
        Ok(resp) => Json(resp).into_response(),
        Err(e) => {
            if e.is_client_error() {
                warn!(url = %req.url, "request rejected: {e}");
            } else {
                error!(url = %req.url, stage = ?e.stage(), "request failed: {e}");
            }
            ApiError(e).into_response()
        }
    }
}

//! API Handlers
//!
//! HTTP request handlers for each bridge endpoint.

use std::sync::Arc;

use axum::{
    body::Bytes,
    extract::{Path, State},
    Json,
};

use crate::dispatch::{catalogue, Dispatcher, ToolResponse};
use crate::error::Result;
use crate::metrics::MetricsExport;
use crate::models::{
    parse_tool_arguments, CacheStatsResponse, ClearCacheResponse, HealthResponse,
    MetricsResetResponse, ToolListResponse,
};

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    pub dispatcher: Arc<Dispatcher>,
}

impl AppState {
    pub fn new(dispatcher: Dispatcher) -> Self {
        Self {
            dispatcher: Arc::new(dispatcher),
        }
    }
}

/// Handler for POST /tools/:name
///
/// Tool failures are part of the [`ToolResponse`] and still answer 200; only
/// an unreadable body is an HTTP error.
pub async fn call_tool_handler(
    State(state): State<AppState>,
    Path(name): Path<String>,
    body: Bytes,
) -> Result<Json<ToolResponse>> {
    let args = parse_tool_arguments(&body)?;
    Ok(Json(state.dispatcher.dispatch(&name, &args).await))
}

/// Handler for GET /tools
pub async fn list_tools_handler() -> Json<ToolListResponse> {
    Json(ToolListResponse::new(catalogue()))
}

/// Handler for GET /cache/stats
pub async fn cache_stats_handler(State(state): State<AppState>) -> Json<CacheStatsResponse> {
    let cache = state.dispatcher.cache();
    Json(CacheStatsResponse {
        stats: cache.stats().await,
        entries: cache.info().await,
    })
}

/// Handler for DELETE /cache
pub async fn clear_cache_handler(State(state): State<AppState>) -> Json<ClearCacheResponse> {
    let removed = state.dispatcher.cache().clear().await;
    Json(ClearCacheResponse::new(removed))
}

/// Handler for GET /metrics
pub async fn metrics_handler(State(state): State<AppState>) -> Json<MetricsExport> {
    Json(state.dispatcher.metrics().export().await)
}

/// Handler for DELETE /metrics
pub async fn reset_metrics_handler(State(state): State<AppState>) -> Json<MetricsResetResponse> {
    state.dispatcher.metrics().reset().await;
    Json(MetricsResetResponse::new())
}

/// Handler for GET /health
pub async fn health_handler(State(state): State<AppState>) -> Json<HealthResponse> {
    let connections = state.dispatcher.connections();
    let configured = connections.config().await.is_configured();
    Json(HealthResponse::healthy(
        configured,
        connections.is_connected().await,
    ))
}

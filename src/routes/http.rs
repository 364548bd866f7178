// GET handlers: version, metrics, uptime, health

use axum::{Json, extract::State, response::IntoResponse};
use chrono::{DateTime, Utc};
use serde::Serialize;

use super::AppState;
use crate::models::{AggregationResult, MonitoredService, NodeResourceSample};
use crate::version::{NAME, VERSION};

/// Wire shape shared by /api/metrics and /api/uptime; `items` is emitted under the
/// endpoint's own key via `#[serde(flatten)]`.
#[derive(Serialize)]
struct Envelope<K: Serialize> {
    #[serde(flatten)]
    items: K,
    #[serde(skip_serializing_if = "Option::is_none")]
    error: Option<String>,
    #[serde(skip_serializing_if = "std::ops::Not::not")]
    fallback: bool,
    timestamp: DateTime<Utc>,
    source: &'static str,
}

#[derive(Serialize)]
struct Nodes {
    nodes: Vec<NodeResourceSample>,
}

#[derive(Serialize)]
struct Services {
    services: Vec<MonitoredService>,
}

fn envelope<T, K: Serialize>(result: AggregationResult<T>, wrap: fn(Vec<T>) -> K) -> Envelope<K> {
    let source = result.source_label();
    Envelope {
        items: wrap(result.items),
        error: result.error_message,
        fallback: result.used_fallback,
        timestamp: result.timestamp,
        source,
    }
}

/// GET /version: service name and version (from Cargo.toml at build time).
pub(super) async fn version_handler() -> impl IntoResponse {
    Json(serde_json::json!({
        "name": NAME,
        "version": VERSION,
    }))
}

/// GET /api/metrics: live per-node CPU and memory, or flagged fallback data.
pub(super) async fn metrics_handler(State(state): State<AppState>) -> impl IntoResponse {
    let result = state.prometheus_repo.fetch_resource_samples().await;
    Json(envelope(result, |nodes| Nodes { nodes }))
}

/// GET /api/metrics/history: trend windows kept by the background poller.
pub(super) async fn metrics_history_handler(State(state): State<AppState>) -> impl IntoResponse {
    let history = state.history.read().await;
    Json(history.snapshot())
}

/// GET /api/uptime: monitor status, uptime windows and incidents, or flagged fallback data.
pub(super) async fn uptime_handler(State(state): State<AppState>) -> impl IntoResponse {
    let result = state.uptime_repo.fetch_service_statuses().await;
    Json(envelope(result, |services| Services { services }))
}

/// GET /api/health: site reachability mapped onto the known services.
pub(super) async fn health_handler(State(state): State<AppState>) -> impl IntoResponse {
    Json(state.health_probe.check().await)
}

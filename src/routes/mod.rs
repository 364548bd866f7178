// HTTP routes

mod http;

use axum::{Router, routing::get};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::RwLock;
use tower_http::cors::{Any, CorsLayer};

use crate::config::AppConfig;
use crate::health::HealthProbe;
use crate::history::ClusterHistory;
use crate::prometheus_repo::PrometheusRepo;
use crate::uptime_repo::UptimeRepo;

#[derive(Clone)]
pub struct AppState {
    pub prometheus_repo: Arc<PrometheusRepo>,
    pub uptime_repo: Arc<UptimeRepo>,
    pub health_probe: Arc<HealthProbe>,
    pub history: Arc<RwLock<ClusterHistory>>,
}

impl AppState {
    /// Builds every repo from config, sharing one HTTP client and one registry.
    pub fn from_config(config: &AppConfig) -> anyhow::Result<Self> {
        let client = http_client(Duration::from_millis(config.upstream.timeout_ms))?;
        let registry = Arc::new(config.cluster.clone());
        Ok(Self {
            prometheus_repo: Arc::new(PrometheusRepo::new(
                client.clone(),
                config.prometheus.url.clone(),
                registry.clone(),
            )),
            uptime_repo: Arc::new(UptimeRepo::new(
                client.clone(),
                config.uptime.clone(),
                registry.clone(),
            )),
            health_probe: Arc::new(HealthProbe::new(
                client,
                config.health.site_url.clone(),
                Duration::from_millis(config.health.timeout_ms),
                registry,
            )),
            history: Arc::new(RwLock::new(ClusterHistory::new(config.polling.history_len))),
        })
    }
}

/// Shared upstream client; `timeout` bounds every request end to end.
pub fn http_client(timeout: Duration) -> anyhow::Result<reqwest::Client> {
    let client = reqwest::Client::builder()
        .timeout(timeout)
        .user_agent(crate::version::USER_AGENT)
        .build()?;
    Ok(client)
}

pub fn app(state: AppState) -> Router {
    Router::new()
        .route("/", get(|| async { "Hello from homelab-status!" })) // GET /
        .route("/version", get(http::version_handler)) // GET /version
        .route("/api/metrics", get(http::metrics_handler)) // GET /api/metrics
        .route("/api/metrics/history", get(http::metrics_history_handler)) // GET /api/metrics/history
        .route("/api/uptime", get(http::uptime_handler)) // GET /api/uptime
        .route("/api/health", get(http::health_handler)) // GET /api/health
        .layer(CorsLayer::new().allow_origin(Any))
        .with_state(state)
}

// Shared test helpers: upstream payload builders and repos pointed at a mock server

#![allow(dead_code)]

use homelab_status::config::UptimeConfig;
use homelab_status::prometheus_repo::{Metric, PrometheusRepo};
use homelab_status::registry::Registry;
use homelab_status::routes::http_client;
use homelab_status::uptime_repo::UptimeRepo;
use serde_json::{Value, json};
use std::sync::Arc;
use std::time::Duration;
use wiremock::matchers::{method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

/// Client timeout used by every test repo; delays above this simulate an outage.
pub const TEST_TIMEOUT: Duration = Duration::from_millis(300);
pub const SLOW: Duration = Duration::from_millis(1500);

pub const GIB: f64 = 1024.0 * 1024.0 * 1024.0;

pub fn client() -> reqwest::Client {
    http_client(TEST_TIMEOUT).unwrap()
}

/// Instant-query success body with one sample per `(instance, value)`.
pub fn vector(samples: &[(&str, f64)]) -> Value {
    let result: Vec<Value> = samples
        .iter()
        .map(|(instance, value)| {
            json!({
                "metric": { "__name__": "up", "instance": instance, "job": "node-exporter" },
                "value": [1_700_000_000.123, value.to_string()],
            })
        })
        .collect();
    json!({
        "status": "success",
        "data": { "resultType": "vector", "result": result },
    })
}

pub async fn mount_query(server: &MockServer, metric: Metric, template: ResponseTemplate) {
    Mock::given(method("GET"))
        .and(path("/api/v1/query"))
        .and(query_param("query", metric.expr()))
        .respond_with(template)
        .mount(server)
        .await;
}

/// Mounts healthy responses for all four queries across the three registry nodes plus
/// one in-cluster exporter Service that must be ignored.
pub async fn mount_healthy_cluster(server: &MockServer) {
    let svc = "node-exporter.monitoring.svc.cluster.local:9100";
    mount_query(
        server,
        Metric::CpuUsage,
        ResponseTemplate::new(200).set_body_json(vector(&[
            ("192.168.88.5:9100", 12.5),
            ("192.168.88.6:9100", 30.0),
            ("192.168.88.7:9100", 55.25),
            (svc, 99.0),
        ])),
    )
    .await;
    mount_query(
        server,
        Metric::MemoryUsage,
        ResponseTemplate::new(200).set_body_json(vector(&[
            ("192.168.88.5:9100", 25.0),
            ("192.168.88.6:9100", 50.0),
            ("192.168.88.7:9100", 75.0),
            (svc, 1.0),
        ])),
    )
    .await;
    mount_query(
        server,
        Metric::MemoryTotal,
        ResponseTemplate::new(200).set_body_json(vector(&[
            ("192.168.88.5:9100", 8.0 * GIB),
            ("192.168.88.6:9100", 4.0 * GIB),
            ("192.168.88.7:9100", 8.0 * GIB),
        ])),
    )
    .await;
    mount_query(
        server,
        Metric::MemoryAvailable,
        ResponseTemplate::new(200).set_body_json(vector(&[
            ("192.168.88.5:9100", 6.0 * GIB),
            ("192.168.88.6:9100", 2.0 * GIB),
            ("192.168.88.7:9100", 2.0 * GIB),
        ])),
    )
    .await;
}

pub fn prometheus_repo(base_url: Option<String>) -> PrometheusRepo {
    PrometheusRepo::new(client(), base_url, Arc::new(Registry::default()))
}

pub fn uptime_config(endpoint: String, api_key: Option<&str>) -> UptimeConfig {
    UptimeConfig {
        api_key: api_key.map(str::to_string),
        endpoint,
        ..UptimeConfig::default()
    }
}

pub fn uptime_repo(endpoint: String, api_key: Option<&str>) -> UptimeRepo {
    UptimeRepo::new(
        client(),
        uptime_config(endpoint, api_key),
        Arc::new(Registry::default()),
    )
}

/// A getMonitors success body with one monitor built from `monitor`.
pub fn monitors(monitors: Vec<Value>) -> Value {
    json!({
        "stat": "ok",
        "pagination": { "offset": 0, "limit": 50, "total": monitors.len() },
        "monitors": monitors,
    })
}

// Node CPU/memory metrics via the Prometheus instant-query API

mod join;

pub use join::{InstantSample, Metric, PartialNode, join_samples, parse_response};

use crate::error::{UpstreamError, UpstreamResult};
use crate::fallback;
use crate::models::{AggregationResult, NodeResourceSample, Source};
use crate::registry::Registry;
use chrono::Utc;
use reqwest::Client;
use std::sync::Arc;
use tracing::instrument;

pub struct PrometheusRepo {
    client: Client,
    base_url: Option<String>,
    registry: Arc<Registry>,
}

impl PrometheusRepo {
    /// `base_url` is the backend root (e.g. `http://prometheus:9090`); `None` means
    /// metrics are not configured and every call answers from fallback.
    pub fn new(client: Client, base_url: Option<String>, registry: Arc<Registry>) -> Self {
        Self {
            client,
            base_url: base_url.map(|u| u.trim_end_matches('/').to_string()),
            registry,
        }
    }

    pub fn is_configured(&self) -> bool {
        self.base_url.is_some()
    }

    /// Current CPU and memory per known node. Never fails: any upstream problem yields
    /// the registry fallback with the reason attached.
    #[instrument(skip(self), fields(repo = "prometheus", operation = "fetch_resource_samples"))]
    pub async fn fetch_resource_samples(&self) -> AggregationResult<NodeResourceSample> {
        let Some(base_url) = self.base_url.as_deref() else {
            tracing::debug!("Prometheus URL not configured, using fallback data");
            return fallback::resource_result(&self.registry, "Monitoring system not configured");
        };

        match self.query_nodes(base_url).await {
            Ok(nodes) if !nodes.is_empty() => AggregationResult::live(nodes, Source::Prometheus),
            Ok(_) => {
                tracing::warn!(
                    operation = "fetch_resource_samples",
                    "Prometheus returned no resolvable nodes; using fallback data"
                );
                fallback::resource_result(&self.registry, "No known nodes in live metrics")
            }
            Err(e) => {
                tracing::warn!(
                    error = %e,
                    timeout = e.is_timeout(),
                    operation = "fetch_resource_samples",
                    "Prometheus fetch failed; using fallback data"
                );
                fallback::resource_result(
                    &self.registry,
                    format!("Unable to fetch live metrics: {}", e),
                )
            }
        }
    }

    async fn query_nodes(&self, base_url: &str) -> UpstreamResult<Vec<NodeResourceSample>> {
        let time = Utc::now().timestamp().to_string();
        let (cpu, memory, total, available) = tokio::join!(
            self.query(base_url, Metric::CpuUsage, &time),
            self.query(base_url, Metric::MemoryUsage, &time),
            self.query(base_url, Metric::MemoryTotal, &time),
            self.query(base_url, Metric::MemoryAvailable, &time),
        );
        let cpu = cpu?;
        let memory = memory?;
        let total = best_effort(Metric::MemoryTotal, total);
        let available = best_effort(Metric::MemoryAvailable, available);

        Ok(join_samples(
            &self.registry,
            &[
                (Metric::CpuUsage, cpu.as_slice()),
                (Metric::MemoryUsage, memory.as_slice()),
                (Metric::MemoryTotal, total.as_slice()),
                (Metric::MemoryAvailable, available.as_slice()),
            ],
            Utc::now(),
        ))
    }

    #[instrument(skip(self, base_url, metric, time), fields(metric = metric.name()))]
    async fn query(
        &self,
        base_url: &str,
        metric: Metric,
        time: &str,
    ) -> UpstreamResult<Vec<InstantSample>> {
        let response = self
            .client
            .get(format!("{}/api/v1/query", base_url))
            .query(&[("query", metric.expr()), ("time", time)])
            .send()
            .await?;
        let status = response.status();
        if !status.is_success() {
            return Err(UpstreamError::Status(status));
        }
        let body = response.bytes().await?;
        parse_response(&body)
    }
}

/// Optional queries degrade to an empty result set so their fields default to zero.
fn best_effort(
    metric: Metric,
    result: UpstreamResult<Vec<InstantSample>>,
) -> Vec<InstantSample> {
    result.unwrap_or_else(|e| {
        tracing::warn!(
            error = %e,
            metric = metric.name(),
            "optional Prometheus query failed; fields default to 0"
        );
        Vec::new()
    })
}

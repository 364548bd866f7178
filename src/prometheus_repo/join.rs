// Instant-query payload parsing and the per-node join of the four metric result sets.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use serde::Deserialize;

use crate::error::{UpstreamError, UpstreamResult};
use crate::models::NodeResourceSample;
use crate::registry::Registry;
use crate::resolver::resolve;

const BYTES_PER_GIB: f64 = 1024.0 * 1024.0 * 1024.0;

/// The four per-node series pulled from the metrics backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Metric {
    CpuUsage,
    MemoryUsage,
    MemoryTotal,
    MemoryAvailable,
}

impl Metric {
    pub fn expr(self) -> &'static str {
        match self {
            Metric::CpuUsage => {
                r#"100 - (avg by (instance) (rate(node_cpu_seconds_total{mode="idle"}[5m])) * 100)"#
            }
            Metric::MemoryUsage => {
                "(1 - (node_memory_MemAvailable_bytes / node_memory_MemTotal_bytes)) * 100"
            }
            Metric::MemoryTotal => "node_memory_MemTotal_bytes",
            Metric::MemoryAvailable => "node_memory_MemAvailable_bytes",
        }
    }

    pub fn name(self) -> &'static str {
        match self {
            Metric::CpuUsage => "cpu_usage",
            Metric::MemoryUsage => "memory_usage",
            Metric::MemoryTotal => "memory_total",
            Metric::MemoryAvailable => "memory_available",
        }
    }
}

#[derive(Debug, Deserialize)]
struct QueryResponse {
    status: String,
    #[serde(default)]
    data: Option<QueryData>,
    #[serde(default)]
    error: Option<String>,
}

#[derive(Debug, Deserialize)]
struct QueryData {
    #[serde(default)]
    result: Vec<InstantSample>,
}

/// One entry of an instant-vector result: labels plus `[epochSeconds, "value"]`.
#[derive(Debug, Clone, Deserialize)]
pub struct InstantSample {
    #[serde(default)]
    pub metric: HashMap<String, String>,
    pub value: (f64, String),
}

impl InstantSample {
    pub fn instance(&self) -> Option<&str> {
        self.metric.get("instance").map(String::as_str)
    }

    /// Sample value, if it is a finite number ("NaN" and "+Inf" are dropped).
    pub fn number(&self) -> Option<f64> {
        self.value
            .1
            .trim()
            .parse::<f64>()
            .ok()
            .filter(|v| v.is_finite())
    }
}

/// Decodes an instant-query body. A non-"success" status is an upstream-side failure.
pub fn parse_response(body: &[u8]) -> UpstreamResult<Vec<InstantSample>> {
    let response: QueryResponse =
        serde_json::from_slice(body).map_err(|e| UpstreamError::Decode(e.to_string()))?;
    if response.status != "success" {
        return Err(UpstreamError::Rejected(
            response
                .error
                .unwrap_or_else(|| format!("query status {}", response.status)),
        ));
    }
    let data = response
        .data
        .ok_or_else(|| UpstreamError::Decode("missing data".into()))?;
    Ok(data.result)
}

/// Fields collected for one node across the four queries. Anything a query did not
/// provide stays `None` until [`PartialNode::finish`] fills in defaults.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PartialNode {
    pub cpu_usage_percent: Option<f64>,
    pub memory_usage_percent: Option<f64>,
    pub memory_total_bytes: Option<f64>,
    pub memory_available_bytes: Option<f64>,
}

impl PartialNode {
    pub fn set(&mut self, metric: Metric, value: f64) {
        let slot = match metric {
            Metric::CpuUsage => &mut self.cpu_usage_percent,
            Metric::MemoryUsage => &mut self.memory_usage_percent,
            Metric::MemoryTotal => &mut self.memory_total_bytes,
            Metric::MemoryAvailable => &mut self.memory_available_bytes,
        };
        *slot = Some(value);
    }

    /// The single place where missing fields get their defaults: absent values become 0,
    /// percentages are clamped to 0..=100, and used memory is derived only when a
    /// positive total is known.
    pub fn finish(self, node_id: &str, captured_at: DateTime<Utc>) -> NodeResourceSample {
        let memory_total_gib = self
            .memory_total_bytes
            .map(|b| (b / BYTES_PER_GIB).max(0.0))
            .unwrap_or(0.0);
        let memory_used_gib = if memory_total_gib > 0.0 {
            let used = match (self.memory_available_bytes, self.memory_usage_percent) {
                (Some(available), _) => memory_total_gib - available / BYTES_PER_GIB,
                (None, Some(percent)) => memory_total_gib * clamp_percent(percent) / 100.0,
                (None, None) => 0.0,
            };
            used.clamp(0.0, memory_total_gib)
        } else {
            0.0
        };

        NodeResourceSample {
            node_id: node_id.to_string(),
            cpu_usage_percent: clamp_percent(self.cpu_usage_percent.unwrap_or(0.0)),
            memory_usage_percent: clamp_percent(self.memory_usage_percent.unwrap_or(0.0)),
            memory_total_gib,
            memory_used_gib,
            captured_at,
        }
    }
}

fn clamp_percent(v: f64) -> f64 {
    v.clamp(0.0, 100.0)
}

/// Joins per-metric result sets into one sample per resolvable node. Unresolvable
/// instances are dropped before joining. Output follows registry order.
pub fn join_samples(
    registry: &Registry,
    results: &[(Metric, &[InstantSample])],
    captured_at: DateTime<Utc>,
) -> Vec<NodeResourceSample> {
    let mut partials: HashMap<&str, PartialNode> = HashMap::new();
    for (metric, samples) in results {
        for sample in samples.iter() {
            let Some(node) = sample
                .instance()
                .and_then(|instance| resolve(registry, instance).node())
            else {
                continue;
            };
            let entry = partials.entry(node).or_default();
            if let Some(value) = sample.number() {
                entry.set(*metric, value);
            }
        }
    }

    registry
        .nodes
        .iter()
        .filter(|n| !n.name.is_empty())
        .filter_map(|n| {
            partials
                .remove(n.name.as_str())
                .map(|p| p.finish(&n.name, captured_at))
        })
        .collect()
}

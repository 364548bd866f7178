// Substitute results for when live data cannot be obtained. Every fallback is
// non-empty, flagged, and built entirely from the registry.

use chrono::{DateTime, Utc};
use rand::Rng;

use crate::models::{AggregationResult, MonitoredService, NodeResourceSample, ServiceStatus};
use crate::registry::Registry;

/// Half-widths of the random variation applied around each node's baselines.
const CPU_JITTER: f64 = 5.0;
const MEMORY_JITTER: f64 = 3.0;

const CPU_RANGE: (f64, f64) = (5.0, 95.0);
const MEMORY_RANGE: (f64, f64) = (10.0, 90.0);

/// Uptime shown for every fallback service.
pub const UNKNOWN_UPTIME: &str = "N/A";

/// Rounds to two decimals, the precision every displayed percentage uses.
pub fn round2(v: f64) -> f64 {
    (v * 100.0).round() / 100.0
}

/// Symmetric random offset in `-half_width..=half_width`.
pub(crate) fn jitter<R: Rng + ?Sized>(rng: &mut R, half_width: f64) -> f64 {
    if half_width <= 0.0 {
        return 0.0;
    }
    rng.random_range(-half_width..=half_width)
}

/// One synthetic sample per registry node, jittered around its baselines.
pub fn resource_samples<R: Rng + ?Sized>(
    registry: &Registry,
    rng: &mut R,
    captured_at: DateTime<Utc>,
) -> Vec<NodeResourceSample> {
    registry
        .nodes
        .iter()
        .map(|node| {
            let cpu = (node.cpu_baseline + jitter(rng, CPU_JITTER)).clamp(CPU_RANGE.0, CPU_RANGE.1);
            let memory = (node.memory_baseline + jitter(rng, MEMORY_JITTER))
                .clamp(MEMORY_RANGE.0, MEMORY_RANGE.1);
            let total = node.memory_total_gib.max(0.0);
            NodeResourceSample {
                node_id: node.name.clone(),
                cpu_usage_percent: round2(cpu),
                memory_usage_percent: round2(memory),
                memory_total_gib: total,
                memory_used_gib: round2(memory / 100.0 * total).min(total),
                captured_at,
            }
        })
        .collect()
}

pub fn resource_result(
    registry: &Registry,
    reason: impl Into<String>,
) -> AggregationResult<NodeResourceSample> {
    let items = resource_samples(registry, &mut rand::rng(), Utc::now());
    AggregationResult::fallback(items, reason)
}

/// The registry's logical services, all reported operational with unknown uptime.
pub fn services(registry: &Registry) -> Vec<MonitoredService> {
    registry
        .services
        .iter()
        .map(|s| MonitoredService {
            name: s.name.clone(),
            status: ServiceStatus::Operational,
            description: Some(s.description.clone()),
            url: s.url.clone(),
            check_interval_seconds: None,
            uptime_ratios: None,
            uptime: Some(UNKNOWN_UPTIME.into()),
            average_response_time_ms: None,
            response_time_series: Vec::new(),
            incidents: Vec::new(),
        })
        .collect()
}

pub fn service_result(
    registry: &Registry,
    reason: impl Into<String>,
) -> AggregationResult<MonitoredService> {
    AggregationResult::fallback(services(registry), reason)
}

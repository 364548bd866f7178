// Per-node resource reading

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// One node's point-in-time CPU and memory reading.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NodeResourceSample {
    pub node_id: String,
    pub cpu_usage_percent: f64,
    pub memory_usage_percent: f64,
    #[serde(rename = "memoryTotalGiB")]
    pub memory_total_gib: f64,
    #[serde(rename = "memoryUsedGiB")]
    pub memory_used_gib: f64,
    /// Time of aggregation, not the upstream sample time.
    pub captured_at: DateTime<Utc>,
}

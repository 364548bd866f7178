// Externally monitored service models

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Tri-state service status; serializes to lowercase JSON (e.g. "operational").
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ServiceStatus {
    Operational,
    Degraded,
    Outage,
}

impl ServiceStatus {
    /// UptimeRobot monitor status code to status. 2 = up, 8 = seems down; anything
    /// else (paused, not checked, down, unknown) is an outage.
    pub fn from_monitor_code(code: i64) -> Self {
        match code {
            2 => ServiceStatus::Operational,
            8 => ServiceStatus::Degraded,
            _ => ServiceStatus::Outage,
        }
    }
}

/// Uptime percentages over the fixed windows, as upstream formats them.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UptimeRatios {
    pub day: String,
    pub week: String,
    pub month: String,
    pub two_months: String,
    pub three_months: String,
}

impl Default for UptimeRatios {
    fn default() -> Self {
        let zero = || UptimeRatios::MISSING.to_string();
        Self {
            day: zero(),
            week: zero(),
            month: zero(),
            two_months: zero(),
            three_months: zero(),
        }
    }
}

impl UptimeRatios {
    pub const MISSING: &'static str = "0.000";

    /// Windows requested from upstream, in the order the ratios come back.
    pub const WINDOWS_DAYS: [u32; 5] = [1, 7, 30, 60, 90];

    /// Splits a dash-delimited ratio string ("99.9-99.8-...") positionally onto the
    /// windows. Missing or blank segments become "0.000"; extra segments are ignored.
    pub fn parse(raw: &str) -> Self {
        let mut segments = raw
            .split('-')
            .map(str::trim)
            .map(|s| (!s.is_empty()).then(|| s.to_string()));
        let mut next = || {
            segments
                .next()
                .flatten()
                .unwrap_or_else(|| Self::MISSING.to_string())
        };
        Self {
            day: next(),
            week: next(),
            month: next(),
            two_months: next(),
            three_months: next(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResponseTimePoint {
    pub time: DateTime<Utc>,
    pub value: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Incident {
    pub date: DateTime<Utc>,
    /// Downtime in seconds.
    pub duration: u64,
    pub reason: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MonitoredService {
    pub name: String,
    pub status: ServiceStatus,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub check_interval_seconds: Option<u64>,
    /// Per-window ratios; present on every live record.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uptime_ratios: Option<UptimeRatios>,
    /// Summary uptime ("N/A"); only fallback records carry it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uptime: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub average_response_time_ms: Option<f64>,
    #[serde(default)]
    pub response_time_series: Vec<ResponseTimePoint>,
    #[serde(default)]
    pub incidents: Vec<Incident>,
}

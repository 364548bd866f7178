// getMonitors payload types and their reshaping into MonitoredService records.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Deserializer};

use crate::error::{UpstreamError, UpstreamResult};
use crate::models::{
    Incident, MonitoredService, ResponseTimePoint, ServiceStatus, UptimeRatios,
};
use crate::registry::Registry;

/// Log entry type for a down event; up (2), started (98) and paused (99) are ignored.
const LOG_TYPE_DOWN: i64 = 1;
/// Incidents kept per service, most recent first.
pub const MAX_INCIDENTS: usize = 5;
/// Reason shown when upstream attaches none to a down event.
pub const DEFAULT_INCIDENT_REASON: &str = "Connection timeout";

#[derive(Debug, Deserialize)]
pub struct GetMonitorsResponse {
    pub stat: String,
    #[serde(default)]
    pub monitors: Vec<RawMonitor>,
    #[serde(default)]
    pub error: Option<RawError>,
}

#[derive(Debug, Deserialize)]
pub struct RawError {
    #[serde(default, rename = "type")]
    pub kind: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct RawMonitor {
    pub friendly_name: String,
    #[serde(default)]
    pub url: Option<String>,
    pub status: i64,
    #[serde(default)]
    pub interval: Option<u64>,
    #[serde(default)]
    pub custom_uptime_ratio: Option<String>,
    #[serde(default, deserialize_with = "number_or_string")]
    pub average_response_time: Option<f64>,
    #[serde(default)]
    pub response_times: Vec<RawResponseTime>,
    #[serde(default)]
    pub logs: Vec<RawLog>,
}

#[derive(Debug, Deserialize)]
pub struct RawResponseTime {
    pub datetime: i64,
    pub value: f64,
}

#[derive(Debug, Deserialize)]
pub struct RawLog {
    #[serde(rename = "type")]
    pub kind: i64,
    pub datetime: i64,
    #[serde(default)]
    pub duration: u64,
    #[serde(default)]
    pub reason: Option<RawReason>,
}

#[derive(Debug, Deserialize)]
pub struct RawReason {
    #[serde(default)]
    pub detail: Option<String>,
}

/// Upstream sends averages both as numbers and as numeric strings.
fn number_or_string<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    let number = match value {
        Some(serde_json::Value::Number(n)) => n.as_f64(),
        Some(serde_json::Value::String(s)) => s.trim().parse::<f64>().ok(),
        _ => None,
    };
    Ok(number.filter(|v| v.is_finite() && *v >= 0.0))
}

pub fn decode(body: &[u8]) -> UpstreamResult<GetMonitorsResponse> {
    serde_json::from_slice(body).map_err(|e| UpstreamError::Decode(e.to_string()))
}

/// Checks the payload's own status and normalizes every monitor.
pub fn normalize_response(
    response: GetMonitorsResponse,
    registry: &Registry,
    response_times_limit: usize,
) -> UpstreamResult<Vec<MonitoredService>> {
    if response.stat != "ok" {
        let detail = response
            .error
            .and_then(|e| e.message.or(e.kind))
            .unwrap_or_else(|| format!("stat {}", response.stat));
        return Err(UpstreamError::Rejected(detail));
    }
    Ok(response
        .monitors
        .into_iter()
        .map(|m| normalize_monitor(m, registry, response_times_limit))
        .collect())
}

pub fn normalize_monitor(
    raw: RawMonitor,
    registry: &Registry,
    response_times_limit: usize,
) -> MonitoredService {
    let known = registry.service_by_name(&raw.friendly_name);
    let url = raw
        .url
        .filter(|u| !u.trim().is_empty())
        .or_else(|| known.and_then(|k| k.url.clone()));

    MonitoredService {
        status: ServiceStatus::from_monitor_code(raw.status),
        description: known.map(|k| k.description.clone()),
        url,
        check_interval_seconds: raw.interval.filter(|i| *i > 0),
        uptime_ratios: Some(UptimeRatios::parse(
            raw.custom_uptime_ratio.as_deref().unwrap_or_default(),
        )),
        uptime: None,
        average_response_time_ms: raw.average_response_time,
        response_time_series: response_time_series(raw.response_times, response_times_limit),
        incidents: incidents(raw.logs),
        name: raw.friendly_name,
    }
}

/// Chronological series holding the `limit` most recent samples.
pub fn response_time_series(raw: Vec<RawResponseTime>, limit: usize) -> Vec<ResponseTimePoint> {
    let mut points: Vec<ResponseTimePoint> = raw
        .into_iter()
        .filter(|r| r.value.is_finite() && r.value >= 0.0)
        .filter_map(|r| {
            DateTime::<Utc>::from_timestamp(r.datetime, 0)
                .map(|time| ResponseTimePoint { time, value: r.value })
        })
        .collect();
    points.sort_by_key(|p| p.time);
    let excess = points.len().saturating_sub(limit);
    points.drain(..excess);
    points
}

/// Down events only, most recent first, at most [`MAX_INCIDENTS`].
pub fn incidents(logs: Vec<RawLog>) -> Vec<Incident> {
    let mut incidents: Vec<Incident> = logs
        .into_iter()
        .filter(|l| l.kind == LOG_TYPE_DOWN)
        .filter_map(|l| {
            let date = DateTime::<Utc>::from_timestamp(l.datetime, 0)?;
            let reason = l
                .reason
                .and_then(|r| r.detail)
                .map(|d| d.trim().to_string())
                .filter(|d| !d.is_empty())
                .unwrap_or_else(|| DEFAULT_INCIDENT_REASON.to_string());
            Some(Incident {
                date,
                duration: l.duration,
                reason,
            })
        })
        .collect();
    incidents.sort_by(|a, b| b.date.cmp(&a.date));
    incidents.truncate(MAX_INCIDENTS);
    incidents
}

#[cfg(test)]
mod tests {
    use super::*;

    fn log(kind: i64, datetime: i64) -> RawLog {
        RawLog {
            kind,
            datetime,
            duration: 60,
            reason: None,
        }
    }

    #[test]
    fn incidents_keep_only_down_entries_newest_first() {
        let logs = vec![
            log(2, 100),
            log(1, 200),
            log(99, 300),
            log(1, 400),
            log(98, 500),
        ];
        let out = incidents(logs);
        assert_eq!(out.len(), 2);
        assert_eq!(out[0].date.timestamp(), 400);
        assert_eq!(out[1].date.timestamp(), 200);
        assert!(out.iter().all(|i| i.reason == DEFAULT_INCIDENT_REASON));
    }

    #[test]
    fn incidents_capped_at_five() {
        let logs = (0..9).map(|i| log(1, 1_000 + i)).collect();
        let out = incidents(logs);
        assert_eq!(out.len(), MAX_INCIDENTS);
        assert_eq!(out[0].date.timestamp(), 1_008);
        assert_eq!(out[4].date.timestamp(), 1_004);
    }

    #[test]
    fn incident_reason_uses_upstream_detail() {
        let out = incidents(vec![RawLog {
            kind: 1,
            datetime: 10,
            duration: 120,
            reason: Some(RawReason {
                detail: Some("Service Unavailable".into()),
            }),
        }]);
        assert_eq!(out[0].reason, "Service Unavailable");
        assert_eq!(out[0].duration, 120);
    }

    #[test]
    fn response_times_sorted_and_bounded() {
        let raw = (0..30)
            .rev()
            .map(|i| RawResponseTime {
                datetime: 1_700_000_000 + i * 60,
                value: i as f64,
            })
            .collect();
        let out = response_time_series(raw, 24);
        assert_eq!(out.len(), 24);
        assert!(out.windows(2).all(|w| w[0].time < w[1].time));
        assert_eq!(out.last().map(|p| p.value), Some(29.0));
        assert_eq!(out.first().map(|p| p.value), Some(6.0));
    }

    #[test]
    fn average_response_time_accepts_string_or_number() {
        let body = br#"{"stat":"ok","monitors":[
            {"friendly_name":"a","status":2,"average_response_time":"123.45"},
            {"friendly_name":"b","status":2,"average_response_time":87},
            {"friendly_name":"c","status":2,"average_response_time":"n/a"}]}"#;
        let response = decode(body).unwrap();
        let avgs: Vec<_> = response
            .monitors
            .iter()
            .map(|m| m.average_response_time)
            .collect();
        assert_eq!(avgs, vec![Some(123.45), Some(87.0), None]);
    }

    #[test]
    fn normalize_fills_description_and_url_from_registry() {
        let registry = Registry::default();
        let raw = RawMonitor {
            friendly_name: "Documentation Website".into(),
            url: Some(String::new()),
            status: 8,
            interval: Some(300),
            custom_uptime_ratio: Some("99.9-99.5".into()),
            average_response_time: None,
            response_times: vec![],
            logs: vec![],
        };
        let s = normalize_monitor(raw, &registry, 24);
        assert_eq!(s.status, ServiceStatus::Degraded);
        assert_eq!(s.url.as_deref(), Some("https://homelab.eurusik.tech"));
        assert_eq!(s.description.as_deref(), Some("K3s Homelab Documentation"));
        assert_eq!(s.check_interval_seconds, Some(300));
        assert!(s.uptime.is_none());
        let r = s.uptime_ratios.unwrap();
        assert_eq!(r.day, "99.9");
        assert_eq!(r.week, "99.5");
        assert_eq!(r.month, UptimeRatios::MISSING);
    }
}

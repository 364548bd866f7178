// Shared envelope returned by both aggregators

use chrono::{DateTime, Utc};
use serde::Serialize;

/// Where the items of an [`AggregationResult`] came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Source {
    Prometheus,
    UptimeRobot,
    Fallback,
}

impl Source {
    pub fn label(self) -> &'static str {
        match self {
            Source::Prometheus => "prometheus",
            Source::UptimeRobot => "uptimerobot",
            Source::Fallback => "fallback",
        }
    }
}

/// Result of one aggregation call. Either every item is live data or every item is
/// fallback data; the two are never mixed.
#[derive(Debug, Clone)]
pub struct AggregationResult<T> {
    pub items: Vec<T>,
    pub used_fallback: bool,
    pub error_message: Option<String>,
    pub source: Source,
    pub timestamp: DateTime<Utc>,
}

impl<T> AggregationResult<T> {
    pub fn live(items: Vec<T>, source: Source) -> Self {
        Self {
            items,
            used_fallback: false,
            error_message: None,
            source,
            timestamp: Utc::now(),
        }
    }

    pub fn fallback(items: Vec<T>, reason: impl Into<String>) -> Self {
        Self {
            items,
            used_fallback: true,
            error_message: Some(reason.into()),
            source: Source::Fallback,
            timestamp: Utc::now(),
        }
    }

    pub fn source_label(&self) -> &'static str {
        self.source.label()
    }
}

// Service uptime, response times and incidents via the UptimeRobot getMonitors API

mod parse;

pub use parse::{
    DEFAULT_INCIDENT_REASON, GetMonitorsResponse, MAX_INCIDENTS, decode, incidents,
    normalize_monitor, normalize_response, response_time_series,
};

use crate::config::UptimeConfig;
use crate::error::{UpstreamError, UpstreamResult};
use crate::fallback;
use crate::models::{AggregationResult, MonitoredService, Source, UptimeRatios};
use crate::registry::Registry;
use reqwest::Client;
use std::sync::Arc;
use tracing::instrument;

/// Averaging window (minutes) for the upstream's average response time.
const RESPONSE_TIMES_AVERAGE_MINUTES: u32 = 30;

pub struct UptimeRepo {
    client: Client,
    config: UptimeConfig,
    registry: Arc<Registry>,
}

impl UptimeRepo {
    pub fn new(client: Client, config: UptimeConfig, registry: Arc<Registry>) -> Self {
        Self {
            client,
            config,
            registry,
        }
    }

    pub fn is_configured(&self) -> bool {
        self.config.api_key.is_some()
    }

    /// Status, uptime windows, response times and incidents of every monitor. Never
    /// fails: any upstream problem yields the registry's service list instead.
    #[instrument(skip(self), fields(repo = "uptimerobot", operation = "fetch_service_statuses"))]
    pub async fn fetch_service_statuses(&self) -> AggregationResult<MonitoredService> {
        let Some(api_key) = self.config.api_key.as_deref() else {
            tracing::debug!("UptimeRobot API key not configured, using fallback data");
            return fallback::service_result(&self.registry, "UptimeRobot API key not configured");
        };

        match self.get_monitors(api_key).await {
            Ok(services) if !services.is_empty() => {
                AggregationResult::live(services, Source::UptimeRobot)
            }
            Ok(_) => {
                tracing::warn!(
                    operation = "fetch_service_statuses",
                    "UptimeRobot returned no monitors; using fallback data"
                );
                fallback::service_result(&self.registry, "No monitors returned by UptimeRobot")
            }
            Err(e) => {
                tracing::warn!(
                    error = %e,
                    timeout = e.is_timeout(),
                    operation = "fetch_service_statuses",
                    "UptimeRobot fetch failed; using fallback data"
                );
                fallback::service_result(
                    &self.registry,
                    format!("Failed to fetch from UptimeRobot: {}", e),
                )
            }
        }
    }

    async fn get_monitors(&self, api_key: &str) -> UpstreamResult<Vec<MonitoredService>> {
        let windows = UptimeRatios::WINDOWS_DAYS
            .iter()
            .map(u32::to_string)
            .collect::<Vec<_>>()
            .join("-");
        let form = [
            ("api_key", api_key.to_string()),
            ("format", "json".to_string()),
            ("custom_uptime_ratios", windows),
            ("response_times", "1".to_string()),
            (
                "response_times_limit",
                self.config.response_times_limit.to_string(),
            ),
            (
                "response_times_average",
                RESPONSE_TIMES_AVERAGE_MINUTES.to_string(),
            ),
            ("logs", "1".to_string()),
            ("logs_limit", self.config.logs_limit.to_string()),
        ];

        let response = self
            .client
            .post(&self.config.endpoint)
            .form(&form)
            .send()
            .await?;
        let status = response.status();
        if !status.is_success() {
            return Err(UpstreamError::Status(status));
        }
        let body = response.bytes().await?;
        normalize_response(
            decode(&body)?,
            &self.registry,
            self.config.response_times_limit as usize,
        )
    }
}

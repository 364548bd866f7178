// Reachability probe of the public site, reported per registry service.

use chrono::{DateTime, Utc};
use reqwest::Client;
use serde::Serialize;
use std::sync::Arc;
use std::time::Duration;
use tracing::instrument;

use crate::models::ServiceStatus;
use crate::registry::Registry;

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ServiceHealth {
    pub name: String,
    pub status: ServiceStatus,
}

#[derive(Debug, Clone, Serialize)]
pub struct HealthReport {
    pub services: Vec<ServiceHealth>,
    pub timestamp: DateTime<Utc>,
}

pub struct HealthProbe {
    client: Client,
    site_url: String,
    timeout: Duration,
    registry: Arc<Registry>,
}

impl HealthProbe {
    pub fn new(client: Client, site_url: String, timeout: Duration, registry: Arc<Registry>) -> Self {
        Self {
            client,
            site_url,
            timeout,
            registry,
        }
    }

    #[instrument(skip(self), fields(repo = "health", operation = "check"))]
    pub async fn check(&self) -> HealthReport {
        let reachable = self.site_reachable().await;
        HealthReport {
            services: statuses(&self.registry, reachable),
            timestamp: Utc::now(),
        }
    }

    /// HEAD request to the site; any error, timeout or non-2xx counts as unreachable.
    async fn site_reachable(&self) -> bool {
        match self
            .client
            .head(&self.site_url)
            .timeout(self.timeout)
            .send()
            .await
        {
            Ok(response) => response.status().is_success(),
            Err(e) => {
                tracing::info!(error = %e, url = %self.site_url, "site probe failed");
                false
            }
        }
    }
}

pub fn statuses(registry: &Registry, reachable: bool) -> Vec<ServiceHealth> {
    registry
        .services
        .iter()
        .map(|s| ServiceHealth {
            name: s.name.clone(),
            status: if reachable {
                ServiceStatus::Operational
            } else {
                s.on_probe_failure
            },
        })
        .collect()
}

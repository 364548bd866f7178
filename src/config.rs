use serde::Deserialize;
use std::collections::HashSet;

use crate::registry::Registry;

#[derive(Debug, Clone, Deserialize)]
pub struct AppConfig {
    pub server: ServerConfig,
    #[serde(default)]
    pub prometheus: PrometheusConfig,
    #[serde(default)]
    pub uptime: UptimeConfig,
    #[serde(default)]
    pub upstream: UpstreamConfig,
    #[serde(default)]
    pub polling: PollingConfig,
    #[serde(default)]
    pub health: HealthConfig,
    #[serde(default)]
    pub cluster: Registry,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub port: u16,
    pub host: String,
}

/// Metrics backend. Without a URL every metrics request is answered from fallback.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PrometheusConfig {
    #[serde(default)]
    pub url: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct UptimeConfig {
    /// Without a key every uptime request is answered from fallback.
    #[serde(default)]
    pub api_key: Option<String>,
    #[serde(default = "default_uptime_endpoint")]
    pub endpoint: String,
    #[serde(default = "default_response_times_limit")]
    pub response_times_limit: u32,
    #[serde(default = "default_logs_limit")]
    pub logs_limit: u32,
}

impl Default for UptimeConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            endpoint: default_uptime_endpoint(),
            response_times_limit: default_response_times_limit(),
            logs_limit: default_logs_limit(),
        }
    }
}

fn default_uptime_endpoint() -> String {
    "https://api.uptimerobot.com/v2/getMonitors".into()
}

fn default_response_times_limit() -> u32 {
    24
}

fn default_logs_limit() -> u32 {
    50
}

#[derive(Debug, Clone, Deserialize)]
pub struct UpstreamConfig {
    /// Per-request timeout for every upstream call; a timeout counts as unreachable.
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
}

impl Default for UpstreamConfig {
    fn default() -> Self {
        Self {
            timeout_ms: default_timeout_ms(),
        }
    }
}

fn default_timeout_ms() -> u64 {
    5000
}

#[derive(Debug, Clone, Deserialize)]
pub struct PollingConfig {
    #[serde(default = "default_true")]
    pub enabled: bool,
    #[serde(default = "default_interval_secs")]
    pub interval_secs: u64,
    /// Points kept per trend series (20 = 10 minutes at 30 s).
    #[serde(default = "default_history_len")]
    pub history_len: usize,
}

impl Default for PollingConfig {
    fn default() -> Self {
        Self {
            enabled: true,
            interval_secs: default_interval_secs(),
            history_len: default_history_len(),
        }
    }
}

fn default_true() -> bool {
    true
}

fn default_interval_secs() -> u64 {
    30
}

fn default_history_len() -> usize {
    20
}

#[derive(Debug, Clone, Deserialize)]
pub struct HealthConfig {
    #[serde(default = "default_site_url")]
    pub site_url: String,
    #[serde(default = "default_timeout_ms")]
    pub timeout_ms: u64,
}

impl Default for HealthConfig {
    fn default() -> Self {
        Self {
            site_url: default_site_url(),
            timeout_ms: default_timeout_ms(),
        }
    }
}

fn default_site_url() -> String {
    "https://homelab.eurusik.tech".into()
}

impl AppConfig {
    /// Reads `CONFIG_FILE` (default `config.toml`), then applies `PROMETHEUS_URL` and
    /// `UPTIMEROBOT_API_KEY` from the environment.
    pub fn load() -> anyhow::Result<Self> {
        let path = std::env::var("CONFIG_FILE").unwrap_or_else(|_| "config.toml".into());
        let mut config = Self::load_from_path(&path)?;
        config.apply_overrides(
            std::env::var("PROMETHEUS_URL").ok(),
            std::env::var("UPTIMEROBOT_API_KEY").ok(),
        );
        Ok(config)
    }

    pub fn load_from_path(path: impl AsRef<std::path::Path>) -> anyhow::Result<Self> {
        let path = path.as_ref();
        let s = std::fs::read_to_string(path)
            .map_err(|e| anyhow::anyhow!("reading {}: {}", path.display(), e))?;
        Self::load_from_str(&s)
    }

    /// Parse and validate config from a string (e.g. for tests). Does not read the environment.
    pub fn load_from_str(s: &str) -> anyhow::Result<Self> {
        let mut config: AppConfig = toml::from_str(s)?;
        config.normalize();
        config.validate()?;
        Ok(config)
    }

    /// Environment values win over the file; empty values are ignored.
    pub fn apply_overrides(&mut self, prometheus_url: Option<String>, api_key: Option<String>) {
        if let Some(url) = non_empty(prometheus_url) {
            self.prometheus.url = Some(url);
        }
        if let Some(key) = non_empty(api_key) {
            self.uptime.api_key = Some(key);
        }
        self.normalize();
    }

    /// Blank optional values mean "not configured".
    fn normalize(&mut self) {
        self.prometheus.url = non_empty(self.prometheus.url.take())
            .map(|u| u.trim_end_matches('/').to_string());
        self.uptime.api_key = non_empty(self.uptime.api_key.take());
    }

    fn validate(&self) -> anyhow::Result<()> {
        anyhow::ensure!(
            self.server.port > 0,
            "server.port must be between 1 and 65535, got {}",
            self.server.port
        );
        anyhow::ensure!(
            !self.uptime.endpoint.is_empty(),
            "uptime.endpoint must be non-empty"
        );
        anyhow::ensure!(
            self.uptime.response_times_limit > 0,
            "uptime.response_times_limit must be > 0, got {}",
            self.uptime.response_times_limit
        );
        anyhow::ensure!(
            self.upstream.timeout_ms > 0,
            "upstream.timeout_ms must be > 0, got {}",
            self.upstream.timeout_ms
        );
        anyhow::ensure!(
            self.polling.interval_secs > 0,
            "polling.interval_secs must be > 0, got {}",
            self.polling.interval_secs
        );
        anyhow::ensure!(
            self.polling.history_len >= 3,
            "polling.history_len must be >= 3, got {}",
            self.polling.history_len
        );
        anyhow::ensure!(
            self.health.timeout_ms > 0,
            "health.timeout_ms must be > 0, got {}",
            self.health.timeout_ms
        );
        anyhow::ensure!(
            !self.cluster.nodes.is_empty(),
            "cluster.nodes must list at least one node"
        );
        anyhow::ensure!(
            !self.cluster.services.is_empty(),
            "cluster.services must list at least one service"
        );

        let mut names = HashSet::new();
        let mut addresses = HashSet::new();
        for node in &self.cluster.nodes {
            anyhow::ensure!(
                !node.name.is_empty(),
                "cluster.nodes name must be non-empty"
            );
            anyhow::ensure!(
                names.insert(node.name.as_str()),
                "cluster.nodes name {:?} is duplicated",
                node.name
            );
            anyhow::ensure!(
                addresses.insert(node.address.as_str()),
                "cluster.nodes address {:?} is duplicated",
                node.address
            );
            anyhow::ensure!(
                (0.0..=100.0).contains(&node.cpu_baseline)
                    && (0.0..=100.0).contains(&node.memory_baseline),
                "cluster.nodes baselines for {} must be within 0..=100",
                node.name
            );
            anyhow::ensure!(
                node.memory_total_gib >= 0.0,
                "cluster.nodes memory_total_gib for {} must be >= 0",
                node.name
            );
        }
        for service in &self.cluster.services {
            anyhow::ensure!(
                !service.name.is_empty(),
                "cluster.services name must be non-empty"
            );
        }
        Ok(())
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

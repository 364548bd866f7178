// Static registry of the cluster's physical nodes and its externally monitored services.
// Both the metrics resolver and the uptime fallback read from here.

use serde::Deserialize;

use crate::models::ServiceStatus;

/// A physical cluster member: its node-exporter address and the baselines used when
/// fallback values have to be synthesized for it.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct NodeEntry {
    pub name: String,
    pub address: String,
    pub cpu_baseline: f64,
    pub memory_baseline: f64,
    pub memory_total_gib: f64,
}

/// A logical service shown on the status page.
#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct ServiceEntry {
    pub name: String,
    pub description: String,
    #[serde(default)]
    pub url: Option<String>,
    /// Status reported by the site health probe when the site is unreachable.
    #[serde(default = "default_probe_failure")]
    pub on_probe_failure: ServiceStatus,
}

fn default_probe_failure() -> ServiceStatus {
    ServiceStatus::Outage
}

#[derive(Debug, Clone, PartialEq, Deserialize)]
pub struct Registry {
    #[serde(default = "default_nodes")]
    pub nodes: Vec<NodeEntry>,
    #[serde(default = "default_services")]
    pub services: Vec<ServiceEntry>,
}

impl Default for Registry {
    fn default() -> Self {
        Self {
            nodes: default_nodes(),
            services: default_services(),
        }
    }
}

impl Registry {
    /// Node name for an exporter host address, if the address belongs to a known node.
    pub fn node_by_address(&self, address: &str) -> Option<&NodeEntry> {
        self.nodes.iter().find(|n| n.address == address)
    }

    pub fn service_by_name(&self, name: &str) -> Option<&ServiceEntry> {
        self.services.iter().find(|s| s.name == name)
    }
}

fn node(name: &str, address: &str, cpu: f64, memory: f64, total_gib: f64) -> NodeEntry {
    NodeEntry {
        name: name.into(),
        address: address.into(),
        cpu_baseline: cpu,
        memory_baseline: memory,
        memory_total_gib: total_gib,
    }
}

fn default_nodes() -> Vec<NodeEntry> {
    vec![
        node("RpiMaster", "192.168.88.5", 25.0, 45.0, 8.0),
        node("RpiWorker1", "192.168.88.6", 20.0, 40.0, 4.0),
        node("RpiWorker2", "192.168.88.7", 35.0, 55.0, 8.0),
    ]
}

fn default_services() -> Vec<ServiceEntry> {
    vec![
        ServiceEntry {
            name: "Documentation Website".into(),
            description: "K3s Homelab Documentation".into(),
            url: Some("https://homelab.eurusik.tech".into()),
            on_probe_failure: ServiceStatus::Outage,
        },
        ServiceEntry {
            name: "K3s Cluster".into(),
            description: "Kubernetes Infrastructure".into(),
            url: None,
            on_probe_failure: ServiceStatus::Outage,
        },
        ServiceEntry {
            name: "GitOps (ArgoCD)".into(),
            description: "Continuous Deployment".into(),
            url: None,
            on_probe_failure: ServiceStatus::Degraded,
        },
    ]
}

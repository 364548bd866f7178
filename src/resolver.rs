// Maps raw exporter instance strings ("192.168.88.5:9100") onto registry node names.

use crate::registry::Registry;

/// Domain suffix of in-cluster service DNS names. Matched as a substring of the host,
/// not only at its end.
const CLUSTER_LOCAL_SUFFIX: &str = ".svc.cluster.local";
/// Service name of the exporter itself when it is scraped through its Service.
const EXPORTER_SERVICE_NAME: &str = "node-exporter";

/// Outcome of resolving one instance identifier. Resolution is total: every input
/// produces one of the two variants, and `Node` never carries an empty name.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Resolved<'a> {
    Node(&'a str),
    Unresolvable,
}

impl<'a> Resolved<'a> {
    pub fn node(self) -> Option<&'a str> {
        match self {
            Resolved::Node(name) => Some(name),
            Resolved::Unresolvable => None,
        }
    }
}

/// Host part of `host[:port]`. Bracketed IPv6 hosts keep their address without brackets.
pub fn strip_port(instance: &str) -> &str {
    let instance = instance.trim();
    if let Some(rest) = instance.strip_prefix('[') {
        return rest.split(']').next().unwrap_or_default();
    }
    instance.split(':').next().unwrap_or_default()
}

pub fn resolve<'a>(registry: &'a Registry, instance: &str) -> Resolved<'a> {
    let host = strip_port(instance);
    if host.is_empty() || host.contains(CLUSTER_LOCAL_SUFFIX) || host.contains(EXPORTER_SERVICE_NAME)
    {
        return Resolved::Unresolvable;
    }
    match registry.node_by_address(host) {
        Some(node) if !node.name.is_empty() => Resolved::Node(&node.name),
        _ => Resolved::Unresolvable,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strip_port_handles_plain_and_bracketed_hosts() {
        assert_eq!(strip_port("192.168.88.5:9100"), "192.168.88.5");
        assert_eq!(strip_port("192.168.88.5"), "192.168.88.5");
        assert_eq!(strip_port("[fe80::1]:9100"), "fe80::1");
        assert_eq!(strip_port(""), "");
    }
}

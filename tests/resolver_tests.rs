// Instance identifier resolution tests

use homelab_status::registry::Registry;
use homelab_status::resolver::{Resolved, resolve, strip_port};

#[test]
fn known_addresses_resolve_with_or_without_port() {
    let registry = Registry::default();
    assert_eq!(
        resolve(&registry, "192.168.88.5:9100"),
        Resolved::Node("RpiMaster")
    );
    assert_eq!(resolve(&registry, "192.168.88.6"), Resolved::Node("RpiWorker1"));
    assert_eq!(
        resolve(&registry, " 192.168.88.7:9100 "),
        Resolved::Node("RpiWorker2")
    );
}

#[test]
fn cluster_local_service_names_are_unresolvable() {
    let registry = Registry::default();
    assert_eq!(
        resolve(&registry, "node-exporter.monitoring.svc.cluster.local:9100"),
        Resolved::Unresolvable
    );
    assert_eq!(
        resolve(&registry, "prometheus.monitoring.svc.cluster.local:9090"),
        Resolved::Unresolvable
    );
    assert_eq!(
        resolve(&registry, "node-exporter:9100"),
        Resolved::Unresolvable
    );
    // Fully qualified form with the trailing root dot.
    assert_eq!(
        resolve(&registry, "kube-dns.kube-system.svc.cluster.local.:9153"),
        Resolved::Unresolvable
    );
}

#[test]
fn unknown_hosts_are_unresolvable() {
    let registry = Registry::default();
    assert_eq!(resolve(&registry, "10.42.0.15:9100"), Resolved::Unresolvable);
    assert_eq!(resolve(&registry, "192.168.88.50:9100"), Resolved::Unresolvable);
}

#[test]
fn resolution_is_total_and_never_yields_empty_names() {
    let registry = Registry::default();
    let inputs = [
        "",
        ":",
        ":9100",
        ":::",
        "[",
        "[]:9100",
        "[fe80::1]:9100",
        "192.168.88.5:",
        "unknown",
        "   ",
        "192.168.88.5:9100:extra",
    ];
    for input in inputs {
        match resolve(&registry, input) {
            Resolved::Node(name) => assert!(!name.is_empty(), "empty name for {:?}", input),
            Resolved::Unresolvable => {}
        }
    }
    assert_eq!(resolve(&registry, ":9100").node(), None);
    assert_eq!(resolve(&registry, "192.168.88.5:").node(), Some("RpiMaster"));
}

#[test]
fn strip_port_keeps_only_host() {
    assert_eq!(strip_port("host.example:443"), "host.example");
    assert_eq!(strip_port("host.example"), "host.example");
}

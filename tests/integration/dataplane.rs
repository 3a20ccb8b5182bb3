//! Dataplane configuration built from a mock host

use crate::MockHost;
use std::net::IpAddr;
use vxagent::dataplane::{
    DataplaneConfig, DataplaneConfigBuilder, DataplaneDriver, FileDriver, InterfaceEntry,
    InterfaceKind, RouteKind,
};
use vxagent::host::AddressFamily;
use vxagent::Error;

fn ip(s: &str) -> IpAddr {
    s.parse().unwrap()
}

#[test]
fn test_build_from_single_homed_host() {
    let host = MockHost::single_homed();
    let config = DataplaneConfigBuilder::new(&host).build().unwrap();

    // Interface: exactly one, passed through with both networks
    assert_eq!(config.interfaces.len(), 1);
    let iface = &config.interfaces[0];
    assert_eq!(iface.name, "eth0");
    assert_eq!(iface.host_if_name, "eth0");
    assert_eq!(iface.kind, InterfaceKind::AfPacket);
    assert_eq!(iface.phys_address, "02:42:0a:00:00:05");
    assert_eq!(iface.ip_addresses.len(), 2);

    // Neighbors: only the eth0 rows, in table order
    let arp_ips: Vec<IpAddr> = config.arps.iter().map(|a| a.ip_address).collect();
    assert_eq!(arp_ips, vec![ip("10.0.0.1"), ip("10.0.0.7")]);
    assert!(config.arps.iter().all(|a| a.is_static && a.interface == "eth0"));

    // Routes: one per family
    assert_eq!(config.routes.len(), 2);
    assert_eq!(config.routes[0].dst_network.family(), AddressFamily::Ipv4);
    assert_eq!(config.routes[0].next_hop_addr, ip("10.0.0.1"));
    assert_eq!(config.routes[1].dst_network.family(), AddressFamily::Ipv6);
    assert_eq!(config.routes[1].next_hop_addr, ip("2001:db8::1"));
    assert!(config.routes.iter().all(|r| r.kind == RouteKind::InterVrf && r.weight == 1));

    // Firewall: one rule per local network, full-host destinations
    assert_eq!(config.acls.len(), 1);
    assert_eq!(config.acls[0].name, "eth0");
    let dsts: Vec<String> = config.acls[0]
        .rules
        .iter()
        .map(|r| r.destination_network.to_string())
        .collect();
    assert_eq!(dsts, vec!["10.0.0.5/32", "2001:db8::5/128"]);
}

#[test]
fn test_explicit_tunnel_ip() {
    let host = MockHost::single_homed();
    let config = DataplaneConfigBuilder::new(&host)
        .tunnel_ip(Some(ip("2001:db8::5")))
        .build()
        .unwrap();
    assert_eq!(config.interfaces[0].name, "eth0");
}

#[test]
fn test_explicit_tunnel_ip_must_be_bound() {
    let host = MockHost::single_homed();
    let err = DataplaneConfigBuilder::new(&host)
        .tunnel_ip(Some(ip("10.0.0.6")))
        .build()
        .unwrap_err();
    assert!(matches!(err, Error::NotFound { .. }));
}

#[test]
fn test_loopback_only_host_has_no_endpoint() {
    let mut host = MockHost::single_homed();
    host.interfaces.truncate(1);
    let err = DataplaneConfigBuilder::new(&host).build().unwrap_err();
    assert!(matches!(err, Error::NoUsableAddress));
}

#[test]
fn test_malformed_neighbor_table_aborts() {
    let mut host = MockHost::single_homed();
    host.arp = "";
    let err = DataplaneConfigBuilder::new(&host).build().unwrap_err();
    assert!(matches!(err, Error::MalformedKernelTable { .. }));
}

#[test]
fn test_build_on_prepends_interface() {
    let host = MockHost::single_homed();
    let mut base = DataplaneConfig::new();
    base.interfaces.push(InterfaceEntry {
        name: "memif0".into(),
        kind: InterfaceKind::AfPacket,
        enabled: true,
        phys_address: String::new(),
        host_if_name: "memif0".into(),
        ip_addresses: Vec::new(),
    });

    let config = DataplaneConfigBuilder::new(&host).build_on(base).unwrap();
    let names: Vec<&str> = config.interfaces.iter().map(|i| i.name.as_str()).collect();
    assert_eq!(names, vec!["eth0", "memif0"]);
}

#[test]
fn test_file_driver_output() {
    let host = MockHost::single_homed();
    let config = DataplaneConfigBuilder::new(&host).build().unwrap();

    let dir = tempfile::tempdir().unwrap();
    let path = dir.path().join("dataplane.toml");
    FileDriver::new(&path, "forwarder").apply(config).unwrap();

    let text = std::fs::read_to_string(&path).unwrap();
    assert!(text.starts_with("# Generated by vxagent - DO NOT EDIT"));
    assert!(text.contains("destination_network = \"10.0.0.5/32\""));
    assert!(text.contains("next_hop_addr = \"2001:db8::1\""));
}

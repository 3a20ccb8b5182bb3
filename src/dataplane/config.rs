//! Dataplane configuration aggregate
//!
//! The payload handed to the dataplane driver. Entries are plain data; the
//! builder fills them from host state in a fixed order.

use crate::host::{HardwareAddr, IpNetwork};
use serde::Serialize;
use std::net::IpAddr;

/// Destination port for VXLAN encapsulated traffic
pub const VXLAN_PORT: u16 = 4789;

/// Complete dataplane configuration
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct DataplaneConfig {
    pub interfaces: Vec<InterfaceEntry>,
    pub arps: Vec<ArpEntry>,
    pub routes: Vec<Route>,
    pub acls: Vec<Acl>,
}

impl DataplaneConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// Total number of firewall rules across all ACLs
    pub fn rule_count(&self) -> usize {
        self.acls.iter().map(|acl| acl.rules.len()).sum()
    }
}

/// How an interface is attached to the dataplane
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum InterfaceKind {
    /// Host interface passed straight through to the dataplane
    AfPacket,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct InterfaceEntry {
    pub name: String,
    pub kind: InterfaceKind,
    pub enabled: bool,
    /// Empty when the host interface has no link-layer address
    pub phys_address: String,
    pub host_if_name: String,
    pub ip_addresses: Vec<IpNetwork>,
}

/// Static neighbor entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ArpEntry {
    pub interface: String,
    pub ip_address: IpAddr,
    pub phys_address: HardwareAddr,
    pub is_static: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum RouteKind {
    /// Route leaking between routing domains
    InterVrf,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Route {
    pub kind: RouteKind,
    pub dst_network: IpNetwork,
    pub next_hop_addr: IpAddr,
    pub outgoing_interface: String,
    pub weight: u32,
}

/// Access list bound to interfaces
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Acl {
    pub name: String,
    /// Interfaces the rules apply to on ingress
    pub ingress: Vec<String>,
    pub rules: Vec<AclRule>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AclAction {
    Permit,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AclProtocol {
    Udp,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct PortRange {
    pub lower: u16,
    pub upper: u16,
}

impl PortRange {
    pub const ALL: PortRange = PortRange {
        lower: 0,
        upper: u16::MAX,
    };

    pub fn single(port: u16) -> Self {
        Self {
            lower: port,
            upper: port,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AclRule {
    pub action: AclAction,
    pub protocol: AclProtocol,
    pub source_network: IpNetwork,
    pub destination_network: IpNetwork,
    pub source_ports: PortRange,
    pub destination_ports: PortRange,
}

//! Configuration steps
//!
//! Each step is a pure function of the captured host state that yields one
//! delta. Deltas are folded into the aggregate in `PIPELINE` order: the
//! interface goes in first because the neighbor and ACL entries name it.

use super::config::{
    Acl, AclAction, AclProtocol, AclRule, ArpEntry, DataplaneConfig, InterfaceEntry,
    InterfaceKind, PortRange, Route, RouteKind, VXLAN_PORT,
};
use crate::endpoint::select_endpoint;
use crate::host::{HostNetworkInspector, IpNetwork, NeighborEntry, RouteEntry, TunnelEndpoint};
use crate::Result;
use std::net::IpAddr;
use tracing::{debug, warn};

/// Host facts the steps are computed from, captured once.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HostState {
    pub endpoint: TunnelEndpoint,
    /// Networks bound to the endpoint interface
    pub networks: Vec<IpNetwork>,
    /// Neighbor rows on the endpoint interface
    pub neighbors: Vec<NeighborEntry>,
    /// Process-wide default routes, at most one per family
    pub routes: Vec<RouteEntry>,
}

impl HostState {
    /// Query the host. Any failure aborts the capture.
    pub fn capture<H>(host: &H, tunnel_ip: Option<IpAddr>) -> Result<Self>
    where
        H: HostNetworkInspector + ?Sized,
    {
        let endpoint = select_endpoint(host, tunnel_ip)?;
        let networks = host.networks_of(&endpoint.interface)?;
        let neighbors = host.neighbors_on(&endpoint.interface.name)?;
        let routes = host.default_routes()?;
        debug!(
            "Captured host state: {} networks, {} neighbors, {} default routes on {}",
            networks.len(),
            neighbors.len(),
            routes.len(),
            endpoint.interface.name
        );
        Ok(Self {
            endpoint,
            networks,
            neighbors,
            routes,
        })
    }

    pub fn interface_name(&self) -> &str {
        &self.endpoint.interface.name
    }
}

/// One mutation of the aggregate
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigDelta {
    /// Insert ahead of any existing interfaces
    PrependInterface(InterfaceEntry),
    AppendArps(Vec<ArpEntry>),
    AppendRoutes(Vec<Route>),
    AppendAcl(Acl),
}

impl ConfigDelta {
    pub fn apply(self, config: &mut DataplaneConfig) {
        match self {
            ConfigDelta::PrependInterface(iface) => config.interfaces.insert(0, iface),
            ConfigDelta::AppendArps(arps) => config.arps.extend(arps),
            ConfigDelta::AppendRoutes(routes) => config.routes.extend(routes),
            ConfigDelta::AppendAcl(acl) => config.acls.push(acl),
        }
    }
}

pub type Step = fn(&HostState) -> Result<ConfigDelta>;

/// The steps, in the order they must be applied
pub const PIPELINE: [(&str, Step); 4] = [
    ("interface", interface_step),
    ("neighbors", neighbor_step),
    ("routes", route_step),
    ("firewall", firewall_step),
];

/// Pass the endpoint interface through to the dataplane with all its addresses
pub fn interface_step(state: &HostState) -> Result<ConfigDelta> {
    let iface = &state.endpoint.interface;
    Ok(ConfigDelta::PrependInterface(InterfaceEntry {
        name: iface.name.clone(),
        kind: InterfaceKind::AfPacket,
        enabled: true,
        phys_address: iface
            .hardware_addr
            .map(|mac| mac.to_string())
            .unwrap_or_default(),
        host_if_name: iface.name.clone(),
        ip_addresses: state.networks.clone(),
    }))
}

/// Copy the host's neighbor cache for the endpoint interface as static entries
pub fn neighbor_step(state: &HostState) -> Result<ConfigDelta> {
    Ok(ConfigDelta::AppendArps(
        state
            .neighbors
            .iter()
            .map(|n| ArpEntry {
                interface: n.interface.clone(),
                ip_address: n.ip,
                phys_address: n.hardware_addr.clone(),
                is_static: true,
            })
            .collect(),
    ))
}

/// Mirror the host's default routes
pub fn route_step(state: &HostState) -> Result<ConfigDelta> {
    if state.routes.is_empty() {
        // Isolated hosts legitimately have none; the dataplane just gets no default.
        warn!("No default route found for any address family");
    }
    Ok(ConfigDelta::AppendRoutes(
        state
            .routes
            .iter()
            .map(|r| Route {
                kind: RouteKind::InterVrf,
                dst_network: r.destination(),
                next_hop_addr: r.gateway,
                outgoing_interface: r.interface.clone(),
                weight: 1,
            })
            .collect(),
    ))
}

/// Permit inbound VXLAN to each local address from anywhere in its family
pub fn firewall_step(state: &HostState) -> Result<ConfigDelta> {
    let name = state.interface_name().to_string();
    let rules = state
        .networks
        .iter()
        .map(|net| AclRule {
            action: AclAction::Permit,
            protocol: AclProtocol::Udp,
            source_network: IpNetwork::any(net.family()),
            destination_network: net.to_host(),
            source_ports: PortRange::ALL,
            destination_ports: PortRange::single(VXLAN_PORT),
        })
        .collect();

    Ok(ConfigDelta::AppendAcl(Acl {
        name: name.clone(),
        ingress: vec![name],
        rules,
    }))
}

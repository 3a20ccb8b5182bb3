//! Read-only queries over host network state
//!
//! Interfaces come from getifaddrs; neighbors and default routes are parsed
//! from the kernel's `/proc/net` tables. Nothing here mutates host state.

mod interfaces;
mod neighbors;
mod routes;
mod types;

pub use interfaces::list_interfaces;
pub use neighbors::parse_neighbors;
pub use routes::{decode_gateway, parse_ipv4_default_route, parse_ipv6_default_route};
pub use types::*;

use crate::config::HostPaths;
use crate::{netns, Error, Result};
use std::fs::File;
use std::io::{BufReader, ErrorKind};
use std::net::IpAddr;
use std::path::Path;
use tracing::{debug, info, warn};

/// Read-only view of the host's network state.
///
/// List operations return empty results rather than failing when nothing
/// matches; only OS and parse errors are reported.
pub trait HostNetworkInspector {
    /// All interfaces in OS enumeration order
    fn interfaces(&self) -> Result<Vec<InterfaceDescriptor>>;

    /// Neighbor rows for an interface, in table order
    fn neighbors_on(&self, interface: &str) -> Result<Vec<NeighborEntry>>;

    /// Default routes for each address family that has one
    fn default_routes(&self) -> Result<Vec<RouteEntry>>;

    /// Interface carrying exactly `ip`
    fn interface_owning(&self, ip: IpAddr) -> Result<InterfaceDescriptor> {
        self.interfaces()?
            .into_iter()
            .find(|iface| iface.has_ip(&ip))
            .ok_or(Error::NotFound { ip })
    }

    /// Networks currently bound to an interface, OS order preserved
    fn networks_of(&self, interface: &InterfaceDescriptor) -> Result<Vec<IpNetwork>> {
        Ok(self
            .interfaces()?
            .into_iter()
            .find(|iface| iface.name == interface.name)
            .map(|iface| iface.networks)
            .unwrap_or_default())
    }
}

/// Inspector backed by the running Linux kernel
#[derive(Debug, Clone, Default)]
pub struct LinuxHost {
    paths: HostPaths,
}

impl LinuxHost {
    pub fn new(paths: HostPaths) -> Self {
        Self { paths }
    }

    /// Queries made while this thread sits in another namespace would
    /// describe that namespace, not the host. Any held guard counts, even one
    /// whose target is the host namespace again.
    fn ensure_host_namespace(&self) -> Result<()> {
        if netns::switch_pending() {
            return Err(Error::OsQuery(
                "network namespace switch pending on this thread".to_string(),
            ));
        }
        Ok(())
    }

    /// Parse one route table; a missing table or a table without a default
    /// row counts as no route for that family.
    fn default_route_from<F>(&self, path: &Path, family: AddressFamily, parse: F) -> Result<Option<RouteEntry>>
    where
        F: FnOnce(BufReader<File>, &str) -> Result<RouteEntry>,
    {
        let file = match File::open(path) {
            Ok(f) => f,
            Err(e) => {
                debug!("{} route table {} unavailable: {}", family, path.display(), e);
                return Ok(None);
            }
        };

        match parse(BufReader::new(file), &path.display().to_string()) {
            Ok(route) => {
                info!(
                    "Found default gateway {} outgoing: {}",
                    route.gateway, route.interface
                );
                Ok(Some(route))
            }
            Err(e @ Error::NoDefaultRoute { .. }) => {
                warn!("{}", e);
                Ok(None)
            }
            Err(e) => Err(e),
        }
    }
}

impl HostNetworkInspector for LinuxHost {
    fn interfaces(&self) -> Result<Vec<InterfaceDescriptor>> {
        self.ensure_host_namespace()?;
        list_interfaces()
    }

    fn neighbors_on(&self, interface: &str) -> Result<Vec<NeighborEntry>> {
        self.ensure_host_namespace()?;
        let path = &self.paths.arp_table;
        let file = File::open(path).map_err(|e| match e.kind() {
            ErrorKind::NotFound => {
                Error::OsQuery(format!("neighbor table {} not found", path.display()))
            }
            _ => Error::OsQuery(format!("failed to open {}: {}", path.display(), e)),
        })?;
        parse_neighbors(BufReader::new(file), &path.display().to_string(), interface)
    }

    fn default_routes(&self) -> Result<Vec<RouteEntry>> {
        self.ensure_host_namespace()?;
        let v4 = self.default_route_from(
            &self.paths.route_table,
            AddressFamily::Ipv4,
            parse_ipv4_default_route::<BufReader<File>>,
        )?;
        let v6 = self.default_route_from(
            &self.paths.ipv6_route_table,
            AddressFamily::Ipv6,
            parse_ipv6_default_route::<BufReader<File>>,
        )?;
        Ok(v4.into_iter().chain(v6).collect())
    }
}

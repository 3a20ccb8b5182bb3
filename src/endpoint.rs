//! Tunnel endpoint selection
//!
//! Picks the local address (and therefore interface) that originates and
//! terminates tunnels, either from an explicit IP or by probing the host.

use crate::host::{HostNetworkInspector, IpNetwork, TunnelEndpoint};
use crate::{Error, Result};
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};
use tracing::{debug, info};

/// Ranges never chosen automatically: loopback and link-local for both families
pub const EXCLUDED_NETWORKS: [(IpAddr, u8); 4] = [
    (IpAddr::V4(Ipv4Addr::new(127, 0, 0, 0)), 8),
    (IpAddr::V6(Ipv6Addr::LOCALHOST), 128),
    (IpAddr::V4(Ipv4Addr::new(169, 254, 0, 0)), 16),
    (IpAddr::V6(Ipv6Addr::new(0xfe80, 0, 0, 0, 0, 0, 0, 0)), 10),
];

/// Check whether an address falls inside one of the excluded ranges
pub fn is_excluded(ip: &IpAddr) -> bool {
    EXCLUDED_NETWORKS.iter().any(|(addr, prefix_len)| {
        IpNetwork::new(*addr, *prefix_len)
            .map(|net| net.contains(ip))
            .unwrap_or(false)
    })
}

/// Resolve the tunnel endpoint.
///
/// An explicit, specified IP must be bound to some host interface
/// (`Error::NotFound` otherwise). Without one, the first non-excluded address
/// in OS enumeration order wins (`Error::NoUsableAddress` if none).
///
/// The automatic choice is only as stable as the order the OS reports
/// interfaces and addresses in. On multi-homed hosts that order may change
/// between runs; pass an explicit IP when the choice must be deterministic.
pub fn select_endpoint<H>(host: &H, explicit: Option<IpAddr>) -> Result<TunnelEndpoint>
where
    H: HostNetworkInspector + ?Sized,
{
    if let Some(ip) = explicit.filter(|ip| !ip.is_unspecified()) {
        let interface = host.interface_owning(ip)?;
        info!("Using configured tunnel IP {} on {}", ip, interface.name);
        return Ok(TunnelEndpoint { ip, interface });
    }

    for interface in host.interfaces()? {
        let candidate = interface
            .networks
            .iter()
            .map(|net| net.addr())
            .find(|ip| {
                let excluded = is_excluded(ip);
                if excluded {
                    debug!("Skipping {} on {}: excluded range", ip, interface.name);
                }
                !excluded
            });

        if let Some(ip) = candidate {
            info!("Selected tunnel IP {} on {}", ip, interface.name);
            return Ok(TunnelEndpoint { ip, interface });
        }
    }

    Err(Error::NoUsableAddress)
}

//! Interface and address enumeration via getifaddrs(3)

use super::types::{AddressFamily, InterfaceDescriptor, IpNetwork, MacAddr};
use crate::{Error, Result};
use nix::ifaddrs::getifaddrs;
use nix::sys::socket::SockaddrStorage;
use std::net::IpAddr;

/// List host interfaces in OS enumeration order.
///
/// getifaddrs returns one record per (interface, address); records are folded
/// per interface name, keeping the order in which each name first appears.
pub fn list_interfaces() -> Result<Vec<InterfaceDescriptor>> {
    let addrs = getifaddrs().map_err(|e| Error::OsQuery(format!("getifaddrs: {}", e)))?;

    let mut interfaces: Vec<InterfaceDescriptor> = Vec::new();
    for ifaddr in addrs {
        let idx = match interfaces
            .iter()
            .position(|i| i.name == ifaddr.interface_name)
        {
            Some(idx) => idx,
            None => {
                interfaces.push(InterfaceDescriptor {
                    name: ifaddr.interface_name.clone(),
                    hardware_addr: None,
                    networks: Vec::new(),
                });
                interfaces.len() - 1
            }
        };
        let iface = &mut interfaces[idx];

        let Some(address) = ifaddr.address.as_ref() else {
            continue;
        };

        if let Some(link) = address.as_link_addr() {
            if let Some(mac) = link.addr() {
                iface.hardware_addr = Some(MacAddr(mac));
            }
            continue;
        }

        if let Some(ip) = sockaddr_ip(address) {
            let prefix_len = ifaddr
                .netmask
                .as_ref()
                .and_then(sockaddr_ip)
                .map(|mask| IpNetwork::prefix_from_mask(&mask))
                .unwrap_or_else(|| AddressFamily::of(&ip).max_prefix_len());
            if let Some(net) = IpNetwork::new(ip, prefix_len) {
                iface.networks.push(net);
            }
        }
    }

    Ok(interfaces)
}

fn sockaddr_ip(addr: &SockaddrStorage) -> Option<IpAddr> {
    if let Some(v4) = addr.as_sockaddr_in() {
        return Some(IpAddr::V4(v4.ip()));
    }
    addr.as_sockaddr_in6().map(|v6| IpAddr::V6(v6.ip()))
}

//! Host network types

use serde::{Serialize, Serializer};
use std::fmt;
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};
use std::str::FromStr;

/// MAC address (6 bytes)
#[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct MacAddr(pub [u8; 6]);

impl fmt::Debug for MacAddr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:02x}:{:02x}:{:02x}:{:02x}:{:02x}:{:02x}",
            self.0[0], self.0[1], self.0[2], self.0[3], self.0[4], self.0[5]
        )
    }
}

impl fmt::Display for MacAddr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// Error type for MAC address parsing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseMacAddrError(String);

impl fmt::Display for ParseMacAddrError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid MAC address {:?}", self.0)
    }
}

impl std::error::Error for ParseMacAddrError {}

impl FromStr for MacAddr {
    type Err = ParseMacAddrError;

    /// Parse a colon- or hyphen-separated MAC address
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || ParseMacAddrError(s.to_string());
        let sep = if s.contains('-') { '-' } else { ':' };

        let mut result = [0u8; 6];
        let mut count = 0;
        for part in s.split(sep) {
            if count == 6 || part.len() != 2 {
                return Err(err());
            }
            result[count] = u8::from_str_radix(part, 16).map_err(|_| err())?;
            count += 1;
        }
        if count != 6 {
            return Err(err());
        }
        Ok(MacAddr(result))
    }
}

impl Serialize for MacAddr {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Link-layer address as the kernel prints it in the neighbor table:
/// colon-separated hex octets of any length (6 for Ethernet, 20 for IPoIB).
#[derive(Clone, PartialEq, Eq, Hash)]
pub struct HardwareAddr(Vec<u8>);

impl fmt::Display for HardwareAddr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for (i, octet) in self.0.iter().enumerate() {
            if i > 0 {
                f.write_str(":")?;
            }
            write!(f, "{:02x}", octet)?;
        }
        Ok(())
    }
}

impl fmt::Debug for HardwareAddr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(self, f)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseHardwareAddrError(String);

impl fmt::Display for ParseHardwareAddrError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid hardware address {:?}", self.0)
    }
}

impl std::error::Error for ParseHardwareAddrError {}

impl FromStr for HardwareAddr {
    type Err = ParseHardwareAddrError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || ParseHardwareAddrError(s.to_string());
        if s.is_empty() {
            return Err(err());
        }
        s.split(':')
            .map(|part| {
                if part.len() != 2 {
                    return Err(err());
                }
                u8::from_str_radix(part, 16).map_err(|_| err())
            })
            .collect::<Result<Vec<u8>, _>>()
            .map(HardwareAddr)
    }
}

impl Serialize for HardwareAddr {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// Address family of an IP address or network
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AddressFamily {
    Ipv4,
    Ipv6,
}

impl AddressFamily {
    pub fn of(ip: &IpAddr) -> Self {
        match ip {
            IpAddr::V4(_) => AddressFamily::Ipv4,
            IpAddr::V6(_) => AddressFamily::Ipv6,
        }
    }

    /// Prefix length of a full-host mask
    pub fn max_prefix_len(self) -> u8 {
        match self {
            AddressFamily::Ipv4 => 32,
            AddressFamily::Ipv6 => 128,
        }
    }
}

impl fmt::Display for AddressFamily {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AddressFamily::Ipv4 => write!(f, "IPv4"),
            AddressFamily::Ipv6 => write!(f, "IPv6"),
        }
    }
}

/// IP address bound with a prefix length.
///
/// Unlike a route destination, the address is kept as assigned: an interface
/// holding `10.0.0.5/24` displays as `10.0.0.5/24`, not `10.0.0.0/24`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct IpNetwork {
    addr: IpAddr,
    prefix_len: u8,
}

impl IpNetwork {
    /// Create a network, rejecting prefixes longer than the family allows
    pub fn new(addr: IpAddr, prefix_len: u8) -> Option<Self> {
        if prefix_len > AddressFamily::of(&addr).max_prefix_len() {
            return None;
        }
        Some(Self { addr, prefix_len })
    }

    /// The whole address space of a family (`0.0.0.0/0` or `::/0`)
    pub fn any(family: AddressFamily) -> Self {
        let addr = match family {
            AddressFamily::Ipv4 => IpAddr::V4(Ipv4Addr::UNSPECIFIED),
            AddressFamily::Ipv6 => IpAddr::V6(Ipv6Addr::UNSPECIFIED),
        };
        Self {
            addr,
            prefix_len: 0,
        }
    }

    pub fn addr(&self) -> IpAddr {
        self.addr
    }

    pub fn prefix_len(&self) -> u8 {
        self.prefix_len
    }

    pub fn family(&self) -> AddressFamily {
        AddressFamily::of(&self.addr)
    }

    /// Same address with a full-host mask (/32 or /128)
    pub fn to_host(&self) -> Self {
        Self {
            addr: self.addr,
            prefix_len: self.family().max_prefix_len(),
        }
    }

    /// Check if an address is within this network
    pub fn contains(&self, ip: &IpAddr) -> bool {
        match (self.addr, ip) {
            (IpAddr::V4(net), IpAddr::V4(ip)) => {
                let mask = v4_mask(self.prefix_len);
                (u32::from(net) & mask) == (u32::from(*ip) & mask)
            }
            (IpAddr::V6(net), IpAddr::V6(ip)) => {
                let mask = v6_mask(self.prefix_len);
                (u128::from(net) & mask) == (u128::from(*ip) & mask)
            }
            _ => false,
        }
    }

    /// Prefix length from a contiguous netmask address
    pub fn prefix_from_mask(mask: &IpAddr) -> u8 {
        match mask {
            IpAddr::V4(m) => u32::from(*m).count_ones() as u8,
            IpAddr::V6(m) => u128::from(*m).count_ones() as u8,
        }
    }
}

fn v4_mask(prefix_len: u8) -> u32 {
    if prefix_len == 0 {
        0
    } else {
        !0u32 << (32 - prefix_len)
    }
}

fn v6_mask(prefix_len: u8) -> u128 {
    if prefix_len == 0 {
        0
    } else {
        !0u128 << (128 - prefix_len)
    }
}

impl fmt::Display for IpNetwork {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.addr, self.prefix_len)
    }
}

/// Error type for CIDR parsing
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParseIpNetworkError(String);

impl fmt::Display for ParseIpNetworkError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid CIDR {:?}", self.0)
    }
}

impl std::error::Error for ParseIpNetworkError {}

impl FromStr for IpNetwork {
    type Err = ParseIpNetworkError;

    /// Parse from string like "192.168.1.10/24" or "fe80::/10"
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let err = || ParseIpNetworkError(s.to_string());
        let (addr, prefix) = s.split_once('/').ok_or_else(err)?;
        let addr: IpAddr = addr.parse().map_err(|_| err())?;
        let prefix_len: u8 = prefix.parse().map_err(|_| err())?;
        Self::new(addr, prefix_len).ok_or_else(err)
    }
}

impl Serialize for IpNetwork {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// A host interface as reported by the OS
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InterfaceDescriptor {
    pub name: String,
    /// None for interfaces without a link-layer address (tun, some tunnels)
    pub hardware_addr: Option<MacAddr>,
    /// Bound networks in OS order
    pub networks: Vec<IpNetwork>,
}

impl InterfaceDescriptor {
    /// Exact address match, not containment
    pub fn has_ip(&self, ip: &IpAddr) -> bool {
        self.networks.iter().any(|n| n.addr() == *ip)
    }
}

/// Selected local address for originating and terminating tunnels
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TunnelEndpoint {
    pub ip: IpAddr,
    pub interface: InterfaceDescriptor,
}

/// One row of the kernel neighbor (ARP) table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NeighborEntry {
    pub ip: IpAddr,
    pub hardware_addr: HardwareAddr,
    pub interface: String,
}

/// A default route read from a kernel route table
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RouteEntry {
    pub family: AddressFamily,
    pub gateway: IpAddr,
    pub interface: String,
}

impl RouteEntry {
    pub fn destination(&self) -> IpNetwork {
        IpNetwork::any(self.family)
    }
}

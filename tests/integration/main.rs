//! Integration tests
//!
//! Privileged namespace tests run with: cargo test --test integration -- --ignored

mod dataplane;
mod netns;

use std::io::Cursor;
use vxagent::host::{
    parse_ipv4_default_route, parse_ipv6_default_route, parse_neighbors, HostNetworkInspector,
    InterfaceDescriptor, NeighborEntry, RouteEntry,
};
use vxagent::Result;

pub const ARP_TABLE: &str = "\
IP address       HW type     Flags       HW address            Mask     Device
10.0.0.1         0x1         0x2         52:54:00:00:00:01     *        eth0
10.1.0.1         0x1         0x2         52:54:00:00:01:01     *        eth1
10.0.0.7         0x1         0x2         52:54:00:00:00:07     *        eth0
";

pub const ROUTE_TABLE: &str = "\
Iface\tDestination\tGateway \tFlags\tRefCnt\tUse\tMetric\tMask\t\tMTU\tWindow\tIRTT
eth0\t00000000\t0100000A\t0003\t0\t0\t0\t00000000\t0\t0\t0
eth0\t0000000A\t00000000\t0001\t0\t0\t0\t00FFFFFF\t0\t0\t0
";

pub const IPV6_ROUTE_TABLE: &str = "\
20010db8000000000000000000000000 40 00000000000000000000000000000000 00 00000000000000000000000000000000 00000100 00000001 00000000 00000001 eth0
00000000000000000000000000000000 00 00000000000000000000000000000000 00 20010db8000000000000000000000001 00000400 00000001 00000000 00000003 eth0
";

/// Host backed by fixed interfaces and in-memory kernel tables
pub struct MockHost {
    pub interfaces: Vec<InterfaceDescriptor>,
    pub arp: &'static str,
    pub route: &'static str,
    pub ipv6_route: &'static str,
}

impl MockHost {
    /// One interface with an IPv4 and an IPv6 network, plus loopback
    pub fn single_homed() -> Self {
        Self {
            interfaces: vec![
                InterfaceDescriptor {
                    name: "lo".into(),
                    hardware_addr: None,
                    networks: vec!["127.0.0.1/8".parse().unwrap(), "::1/128".parse().unwrap()],
                },
                InterfaceDescriptor {
                    name: "eth0".into(),
                    hardware_addr: Some("02:42:0a:00:00:05".parse().unwrap()),
                    networks: vec![
                        "10.0.0.5/24".parse().unwrap(),
                        "2001:db8::5/64".parse().unwrap(),
                    ],
                },
            ],
            arp: ARP_TABLE,
            route: ROUTE_TABLE,
            ipv6_route: IPV6_ROUTE_TABLE,
        }
    }
}

impl HostNetworkInspector for MockHost {
    fn interfaces(&self) -> Result<Vec<InterfaceDescriptor>> {
        Ok(self.interfaces.clone())
    }

    fn neighbors_on(&self, interface: &str) -> Result<Vec<NeighborEntry>> {
        parse_neighbors(Cursor::new(self.arp), "arp", interface)
    }

    fn default_routes(&self) -> Result<Vec<RouteEntry>> {
        let v4 = parse_ipv4_default_route(Cursor::new(self.route), "route")?;
        let v6 = parse_ipv6_default_route(Cursor::new(self.ipv6_route), "ipv6_route")?;
        Ok(vec![v4, v6])
    }
}

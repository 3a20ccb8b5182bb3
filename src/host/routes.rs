//! Kernel route table parsing (`/proc/net/route`, `/proc/net/ipv6_route`)

use super::types::{AddressFamily, RouteEntry};
use crate::{Error, Result};
use std::io::BufRead;
use std::net::{IpAddr, Ipv4Addr, Ipv6Addr};

const IPV4_DEFAULT_DST: &str = "00000000";
const IPV6_DEFAULT_DST: &str = "00000000000000000000000000000000";
const IPV6_DEFAULT_PREFIX: &str = "00";

// /proc/net/route: Iface Destination Gateway Flags RefCnt Use Metric Mask ...
const V4_COL_IFACE: usize = 0;
const V4_COL_DST: usize = 1;
const V4_COL_GATEWAY: usize = 2;

// /proc/net/ipv6_route: dst dst_len src src_len next_hop metric refcnt use flags iface
const V6_COL_DST: usize = 0;
const V6_COL_DST_LEN: usize = 1;
const V6_COL_GATEWAY: usize = 4;
const V6_COL_IFACE: usize = 9;
const V6_MIN_COLUMNS: usize = 10;

/// Find the IPv4 default route.
///
/// The header row never matches the all-zero destination, so it needs no
/// special handling.
pub fn parse_ipv4_default_route<R: BufRead>(reader: R, table: &str) -> Result<RouteEntry> {
    for line in reader.lines() {
        let line = line?;
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let parts: Vec<&str> = line.split_whitespace().collect();
        if parts.len() <= V4_COL_GATEWAY {
            return Err(Error::malformed(
                table,
                format!("expected at least {} columns, got {}", V4_COL_GATEWAY + 1, parts.len()),
            ));
        }
        if parts[V4_COL_DST] != IPV4_DEFAULT_DST {
            continue;
        }

        let gateway = gateway_of_family(parts[V4_COL_GATEWAY], AddressFamily::Ipv4, table)?;
        return Ok(RouteEntry {
            family: AddressFamily::Ipv4,
            gateway,
            interface: parts[V4_COL_IFACE].to_string(),
        });
    }

    Err(Error::NoDefaultRoute {
        family: AddressFamily::Ipv4,
    })
}

/// Find the IPv6 default route (`::/0`).
pub fn parse_ipv6_default_route<R: BufRead>(reader: R, table: &str) -> Result<RouteEntry> {
    for line in reader.lines() {
        let line = line?;
        let line = line.trim();
        if line.is_empty() {
            continue;
        }

        let parts: Vec<&str> = line.split_whitespace().collect();
        if parts.len() < V6_MIN_COLUMNS {
            return Err(Error::malformed(
                table,
                format!("expected at least {} columns, got {}", V6_MIN_COLUMNS, parts.len()),
            ));
        }
        if parts[V6_COL_DST] != IPV6_DEFAULT_DST || parts[V6_COL_DST_LEN] != IPV6_DEFAULT_PREFIX {
            continue;
        }

        let gateway = gateway_of_family(parts[V6_COL_GATEWAY], AddressFamily::Ipv6, table)?;
        return Ok(RouteEntry {
            family: AddressFamily::Ipv6,
            gateway,
            interface: parts[V6_COL_IFACE].to_string(),
        });
    }

    Err(Error::NoDefaultRoute {
        family: AddressFamily::Ipv6,
    })
}

/// Decode a gateway column.
///
/// 8 hex digits are an IPv4 address in host (little-endian) byte order, so
/// `0101080A` is `10.8.1.1`. 32 hex digits are an IPv6 address in network
/// order and are taken as-is.
pub fn decode_gateway(hex: &str) -> std::result::Result<IpAddr, String> {
    let bytes = decode_hex(hex)?;
    match bytes.len() {
        4 => Ok(IpAddr::V4(Ipv4Addr::new(bytes[3], bytes[2], bytes[1], bytes[0]))),
        16 => {
            let mut octets = [0u8; 16];
            octets.copy_from_slice(&bytes);
            Ok(IpAddr::V6(Ipv6Addr::from(octets)))
        }
        _ => Err(format!("gateway {:?} is neither 8 nor 32 hex digits", hex)),
    }
}

/// Decode a gateway that must belong to the table's own family
fn gateway_of_family(hex: &str, family: AddressFamily, table: &str) -> Result<IpAddr> {
    let gateway = decode_gateway(hex).map_err(|reason| Error::malformed(table, reason))?;
    if AddressFamily::of(&gateway) != family {
        return Err(Error::malformed(
            table,
            format!("gateway {:?} is not an {} address", hex, family),
        ));
    }
    Ok(gateway)
}

fn decode_hex(hex: &str) -> std::result::Result<Vec<u8>, String> {
    if hex.len() % 2 != 0 || !hex.is_ascii() {
        return Err(format!("invalid hex string {:?}", hex));
    }
    (0..hex.len())
        .step_by(2)
        .map(|i| {
            u8::from_str_radix(&hex[i..i + 2], 16)
                .map_err(|_| format!("invalid hex string {:?}", hex))
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    const ROUTE: &str = "\
Iface\tDestination\tGateway \tFlags\tRefCnt\tUse\tMetric\tMask\t\tMTU\tWindow\tIRTT
eth0\t0000080A\t00000000\t0001\t0\t0\t0\t00FFFFFF\t0\t0\t0
eth0\t00000000\t0101080A\t0003\t0\t0\t0\t00000000\t0\t0\t0
";

    const IPV6_ROUTE: &str = "\
20010db8000000000000000000000000 40 00000000000000000000000000000000 00 00000000000000000000000000000000 00000100 00000001 00000000 00000001     eth0
00000000000000000000000000000000 00 00000000000000000000000000000000 00 fe800000000000000000000000000001 00000400 00000001 00000000 00000003     eth0
";

    #[test]
    fn test_decode_ipv4_gateway_reversed() {
        assert_eq!(
            decode_gateway("0101080A").unwrap(),
            "10.8.1.1".parse::<IpAddr>().unwrap()
        );
        assert_eq!(
            decode_gateway("00000000").unwrap(),
            "0.0.0.0".parse::<IpAddr>().unwrap()
        );
    }

    #[test]
    fn test_decode_ipv6_gateway_natural_order() {
        assert_eq!(
            decode_gateway("20010db8000000000000000000000001").unwrap(),
            "2001:db8::1".parse::<IpAddr>().unwrap()
        );
    }

    #[test]
    fn test_decode_gateway_rejects_bad_input() {
        assert!(decode_gateway("0101080").is_err());
        assert!(decode_gateway("0101080A00").is_err());
        assert!(decode_gateway("ZZ01080A").is_err());
    }

    #[test]
    fn test_ipv4_default_route() {
        let route = parse_ipv4_default_route(Cursor::new(ROUTE), "route").unwrap();
        assert_eq!(route.family, AddressFamily::Ipv4);
        assert_eq!(route.gateway, "10.8.1.1".parse::<IpAddr>().unwrap());
        assert_eq!(route.interface, "eth0");
        assert_eq!(route.destination().to_string(), "0.0.0.0/0");
    }

    #[test]
    fn test_ipv4_no_default_route() {
        let table = "Iface\tDestination\tGateway\neth0\t0000080A\t00000000\n";
        let err = parse_ipv4_default_route(Cursor::new(table), "route").unwrap_err();
        assert!(matches!(
            err,
            Error::NoDefaultRoute {
                family: AddressFamily::Ipv4
            }
        ));
    }

    #[test]
    fn test_ipv4_short_row_is_malformed() {
        let table = "Iface\tDestination\tGateway\neth0\t00000000\n";
        let err = parse_ipv4_default_route(Cursor::new(table), "route").unwrap_err();
        assert!(matches!(err, Error::MalformedKernelTable { .. }));
    }

    #[test]
    fn test_ipv6_default_route() {
        let route = parse_ipv6_default_route(Cursor::new(IPV6_ROUTE), "ipv6_route").unwrap();
        assert_eq!(route.family, AddressFamily::Ipv6);
        assert_eq!(route.gateway, "fe80::1".parse::<IpAddr>().unwrap());
        assert_eq!(route.interface, "eth0");
        assert_eq!(route.destination().to_string(), "::/0");
    }

    #[test]
    fn test_ipv6_requires_zero_prefix() {
        let table = "00000000000000000000000000000000 40 00000000000000000000000000000000 00 fe800000000000000000000000000001 00000400 00000001 00000000 00000003 eth0\n";
        let err = parse_ipv6_default_route(Cursor::new(table), "ipv6_route").unwrap_err();
        assert!(matches!(err, Error::NoDefaultRoute { .. }));
    }

    #[test]
    fn test_ipv4_table_rejects_ipv6_width_gateway() {
        let table = "Iface\tDestination\tGateway\neth0\t00000000\t20010db8000000000000000000000001\n";
        let err = parse_ipv4_default_route(Cursor::new(table), "route").unwrap_err();
        assert!(matches!(err, Error::MalformedKernelTable { .. }));
    }

    #[test]
    fn test_ipv6_table_rejects_ipv4_width_gateway() {
        let table = "00000000000000000000000000000000 00 00000000000000000000000000000000 00 0101080A 00000400 00000001 00000000 00000003 eth0\n";
        let err = parse_ipv6_default_route(Cursor::new(table), "ipv6_route").unwrap_err();
        match err {
            Error::MalformedKernelTable { reason, .. } => assert!(reason.contains("IPv6")),
            other => panic!("unexpected error: {}", other),
        }
    }

    #[test]
    fn test_ipv6_short_row_is_malformed() {
        let table = "00000000000000000000000000000000 00 fe800000000000000000000000000001\n";
        let err = parse_ipv6_default_route(Cursor::new(table), "ipv6_route").unwrap_err();
        assert!(matches!(err, Error::MalformedKernelTable { .. }));
    }
}

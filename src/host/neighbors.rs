//! Kernel neighbor (ARP) table parsing
//!
//! `/proc/net/arp` layout:
//!
//! ```text
//! IP address       HW type     Flags       HW address            Mask     Device
//! 192.168.1.1      0x1         0x2         52:54:00:12:35:02     *        eth0
//! ```

use super::types::{HardwareAddr, NeighborEntry};
use crate::{Error, Result};
use std::io::BufRead;
use std::net::IpAddr;

const COL_IP: usize = 0;
const COL_HW_ADDR: usize = 3;
const COL_DEVICE: usize = 5;

/// Parse neighbor rows for `iface` from an ARP table.
///
/// The header line is required; a blank line or EOF ends the scan. Rows for
/// other interfaces are skipped without being validated.
pub fn parse_neighbors<R: BufRead>(reader: R, table: &str, iface: &str) -> Result<Vec<NeighborEntry>> {
    let mut lines = reader.lines();

    match lines.next() {
        Some(header) => {
            header?;
        }
        None => return Err(Error::malformed(table, "missing header line")),
    }

    let mut entries = Vec::new();
    for line in lines {
        let line = line?;
        let line = line.trim();
        if line.is_empty() {
            break;
        }

        let parts: Vec<&str> = line.split_whitespace().collect();
        if parts.len() <= COL_DEVICE {
            return Err(Error::malformed(
                table,
                format!("expected {} columns, got {}: {:?}", COL_DEVICE + 1, parts.len(), line),
            ));
        }
        if parts[COL_DEVICE] != iface {
            continue;
        }

        let ip: IpAddr = parts[COL_IP]
            .parse()
            .map_err(|_| Error::malformed(table, format!("bad IP address {:?}", parts[COL_IP])))?;
        let hardware_addr: HardwareAddr = parts[COL_HW_ADDR]
            .parse()
            .map_err(|e| Error::malformed(table, format!("{}", e)))?;

        entries.push(NeighborEntry {
            ip,
            hardware_addr,
            interface: parts[COL_DEVICE].to_string(),
        });
    }

    Ok(entries)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::io::Cursor;

    const HEADER: &str =
        "IP address       HW type     Flags       HW address            Mask     Device\n";

    #[test]
    fn test_filters_by_interface() {
        let table = format!(
            "{}{}{}",
            HEADER,
            "10.0.0.1         0x1         0x2         52:54:00:12:35:02     *        eth0\n",
            "10.1.0.1         0x1         0x2         52:54:00:12:35:03     *        eth1\n",
        );
        let entries = parse_neighbors(Cursor::new(table), "arp", "eth0").unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(entries[0].ip, "10.0.0.1".parse::<IpAddr>().unwrap());
        assert_eq!(entries[0].hardware_addr.to_string(), "52:54:00:12:35:02");
        assert_eq!(entries[0].interface, "eth0");
    }

    #[test]
    fn test_exact_interface_match() {
        let table = format!(
            "{}{}",
            HEADER, "10.0.0.1         0x1         0x2         52:54:00:12:35:02     *        eth01\n",
        );
        let entries = parse_neighbors(Cursor::new(table), "arp", "eth0").unwrap();
        assert!(entries.is_empty());
    }

    #[test]
    fn test_preserves_table_order() {
        let table = format!(
            "{}{}{}{}",
            HEADER,
            "10.0.0.3 0x1 0x2 00:00:00:00:00:03 * eth0\n",
            "10.0.0.1 0x1 0x2 00:00:00:00:00:01 * eth0\n",
            "10.0.0.2 0x1 0x2 00:00:00:00:00:02 * eth0\n",
        );
        let entries = parse_neighbors(Cursor::new(table), "arp", "eth0").unwrap();
        let ips: Vec<String> = entries.iter().map(|e| e.ip.to_string()).collect();
        assert_eq!(ips, vec!["10.0.0.3", "10.0.0.1", "10.0.0.2"]);
    }

    #[test]
    fn test_infiniband_neighbor() {
        let table = format!(
            "{}{}{}",
            HEADER,
            "10.0.0.1 0x20 0x2 80:00:00:48:fe:80:00:00:00:00:00:00:00:02:c9:03:00:0a:0b:0c * ib0\n",
            "10.0.0.2 0x1 0x2 52:54:00:12:35:02 * eth0\n",
        );
        let entries = parse_neighbors(Cursor::new(table), "arp", "ib0").unwrap();
        assert_eq!(entries.len(), 1);
        assert_eq!(
            entries[0].hardware_addr.to_string(),
            "80:00:00:48:fe:80:00:00:00:00:00:00:00:02:c9:03:00:0a:0b:0c"
        );
    }

    #[test]
    fn test_bad_hardware_address_fails() {
        let table = format!("{}{}", HEADER, "10.0.0.1 0x1 0x2 52:54:0g:12:35:02 * eth0\n");
        let err = parse_neighbors(Cursor::new(table), "arp", "eth0").unwrap_err();
        assert!(matches!(err, Error::MalformedKernelTable { .. }));
    }

    #[test]
    fn test_header_only_is_empty() {
        let entries = parse_neighbors(Cursor::new(HEADER), "arp", "eth0").unwrap();
        assert!(entries.is_empty());
    }

    #[test]
    fn test_missing_header_fails() {
        let err = parse_neighbors(Cursor::new(""), "arp", "eth0").unwrap_err();
        assert!(matches!(err, Error::MalformedKernelTable { .. }));
    }

    #[test]
    fn test_short_row_fails() {
        let table = format!("{}{}", HEADER, "10.0.0.1 0x1 0x2\n");
        let err = parse_neighbors(Cursor::new(table), "arp", "eth0").unwrap_err();
        assert!(matches!(err, Error::MalformedKernelTable { .. }));
    }

    #[test]
    fn test_blank_line_ends_scan() {
        let table = format!(
            "{}{}\n{}",
            HEADER,
            "10.0.0.1 0x1 0x2 00:00:00:00:00:01 * eth0\n",
            "10.0.0.2 0x1 0x2 00:00:00:00:00:02 * eth0\n",
        );
        let entries = parse_neighbors(Cursor::new(table), "arp", "eth0").unwrap();
        assert_eq!(entries.len(), 1);
    }
}

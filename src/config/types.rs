//! Configuration types

use crate::telemetry::LogConfig;
use serde::{Deserialize, Serialize};
use std::net::IpAddr;
use std::path::PathBuf;

/// Agent configuration (vxagent.toml)
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct AgentConfig {
    /// Endpoint name
    pub name: String,
    /// IP to use for originating and terminating tunnels; picked from the host when unset
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tunnel_ip: Option<IpAddr>,
    /// Where the rendered dataplane configuration is written (`-` for stdout)
    pub output: PathBuf,
    pub log: LogConfig,
    pub host: HostPaths,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            name: "forwarder".to_string(),
            tunnel_ip: None,
            output: PathBuf::from("dataplane.toml"),
            log: LogConfig::default(),
            host: HostPaths::default(),
        }
    }
}

/// Kernel tables read by the host inspector
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(default)]
pub struct HostPaths {
    pub arp_table: PathBuf,
    pub route_table: PathBuf,
    pub ipv6_route_table: PathBuf,
}

impl Default for HostPaths {
    fn default() -> Self {
        Self {
            arp_table: PathBuf::from("/proc/net/arp"),
            route_table: PathBuf::from("/proc/net/route"),
            ipv6_route_table: PathBuf::from("/proc/net/ipv6_route"),
        }
    }
}

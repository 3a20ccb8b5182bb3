//! Dataplane configuration builder

use super::config::DataplaneConfig;
use super::pipeline::{HostState, PIPELINE};
use crate::host::HostNetworkInspector;
use crate::Result;
use std::net::IpAddr;
use tracing::{debug, info};

/// Builds the startup dataplane configuration from host state.
///
/// Runs once, single-threaded, before any namespace switching. A failure in
/// any step discards the whole configuration; there is no retry.
pub struct DataplaneConfigBuilder<'a, H: ?Sized> {
    host: &'a H,
    tunnel_ip: Option<IpAddr>,
}

impl<'a, H> DataplaneConfigBuilder<'a, H>
where
    H: HostNetworkInspector + ?Sized,
{
    pub fn new(host: &'a H) -> Self {
        Self {
            host,
            tunnel_ip: None,
        }
    }

    /// Use this tunnel IP instead of picking one from the host. Unspecified addresses count as unset.
    pub fn tunnel_ip(mut self, ip: Option<IpAddr>) -> Self {
        self.tunnel_ip = ip;
        self
    }

    pub fn build(&self) -> Result<DataplaneConfig> {
        self.build_on(DataplaneConfig::new())
    }

    /// Extend `base`, placing the tunnel interface ahead of its interfaces
    pub fn build_on(&self, base: DataplaneConfig) -> Result<DataplaneConfig> {
        let state = HostState::capture(self.host, self.tunnel_ip)?;
        let config = apply_pipeline(&state, base)?;
        info!(
            "Dataplane config for {} ({}): {} interfaces, {} ARP entries, {} routes, {} ACL rules",
            state.interface_name(),
            state.endpoint.ip,
            config.interfaces.len(),
            config.arps.len(),
            config.routes.len(),
            config.rule_count()
        );
        Ok(config)
    }
}

/// Fold every step over `config`, stopping at the first failure
pub fn apply_pipeline(state: &HostState, mut config: DataplaneConfig) -> Result<DataplaneConfig> {
    for (name, step) in PIPELINE {
        debug!("Applying {} step", name);
        step(state)?.apply(&mut config);
    }
    Ok(config)
}

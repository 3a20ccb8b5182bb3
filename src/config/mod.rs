//! Configuration management
//!
//! Layers, lowest priority first: built-in defaults, an optional TOML file,
//! `NSM_*` environment variables, then command-line flags.

mod types;
mod validation;

pub use types::*;
pub use validation::{validate, ValidationResult};

use crate::{Error, Result};
use std::net::IpAddr;
use std::path::{Path, PathBuf};

/// Prefix of every environment override
pub const ENV_PREFIX: &str = "NSM";

/// Load configuration from a TOML file
pub fn load<P: AsRef<Path>>(path: P) -> Result<AgentConfig> {
    let content = std::fs::read_to_string(path).map_err(Error::Io)?;
    parse(&content)
}

/// Parse configuration from TOML text
pub fn parse(content: &str) -> Result<AgentConfig> {
    toml::from_str(content).map_err(|e| Error::Config(e.to_string()))
}

impl AgentConfig {
    /// Overlay `NSM_*` variables using `lookup` (normally `std::env::var`).
    ///
    /// An empty `NSM_TUNNEL_IP` clears the tunnel IP.
    pub fn apply_env<F>(&mut self, lookup: F) -> Result<()>
    where
        F: Fn(&str) -> Option<String>,
    {
        let var = |key: &str| lookup(&format!("{}_{}", ENV_PREFIX, key));

        if let Some(name) = var("NAME") {
            self.name = name;
        }
        if let Some(ip) = var("TUNNEL_IP") {
            self.tunnel_ip = parse_tunnel_ip(&ip)?;
        }
        if let Some(output) = var("OUTPUT") {
            self.output = PathBuf::from(output);
        }
        if let Some(level) = var("LOG_LEVEL") {
            self.log.level = level;
        }
        if let Some(format) = var("LOG_FORMAT") {
            self.log.format = format;
        }
        Ok(())
    }

    /// Overlay from the process environment
    pub fn apply_process_env(&mut self) -> Result<()> {
        self.apply_env(|key| std::env::var(key).ok())
    }
}

fn parse_tunnel_ip(value: &str) -> Result<Option<IpAddr>> {
    let value = value.trim();
    if value.is_empty() {
        return Ok(None);
    }
    value
        .parse()
        .map(Some)
        .map_err(|_| Error::Config(format!("{}_TUNNEL_IP: invalid IP {:?}", ENV_PREFIX, value)))
}

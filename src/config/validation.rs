//! Configuration validation

use super::AgentConfig;
use crate::endpoint::is_excluded;

const LOG_LEVELS: [&str; 5] = ["error", "warn", "info", "debug", "trace"];
const LOG_FORMATS: [&str; 3] = ["pretty", "compact", "json"];

#[derive(Debug, Clone, Default)]
pub struct ValidationResult {
    pub warnings: Vec<String>,
    pub errors: Vec<String>,
}

impl ValidationResult {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn warn(&mut self, msg: impl Into<String>) {
        self.warnings.push(msg.into());
    }

    pub fn error(&mut self, msg: impl Into<String>) {
        self.errors.push(msg.into());
    }

    pub fn has_errors(&self) -> bool {
        !self.errors.is_empty()
    }

    /// Diagnostics go to stderr; stdout may carry the rendered config.
    pub fn print_diagnostics(&self) {
        for warning in &self.warnings {
            eprintln!("[WARN] {}", warning);
        }
        for error in &self.errors {
            eprintln!("[ERROR] {}", error);
        }
    }
}

/// Validate configuration and return warnings/errors
pub fn validate(config: &AgentConfig) -> ValidationResult {
    let mut result = ValidationResult::new();

    validate_identity(config, &mut result);
    validate_tunnel(config, &mut result);
    validate_host(config, &mut result);
    validate_log(config, &mut result);

    result
}

fn validate_identity(config: &AgentConfig, result: &mut ValidationResult) {
    if config.name.trim().is_empty() {
        result.error("name: must not be empty");
    }
    if config.output.as_os_str().is_empty() {
        result.error("output: must not be empty (use \"-\" for stdout)");
    }
}

fn validate_tunnel(config: &AgentConfig, result: &mut ValidationResult) {
    match config.tunnel_ip {
        None => result.warn(
            "tunnel_ip: not specified, the first usable host address is chosen in OS enumeration order",
        ),
        Some(ip) if ip.is_unspecified() => result.warn(format!(
            "tunnel_ip: {} is unspecified, an address is picked from the host",
            ip
        )),
        Some(ip) if is_excluded(&ip) => result.warn(format!(
            "tunnel_ip: {} is loopback or link-local",
            ip
        )),
        Some(_) => {}
    }
}

fn validate_host(config: &AgentConfig, result: &mut ValidationResult) {
    let paths = [
        ("host.arp_table", &config.host.arp_table),
        ("host.route_table", &config.host.route_table),
        ("host.ipv6_route_table", &config.host.ipv6_route_table),
    ];
    for (key, path) in paths {
        if path.as_os_str().is_empty() {
            result.error(format!("{}: must not be empty", key));
        }
    }
}

fn validate_log(config: &AgentConfig, result: &mut ValidationResult) {
    let level = config.log.level.to_lowercase();
    if !LOG_LEVELS.contains(&level.as_str()) {
        result.error(format!(
            "log.level: unknown level {:?} (expected one of {})",
            config.log.level,
            LOG_LEVELS.join(", ")
        ));
    }
    if !LOG_FORMATS.contains(&config.log.format.as_str()) {
        result.error(format!(
            "log.format: unknown format {:?} (expected one of {})",
            config.log.format,
            LOG_FORMATS.join(", ")
        ));
    }
}

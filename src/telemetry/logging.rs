//! Log output for the agent.
//!
//! The filter comes from `RUST_LOG` when it is set and from the `[log]`
//! table otherwise. Everything is written to stderr, leaving stdout for
//! rendered dataplane configuration.

use serde::{Deserialize, Serialize};
use tracing::Level;
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::prelude::*;
use tracing_subscriber::{EnvFilter, Layer, Registry};

/// Logging configuration from the `[log]` table.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct LogConfig {
    /// Log level: error, warn, info, debug, trace
    pub level: String,
    /// Output format: pretty, compact, json
    pub format: String,
}

impl LogConfig {
    /// Creates a new LogConfig with default values.
    pub fn new() -> Self {
        Self {
            level: "info".to_string(),
            format: "pretty".to_string(),
        }
    }
}

impl Default for LogConfig {
    fn default() -> Self {
        Self::new()
    }
}

/// Initializes the logging system.
///
/// Priority:
/// 1. RUST_LOG environment variable (if set)
/// 2. config parameter (if provided)
/// 3. Default: info level, pretty format
///
/// Calling it again after a subscriber is installed has no effect.
pub fn init_logging(config: Option<&LogConfig>) {
    let filter = match config {
        _ if std::env::var_os("RUST_LOG").is_some() => EnvFilter::from_default_env(),
        Some(cfg) => EnvFilter::new(parse_level(&cfg.level).as_str()),
        None => EnvFilter::new("info"),
    };

    let layer = output_layer(config.map_or("pretty", |c| c.format.as_str()));
    let _ = tracing::subscriber::set_global_default(Registry::default().with(layer).with(filter));
}

/// Formatting layer for `format`; unknown names fall back to pretty.
fn output_layer(format: &str) -> Box<dyn Layer<Registry> + Send + Sync> {
    let base = tracing_subscriber::fmt::layer().with_writer(std::io::stderr);
    match format {
        "json" => base.json().with_span_events(FmtSpan::CLOSE).boxed(),
        "compact" => base.compact().boxed(),
        _ => base.boxed(),
    }
}

/// Level named by the `[log]` table, case-insensitive; info when unknown.
fn parse_level(level: &str) -> Level {
    level.trim().parse().unwrap_or(Level::INFO)
}

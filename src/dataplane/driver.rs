//! Hand-off of the built configuration to the dataplane

use super::config::DataplaneConfig;
use crate::{Error, Result};
use std::io::Write;
use std::path::PathBuf;
use tracing::info;

/// Consumer of the finished configuration. Takes ownership; the agent keeps
/// no reference once `apply` returns.
pub trait DataplaneDriver {
    fn apply(&mut self, config: DataplaneConfig) -> Result<()>;
}

/// Writes the configuration as TOML to a file, or stdout for `-`
#[derive(Debug, Clone)]
pub struct FileDriver {
    path: PathBuf,
    source: String,
}

impl FileDriver {
    pub fn new(path: impl Into<PathBuf>, source: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            source: source.into(),
        }
    }

    pub fn render(&self, config: &DataplaneConfig) -> Result<String> {
        let body = toml::to_string_pretty(config)
            .map_err(|e| Error::Config(format!("failed to serialize dataplane config: {}", e)))?;
        Ok(format!(
            "# Generated by vxagent - DO NOT EDIT\n# Endpoint: {}\n# Generated at: {}\n\n{}",
            self.source,
            chrono::Utc::now().to_rfc3339(),
            body
        ))
    }
}

impl DataplaneDriver for FileDriver {
    fn apply(&mut self, config: DataplaneConfig) -> Result<()> {
        let output = self.render(&config)?;
        if self.path.as_os_str() == "-" {
            let mut stdout = std::io::stdout().lock();
            stdout.write_all(output.as_bytes())?;
            stdout.flush()?;
        } else {
            std::fs::write(&self.path, output)?;
            info!("Wrote dataplane config to {}", self.path.display());
        }
        Ok(())
    }
}

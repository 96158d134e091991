//! Command-line interface.
//!
//! Precedence, lowest to highest: defaults, `--config` file, flags.
//! The file must be valid on its own; flags are validated again on top.

use std::path::PathBuf;

use clap::Parser;

use crate::config::loader::{load_config, ConfigError};
use crate::config::schema::RelayConfig;
use crate::config::validation::validate_config;

#[derive(Debug, Parser)]
#[command(name = "cors-relay")]
#[command(version, about = "Relay GET/POST requests to the URL given in ?url= and add CORS headers")]
pub struct Cli {
    /// Port to listen on [default: 8080]
    pub port: Option<u16>,

    /// Interface to bind [default: 0.0.0.0]
    #[arg(long)]
    pub host: Option<String>,

    /// TOML configuration file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long)]
    pub log_level: Option<String>,

    /// Emit JSON log lines
    #[arg(long)]
    pub log_json: bool,
}

impl Cli {
    /// Build the effective configuration and validate it.
    pub fn resolve(self) -> Result<RelayConfig, ConfigError> {
        let mut config = match &self.config {
            Some(path) => load_config(path)?,
            None => RelayConfig::default(),
        };

        if let Some(port) = self.port {
            config.listener.port = port;
        }
        if let Some(host) = self.host {
            config.listener.host = host;
        }
        if let Some(level) = self.log_level {
            config.observability.log_level = level;
        }
        if self.log_json {
            config.observability.json = true;
        }

        validate_config(&config).map_err(ConfigError::Validation)?;
        Ok(config)
    }
}

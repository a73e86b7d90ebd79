//! Front-end configuration
//!
//! A thin TOML wrapper around [`BrokerConfig`]. Command-line flags win over
//! the file, the file wins over the defaults.
//!
//! ```toml
//! [broker]
//! listen_addr = "0.0.0.0:12345"
//! log_path = "broker_log.txt"
//! read_buffer_size = 4096
//! ```

use relaychat_core::BrokerConfig;
use serde::{Deserialize, Serialize};

use crate::cli::Cli;
use crate::error::Result;

/// Application configuration loaded from a TOML file
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub broker: BrokerConfig,
}

impl AppConfig {
    /// Load configuration from a TOML file
    pub fn load_from_file(path: &str) -> Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        Ok(toml::from_str(&contents)?)
    }

    /// Apply command-line overrides on top of the loaded configuration
    pub fn apply_cli_overrides(&mut self, cli: &Cli) {
        if let Some(port) = cli.port {
            self.broker.listen_addr.set_port(port);
        }
        if let Some(log_file) = &cli.log_file {
            self.broker.log_path = log_file.into();
        }
    }
}

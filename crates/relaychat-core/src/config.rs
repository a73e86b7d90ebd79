//! Broker configuration

use std::net::SocketAddr;
use std::path::PathBuf;

use crate::errors::{BrokerError, Result};

/// Default transcript file, created in the working directory
pub const DEFAULT_LOG_PATH: &str = "broker_log.txt";

/// Default size of a single socket read
pub const DEFAULT_READ_BUFFER_SIZE: usize = 4096;

/// Configuration for a [`BrokerServer`](crate::BrokerServer)
#[derive(Debug, Clone, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct BrokerConfig {
    /// Address the listening socket binds to
    pub listen_addr: SocketAddr,
    /// Path of the append-only transcript file
    pub log_path: PathBuf,
    /// Maximum number of bytes consumed by a single client read
    pub read_buffer_size: usize,
}

impl Default for BrokerConfig {
    fn default() -> Self {
        Self {
            listen_addr: SocketAddr::from(([0, 0, 0, 0], 12345)),
            log_path: PathBuf::from(DEFAULT_LOG_PATH),
            read_buffer_size: DEFAULT_READ_BUFFER_SIZE,
        }
    }
}

impl BrokerConfig {
    /// Validate the configuration, rejecting values the broker cannot run with
    pub fn validate(&self) -> Result<()> {
        if self.read_buffer_size == 0 {
            return Err(BrokerError::Config(
                "read_buffer_size must be non-zero".to_string(),
            ));
        }
        if self.log_path.as_os_str().is_empty() {
            return Err(BrokerError::Config("log_path must not be empty".to_string()));
        }
        Ok(())
    }
}

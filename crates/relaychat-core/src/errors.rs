//! Error types for the broker core
//!
//! Three classes of failure cross the public API: startup failures (bind),
//! persistence failures (transcript append) and plain connection I/O. Read
//! and send errors on individual client sockets never surface here at all —
//! they are handled in place as implicit disconnects.

use std::net::SocketAddr;
use std::path::PathBuf;

/// Errors produced by the broker core
#[derive(Debug, thiserror::Error)]
pub enum BrokerError {
    /// The listening socket could not be bound. Fatal to `start()`.
    #[error("failed to bind listener on {addr}: {source}")]
    Bind {
        addr: SocketAddr,
        #[source]
        source: std::io::Error,
    },

    /// A transcript append failed. Reported to the observer, never fatal
    /// to the handler that attempted it.
    #[error("failed to append to transcript {path}: {source}")]
    Transcript {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// Invalid broker configuration, rejected before binding.
    #[error("invalid configuration: {0}")]
    Config(String),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

/// Result type for broker operations
pub type Result<T> = std::result::Result<T, BrokerError>;

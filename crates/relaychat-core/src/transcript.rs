//! Append-only message transcript
//!
//! Every inbound message is written to a flat text file, one line per entry:
//!
//! ```text
//! 2026-08-23 14:01:09 [Client 1]: hello
//! ```
//!
//! The file is opened in append mode and closed again for every entry; there
//! is no rotation and no size limit. Entry order is the order appends are
//! made, which the sequential per-client handlers keep consistent with each
//! client's own send order.

use std::path::{Path, PathBuf};

use chrono::Local;
use tokio::fs::OpenOptions;
use tokio::io::AsyncWriteExt;

use crate::errors::{BrokerError, Result};
use crate::registry::ClientId;

const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// Durable transcript of relayed messages
#[derive(Debug, Clone)]
pub struct TranscriptLog {
    path: PathBuf,
}

impl TranscriptLog {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Append one entry and return the formatted line (newline included)
    ///
    /// A failed append leaves the file untouched for subsequent entries; the
    /// caller reports the error and carries on.
    pub async fn append(&self, id: ClientId, text: &str) -> Result<String> {
        let timestamp = Local::now().format(TIMESTAMP_FORMAT);
        let entry = format!("{timestamp} [Client {id}]: {text}\n");

        let mut file = OpenOptions::new()
            .create(true)
            .append(true)
            .open(&self.path)
            .await
            .map_err(|source| BrokerError::Transcript {
                path: self.path.clone(),
                source,
            })?;
        file.write_all(entry.as_bytes())
            .await
            .map_err(|source| BrokerError::Transcript {
                path: self.path.clone(),
                source,
            })?;
        file.flush()
            .await
            .map_err(|source| BrokerError::Transcript {
                path: self.path.clone(),
                source,
            })?;

        Ok(entry)
    }
}

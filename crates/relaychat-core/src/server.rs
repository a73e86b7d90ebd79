//! Broker server lifecycle
//!
//! [`BrokerServer`] composes the registry, transcript and accept loop into a
//! start/stop lifecycle for the front-end. `start()` binds synchronously and
//! returns immediately once the accept loop is running; `stop()` blocks
//! until shutdown has fully completed, so no observer callbacks fire after
//! it returns. Both are idempotent.

use std::net::SocketAddr;
use std::sync::atomic::AtomicU64;
use std::sync::Arc;

use tokio::net::TcpListener;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};

use crate::accept::AcceptLoop;
use crate::config::BrokerConfig;
use crate::errors::{BrokerError, Result};
use crate::observer::BrokerObserver;
use crate::registry::ClientRegistry;
use crate::transcript::TranscriptLog;

// ----------------------------------------------------------------------------
// Broker Server
// ----------------------------------------------------------------------------

/// The message broker: listening socket, client registry and transcript
/// behind a start/stop lifecycle
pub struct BrokerServer {
    config: BrokerConfig,
    observer: Arc<dyn BrokerObserver>,
    registry: Arc<ClientRegistry>,
    transcript: Arc<TranscriptLog>,
    accept_task: Option<JoinHandle<()>>,
    shutdown: Option<CancellationToken>,
    local_addr: Option<SocketAddr>,
    // Owned by the server rather than the accept loop so identifiers are
    // unique for the server's whole lifetime, across stop/start cycles.
    next_client_id: Arc<AtomicU64>,
}

impl BrokerServer {
    pub fn new(config: BrokerConfig, observer: Arc<dyn BrokerObserver>) -> Self {
        let transcript = Arc::new(TranscriptLog::new(config.log_path.clone()));
        Self {
            config,
            observer,
            registry: Arc::new(ClientRegistry::new()),
            transcript,
            accept_task: None,
            shutdown: None,
            local_addr: None,
            next_client_id: Arc::new(AtomicU64::new(1)),
        }
    }

    /// Bind the listening socket and launch the accept loop
    ///
    /// Non-blocking: returns as soon as the socket is bound and the accept
    /// task is spawned. A bind or listen failure is returned synchronously
    /// and leaves the server stopped. Calling `start()` on a running server
    /// is a no-op.
    pub async fn start(&mut self) -> Result<()> {
        if self.is_running() {
            warn!("start ignored, broker already running");
            return Ok(());
        }

        self.config.validate()?;

        let listener = TcpListener::bind(self.config.listen_addr)
            .await
            .map_err(|source| BrokerError::Bind {
                addr: self.config.listen_addr,
                source,
            })?;
        let local_addr = listener.local_addr()?;

        let shutdown = CancellationToken::new();
        let accept_loop = AcceptLoop::new(
            listener,
            Arc::clone(&self.registry),
            Arc::clone(&self.transcript),
            Arc::clone(&self.observer),
            shutdown.clone(),
            self.config.read_buffer_size,
            Arc::clone(&self.next_client_id),
        );

        self.accept_task = Some(tokio::spawn(accept_loop.run()));
        self.shutdown = Some(shutdown);
        self.local_addr = Some(local_addr);

        info!(%local_addr, "broker started");
        Ok(())
    }

    /// Signal shutdown and wait for it to complete
    ///
    /// Blocking: when `stop()` returns, the listening socket and every
    /// client stream are closed, the registry is empty, every handler has
    /// finished, and no further observer callbacks will fire. Calling
    /// `stop()` on a stopped server is a no-op.
    pub async fn stop(&mut self) {
        let Some(shutdown) = self.shutdown.take() else {
            return;
        };
        shutdown.cancel();

        if let Some(task) = self.accept_task.take() {
            // Only fails if the accept loop panicked or was aborted.
            if let Err(error) = task.await {
                warn!(%error, "accept loop task failed");
            }
        }

        self.local_addr = None;
        info!("broker stopped");
    }

    pub fn is_running(&self) -> bool {
        self.shutdown.is_some()
    }

    /// Address the listener is actually bound to, once running. Useful when
    /// the configured port is 0.
    pub fn local_addr(&self) -> Option<SocketAddr> {
        self.local_addr
    }

    /// Number of currently registered clients
    pub async fn client_count(&self) -> usize {
        self.registry.len().await
    }

    pub fn config(&self) -> &BrokerConfig {
        &self.config
    }
}

impl Drop for BrokerServer {
    fn drop(&mut self) {
        // Best effort if dropped while running; stop() is the orderly path.
        if let Some(shutdown) = self.shutdown.take() {
            shutdown.cancel();
        }
        if let Some(task) = self.accept_task.take() {
            task.abort();
        }
    }
}

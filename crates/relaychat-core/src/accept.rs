//! Connection accept loop
//!
//! Owns the listening socket. Accepts until the shutdown token fires, giving
//! each connection a fresh identifier and its own handler task. The
//! identifier counter lives with the server, not the loop, so identifiers
//! stay unique across stop/start cycles of the same server. The accept
//! itself is cancellable (`select!` against the token), so shutdown latency
//! is bounded by the current await, not by a poll interval.
//!
//! Shutdown ordering: stop accepting, drop the listener, drain the registry
//! (which cancels every handler), then join all handlers. A connection that
//! wins the `select!` race against shutdown is registered first and closed by
//! the drain like any other client — never leaked.

use std::net::SocketAddr;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use tokio::net::{TcpListener, TcpStream};
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, warn};

use crate::handler::ConnectionHandler;
use crate::observer::BrokerObserver;
use crate::registry::{ClientHandle, ClientId, ClientRegistry};
use crate::transcript::TranscriptLog;

pub struct AcceptLoop {
    listener: TcpListener,
    registry: Arc<ClientRegistry>,
    transcript: Arc<TranscriptLog>,
    observer: Arc<dyn BrokerObserver>,
    shutdown: CancellationToken,
    read_buffer_size: usize,
    next_client_id: Arc<AtomicU64>,
}

impl AcceptLoop {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        listener: TcpListener,
        registry: Arc<ClientRegistry>,
        transcript: Arc<TranscriptLog>,
        observer: Arc<dyn BrokerObserver>,
        shutdown: CancellationToken,
        read_buffer_size: usize,
        next_client_id: Arc<AtomicU64>,
    ) -> Self {
        Self {
            listener,
            registry,
            transcript,
            observer,
            shutdown,
            read_buffer_size,
            next_client_id,
        }
    }

    /// Accept connections until shutdown, then tear everything down
    pub async fn run(mut self) {
        let mut handlers = JoinSet::new();

        loop {
            tokio::select! {
                _ = self.shutdown.cancelled() => break,
                accepted = self.listener.accept() => match accepted {
                    Ok((stream, addr)) => self.admit(stream, addr, &mut handlers).await,
                    // Transient (EMFILE, aborted connection); keep accepting.
                    Err(error) => warn!(%error, "accept failed"),
                }
            }
        }

        self.finish(handlers).await;
    }

    /// Register an accepted connection and spawn its handler
    async fn admit(&mut self, stream: TcpStream, addr: SocketAddr, handlers: &mut JoinSet<()>) {
        let id = ClientId::new(self.next_client_id.fetch_add(1, Ordering::Relaxed));

        let (reader, writer) = stream.into_split();
        let handle = ClientHandle::new(id, addr, writer);
        let cancel = handle.cancellation();
        self.registry.insert(handle).await;

        info!(client = %id, %addr, "client connected");
        // Connected callback fires before the handler can read anything.
        self.observer.on_client_connected(id, addr);

        let handler = ConnectionHandler::new(
            id,
            reader,
            cancel,
            Arc::clone(&self.registry),
            Arc::clone(&self.transcript),
            Arc::clone(&self.observer),
            self.read_buffer_size,
        );
        handlers.spawn(handler.run());
    }

    /// Close the listener and every client, then wait for the handlers
    async fn finish(self, mut handlers: JoinSet<()>) {
        drop(self.listener);

        let closed = self.registry.drain().await;
        if closed > 0 {
            debug!(count = closed, "closed client connections");
        }

        // Every handler observes its cancellation and runs cleanup; joining
        // them means all disconnect callbacks have fired when we return.
        while handlers.join_next().await.is_some() {}

        info!("accept loop stopped");
    }
}

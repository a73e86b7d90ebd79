//! Per-client connection handler
//!
//! One handler task per accepted client: read, decode, log, broadcast,
//! repeat. The loop ends when the peer closes, a read fails, or the client
//! is cancelled (removed by a broadcaster, or the server is stopping).
//! Cleanup runs exactly once on every exit path.
//!
//! Failures here are strictly local: nothing a single client does can
//! terminate another handler or the accept loop.

use std::sync::Arc;

use tokio::io::AsyncReadExt;
use tokio::net::tcp::OwnedReadHalf;
use tokio_util::sync::CancellationToken;
use tracing::{debug, warn};

use crate::broadcast::broadcast;
use crate::observer::BrokerObserver;
use crate::registry::{ClientId, ClientRegistry};
use crate::transcript::TranscriptLog;

/// Read loop for one client connection
pub struct ConnectionHandler {
    id: ClientId,
    reader: OwnedReadHalf,
    cancel: CancellationToken,
    registry: Arc<ClientRegistry>,
    transcript: Arc<TranscriptLog>,
    observer: Arc<dyn BrokerObserver>,
    read_buffer_size: usize,
}

impl ConnectionHandler {
    pub fn new(
        id: ClientId,
        reader: OwnedReadHalf,
        cancel: CancellationToken,
        registry: Arc<ClientRegistry>,
        transcript: Arc<TranscriptLog>,
        observer: Arc<dyn BrokerObserver>,
        read_buffer_size: usize,
    ) -> Self {
        Self {
            id,
            reader,
            cancel,
            registry,
            transcript,
            observer,
            read_buffer_size,
        }
    }

    /// Run until the client disconnects or is cancelled, then clean up
    pub async fn run(mut self) {
        let mut buf = vec![0u8; self.read_buffer_size];
        loop {
            tokio::select! {
                _ = self.cancel.cancelled() => {
                    debug!(client = %self.id, "handler cancelled");
                    break;
                }
                read = self.reader.read(&mut buf) => match read {
                    Ok(0) => {
                        debug!(client = %self.id, "peer closed connection");
                        break;
                    }
                    Ok(n) => self.relay(&buf[..n]).await,
                    Err(error) => {
                        debug!(client = %self.id, %error, "read failed");
                        break;
                    }
                }
            }
        }

        // Cleanup. remove() is a no-op if the broadcaster got here first;
        // the disconnect notification fires exactly once either way because
        // only this task sends it.
        self.registry.remove(self.id).await;
        self.observer.on_client_disconnected(self.id);
    }

    /// Log one chunk of inbound bytes and relay it to the other clients
    ///
    /// Undecodable bytes are replaced, never rejected. A transcript failure
    /// ends this message's processing (it is reported, not relayed) but the
    /// read loop continues.
    async fn relay(&self, data: &[u8]) {
        let text = String::from_utf8_lossy(data);
        match self.transcript.append(self.id, &text).await {
            Ok(entry) => {
                self.observer.on_message_logged(&entry);
                broadcast(&self.registry, self.id, text.as_bytes()).await;
            }
            Err(error) => {
                warn!(client = %self.id, %error, "transcript append failed");
                self.observer.on_transcript_error(&error);
            }
        }
    }
}

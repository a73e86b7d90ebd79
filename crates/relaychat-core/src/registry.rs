//! Client registry
//!
//! The registry is the single shared mutable resource of the broker: a map of
//! currently connected clients behind one lock. Every add, remove and
//! iteration goes through a method here — the raw map is never exposed, and
//! the lock is never held across a socket send.
//!
//! [`ClientRegistry::remove`] is the one authoritative removal path. Both the
//! broadcaster (on send failure) and the connection handler (on cleanup) call
//! it, and it is idempotent, so a client can never be closed twice or
//! observed after removal.

use std::collections::HashMap;
use std::fmt;
use std::net::SocketAddr;
use std::sync::Arc;

use tokio::io::AsyncWriteExt;
use tokio::net::tcp::OwnedWriteHalf;
use tokio::sync::Mutex;
use tokio_util::sync::CancellationToken;

// ----------------------------------------------------------------------------
// Client Identity
// ----------------------------------------------------------------------------

/// Server-assigned client identifier
///
/// Assigned monotonically at accept time, never reused for the lifetime of
/// the process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ClientId(u64);

impl ClientId {
    pub const fn new(id: u64) -> Self {
        Self(id)
    }

    pub const fn get(self) -> u64 {
        self.0
    }
}

impl fmt::Display for ClientId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

// ----------------------------------------------------------------------------
// Client Handle
// ----------------------------------------------------------------------------

/// Registry-side view of one connected client
///
/// The read half of the stream is owned exclusively by the client's
/// connection handler; the registry holds the write half (for broadcast) and
/// the cancellation token that tells the handler to stop reading.
#[derive(Clone)]
pub struct ClientHandle {
    pub id: ClientId,
    pub addr: SocketAddr,
    writer: Arc<Mutex<OwnedWriteHalf>>,
    cancel: CancellationToken,
}

impl ClientHandle {
    pub fn new(id: ClientId, addr: SocketAddr, writer: OwnedWriteHalf) -> Self {
        Self {
            id,
            addr,
            writer: Arc::new(Mutex::new(writer)),
            cancel: CancellationToken::new(),
        }
    }

    /// Token the owning handler selects on alongside its socket read
    pub fn cancellation(&self) -> CancellationToken {
        self.cancel.clone()
    }

    /// Write raw bytes to this client. The per-client mutex keeps writes
    /// from interleaving mid-message.
    pub async fn send(&self, payload: &[u8]) -> std::io::Result<()> {
        let mut writer = self.writer.lock().await;
        writer.write_all(payload).await
    }

    /// Close the stream and cancel the owning handler's read loop.
    async fn close(&self) {
        self.cancel.cancel();
        let mut writer = self.writer.lock().await;
        let _ = writer.shutdown().await;
    }
}

impl fmt::Debug for ClientHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientHandle")
            .field("id", &self.id)
            .field("addr", &self.addr)
            .finish_non_exhaustive()
    }
}

// ----------------------------------------------------------------------------
// Client Registry
// ----------------------------------------------------------------------------

/// Thread-safe collection of currently connected clients
///
/// Invariant: a client is present iff its stream is open and its handler has
/// not finished cleanup.
#[derive(Debug, Default)]
pub struct ClientRegistry {
    clients: Mutex<HashMap<ClientId, ClientHandle>>,
}

impl ClientRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Register a freshly accepted client
    pub async fn insert(&self, handle: ClientHandle) {
        self.clients.lock().await.insert(handle.id, handle);
    }

    /// Remove a client, closing its stream and cancelling its handler
    ///
    /// Idempotent: returns `false` if the client was already removed. The
    /// registry lock is released before the stream is shut down, so a
    /// handler removing itself cannot deadlock against a broadcaster
    /// removing the same client.
    pub async fn remove(&self, id: ClientId) -> bool {
        let handle = self.clients.lock().await.remove(&id);
        match handle {
            Some(handle) => {
                handle.close().await;
                true
            }
            None => false,
        }
    }

    /// Snapshot every client except the sender
    ///
    /// Taken under the lock; the actual sends happen on the returned clones
    /// after the lock is released.
    pub async fn recipients(&self, sender: ClientId) -> Vec<ClientHandle> {
        self.clients
            .lock()
            .await
            .values()
            .filter(|handle| handle.id != sender)
            .cloned()
            .collect()
    }

    /// Remove and close every client, returning how many were closed
    pub async fn drain(&self) -> usize {
        let drained: Vec<ClientHandle> = {
            let mut clients = self.clients.lock().await;
            clients.drain().map(|(_, handle)| handle).collect()
        };
        for handle in &drained {
            handle.close().await;
        }
        drained.len()
    }

    pub async fn contains(&self, id: ClientId) -> bool {
        self.clients.lock().await.contains_key(&id)
    }

    pub async fn len(&self) -> usize {
        self.clients.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.clients.lock().await.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tokio::net::{TcpListener, TcpStream};

    /// A connected write half plus the peer stream, for exercising the
    /// registry against real sockets.
    async fn connected_writer() -> (OwnedWriteHalf, TcpStream) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        let client = TcpStream::connect(addr).await.unwrap();
        let (server_side, _) = listener.accept().await.unwrap();
        let (_, writer) = server_side.into_split();
        (writer, client)
    }

    #[tokio::test]
    async fn insert_and_remove() {
        let registry = ClientRegistry::new();
        let (writer, _peer) = connected_writer().await;
        let addr = "127.0.0.1:1000".parse().unwrap();

        registry
            .insert(ClientHandle::new(ClientId::new(1), addr, writer))
            .await;
        assert!(registry.contains(ClientId::new(1)).await);
        assert_eq!(registry.len().await, 1);

        assert!(registry.remove(ClientId::new(1)).await);
        assert!(registry.is_empty().await);
    }

    #[tokio::test]
    async fn remove_is_idempotent() {
        let registry = ClientRegistry::new();
        let (writer, _peer) = connected_writer().await;
        let addr = "127.0.0.1:1000".parse().unwrap();
        registry
            .insert(ClientHandle::new(ClientId::new(7), addr, writer))
            .await;

        assert!(registry.remove(ClientId::new(7)).await);
        assert!(!registry.remove(ClientId::new(7)).await);
        assert!(!registry.remove(ClientId::new(99)).await);
    }

    #[tokio::test]
    async fn recipients_excludes_sender() {
        let registry = ClientRegistry::new();
        let mut peers = Vec::new();
        for n in 1..=3 {
            let (writer, peer) = connected_writer().await;
            peers.push(peer);
            let addr = format!("127.0.0.1:{}", 1000 + n).parse().unwrap();
            registry
                .insert(ClientHandle::new(ClientId::new(n), addr, writer))
                .await;
        }

        let recipients = registry.recipients(ClientId::new(2)).await;
        let mut ids: Vec<u64> = recipients.iter().map(|h| h.id.get()).collect();
        ids.sort_unstable();
        assert_eq!(ids, vec![1, 3]);
    }

    #[tokio::test]
    async fn drain_closes_everything() {
        let registry = ClientRegistry::new();
        let mut peers = Vec::new();
        for n in 1..=3 {
            let (writer, peer) = connected_writer().await;
            peers.push(peer);
            let addr = format!("127.0.0.1:{}", 2000 + n).parse().unwrap();
            registry
                .insert(ClientHandle::new(ClientId::new(n), addr, writer))
                .await;
        }

        assert_eq!(registry.drain().await, 3);
        assert!(registry.is_empty().await);
        assert_eq!(registry.drain().await, 0);
    }

    #[tokio::test]
    async fn removal_cancels_handler_token() {
        let registry = ClientRegistry::new();
        let (writer, _peer) = connected_writer().await;
        let addr = "127.0.0.1:1000".parse().unwrap();
        let handle = ClientHandle::new(ClientId::new(4), addr, writer);
        let token = handle.cancellation();
        registry.insert(handle).await;

        assert!(!token.is_cancelled());
        registry.remove(ClientId::new(4)).await;
        assert!(token.is_cancelled());
    }
}

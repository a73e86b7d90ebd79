//! Front-end observer interface
//!
//! The broker core renders nothing itself. Whatever sits on top of it — the
//! desktop window this broker was originally written for, a CLI, a test
//! harness — implements [`BrokerObserver`] and receives a callback when a
//! message is logged, a client connects or a client disconnects.
//!
//! Callbacks are synchronous notifications invoked from broker tasks; an
//! implementation must not block. Front-ends that need to process events on
//! their own schedule use [`ChannelObserver`], which forwards every callback
//! into an unbounded channel.

use std::net::SocketAddr;

use tokio::sync::mpsc;

use crate::errors::BrokerError;
use crate::registry::ClientId;

// ----------------------------------------------------------------------------
// Observer Trait
// ----------------------------------------------------------------------------

/// Callbacks consumed by the external front-end
///
/// All methods default to no-ops, so an implementation only overrides the
/// notifications it cares about.
pub trait BrokerObserver: Send + Sync {
    /// A message was appended to the transcript. `entry` is the formatted
    /// transcript line, trailing newline included.
    fn on_message_logged(&self, _entry: &str) {}

    /// A client connection was accepted and registered. Fires exactly once
    /// per client, before its handler starts reading.
    fn on_client_connected(&self, _id: ClientId, _addr: SocketAddr) {}

    /// A client's handler finished cleanup. Fires exactly once per client.
    fn on_client_disconnected(&self, _id: ClientId) {}

    /// A transcript append failed. The message that triggered it was not
    /// relayed; the client's session continues.
    fn on_transcript_error(&self, _error: &BrokerError) {}
}

/// Observer that ignores every notification
#[derive(Debug, Clone, Copy, Default)]
pub struct NoOpObserver;

impl BrokerObserver for NoOpObserver {}

// ----------------------------------------------------------------------------
// Channel-Backed Observer
// ----------------------------------------------------------------------------

/// A broker notification, the channel-borne form of one observer callback
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BrokerEvent {
    MessageLogged { entry: String },
    ClientConnected { id: ClientId, addr: SocketAddr },
    ClientDisconnected { id: ClientId },
    TranscriptError { reason: String },
}

/// Observer that forwards every callback into an unbounded mpsc channel
///
/// Send failures are ignored: once the receiving front-end goes away there
/// is nobody left to notify.
#[derive(Debug, Clone)]
pub struct ChannelObserver {
    sender: mpsc::UnboundedSender<BrokerEvent>,
}

impl ChannelObserver {
    /// Create an observer together with the receiving end of its channel
    pub fn channel() -> (Self, mpsc::UnboundedReceiver<BrokerEvent>) {
        let (sender, receiver) = mpsc::unbounded_channel();
        (Self { sender }, receiver)
    }
}

impl BrokerObserver for ChannelObserver {
    fn on_message_logged(&self, entry: &str) {
        let _ = self.sender.send(BrokerEvent::MessageLogged {
            entry: entry.to_string(),
        });
    }

    fn on_client_connected(&self, id: ClientId, addr: SocketAddr) {
        let _ = self.sender.send(BrokerEvent::ClientConnected { id, addr });
    }

    fn on_client_disconnected(&self, id: ClientId) {
        let _ = self.sender.send(BrokerEvent::ClientDisconnected { id });
    }

    fn on_transcript_error(&self, error: &BrokerError) {
        let _ = self.sender.send(BrokerEvent::TranscriptError {
            reason: error.to_string(),
        });
    }
}

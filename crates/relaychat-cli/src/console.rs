//! Console rendering of broker events
//!
//! Stands in for the original front-end's message panel and client table:
//! one tracing line per event, drained from a [`ChannelObserver`] receiver.

use relaychat_core::BrokerEvent;
use tokio::sync::mpsc::UnboundedReceiver;
use tracing::{info, warn};

/// Drain broker events and render each one; returns when the broker (and
/// with it the sending side of the channel) is gone.
pub async fn render_events(mut events: UnboundedReceiver<BrokerEvent>) {
    while let Some(event) = events.recv().await {
        match event {
            BrokerEvent::MessageLogged { entry } => {
                info!("{}", entry.trim_end());
            }
            BrokerEvent::ClientConnected { id, addr } => {
                info!(client = %id, %addr, "client connected");
            }
            BrokerEvent::ClientDisconnected { id } => {
                info!(client = %id, "client disconnected");
            }
            BrokerEvent::TranscriptError { reason } => {
                warn!(%reason, "transcript write failed");
            }
        }
    }
}

//! Broadcast relay
//!
//! Fans one client's message out to every other registered client. Delivery
//! is best-effort and fire-and-forget: no acknowledgment, no retry, no
//! ordering guarantee across recipients. A failed send means the recipient
//! is gone, so it is removed through the registry's shared removal path.

use tracing::debug;

use crate::registry::{ClientId, ClientRegistry};

/// Deliver `payload` to every registered client except `sender`
///
/// The recipient list is snapshotted under the registry lock; the sends
/// themselves run with the lock released, so a slow recipient delays only
/// this broadcast, never registry operations of other handlers.
pub async fn broadcast(registry: &ClientRegistry, sender: ClientId, payload: &[u8]) {
    for recipient in registry.recipients(sender).await {
        if let Err(error) = recipient.send(payload).await {
            // Implicit disconnect. The handler's own cleanup will find the
            // client already gone and skip straight to the notification.
            debug!(client = %recipient.id, %error, "send failed, dropping client");
            registry.remove(recipient.id).await;
        }
    }
}

//! Chat Dispatcher Implementation

use std::sync::Arc;
use std::time::{SystemTime, UNIX_EPOCH};

use tracing::debug;

use crate::connection::ConnectionHub;
use crate::events::{ChatBroadcast, ServerEvent};
use crate::presence::ConnectionRegistry;

/// Current wall-clock time as milliseconds since the Unix epoch.
pub fn epoch_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_millis() as u64)
        .unwrap_or(0)
}

/// Validates sender presence, stamps messages, and fans them out to all
/// connected channels.
#[derive(Clone)]
pub struct ChatDispatcher {
    registry: Arc<ConnectionRegistry>,
    hub: Arc<ConnectionHub>,
}

impl ChatDispatcher {
    pub fn new(registry: Arc<ConnectionRegistry>, hub: Arc<ConnectionHub>) -> Self {
        Self { registry, hub }
    }

    /// Broadcast a chat message if `conn_id` has a presence record.
    ///
    /// The display name on the outgoing message is the one supplied with
    /// this call, not the registry's stored name; the two are independent
    /// inputs. Messages from connections without a record (never identified
    /// or already disconnected) are silently dropped: no error to the
    /// sender, no broadcast. The body is treated as opaque text.
    ///
    /// Returns whether a broadcast was produced.
    pub async fn dispatch(&self, conn_id: &str, display_name: String, body: String) -> bool {
        if !self.registry.contains(conn_id).await {
            debug!(conn_id = %conn_id, "dropping chat message from unidentified sender");
            return false;
        }

        let message = ChatBroadcast {
            display_name,
            body,
            sent_at_epoch_millis: epoch_millis(),
        };

        debug!(conn_id = %conn_id, "broadcasting chat message");
        self.hub.broadcast(&ServerEvent::Chat(message)).await;
        true
    }
}

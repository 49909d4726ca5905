//! Presence Broadcaster Implementation

use std::sync::Arc;

use tracing::debug;

use crate::connection::ConnectionHub;
use crate::events::{ActiveUser, ServerEvent};
use crate::presence::{ConnectionRegistry, PresenceRecord};

/// Serializes the registry into its public view and fans it out to every
/// connected channel.
///
/// Called synchronously after each upsert/remove that changes membership.
/// Every change triggers one full-snapshot broadcast; there is no batching
/// or debounce, so connect/disconnect storms produce a proportional number
/// of broadcasts. The snapshot is taken before the fan-out, so no registry
/// lock is held while messages are queued.
#[derive(Clone)]
pub struct PresenceBroadcaster {
    registry: Arc<ConnectionRegistry>,
    hub: Arc<ConnectionHub>,
}

impl PresenceBroadcaster {
    pub fn new(registry: Arc<ConnectionRegistry>, hub: Arc<ConnectionHub>) -> Self {
        Self { registry, hub }
    }

    /// Snapshot the registry and broadcast the result.
    pub async fn publish(&self) {
        let snapshot = self.registry.snapshot().await;
        self.publish_snapshot(snapshot).await;
    }

    /// Broadcast a previously taken snapshot as the `active-users` event.
    pub async fn publish_snapshot(&self, snapshot: Vec<PresenceRecord>) {
        let users: Vec<ActiveUser> = snapshot
            .into_iter()
            .map(|record| ActiveUser {
                id: record.conn_id,
                display_name: record.display_name,
                avatar_url: record.avatar_url,
            })
            .collect();

        debug!(users = users.len(), "broadcasting active-users snapshot");
        self.hub.broadcast(&ServerEvent::ActiveUsers(users)).await;
    }
}

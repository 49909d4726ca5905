//! Connection Lifecycle Handler Implementation

use std::sync::Arc;

use tracing::{debug, info};

use crate::chat::ChatDispatcher;
use crate::events::{ChatPayload, ClientEvent, IdentifyPayload};
use crate::presence::{ConnectionId, ConnectionRegistry, PresenceBroadcaster};

/// Lifecycle state of one connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    /// Open but not yet identified. A connection may stay here indefinitely;
    /// chat attempts from this state are silently dropped by the dispatcher.
    Connected,
    /// Registered in the presence set. Re-identifying stays here and
    /// overwrites the stored record.
    Identified,
    /// Terminal. No further events are accepted for this connection id.
    Disconnected,
}

/// Wires transport-level connect/disconnect/message events to the registry,
/// broadcaster, and dispatcher, owning the state transitions of a single
/// connection. The transport delivers one in-flight event per connection at
/// a time, so the handler needs no internal locking of its own.
pub struct ConnectionLifecycleHandler {
    conn_id: ConnectionId,
    state: ConnectionState,
    registry: Arc<ConnectionRegistry>,
    broadcaster: PresenceBroadcaster,
    dispatcher: ChatDispatcher,
}

impl ConnectionLifecycleHandler {
    /// Entry state is `Connected`: the transport reported a new connection,
    /// nothing is in the registry yet and no broadcast is triggered.
    pub fn new(
        conn_id: ConnectionId,
        registry: Arc<ConnectionRegistry>,
        broadcaster: PresenceBroadcaster,
        dispatcher: ChatDispatcher,
    ) -> Self {
        Self {
            conn_id,
            state: ConnectionState::Connected,
            registry,
            broadcaster,
            dispatcher,
        }
    }

    pub fn state(&self) -> ConnectionState {
        self.state
    }

    pub fn conn_id(&self) -> &str {
        &self.conn_id
    }

    /// Dispatch one inbound event. Events arriving after disconnect are
    /// ignored.
    pub async fn handle_event(&mut self, event: ClientEvent) {
        if self.state == ConnectionState::Disconnected {
            debug!(conn_id = %self.conn_id, "ignoring event for disconnected connection");
            return;
        }

        match event {
            ClientEvent::Identify(payload) => self.handle_identify(payload).await,
            ClientEvent::Chat(payload) => self.handle_chat(payload).await,
        }
    }

    async fn handle_identify(&mut self, payload: IdentifyPayload) {
        info!(conn_id = %self.conn_id, name = %payload.display_name, "connection identified");
        self.registry
            .upsert(self.conn_id.clone(), payload.display_name, payload.avatar_url)
            .await;
        self.state = ConnectionState::Identified;
        self.broadcaster.publish().await;
    }

    async fn handle_chat(&self, payload: ChatPayload) {
        // Drop rule lives in the dispatcher; an unidentified connection may
        // attempt chat and the message just goes nowhere.
        self.dispatcher
            .dispatch(&self.conn_id, payload.display_name, payload.body)
            .await;
    }

    /// Transport reported disconnect. Removes the presence record if one
    /// exists and broadcasts the shrunken snapshot only when membership
    /// actually changed. Idempotent; the state is terminal afterwards.
    pub async fn handle_disconnect(&mut self) {
        if self.state == ConnectionState::Disconnected {
            return;
        }

        let removed = self.registry.remove(&self.conn_id).await;
        self.state = ConnectionState::Disconnected;

        if removed {
            info!(conn_id = %self.conn_id, "identified connection disconnected");
            self.broadcaster.publish().await;
        } else {
            info!(conn_id = %self.conn_id, "unidentified connection disconnected");
        }
    }
}

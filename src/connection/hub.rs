//! Connection Hub Implementation

use std::collections::HashMap;
use std::sync::atomic::{AtomicUsize, Ordering};

use axum::extract::ws::Message;
use tokio::sync::{mpsc, RwLock};
use tracing::{debug, warn};

use crate::events::ServerEvent;
use crate::presence::ConnectionId;

/// The transport's broadcast primitive.
///
/// Holds one unbounded sender per open connection; a forwarder task on the
/// socket side drains the matching receiver. Broadcasting serializes the
/// event once and queues it on every sender under a read guard. Queueing on
/// an unbounded channel never blocks, so no slow I/O happens while the lock
/// is held. Delivery is best-effort: a send to a connection that is already
/// tearing down is ignored.
pub struct ConnectionHub {
    senders: RwLock<HashMap<ConnectionId, mpsc::UnboundedSender<Message>>>,
    active_connections: AtomicUsize,
}

impl ConnectionHub {
    pub fn new() -> Self {
        Self {
            senders: RwLock::new(HashMap::new()),
            active_connections: AtomicUsize::new(0),
        }
    }

    /// Register the outbound channel for a new connection.
    pub async fn register(&self, conn_id: ConnectionId, sender: mpsc::UnboundedSender<Message>) {
        let mut senders = self.senders.write().await;
        senders.insert(conn_id, sender);
        self.active_connections.fetch_add(1, Ordering::Relaxed);
    }

    /// Drop the outbound channel for a closed connection.
    pub async fn unregister(&self, conn_id: &str) {
        let mut senders = self.senders.write().await;
        if senders.remove(conn_id).is_some() {
            self.active_connections.fetch_sub(1, Ordering::Relaxed);
        }
    }

    /// Fan an event out to every connected channel, the sender included.
    pub async fn broadcast(&self, event: &ServerEvent) {
        let json = match serde_json::to_string(event) {
            Ok(json) => json,
            Err(e) => {
                warn!(error = %e, "failed to serialize outbound event, dropping broadcast");
                return;
            }
        };

        let senders = self.senders.read().await;
        debug!(recipients = senders.len(), "fanning out event");
        for sender in senders.values() {
            let _ = sender.send(Message::Text(json.clone()));
        }
    }

    /// Number of currently open connections (identified or not).
    pub fn active_connections(&self) -> usize {
        self.active_connections.load(Ordering::Relaxed)
    }
}

impl Default for ConnectionHub {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::events::ChatBroadcast;

    #[tokio::test]
    async fn broadcast_reaches_every_registered_connection() {
        let hub = ConnectionHub::new();
        let (tx1, mut rx1) = mpsc::unbounded_channel();
        let (tx2, mut rx2) = mpsc::unbounded_channel();
        hub.register("c1".to_string(), tx1).await;
        hub.register("c2".to_string(), tx2).await;
        assert_eq!(hub.active_connections(), 2);

        let event = ServerEvent::Chat(ChatBroadcast {
            display_name: "Ana".to_string(),
            body: "Oi".to_string(),
            sent_at_epoch_millis: 1,
        });
        hub.broadcast(&event).await;

        for rx in [&mut rx1, &mut rx2] {
            match rx.recv().await {
                Some(Message::Text(text)) => {
                    let received: ServerEvent = serde_json::from_str(&text).unwrap();
                    assert_eq!(received, event);
                }
                other => panic!("expected text frame, got {:?}", other),
            }
        }
    }

    #[tokio::test]
    async fn unregistered_connection_receives_nothing() {
        let hub = ConnectionHub::new();
        let (tx, mut rx) = mpsc::unbounded_channel();
        hub.register("c1".to_string(), tx).await;
        hub.unregister("c1").await;
        assert_eq!(hub.active_connections(), 0);

        hub.broadcast(&ServerEvent::ActiveUsers(vec![])).await;
        assert!(rx.try_recv().is_err());
    }

    #[tokio::test]
    async fn broadcast_survives_a_dropped_receiver() {
        let hub = ConnectionHub::new();
        let (tx1, rx1) = mpsc::unbounded_channel();
        let (tx2, mut rx2) = mpsc::unbounded_channel();
        hub.register("c1".to_string(), tx1).await;
        hub.register("c2".to_string(), tx2).await;
        drop(rx1);

        hub.broadcast(&ServerEvent::ActiveUsers(vec![])).await;
        assert!(rx2.recv().await.is_some());
    }
}

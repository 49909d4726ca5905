//! Connection Registry Implementation

use std::collections::HashMap;

use tokio::sync::RwLock;

/// Opaque transport-assigned identifier for one client connection.
///
/// Unique for the connection's lifetime; not reused while the connection
/// is open.
pub type ConnectionId = String;

/// The stored identity associated with one active connection.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PresenceRecord {
    pub conn_id: ConnectionId,
    pub display_name: String,
    pub avatar_url: String,
}

/// Mapping from connection identifier to presence record.
///
/// Holds exactly the records of connections that have identified and not yet
/// disconnected. All operations take the lock, so concurrent lifecycle
/// handlers cannot lose updates or observe torn snapshots. None of the
/// operations perform I/O; broadcasting happens after the guard is released.
pub struct ConnectionRegistry {
    records: RwLock<HashMap<ConnectionId, PresenceRecord>>,
}

impl ConnectionRegistry {
    pub fn new() -> Self {
        Self {
            records: RwLock::new(HashMap::new()),
        }
    }

    /// Insert or replace the record for `conn_id`. Last write wins; empty
    /// strings are permitted (no validation on name or avatar content).
    pub async fn upsert(&self, conn_id: ConnectionId, display_name: String, avatar_url: String) {
        let record = PresenceRecord {
            conn_id: conn_id.clone(),
            display_name,
            avatar_url,
        };
        let mut records = self.records.write().await;
        records.insert(conn_id, record);
    }

    /// Delete the record for `conn_id` if present. Returns whether a record
    /// existed, so callers know if membership actually changed. Removing an
    /// absent id is a no-op, not an error.
    pub async fn remove(&self, conn_id: &str) -> bool {
        let mut records = self.records.write().await;
        records.remove(conn_id).is_some()
    }

    /// Whether `conn_id` currently has a presence record.
    pub async fn contains(&self, conn_id: &str) -> bool {
        let records = self.records.read().await;
        records.contains_key(conn_id)
    }

    /// Point-in-time copy of all presence records, in no particular order.
    /// The copy shares nothing with registry state.
    pub async fn snapshot(&self) -> Vec<PresenceRecord> {
        let records = self.records.read().await;
        records.values().cloned().collect()
    }

    /// Number of identified connections.
    pub async fn len(&self) -> usize {
        let records = self.records.read().await;
        records.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.len().await == 0
    }
}

impl Default for ConnectionRegistry {
    fn default() -> Self {
        Self::new()
    }
}

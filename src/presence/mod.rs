//! Presence Module
//!
//! Tracks which connections have identified themselves and pushes the
//! active-user list to all clients whenever membership changes.

pub mod broadcaster;
pub mod registry;

pub use broadcaster::PresenceBroadcaster;
pub use registry::{ConnectionId, ConnectionRegistry, PresenceRecord};

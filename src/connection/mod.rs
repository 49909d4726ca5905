//! Connection Module
//!
//! Owns the transport side of the relay: the per-connection WebSocket
//! handler, the hub that fans outbound events to every open channel, and
//! the per-connection lifecycle state machine.

pub mod hub;
pub mod lifecycle;
pub mod socket;

pub use hub::ConnectionHub;
pub use lifecycle::{ConnectionLifecycleHandler, ConnectionState};
pub use socket::ws_handler;

//! chatrelay Library
//!
//! A minimal real-time presence-and-chat relay: clients connect over a
//! WebSocket, register an identity, exchange broadcast text messages, and
//! are removed from the shared presence set on disconnect. Delivery is
//! best-effort fan-out; nothing is persisted.

pub mod chat;
pub mod config;
pub mod connection;
pub mod events;
pub mod http;
pub mod presence;
pub mod shutdown;

pub use chat::ChatDispatcher;
pub use config::Config;
pub use connection::{ConnectionHub, ConnectionLifecycleHandler};
pub use http::{AppServer, AppState};
pub use presence::{ConnectionRegistry, PresenceBroadcaster};
pub use shutdown::ShutdownCoordinator;

/// Common error type for the relay server
pub type Result<T> = anyhow::Result<T>;

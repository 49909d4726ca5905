//! Chat Module
//!
//! Best-effort fan-out of chat messages from identified senders.

pub mod dispatcher;

pub use dispatcher::{epoch_millis, ChatDispatcher};

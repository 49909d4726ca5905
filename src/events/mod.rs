//! Wire Event Module
//!
//! JSON event envelopes exchanged over the real-time channel.

pub mod types;

pub use types::{
    ActiveUser, ChatBroadcast, ChatPayload, ClientEvent, IdentifyPayload, ServerEvent,
};

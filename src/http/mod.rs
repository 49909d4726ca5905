//! HTTP Module
//!
//! The outward-facing surface: WebSocket upgrade, avatar uploads, static
//! assets, and the health endpoint.

pub mod server;
pub mod upload;

pub use server::{create_router, AppServer, AppState};

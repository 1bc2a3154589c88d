//! Inbound HTTP surface: JSON-RPC entry point, artifact downloads, health,
//! and the legacy SSE compatibility endpoint.

pub mod handlers;

pub use handlers::{config, SESSION_HEADER};

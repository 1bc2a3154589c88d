//! MCP (Model Context Protocol) module.
//!
//! JSON-RPC 2.0 over HTTP, exposing the visual-generation tools.

pub mod content;
pub mod rpc;
pub mod service;
pub mod tools;

pub use service::{McpService, PROTOCOL_VERSION};

//! MCP service - core JSON-RPC 2.0 request handler.
//!
//! Stateless per call: resolve the method, run the handler, wrap the result.
//! Notifications (absent or null id) never yield a response, whatever the
//! method resolved to.

use log::{info, warn};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::{json, Value};
use std::sync::Arc;

use crate::mcp::rpc::{RpcRequest, RpcResponse};
use crate::mcp::tools::{ToolDescriptor, ToolRegistry};

pub const PROTOCOL_VERSION: &str = "2024-11-05";

#[derive(Clone)]
pub struct McpService {
    registry: Arc<ToolRegistry>,
}

impl McpService {
    pub fn new(registry: ToolRegistry) -> Self {
        Self {
            registry: Arc::new(registry),
        }
    }

    pub async fn handle_request(&self, request: RpcRequest) -> Option<RpcResponse> {
        let notification = request.is_notification();
        let response = self.dispatch(request).await;
        if notification {
            None
        } else {
            response
        }
    }

    async fn dispatch(&self, request: RpcRequest) -> Option<RpcResponse> {
        if request.jsonrpc != "2.0" {
            warn!("received unsupported jsonrpc version: {}", request.jsonrpc);
            return Some(RpcResponse::invalid_request(
                request.id,
                "Unsupported jsonrpc version (expected 2.0)",
            ));
        }

        let RpcRequest {
            method, params, id, ..
        } = request;

        match method.as_str() {
            "initialize" => Some(self.handle_initialize(id, params)),
            "tools/list" => Some(self.handle_list_tools(id)),
            "tools/call" => Some(self.handle_call_tool(id, params).await),
            "ping" => Some(RpcResponse::success(id, json!({}))),
            method if method.starts_with("notifications/") => {
                info!("received client notification: {method}");
                None
            }
            other => Some(RpcResponse::method_not_found(id, other)),
        }
    }

    fn handle_initialize(&self, id: Option<Value>, params: Option<Value>) -> RpcResponse {
        // Lenient on purpose: a missing clientInfo must not fail the handshake.
        if let Ok(parsed) = parse_params::<InitializeParams>(params) {
            if let Some(client) = parsed.client_info {
                info!(
                    "client initialized: {} v{}",
                    client.name,
                    client.version.unwrap_or_else(|| "unknown".into())
                );
            }
        }

        let result = InitializeResult {
            protocol_version: PROTOCOL_VERSION.to_string(),
            server_info: ImplementationInfo {
                name: env!("CARGO_PKG_NAME").to_string(),
                version: env!("CARGO_PKG_VERSION").to_string(),
            },
            capabilities: ServerCapabilities {
                tools: ToolsCapability {
                    list_changed: false,
                },
            },
        };

        match serde_json::to_value(result) {
            Ok(value) => RpcResponse::success(id, value),
            Err(err) => RpcResponse::internal_error(id, err.to_string()),
        }
    }

    fn handle_list_tools(&self, id: Option<Value>) -> RpcResponse {
        let payload = ListToolsResult {
            tools: self.registry.list_tools(),
        };
        match serde_json::to_value(payload) {
            Ok(value) => RpcResponse::success(id, value),
            Err(err) => RpcResponse::internal_error(id, err.to_string()),
        }
    }

    async fn handle_call_tool(&self, id: Option<Value>, params: Option<Value>) -> RpcResponse {
        let parsed: CallToolParams = match parse_params(params) {
            Ok(value) => value,
            Err(message) => return RpcResponse::invalid_params(id, message),
        };

        // Unknown tools are a protocol-level miss; handler failures inside a
        // known tool are in-band `isError` results instead.
        if !self.registry.knows(&parsed.name) {
            return RpcResponse::tool_not_found(id, &parsed.name);
        }

        let result = self.registry.call_tool(&parsed.name, parsed.arguments).await;
        match serde_json::to_value(result) {
            Ok(value) => RpcResponse::success(id, value),
            Err(err) => RpcResponse::internal_error(id, err.to_string()),
        }
    }
}

#[derive(Debug, Deserialize)]
struct InitializeParams {
    #[serde(rename = "clientInfo")]
    #[serde(default)]
    client_info: Option<ClientInfo>,
}

#[derive(Debug, Deserialize)]
struct ClientInfo {
    name: String,
    #[serde(default)]
    version: Option<String>,
}

#[derive(Debug, Serialize)]
struct InitializeResult {
    #[serde(rename = "protocolVersion")]
    protocol_version: String,
    #[serde(rename = "serverInfo")]
    server_info: ImplementationInfo,
    capabilities: ServerCapabilities,
}

#[derive(Debug, Serialize)]
struct ImplementationInfo {
    name: String,
    version: String,
}

#[derive(Debug, Serialize)]
struct ServerCapabilities {
    tools: ToolsCapability,
}

#[derive(Debug, Serialize)]
struct ToolsCapability {
    #[serde(rename = "listChanged")]
    list_changed: bool,
}

#[derive(Debug, Serialize)]
struct ListToolsResult {
    tools: Vec<ToolDescriptor>,
}

#[derive(Debug, Deserialize)]
struct CallToolParams {
    name: String,
    #[serde(default)]
    arguments: Option<Value>,
}

fn parse_params<T: DeserializeOwned>(params: Option<Value>) -> Result<T, String> {
    serde_json::from_value(params.unwrap_or(Value::Null)).map_err(|err| err.to_string())
}

//! Content blocks for MCP tool results.
//!
//! Tool output is a list of typed blocks. Failures inside a tool handler are
//! reported as a *successful* JSON-RPC response carrying `isError: true`; the
//! JSON-RPC error channel is reserved for protocol-level problems.

use base64::engine::general_purpose::STANDARD as BASE64;
use base64::Engine;
use serde::{Deserialize, Serialize};

/// One block of tool output (MCP spec compatible).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ContentItem {
    #[serde(rename = "type")]
    pub content_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub text: Option<String>,
    /// Base64-encoded payload, for image blocks.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<String>,
    #[serde(rename = "mimeType", skip_serializing_if = "Option::is_none")]
    pub mime_type: Option<String>,
}

impl ContentItem {
    pub fn text(text: impl Into<String>) -> Self {
        Self {
            content_type: "text".to_string(),
            text: Some(text.into()),
            data: None,
            mime_type: None,
        }
    }

    pub fn image(bytes: &[u8], mime_type: &str) -> Self {
        Self {
            content_type: "image".to_string(),
            text: None,
            data: Some(BASE64.encode(bytes)),
            mime_type: Some(mime_type.to_string()),
        }
    }
}

/// Result of a tool call.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ToolResult {
    pub content: Vec<ContentItem>,
    #[serde(rename = "isError")]
    pub is_error: bool,
}

impl ToolResult {
    pub fn success(content: Vec<ContentItem>) -> Self {
        Self {
            content,
            is_error: false,
        }
    }

    pub fn success_text(message: impl Into<String>) -> Self {
        Self::success(vec![ContentItem::text(message)])
    }

    pub fn error(message: impl Into<String>) -> Self {
        Self {
            content: vec![ContentItem::text(message)],
            is_error: true,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_text_item() {
        let item = ContentItem::text("hello");
        assert_eq!(item.content_type, "text");
        assert_eq!(item.text.as_deref(), Some("hello"));
        assert!(item.data.is_none());
    }

    #[test]
    fn test_image_item_encodes_base64() {
        let item = ContentItem::image(b"png bytes", "image/png");
        assert_eq!(item.content_type, "image");
        assert_eq!(item.mime_type.as_deref(), Some("image/png"));
        assert_eq!(
            BASE64.decode(item.data.unwrap()).unwrap(),
            b"png bytes".to_vec()
        );
    }

    #[test]
    fn test_error_result_carries_single_text_block() {
        let result = ToolResult::error("something broke");
        assert!(result.is_error);
        assert_eq!(result.content.len(), 1);
        assert_eq!(result.content[0].text.as_deref(), Some("something broke"));
    }

    #[test]
    fn test_serialized_field_names() {
        let result = ToolResult::success(vec![ContentItem::image(b"x", "image/svg+xml")]);
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["isError"], false);
        assert_eq!(json["content"][0]["type"], "image");
        assert_eq!(json["content"][0]["mimeType"], "image/svg+xml");
    }
}

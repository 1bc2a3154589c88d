//! Tool definition for asynchronous visual generation.

use serde::Deserialize;
use serde_json::{json, Value};

use crate::provider::VisualFormat;

use super::registry::ToolDescriptor;

pub const TOOL_NAME: &str = "generate_visual";

/// Get the tool descriptor for MCP tools/list.
pub fn descriptor() -> ToolDescriptor {
    ToolDescriptor {
        name: TOOL_NAME.to_string(),
        description: concat!(
            "Generate a visual (diagram, chart, or infographic) from text or Markdown content. ",
            "The provider works asynchronously; this tool waits up to 24 seconds for the job ",
            "to finish and returns the rendered image inline plus a time-limited download link. ",
            "Artifacts expire after one hour."
        )
        .to_string(),
        input_schema: input_schema(),
    }
}

fn input_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "content": {
                "type": "string",
                "description": "Text or Markdown describing what to visualize"
            },
            "visual_type": {
                "type": "string",
                "description": "Optional hint for the visual style, e.g. 'mindmap' or 'timeline'"
            },
            "format": {
                "type": "string",
                "enum": ["svg", "png"],
                "description": "Output format (default: svg)"
            }
        },
        "required": ["content"]
    })
}

#[derive(Debug, Deserialize)]
pub struct GenerateVisualRequest {
    pub content: String,
    #[serde(default)]
    pub visual_type: Option<String>,
    #[serde(default)]
    pub format: VisualFormat,
}

impl GenerateVisualRequest {
    pub fn validate(&self) -> Result<(), String> {
        if self.content.trim().is_empty() {
            return Err("'content' must not be empty".to_string());
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_descriptor() {
        let desc = descriptor();
        assert_eq!(desc.name, TOOL_NAME);
        assert!(desc.input_schema["required"]
            .as_array()
            .unwrap()
            .contains(&json!("content")));
    }

    #[test]
    fn test_format_defaults_to_svg() {
        let request: GenerateVisualRequest =
            serde_json::from_value(json!({ "content": "# Plan" })).unwrap();
        assert_eq!(request.format, VisualFormat::Svg);
        assert!(request.visual_type.is_none());
        assert!(request.validate().is_ok());
    }

    #[test]
    fn test_blank_content_rejected() {
        let request: GenerateVisualRequest =
            serde_json::from_value(json!({ "content": "   " })).unwrap();
        assert!(request.validate().is_err());
    }
}

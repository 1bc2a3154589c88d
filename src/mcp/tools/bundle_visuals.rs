//! Tool definition for packaging stored visuals into one zip download.

use serde::Deserialize;
use serde_json::{json, Value};

use super::registry::ToolDescriptor;

pub const TOOL_NAME: &str = "bundle_visuals";

/// Get the tool descriptor for MCP tools/list.
pub fn descriptor() -> ToolDescriptor {
    ToolDescriptor {
        name: TOOL_NAME.to_string(),
        description: concat!(
            "Group previously generated visuals into a single zip download. ",
            "Pass the artifact ids returned by generate_visual. All ids must still exist ",
            "when the bundle is created; members that expire later are skipped when the ",
            "archive is served."
        )
        .to_string(),
        input_schema: input_schema(),
    }
}

fn input_schema() -> Value {
    json!({
        "type": "object",
        "properties": {
            "artifact_ids": {
                "type": "array",
                "items": { "type": "string" },
                "minItems": 1,
                "description": "Ids of stored artifacts, in the order they should appear in the archive"
            }
        },
        "required": ["artifact_ids"]
    })
}

#[derive(Debug, Deserialize)]
pub struct BundleVisualsRequest {
    pub artifact_ids: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_descriptor() {
        let desc = descriptor();
        assert_eq!(desc.name, TOOL_NAME);
        assert_eq!(desc.input_schema["properties"]["artifact_ids"]["type"], "array");
    }
}

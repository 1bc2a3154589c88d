//! Tool registry - central routing for MCP tools.

use chrono::Utc;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::sync::Arc;

use crate::mcp::content::{ContentItem, ToolResult};
use crate::provider::{GenerationOutcome, JobPoller};
use crate::store::ArtifactStore;

use super::bundle_visuals::{self, BundleVisualsRequest};
use super::generate_visual::{self, GenerateVisualRequest};

/// Tool descriptor conforming to the MCP specification.
#[derive(Debug, Serialize)]
pub struct ToolDescriptor {
    pub name: String,
    pub description: String,
    #[serde(rename = "inputSchema")]
    pub input_schema: Value,
}

/// Central registry for all MCP tools.
pub struct ToolRegistry {
    poller: JobPoller,
    store: Arc<ArtifactStore>,
    /// Externally visible base URL for download links; relative when unset.
    download_base: Option<String>,
}

impl ToolRegistry {
    pub fn new(poller: JobPoller, store: Arc<ArtifactStore>, download_base: Option<String>) -> Self {
        Self {
            poller,
            store,
            download_base,
        }
    }

    /// List all available tools per MCP spec.
    pub fn list_tools(&self) -> Vec<ToolDescriptor> {
        vec![generate_visual::descriptor(), bundle_visuals::descriptor()]
    }

    pub fn knows(&self, name: &str) -> bool {
        matches!(name, generate_visual::TOOL_NAME | bundle_visuals::TOOL_NAME)
    }

    /// Call a tool by name with the given arguments.
    pub async fn call_tool(&self, name: &str, arguments: Option<Value>) -> ToolResult {
        match name {
            generate_visual::TOOL_NAME => self.call_generate_visual(arguments).await,
            bundle_visuals::TOOL_NAME => self.call_bundle_visuals(arguments),
            _ => ToolResult::error(format!(
                "Tool '{}' is not available. Available tools: {}, {}",
                name,
                generate_visual::TOOL_NAME,
                bundle_visuals::TOOL_NAME
            )),
        }
    }

    async fn call_generate_visual(&self, arguments: Option<Value>) -> ToolResult {
        let request = match parse_arguments::<GenerateVisualRequest>(arguments) {
            Ok(req) => req,
            Err(err) => return ToolResult::error(err),
        };
        if let Err(validation_error) = request.validate() {
            return ToolResult::error(validation_error);
        }

        let outcome = self
            .poller
            .submit_and_await(&request.content, request.visual_type.as_deref(), request.format)
            .await;

        match outcome {
            Ok(GenerationOutcome::Artifact { bytes, mime_type }) => {
                let image = ContentItem::image(&bytes, &mime_type);
                let size = bytes.len();
                let filename = format!(
                    "visual-{}.{}",
                    Utc::now().format("%Y%m%d-%H%M%S"),
                    request.format.extension()
                );
                let id = self.store.put(bytes, &mime_type, &filename);
                let link = self.download_link(&id);
                let summary = format!(
                    "Visual generated ({mime_type}, {size} bytes). Artifact id: {id}. \
                     Download (valid for one hour): {link}"
                );
                ToolResult::success(vec![image, ContentItem::text(summary)])
            }
            // The provider finished the job; report what went sideways as text.
            Ok(GenerationOutcome::Incomplete { note }) => ToolResult::success_text(note),
            Err(err) => ToolResult::error(format!("Visual generation failed: {err}")),
        }
    }

    fn call_bundle_visuals(&self, arguments: Option<Value>) -> ToolResult {
        let request = match parse_arguments::<BundleVisualsRequest>(arguments) {
            Ok(req) => req,
            Err(err) => return ToolResult::error(err),
        };

        match self.store.bundle(&request.artifact_ids) {
            Ok(bundle_id) => {
                let link = self.zip_link(&bundle_id);
                ToolResult::success_text(format!(
                    "Bundle {bundle_id} created with {} artifact(s). \
                     Download (valid for one hour): {link}",
                    request.artifact_ids.len()
                ))
            }
            Err(err) => ToolResult::error(format!("Bundling failed: {err}")),
        }
    }

    fn download_link(&self, id: &str) -> String {
        match &self.download_base {
            Some(base) => format!("{base}/download/{id}"),
            None => format!("/download/{id}"),
        }
    }

    fn zip_link(&self, bundle_id: &str) -> String {
        match &self.download_base {
            Some(base) => format!("{base}/download/zip/{bundle_id}"),
            None => format!("/download/zip/{bundle_id}"),
        }
    }
}

fn parse_arguments<T: for<'de> Deserialize<'de>>(arguments: Option<Value>) -> Result<T, String> {
    serde_json::from_value(arguments.unwrap_or(Value::Null))
        .map_err(|err| format!("Invalid arguments: {err}"))
}

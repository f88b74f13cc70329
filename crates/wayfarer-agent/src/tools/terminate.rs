//! Terminate tool: lets the model end a run explicitly.
//!
//! The agent loop watches for calls to this tool's name and returns the
//! act-phase output as soon as one is executed.

use async_trait::async_trait;
use serde_json::{json, Value as JsonValue};

use wayfarer_core::value::Arguments;

use super::base::{Tool, ToolResult};

/// Default name the agent loop treats as the stop sentinel.
pub const TERMINATE_TOOL: &str = "terminate";

pub struct TerminateTool {
    name: String,
}

impl TerminateTool {
    /// Create the tool under a custom sentinel name.
    pub fn new(name: impl Into<String>) -> Self {
        Self { name: name.into() }
    }
}

impl Default for TerminateTool {
    fn default() -> Self {
        Self::new(TERMINATE_TOOL)
    }
}

#[async_trait]
impl Tool for TerminateTool {
    fn name(&self) -> &str {
        &self.name
    }

    fn description(&self) -> &str {
        "Finish the current task. Call this once the request has been fully answered \
         or when it cannot be completed."
    }

    fn parameters(&self) -> JsonValue {
        json!({
            "type": "object",
            "properties": {
                "status": {
                    "type": "string",
                    "enum": ["success", "failure"],
                    "description": "Whether the task was completed successfully"
                }
            },
            "required": ["status"]
        })
    }

    async fn execute(&self, args: &Arguments) -> anyhow::Result<ToolResult> {
        let status = args.require_str("status")?;
        if status != "success" && status != "failure" {
            return Ok(ToolResult::error(format!(
                "Invalid status '{status}': expected 'success' or 'failure'"
            )));
        }
        Ok(ToolResult::success(format!(
            "The interaction has been completed with status: {status}"
        )))
    }
}

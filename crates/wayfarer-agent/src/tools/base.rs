//! Tool trait, the abstract interface every agent tool implements,
//! and [`ToolResult`], what a tool hands back to the agent loop.

use std::collections::BTreeMap;

use async_trait::async_trait;
use serde_json::Value as JsonValue;

use wayfarer_core::types::ToolDefinition;
use wayfarer_core::value::{Arguments, Value};

/// Content recorded for a result that carries neither output nor error.
pub const NO_OUTPUT: &str = "Tool produced no output";

// ─────────────────────────────────────────────
// ToolResult
// ─────────────────────────────────────────────

/// Outcome of executing one tool call.
///
/// Exactly one of `output` / `error` is normally set; both may be absent.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct ToolResult {
    pub output: Option<String>,
    pub error: Option<String>,
    /// Base64-encoded image payload.
    pub image: Option<String>,
    pub metadata: BTreeMap<String, Value>,
}

impl ToolResult {
    pub fn success(output: impl Into<String>) -> Self {
        ToolResult {
            output: Some(output.into()),
            ..Default::default()
        }
    }

    pub fn error(message: impl Into<String>) -> Self {
        ToolResult {
            error: Some(message.into()),
            ..Default::default()
        }
    }

    pub fn with_image(mut self, image: impl Into<String>) -> Self {
        self.image = Some(image.into());
        self
    }

    pub fn with_metadata(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.metadata.insert(key.into(), value.into());
        self
    }

    pub fn is_error(&self) -> bool {
        self.error.is_some()
    }

    /// Text the model sees: output, else error, else [`NO_OUTPUT`].
    pub fn content(&self) -> &str {
        self.output
            .as_deref()
            .or(self.error.as_deref())
            .unwrap_or(NO_OUTPUT)
    }
}

// ─────────────────────────────────────────────
// Tool trait
// ─────────────────────────────────────────────

/// Every agent tool implements this trait.
///
/// The agent loop discovers tools via `name()`, sends their schemas to the LLM
/// via `to_definition()`, and dispatches calls via `execute()`.
#[async_trait]
pub trait Tool: Send + Sync {
    /// Unique name used by the LLM to call this tool (e.g. `"hotel_search"`).
    fn name(&self) -> &str;

    /// Human-readable description shown to the LLM.
    fn description(&self) -> &str;

    /// JSON Schema describing the parameters.
    ///
    /// Must be `{"type": "object", "properties": {...}, "required": [...]}`.
    fn parameters(&self) -> JsonValue;

    /// Execute the tool with the given arguments.
    ///
    /// Argument problems and domain failures may be returned either as
    /// `Ok(ToolResult::error(..))` or as `Err`; the registry converts an
    /// `Err` into an error-carrying result so the model can react to it.
    async fn execute(&self, args: &Arguments) -> anyhow::Result<ToolResult>;

    /// Build the `ToolDefinition` sent to the LLM.
    fn to_definition(&self) -> ToolDefinition {
        ToolDefinition::new(self.name(), self.description(), self.parameters())
    }
}

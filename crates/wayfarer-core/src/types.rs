//! Core types for Wayfarer: conversation messages, tool calls, and model responses.
//!
//! These are the provider-independent shapes the agent loop and memory work
//! with. The OpenAI-compatible wire format lives in `wayfarer-providers`.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::value::Arguments;

// ─────────────────────────────────────────────
// Messages
// ─────────────────────────────────────────────

/// Who authored a message.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    System,
    User,
    Assistant,
    Tool,
}

impl Role {
    pub fn as_str(&self) -> &'static str {
        match self {
            Role::System => "system",
            Role::User => "user",
            Role::Assistant => "assistant",
            Role::Tool => "tool",
        }
    }
}

impl std::fmt::Display for Role {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One entry in an agent's conversation history.
///
/// `content` may be empty when a tool result only carries an image, or when
/// an assistant turn consisted solely of tool calls.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct Message {
    pub role: Role,
    #[serde(default)]
    pub content: String,
    /// Links a tool-role message to the call that produced it.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub tool_call_id: Option<String>,
    /// Tool name for tool-role messages.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Base64-encoded image payload.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub image: Option<String>,
    /// Calls requested by an assistant turn.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub tool_calls: Vec<ToolCall>,
    #[serde(default = "Utc::now")]
    pub timestamp: DateTime<Utc>,
}

impl Message {
    fn with_role(role: Role, content: impl Into<String>) -> Self {
        Message {
            role,
            content: content.into(),
            tool_call_id: None,
            name: None,
            image: None,
            tool_calls: Vec::new(),
            timestamp: Utc::now(),
        }
    }

    pub fn system(content: impl Into<String>) -> Self {
        Self::with_role(Role::System, content)
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::with_role(Role::User, content)
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::with_role(Role::Assistant, content)
    }

    /// Assistant turn that requested tool calls (content may be empty).
    pub fn assistant_with_tools(content: impl Into<String>, tool_calls: Vec<ToolCall>) -> Self {
        Message {
            tool_calls,
            ..Self::with_role(Role::Assistant, content)
        }
    }

    /// Result of executing one tool call.
    pub fn tool_result(
        tool_call_id: impl Into<String>,
        name: impl Into<String>,
        content: impl Into<String>,
        image: Option<String>,
    ) -> Self {
        Message {
            tool_call_id: Some(tool_call_id.into()),
            name: Some(name.into()),
            image,
            ..Self::with_role(Role::Tool, content)
        }
    }

    pub fn is_system(&self) -> bool {
        self.role == Role::System
    }
}

// ─────────────────────────────────────────────
// Tool calls
// ─────────────────────────────────────────────

/// A request from the model to invoke a tool.
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
pub struct ToolCall {
    /// Opaque id used to match the result back to the request.
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub arguments: Arguments,
}

impl ToolCall {
    pub fn new(id: impl Into<String>, name: impl Into<String>, arguments: Arguments) -> Self {
        ToolCall {
            id: id.into(),
            name: name.into(),
            arguments,
        }
    }
}

/// How the model may pick tools on a request.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ToolChoice {
    None,
    #[default]
    Auto,
    Required,
}

impl ToolChoice {
    pub fn as_str(&self) -> &'static str {
        match self {
            ToolChoice::None => "none",
            ToolChoice::Auto => "auto",
            ToolChoice::Required => "required",
        }
    }
}

// ─────────────────────────────────────────────
// Tool definitions (sent to the model)
// ─────────────────────────────────────────────

/// Definition of a tool, sent to the LLM so it knows what tools are available.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct ToolDefinition {
    /// Always "function".
    #[serde(rename = "type")]
    pub tool_type: String,
    pub function: FunctionDefinition,
}

/// Schema of a function tool.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct FunctionDefinition {
    pub name: String,
    pub description: String,
    pub parameters: serde_json::Value,
}

impl ToolDefinition {
    pub fn new(
        name: impl Into<String>,
        description: impl Into<String>,
        parameters: serde_json::Value,
    ) -> Self {
        ToolDefinition {
            tool_type: "function".to_string(),
            function: FunctionDefinition {
                name: name.into(),
                description: description.into(),
                parameters,
            },
        }
    }
}

// ─────────────────────────────────────────────
// LLM Response
// ─────────────────────────────────────────────

/// What the think phase gets back from the model.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct LlmResponse {
    /// Text content (None if only tool calls).
    pub content: Option<String>,
    pub tool_calls: Vec<ToolCall>,
    pub finish_reason: Option<String>,
    pub usage: Option<UsageInfo>,
}

impl LlmResponse {
    /// A plain text answer with no tool calls.
    pub fn text(content: impl Into<String>) -> Self {
        LlmResponse {
            content: Some(content.into()),
            ..Default::default()
        }
    }

    /// A response consisting only of tool calls.
    pub fn tools(tool_calls: Vec<ToolCall>) -> Self {
        LlmResponse {
            tool_calls,
            ..Default::default()
        }
    }

    pub fn has_tool_calls(&self) -> bool {
        !self.tool_calls.is_empty()
    }

    /// Content, treating an empty string the same as absent.
    pub fn non_empty_content(&self) -> Option<&str> {
        self.content.as_deref().filter(|c| !c.trim().is_empty())
    }
}

/// Token usage statistics from the LLM.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct UsageInfo {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub total_tokens: u32,
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_role_serialization() {
        assert_eq!(serde_json::to_value(Role::Assistant).unwrap(), json!("assistant"));
        let role: Role = serde_json::from_value(json!("tool")).unwrap();
        assert_eq!(role, Role::Tool);
        assert_eq!(Role::System.to_string(), "system");
    }

    #[test]
    fn test_user_message_skips_empty_fields() {
        let msg = Message::user("Plan a trip");
        let json = serde_json::to_value(&msg).unwrap();

        assert_eq!(json["role"], "user");
        assert_eq!(json["content"], "Plan a trip");
        assert!(json.get("tool_call_id").is_none());
        assert!(json.get("name").is_none());
        assert!(json.get("image").is_none());
        assert!(json.get("tool_calls").is_none());
        assert!(json.get("timestamp").is_some());
    }

    #[test]
    fn test_tool_result_message() {
        let msg = Message::tool_result("call_1", "calculator", "42", None);
        assert_eq!(msg.role, Role::Tool);
        assert_eq!(msg.tool_call_id.as_deref(), Some("call_1"));
        assert_eq!(msg.name.as_deref(), Some("calculator"));
        assert_eq!(msg.content, "42");
    }

    #[test]
    fn test_assistant_with_tools() {
        let call = ToolCall::new("c1", "terminate", Arguments::new().with("status", "success"));
        let msg = Message::assistant_with_tools("", vec![call.clone()]);
        assert_eq!(msg.role, Role::Assistant);
        assert!(msg.content.is_empty());
        assert_eq!(msg.tool_calls, vec![call]);
    }

    #[test]
    fn test_message_round_trip() {
        let messages = vec![
            Message::system("You are Wayfarer."),
            Message::user("What is 2+2?"),
            Message::assistant("4"),
            Message::tool_result("call_1", "calculator", "4", Some("aGk=".into())),
        ];

        let raw = serde_json::to_string(&messages).unwrap();
        let back: Vec<Message> = serde_json::from_str(&raw).unwrap();
        assert_eq!(messages, back);
    }

    #[test]
    fn test_tool_choice_strings() {
        assert_eq!(ToolChoice::default(), ToolChoice::Auto);
        assert_eq!(ToolChoice::None.as_str(), "none");
        assert_eq!(ToolChoice::Required.as_str(), "required");
        assert_eq!(serde_json::to_value(ToolChoice::Auto).unwrap(), json!("auto"));
    }

    #[test]
    fn test_tool_definition_serialization() {
        let def = ToolDefinition::new(
            "calculator",
            "Evaluate arithmetic",
            json!({"type": "object", "properties": {"expression": {"type": "string"}}}),
        );
        let json = serde_json::to_value(&def).unwrap();
        assert_eq!(json["type"], "function");
        assert_eq!(json["function"]["name"], "calculator");
        assert_eq!(json["function"]["parameters"]["type"], "object");
    }

    #[test]
    fn test_llm_response_helpers() {
        let resp = LlmResponse::text("done");
        assert!(!resp.has_tool_calls());
        assert_eq!(resp.non_empty_content(), Some("done"));

        let blank = LlmResponse::text("   ");
        assert_eq!(blank.non_empty_content(), None);

        let calls = LlmResponse::tools(vec![ToolCall::new("1", "x", Arguments::new())]);
        assert!(calls.has_tool_calls());
        assert!(calls.content.is_none());
    }
}

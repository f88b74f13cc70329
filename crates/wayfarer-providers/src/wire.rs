//! OpenAI-compatible `/chat/completions` wire format.
//!
//! Converts between the provider-independent [`Message`] / [`LlmResponse`]
//! types and the JSON shapes the endpoint speaks. Tool-call arguments travel
//! as JSON-encoded strings and are decoded into [`Arguments`] here; a string
//! that is not a JSON object is a [`ProviderError::MalformedToolCall`].

use serde::{Deserialize, Serialize};

use wayfarer_core::error::ProviderError;
use wayfarer_core::types::{LlmResponse, Message, Role, ToolCall, ToolChoice, ToolDefinition, UsageInfo};
use wayfarer_core::value::Arguments;

// ─────────────────────────────────────────────
// Request
// ─────────────────────────────────────────────

/// Request body for an OpenAI-compatible chat completion API.
#[derive(Debug, Serialize)]
pub struct ChatCompletionRequest {
    pub model: String,
    pub messages: Vec<WireMessage>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tools: Option<Vec<ToolDefinition>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tool_choice: Option<ToolChoice>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub max_tokens: Option<u32>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub temperature: Option<f64>,
}

impl ChatCompletionRequest {
    /// Build a request; `tools` and `tool_choice` are omitted when no tools are offered.
    pub fn new(model: &str, messages: &[Message], tools: &[ToolDefinition], tool_choice: ToolChoice) -> Self {
        let (tools, tool_choice) = if tools.is_empty() {
            (None, None)
        } else {
            (Some(tools.to_vec()), Some(tool_choice))
        };
        ChatCompletionRequest {
            model: model.to_string(),
            messages: messages.iter().map(WireMessage::from).collect(),
            tools,
            tool_choice,
            max_tokens: None,
            temperature: None,
        }
    }
}

/// One message as the endpoint expects it.
#[derive(Debug, Serialize, PartialEq)]
pub struct WireMessage {
    pub role: Role,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub content: Option<MessageContent>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tool_calls: Option<Vec<WireToolCall>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub tool_call_id: Option<String>,
}

/// Either plain text or multipart (text + image) content.
#[derive(Debug, Serialize, PartialEq)]
#[serde(untagged)]
pub enum MessageContent {
    Text(String),
    Parts(Vec<ContentPart>),
}

/// A single part of a multipart message.
#[derive(Debug, Serialize, PartialEq)]
#[serde(tag = "type")]
pub enum ContentPart {
    #[serde(rename = "text")]
    Text { text: String },
    #[serde(rename = "image_url")]
    ImageUrl { image_url: ImageUrl },
}

#[derive(Debug, Serialize, PartialEq)]
pub struct ImageUrl {
    pub url: String,
}

impl From<&Message> for WireMessage {
    fn from(msg: &Message) -> Self {
        // Only user turns may carry images; tool results are sent as text.
        let content = match (&msg.image, msg.role) {
            (Some(image), Role::User) => Some(MessageContent::Parts(vec![
                ContentPart::Text {
                    text: msg.content.clone(),
                },
                ContentPart::ImageUrl {
                    image_url: ImageUrl {
                        url: format!("data:image/png;base64,{image}"),
                    },
                },
            ])),
            _ if msg.role == Role::Assistant && msg.content.is_empty() && !msg.tool_calls.is_empty() => None,
            _ => Some(MessageContent::Text(msg.content.clone())),
        };

        let tool_calls = if msg.tool_calls.is_empty() {
            None
        } else {
            Some(msg.tool_calls.iter().map(WireToolCall::from).collect())
        };

        WireMessage {
            role: msg.role,
            content,
            tool_calls,
            tool_call_id: msg.tool_call_id.clone(),
        }
    }
}

// ─────────────────────────────────────────────
// Tool calls
// ─────────────────────────────────────────────

/// A tool call as it appears on the wire.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct WireToolCall {
    pub id: String,
    #[serde(rename = "type", default = "function_type")]
    pub call_type: String,
    pub function: FunctionCall,
}

/// The function name and JSON-encoded arguments within a tool call.
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq)]
pub struct FunctionCall {
    pub name: String,
    #[serde(default)]
    pub arguments: String,
}

fn function_type() -> String {
    "function".to_string()
}

impl From<&ToolCall> for WireToolCall {
    fn from(call: &ToolCall) -> Self {
        WireToolCall {
            id: call.id.clone(),
            call_type: function_type(),
            function: FunctionCall {
                name: call.name.clone(),
                arguments: call.arguments.to_json(),
            },
        }
    }
}

impl TryFrom<WireToolCall> for ToolCall {
    type Error = ProviderError;

    fn try_from(call: WireToolCall) -> Result<Self, Self::Error> {
        let arguments = Arguments::from_json(&call.function.arguments).map_err(|e| {
            ProviderError::MalformedToolCall {
                name: call.function.name.clone(),
                reason: e.to_string(),
            }
        })?;
        Ok(ToolCall::new(call.id, call.function.name, arguments))
    }
}

// ─────────────────────────────────────────────
// Response
// ─────────────────────────────────────────────

/// Raw chat completion response from an OpenAI-compatible API.
#[derive(Debug, Deserialize)]
pub struct ChatCompletionResponse {
    pub id: Option<String>,
    pub choices: Vec<ChatChoice>,
    pub usage: Option<UsageInfo>,
}

/// A single choice in a chat completion response.
#[derive(Debug, Deserialize)]
pub struct ChatChoice {
    pub message: AssistantMessage,
    pub finish_reason: Option<String>,
}

/// The assistant message within a chat completion choice.
#[derive(Debug, Deserialize)]
pub struct AssistantMessage {
    pub content: Option<String>,
    #[serde(default)]
    pub tool_calls: Option<Vec<WireToolCall>>,
}

impl TryFrom<ChatCompletionResponse> for LlmResponse {
    type Error = ProviderError;

    fn try_from(resp: ChatCompletionResponse) -> Result<Self, Self::Error> {
        let choice = resp
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| ProviderError::Decode("no choices in response".into()))?;

        let tool_calls = choice
            .message
            .tool_calls
            .unwrap_or_default()
            .into_iter()
            .map(ToolCall::try_from)
            .collect::<Result<Vec<_>, _>>()?;

        Ok(LlmResponse {
            content: choice.message.content,
            tool_calls,
            finish_reason: choice.finish_reason,
            usage: resp.usage,
        })
    }
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────

//! LLM Provider trait: what the think phase talks to.

use async_trait::async_trait;
use wayfarer_core::error::ProviderError;
use wayfarer_core::types::{LlmResponse, Message, ToolChoice, ToolDefinition};

/// Sampling settings passed with each request.
#[derive(Clone, Debug)]
pub struct LlmRequestConfig {
    /// Maximum tokens to generate.
    pub max_tokens: u32,
    /// Sampling temperature (0.0 – 2.0).
    pub temperature: f64,
}

impl Default for LlmRequestConfig {
    fn default() -> Self {
        Self {
            max_tokens: 4096,
            temperature: 0.7,
        }
    }
}

/// Trait that all LLM providers must implement.
///
/// Transport failures are returned as `Err`, never folded into the
/// response text: a failed think phase has no safe continuation.
#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// Send the transcript plus the available tools and get the model's turn.
    ///
    /// # Arguments
    /// * `messages`   : Full conversation so far.
    /// * `tools`      : Tool schemas the model may call (may be empty).
    /// * `tool_choice`: Whether the model may, must, or must not call tools.
    async fn ask_tool(
        &self,
        messages: &[Message],
        tools: &[ToolDefinition],
        tool_choice: ToolChoice,
    ) -> Result<LlmResponse, ProviderError>;

    /// The model this provider sends requests to.
    fn default_model(&self) -> &str;

    /// Display name for logging.
    fn display_name(&self) -> &str;
}

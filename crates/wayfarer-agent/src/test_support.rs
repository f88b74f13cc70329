//! Scripted provider shared by the agent and flow tests.

use std::sync::Mutex;

use async_trait::async_trait;

use wayfarer_core::error::ProviderError;
use wayfarer_core::types::{LlmResponse, Message, ToolCall, ToolChoice, ToolDefinition};
use wayfarer_core::value::Arguments;
use wayfarer_providers::LlmProvider;

/// Returns canned responses in order and records every request.
pub struct MockProvider {
    responses: Mutex<Vec<Result<LlmResponse, ProviderError>>>,
    pub requests: Mutex<Vec<(Vec<Message>, Vec<String>, ToolChoice)>>,
}

impl MockProvider {
    pub fn new(responses: Vec<LlmResponse>) -> Self {
        Self::scripted(responses.into_iter().map(Ok).collect())
    }

    pub fn scripted(responses: Vec<Result<LlmResponse, ProviderError>>) -> Self {
        Self {
            responses: Mutex::new(responses),
            requests: Mutex::new(Vec::new()),
        }
    }

    pub fn call_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }
}

#[async_trait]
impl LlmProvider for MockProvider {
    async fn ask_tool(
        &self,
        messages: &[Message],
        tools: &[ToolDefinition],
        tool_choice: ToolChoice,
    ) -> Result<LlmResponse, ProviderError> {
        self.requests.lock().unwrap().push((
            messages.to_vec(),
            tools.iter().map(|t| t.function.name.clone()).collect(),
            tool_choice,
        ));
        let mut responses = self.responses.lock().unwrap();
        if responses.is_empty() {
            Ok(LlmResponse::text("(no more responses)"))
        } else {
            responses.remove(0)
        }
    }

    fn default_model(&self) -> &str {
        "mock-model"
    }

    fn display_name(&self) -> &str {
        "MockProvider"
    }
}

/// Shorthand for a single tool call.
pub fn call(id: &str, name: &str, args: Arguments) -> ToolCall {
    ToolCall::new(id, name, args)
}

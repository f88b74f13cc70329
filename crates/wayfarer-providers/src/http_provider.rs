//! Generic HTTP-based LLM provider for OpenAI-compatible APIs.
//!
//! Talks directly to any `/chat/completions` endpoint (OpenAI, DeepSeek,
//! OpenRouter, vLLM, a local proxy, ...) via `reqwest`.

use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderName, HeaderValue};
use tracing::{debug, error, warn};

use wayfarer_core::config::ProviderConfig;
use wayfarer_core::error::ProviderError;
use wayfarer_core::types::{LlmResponse, Message, ToolChoice, ToolDefinition};

use crate::traits::{LlmProvider, LlmRequestConfig};
use crate::wire::{ChatCompletionRequest, ChatCompletionResponse};

/// Endpoint used when the config does not set `apiBase`.
const DEFAULT_API_BASE: &str = "https://api.openai.com/v1";

/// Per-request timeout.
const REQUEST_TIMEOUT: Duration = Duration::from_secs(120);

// ─────────────────────────────────────────────
// HttpProvider
// ─────────────────────────────────────────────

/// A provider that talks to any OpenAI-compatible HTTP API.
pub struct HttpProvider {
    /// HTTP client (shared, connection-pooled).
    client: reqwest::Client,
    /// API base URL (e.g. `"https://api.openai.com/v1"`).
    api_base: String,
    /// API key for Bearer authentication.
    api_key: String,
    /// Model sent with every request.
    model: String,
    /// Temperature and max_tokens.
    request_config: LlmRequestConfig,
    /// Extra headers to send with each request.
    extra_headers: HeaderMap,
}

impl std::fmt::Debug for HttpProvider {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("HttpProvider")
            .field("api_base", &self.api_base)
            .field("model", &self.model)
            .finish()
    }
}

impl HttpProvider {
    /// Create a new provider.
    ///
    /// # Arguments
    /// * `config`        : API key, base URL and extra headers
    /// * `model`         : Model identifier sent with every request
    /// * `request_config`: Temperature and max_tokens
    pub fn new(
        config: &ProviderConfig,
        model: &str,
        request_config: LlmRequestConfig,
    ) -> Result<Self, ProviderError> {
        let api_base = config
            .api_base
            .clone()
            .unwrap_or_else(|| DEFAULT_API_BASE.to_string());

        let mut extra_headers = HeaderMap::new();
        if let Some(ref headers) = config.extra_headers {
            for (key, value) in headers {
                if let (Ok(name), Ok(val)) = (
                    HeaderName::from_bytes(key.as_bytes()),
                    HeaderValue::from_str(value),
                ) {
                    extra_headers.insert(name, val);
                } else {
                    warn!("Invalid header: {}={}", key, value);
                }
            }
        }

        let client = reqwest::Client::builder()
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| ProviderError::Http {
                url: api_base.clone(),
                message: e.to_string(),
            })?;

        Ok(HttpProvider {
            client,
            api_base,
            api_key: config.api_key.clone(),
            model: model.to_string(),
            request_config,
            extra_headers,
        })
    }

    /// Build the full chat completions URL.
    fn completions_url(&self) -> String {
        let base = self.api_base.trim_end_matches('/');
        format!("{}/chat/completions", base)
    }
}

#[async_trait]
impl LlmProvider for HttpProvider {
    async fn ask_tool(
        &self,
        messages: &[Message],
        tools: &[ToolDefinition],
        tool_choice: ToolChoice,
    ) -> Result<LlmResponse, ProviderError> {
        debug!(
            model = %self.model,
            messages = messages.len(),
            tools = tools.len(),
            tool_choice = tool_choice.as_str(),
            "Calling LLM"
        );

        let mut request_body = ChatCompletionRequest::new(&self.model, messages, tools, tool_choice);
        request_body.max_tokens = Some(self.request_config.max_tokens);
        request_body.temperature = Some(self.request_config.temperature);

        let url = self.completions_url();

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .headers(self.extra_headers.clone())
            .json(&request_body)
            .send()
            .await
            .map_err(|e| {
                error!(error = %e, "HTTP request failed");
                ProviderError::Http {
                    url: url.clone(),
                    message: e.to_string(),
                }
            })?;

        let status = response.status();
        if !status.is_success() {
            let body = response
                .text()
                .await
                .unwrap_or_else(|_| "Failed to read error body".to_string());
            error!(status = %status, body = %body, "API error");
            return Err(ProviderError::Status {
                status: status.as_u16(),
                body,
            });
        }

        let chat_resp = response
            .json::<ChatCompletionResponse>()
            .await
            .map_err(|e| {
                error!(error = %e, "Failed to parse LLM response");
                ProviderError::Decode(e.to_string())
            })?;

        let llm_resp = LlmResponse::try_from(chat_resp)?;
        debug!(
            has_content = llm_resp.content.is_some(),
            tool_calls = llm_resp.tool_calls.len(),
            finish_reason = llm_resp.finish_reason.as_deref().unwrap_or("?"),
            "LLM response received"
        );
        Ok(llm_resp)
    }

    fn default_model(&self) -> &str {
        &self.model
    }

    fn display_name(&self) -> &str {
        "OpenAI-compatible"
    }
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use wiremock::matchers::{body_partial_json, header, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn make_config(api_key: &str, api_base: Option<&str>) -> ProviderConfig {
        ProviderConfig {
            api_key: api_key.to_string(),
            api_base: api_base.map(String::from),
            extra_headers: None,
        }
    }

    fn make_provider(api_key: &str, api_base: Option<&str>) -> HttpProvider {
        HttpProvider::new(&make_config(api_key, api_base), "gpt-4o", LlmRequestConfig::default()).unwrap()
    }

    // ── Unit tests ──

    #[test]
    fn test_completions_url_trailing_slash() {
        let provider = make_provider("key", Some("https://api.openai.com/v1/"));
        assert_eq!(
            provider.completions_url(),
            "https://api.openai.com/v1/chat/completions"
        );
    }

    #[test]
    fn test_default_api_base() {
        let provider = make_provider("key", None);
        assert_eq!(provider.api_base, DEFAULT_API_BASE);
        assert_eq!(provider.default_model(), "gpt-4o");
    }

    #[test]
    fn test_extra_headers() {
        let mut headers = HashMap::new();
        headers.insert("X-App-Code".to_string(), "wayfarer".to_string());
        let config = ProviderConfig {
            api_key: "key".to_string(),
            api_base: None,
            extra_headers: Some(headers),
        };
        let provider = HttpProvider::new(&config, "gpt-4o", LlmRequestConfig::default()).unwrap();
        assert!(provider.extra_headers.contains_key("x-app-code"));
    }

    // ── Integration tests with mock server ──

    #[tokio::test]
    async fn test_ask_tool_text_answer() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .and(header("Authorization", "Bearer test-key-123"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "id": "chatcmpl-test",
                "choices": [{
                    "message": { "content": "done", "tool_calls": null },
                    "finish_reason": "stop"
                }],
                "usage": { "prompt_tokens": 10, "completion_tokens": 1, "total_tokens": 11 }
            })))
            .mount(&mock_server)
            .await;

        let provider = make_provider("test-key-123", Some(&mock_server.uri()));
        let messages = vec![Message::system("You are Wayfarer."), Message::user("Hello")];

        let resp = provider.ask_tool(&messages, &[], ToolChoice::Auto).await.unwrap();

        assert_eq!(resp.content.as_deref(), Some("done"));
        assert!(!resp.has_tool_calls());
        assert_eq!(resp.usage.as_ref().unwrap().total_tokens, 11);
    }

    #[tokio::test]
    async fn test_ask_tool_with_tool_calls() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .and(body_partial_json(serde_json::json!({ "tool_choice": "auto" })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "id": "chatcmpl-tools",
                "choices": [{
                    "message": {
                        "content": null,
                        "tool_calls": [{
                            "id": "call_abc123",
                            "type": "function",
                            "function": {
                                "name": "hotel_search",
                                "arguments": "{\"city\": \"Hangzhou\"}"
                            }
                        }]
                    },
                    "finish_reason": "tool_calls"
                }],
                "usage": null
            })))
            .mount(&mock_server)
            .await;

        let provider = make_provider("key", Some(&mock_server.uri()));
        let tool_def = ToolDefinition::new(
            "hotel_search",
            "Search hotels",
            serde_json::json!({"type": "object", "properties": {"city": {"type": "string"}}}),
        );

        let resp = provider
            .ask_tool(&[Message::user("Find a hotel")], &[tool_def], ToolChoice::Auto)
            .await
            .unwrap();

        assert!(resp.content.is_none());
        assert_eq!(resp.tool_calls.len(), 1);
        assert_eq!(resp.tool_calls[0].id, "call_abc123");
        assert_eq!(resp.tool_calls[0].name, "hotel_search");
        assert_eq!(resp.tool_calls[0].arguments.require_str("city").unwrap(), "Hangzhou");
    }

    #[tokio::test]
    async fn test_ask_tool_api_error_propagates() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(ResponseTemplate::new(429).set_body_string("Rate limit exceeded"))
            .mount(&mock_server)
            .await;

        let provider = make_provider("key", Some(&mock_server.uri()));
        let err = provider
            .ask_tool(&[Message::user("Hello")], &[], ToolChoice::Auto)
            .await
            .unwrap_err();

        match err {
            ProviderError::Status { status, body } => {
                assert_eq!(status, 429);
                assert!(body.contains("Rate limit"));
            }
            other => panic!("expected status error, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_ask_tool_network_error() {
        let provider = make_provider("key", Some("http://127.0.0.1:1"));
        let err = provider
            .ask_tool(&[Message::user("Hello")], &[], ToolChoice::Auto)
            .await
            .unwrap_err();
        assert!(matches!(err, ProviderError::Http { .. }));
    }

    #[tokio::test]
    async fn test_ask_tool_undecodable_body() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .respond_with(ResponseTemplate::new(200).set_body_string("<html>oops</html>"))
            .mount(&mock_server)
            .await;

        let provider = make_provider("key", Some(&mock_server.uri()));
        let err = provider
            .ask_tool(&[Message::user("Hello")], &[], ToolChoice::Auto)
            .await
            .unwrap_err();
        assert!(matches!(err, ProviderError::Decode(_)));
    }

    #[tokio::test]
    async fn test_ask_tool_sends_sampling_settings() {
        let mock_server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .and(body_partial_json(serde_json::json!({
                "model": "deepseek-chat",
                "max_tokens": 512,
                "temperature": 0.2
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "id": "chatcmpl-body",
                "choices": [{ "message": { "content": "ok" }, "finish_reason": "stop" }],
                "usage": null
            })))
            .mount(&mock_server)
            .await;

        let config = make_config("ds-key", Some(&mock_server.uri()));
        let provider = HttpProvider::new(
            &config,
            "deepseek-chat",
            LlmRequestConfig {
                max_tokens: 512,
                temperature: 0.2,
            },
        )
        .unwrap();

        // If the body matcher fails, wiremock returns 404 → Status error
        let resp = provider
            .ask_tool(&[Message::user("test")], &[], ToolChoice::None)
            .await
            .unwrap();
        assert_eq!(resp.content.as_deref(), Some("ok"));
    }
}

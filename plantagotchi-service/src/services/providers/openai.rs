//! OpenAI chat-completions provider.
//!
//! Forced function calls are sent as `tools` + `tool_choice`; replies are
//! read from `tool_calls`, the legacy `function_call` field, or plain content.

use super::{ChatProvider, ChatRequest, Completion, ProviderError};
use async_trait::async_trait;
use reqwest::Client;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// OpenAI provider configuration.
#[derive(Debug, Clone)]
pub struct OpenAiSettings {
    pub api_key: String,
    pub base_url: String,
    pub model: String,
    pub timeout: Duration,
}

/// OpenAI chat provider.
pub struct OpenAiChatProvider {
    settings: OpenAiSettings,
    client: Client,
}

impl OpenAiChatProvider {
    pub fn new(settings: OpenAiSettings) -> Result<Self, ProviderError> {
        let client = Client::builder()
            .timeout(settings.timeout)
            .build()
            .map_err(|e| ProviderError::NotConfigured(format!("HTTP client: {}", e)))?;

        Ok(Self { settings, client })
    }

    fn completions_url(&self) -> String {
        format!(
            "{}/chat/completions",
            self.settings.base_url.trim_end_matches('/')
        )
    }

    fn build_body<'a>(&'a self, request: &'a ChatRequest) -> ChatCompletionRequest<'a> {
        let (tools, tool_choice) = match &request.function {
            Some(function) => (
                Some(vec![Tool {
                    kind: "function",
                    function: ToolFunction {
                        name: function.name,
                        description: function.description,
                        parameters: &function.parameters,
                    },
                }]),
                Some(ToolChoice {
                    kind: "function",
                    function: ToolChoiceFunction {
                        name: function.name,
                    },
                }),
            ),
            None => (None, None),
        };

        ChatCompletionRequest {
            model: &self.settings.model,
            messages: vec![
                Message {
                    role: "system",
                    content: &request.system,
                },
                Message {
                    role: "user",
                    content: &request.user,
                },
            ],
            temperature: request.temperature,
            max_tokens: request.max_tokens,
            tools,
            tool_choice,
        }
    }
}

#[async_trait]
impl ChatProvider for OpenAiChatProvider {
    async fn complete(&self, request: &ChatRequest) -> Result<Completion, ProviderError> {
        let body = self.build_body(request);

        tracing::debug!(
            model = %self.settings.model,
            prompt_len = request.user.len(),
            function = ?request.function.as_ref().map(|f| f.name),
            "Sending request to OpenAI API"
        );

        let response = self
            .client
            .post(self.completions_url())
            .bearer_auth(&self.settings.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| ProviderError::NetworkError(e.to_string()))?;

        if !response.status().is_success() {
            let status = response.status();
            let error_text = response.text().await.unwrap_or_default();

            if status.as_u16() == 429 {
                return Err(ProviderError::RateLimited);
            }

            return Err(ProviderError::ApiError(format!(
                "OpenAI API error {}: {}",
                status, error_text
            )));
        }

        let api_response: ChatCompletionResponse = response
            .json()
            .await
            .map_err(|e| {
                ProviderError::InvalidResponse(format!("Failed to parse response: {}", e))
            })?;

        let message = api_response
            .choices
            .into_iter()
            .next()
            .map(|choice| choice.message)
            .ok_or_else(|| ProviderError::InvalidResponse("response has no choices".to_string()))?;

        if let Some(usage) = &api_response.usage {
            tracing::debug!(
                input_tokens = usage.prompt_tokens,
                output_tokens = usage.completion_tokens,
                "OpenAI usage"
            );
        }

        message.into_completion()
    }

    async fn health_check(&self) -> Result<(), ProviderError> {
        if self.settings.api_key.trim().is_empty() {
            return Err(ProviderError::NotConfigured(
                "OpenAI API key not configured".to_string(),
            ));
        }
        Ok(())
    }
}

// ============================================================================
// OpenAI API Request/Response Types
// ============================================================================

#[derive(Debug, Serialize)]
struct ChatCompletionRequest<'a> {
    model: &'a str,
    messages: Vec<Message<'a>>,
    temperature: f32,
    max_tokens: u32,
    #[serde(skip_serializing_if = "Option::is_none")]
    tools: Option<Vec<Tool<'a>>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tool_choice: Option<ToolChoice<'a>>,
}

#[derive(Debug, Serialize)]
struct Message<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Debug, Serialize)]
struct Tool<'a> {
    #[serde(rename = "type")]
    kind: &'static str,
    function: ToolFunction<'a>,
}

#[derive(Debug, Serialize)]
struct ToolFunction<'a> {
    name: &'a str,
    description: &'a str,
    parameters: &'a serde_json::Value,
}

#[derive(Debug, Serialize)]
struct ToolChoice<'a> {
    #[serde(rename = "type")]
    kind: &'static str,
    function: ToolChoiceFunction<'a>,
}

#[derive(Debug, Serialize)]
struct ToolChoiceFunction<'a> {
    name: &'a str,
}

#[derive(Debug, Deserialize)]
struct ChatCompletionResponse {
    #[serde(default)]
    choices: Vec<Choice>,
    #[serde(default)]
    usage: Option<Usage>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    #[serde(default)]
    content: Option<String>,
    #[serde(default)]
    tool_calls: Option<Vec<ToolCall>>,
    #[serde(default)]
    function_call: Option<FunctionCall>,
}

impl ResponseMessage {
    /// A message with neither a function call nor content is not an answer.
    fn into_completion(self) -> Result<Completion, ProviderError> {
        let call = self
            .tool_calls
            .and_then(|calls| calls.into_iter().next())
            .map(|call| call.function)
            .or(self.function_call);

        match (call, self.content) {
            (Some(FunctionCall { name, arguments }), _) => {
                Ok(Completion::Structured { name, arguments })
            }
            (None, Some(content)) => Ok(Completion::Text(content)),
            (None, None) => Err(ProviderError::InvalidResponse(
                "message has neither content nor a function call".to_string(),
            )),
        }
    }
}

#[derive(Debug, Deserialize)]
struct ToolCall {
    function: FunctionCall,
}

#[derive(Debug, Deserialize)]
struct FunctionCall {
    name: String,
    #[serde(default)]
    arguments: String,
}

#[derive(Debug, Deserialize, Default)]
#[serde(default)]
struct Usage {
    prompt_tokens: u32,
    completion_tokens: u32,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::services::providers::FunctionSpec;
    use serde_json::json;
    use wiremock::matchers::{bearer_token, body_partial_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn provider(base_url: &str) -> OpenAiChatProvider {
        OpenAiChatProvider::new(OpenAiSettings {
            api_key: "sk-test".to_string(),
            base_url: base_url.to_string(),
            model: "gpt-4o-mini".to_string(),
            timeout: Duration::from_secs(5),
        })
        .unwrap()
    }

    fn text_request() -> ChatRequest {
        ChatRequest {
            system: "answer sí or no".to_string(),
            user: "¿Cómo poda un rosal?".to_string(),
            temperature: 0.0,
            max_tokens: 2,
            function: None,
        }
    }

    #[tokio::test]
    async fn test_text_completion() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .and(bearer_token("sk-test"))
            .and(body_partial_json(json!({
                "model": "gpt-4o-mini",
                "max_tokens": 2,
                "messages": [
                    {"role": "system", "content": "answer sí or no"},
                    {"role": "user", "content": "¿Cómo poda un rosal?"}
                ]
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "choices": [{"message": {"role": "assistant", "content": "Sí"}}],
                "usage": {"prompt_tokens": 40, "completion_tokens": 1, "total_tokens": 41}
            })))
            .mount(&server)
            .await;

        let completion = provider(&server.uri()).complete(&text_request()).await.unwrap();
        assert_eq!(completion, Completion::Text("Sí".to_string()));
    }

    #[tokio::test]
    async fn test_tool_call_completion() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/chat/completions"))
            .and(body_partial_json(json!({
                "tool_choice": {"type": "function", "function": {"name": "get_species_info"}}
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "choices": [{"message": {
                    "role": "assistant",
                    "content": null,
                    "tool_calls": [{
                        "id": "call_1",
                        "type": "function",
                        "function": {
                            "name": "get_species_info",
                            "arguments": "{\"humedad_tierra\":30,\"humedad_ambiente\":70,\"tipo\":\"exterior\"}"
                        }
                    }]
                }}]
            })))
            .mount(&server)
            .await;

        let mut request = text_request();
        request.function = Some(FunctionSpec {
            name: "get_species_info",
            description: "species info",
            parameters: json!({"type": "object"}),
        });

        let completion = provider(&server.uri()).complete(&request).await.unwrap();
        assert_eq!(
            completion,
            Completion::Structured {
                name: "get_species_info".to_string(),
                arguments: r#"{"humedad_tierra":30,"humedad_ambiente":70,"tipo":"exterior"}"#
                    .to_string(),
            }
        );
    }

    #[tokio::test]
    async fn test_legacy_function_call_completion() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "choices": [{"message": {
                    "content": null,
                    "function_call": {"name": "get_species_info", "arguments": "{}"}
                }}]
            })))
            .mount(&server)
            .await;

        let completion = provider(&server.uri()).complete(&text_request()).await.unwrap();
        assert!(matches!(
            completion,
            Completion::Structured { ref arguments, .. } if arguments == "{}"
        ));
    }

    #[tokio::test]
    async fn test_rate_limited() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(429))
            .mount(&server)
            .await;

        let err = provider(&server.uri()).complete(&text_request()).await.unwrap_err();
        assert!(matches!(err, ProviderError::RateLimited));
    }

    #[tokio::test]
    async fn test_api_error_carries_status_and_body() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(401).set_body_string("invalid api key"))
            .mount(&server)
            .await;

        let err = provider(&server.uri()).complete(&text_request()).await.unwrap_err();
        match err {
            ProviderError::ApiError(detail) => {
                assert!(detail.contains("401"));
                assert!(detail.contains("invalid api key"));
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_empty_choices_is_invalid_response() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({"choices": []})))
            .mount(&server)
            .await;

        let err = provider(&server.uri()).complete(&text_request()).await.unwrap_err();
        assert!(matches!(err, ProviderError::InvalidResponse(_)));
    }

    #[tokio::test]
    async fn test_message_without_content_or_call_is_invalid_response() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "choices": [{"message": {"role": "assistant", "content": null}}]
            })))
            .mount(&server)
            .await;

        let err = provider(&server.uri()).complete(&text_request()).await.unwrap_err();
        assert!(matches!(err, ProviderError::InvalidResponse(_)));
    }

    #[tokio::test]
    async fn test_empty_content_is_still_text() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "choices": [{"message": {"role": "assistant", "content": ""}}]
            })))
            .mount(&server)
            .await;

        let completion = provider(&server.uri()).complete(&text_request()).await.unwrap();
        assert_eq!(completion, Completion::Text(String::new()));
    }

    #[tokio::test]
    async fn test_unreachable_upstream_is_network_error() {
        let err = provider("http://127.0.0.1:1")
            .complete(&text_request())
            .await
            .unwrap_err();
        assert!(matches!(err, ProviderError::NetworkError(_)));
    }

    #[tokio::test]
    async fn test_health_check_requires_key() {
        let provider = OpenAiChatProvider::new(OpenAiSettings {
            api_key: "  ".to_string(),
            base_url: "http://localhost".to_string(),
            model: "gpt-4o-mini".to_string(),
            timeout: Duration::from_secs(1),
        })
        .unwrap();
        assert!(matches!(
            provider.health_check().await,
            Err(ProviderError::NotConfigured(_))
        ));
    }
}

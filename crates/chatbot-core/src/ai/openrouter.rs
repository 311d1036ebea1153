use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{AUTHORIZATION, CONTENT_TYPE};
use reqwest::Client;
use serde::Serialize;
use serde_json::Value;
use tracing::debug;

use super::ChatClient;
use crate::config::Config;
use crate::error::{ChatError, Result};
use crate::state::ChatMessage;

pub const DEFAULT_ENDPOINT: &str = "https://openrouter.ai/api/v1/chat/completions";
pub const DEFAULT_MODEL: &str = "meta-llama/llama-4-maverick:free";

#[derive(Serialize)]
struct CompletionRequest<'a> {
    model: &'a str,
    messages: &'a [ChatMessage],
}

/// Parse a completion body into the raw reply text.
///
/// Reply is the first choice's content, falling back to the API's error
/// message. Empty content counts as missing. Fields with an unexpected
/// shape are treated as absent rather than failing the whole body.
pub fn parse_reply(body: &str) -> Result<String> {
    let value: Value =
        serde_json::from_str(body).map_err(|e| ChatError::invalid_response(e.to_string()))?;

    let content = value
        .pointer("/choices/0/message/content")
        .and_then(Value::as_str)
        .filter(|c| !c.is_empty());

    content
        .or_else(|| value.pointer("/error/message").and_then(Value::as_str))
        .map(str::to_string)
        .ok_or(ChatError::EmptyResponse)
}

/// Client for OpenRouter's OpenAI-compatible chat completions API.
#[derive(Clone)]
pub struct OpenRouterClient {
    client: Client,
    api_key: String,
    model: String,
    endpoint: String,
}

impl OpenRouterClient {
    pub fn new(
        api_key: impl Into<String>,
        model: impl Into<String>,
        endpoint: impl Into<String>,
    ) -> Self {
        Self {
            client: Client::new(),
            api_key: api_key.into(),
            model: model.into(),
            endpoint: endpoint.into(),
        }
    }

    pub fn from_config(config: &Config) -> Result<Self> {
        let mut builder = Client::builder();
        if let Some(secs) = config.timeout_secs {
            builder = builder.timeout(Duration::from_secs(secs));
        }

        Ok(Self {
            client: builder.build()?,
            api_key: config.api_key.clone().unwrap_or_default(),
            model: config.model().to_string(),
            endpoint: config.endpoint().to_string(),
        })
    }

    pub fn model(&self) -> &str {
        &self.model
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }
}

#[async_trait]
impl ChatClient for OpenRouterClient {
    async fn complete(&self, messages: &[ChatMessage]) -> Result<String> {
        let request = CompletionRequest {
            model: &self.model,
            messages,
        };

        debug!(
            endpoint = %self.endpoint,
            model = %self.model,
            messages = messages.len(),
            "sending completion request"
        );

        let response = self
            .client
            .post(&self.endpoint)
            .header(AUTHORIZATION, format!("Bearer {}", self.api_key))
            .header(CONTENT_TYPE, "application/json")
            .json(&request)
            .send()
            .await?;

        // API-level failures arrive as non-2xx bodies carrying `error.message`,
        // which is shown to the user like a normal answer
        let status = response.status();
        let body = response.text().await?;
        debug!(%status, bytes = body.len(), "completion response received");

        parse_reply(&body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_reply_from_first_choice() {
        let body = r#"{"id":"x","choices":[{"message":{"role":"assistant","content":"**hi**"}},{"message":{"content":"second"}}]}"#;
        assert_eq!(parse_reply(body).unwrap(), "**hi**");
    }

    #[test]
    fn test_reply_falls_back_to_error_message() {
        let body = r#"{"error":{"message":"Rate limit exceeded","code":429}}"#;
        assert_eq!(parse_reply(body).unwrap(), "Rate limit exceeded");
    }

    #[test]
    fn test_empty_content_falls_back_to_error_message() {
        let body = r#"{"choices":[{"message":{"content":""}}],"error":{"message":"upstream failed"}}"#;
        assert_eq!(parse_reply(body).unwrap(), "upstream failed");
    }

    #[test]
    fn test_null_choices_still_reads_error_message() {
        let body = r#"{"choices":null,"error":{"message":"quota"}}"#;
        assert_eq!(parse_reply(body).unwrap(), "quota");
    }

    #[test]
    fn test_content_wins_over_malformed_error() {
        let body = r#"{"choices":[{"message":{"content":"hi"}}],"error":"oops"}"#;
        assert_eq!(parse_reply(body).unwrap(), "hi");
    }

    #[test]
    fn test_null_content_without_error_is_empty_response() {
        let body = r#"{"choices":[{"message":{"content":null}}]}"#;
        assert!(matches!(parse_reply(body), Err(ChatError::EmptyResponse)));
        assert!(matches!(parse_reply("{}"), Err(ChatError::EmptyResponse)));
    }

    #[test]
    fn test_non_json_body_is_invalid_response() {
        let err = parse_reply("<html>Bad Gateway</html>").unwrap_err();
        assert!(matches!(err, ChatError::InvalidResponse(_)));
    }

    #[test]
    fn test_request_body_shape() {
        let messages = vec![ChatMessage::user("hello"), ChatMessage::assistant("hi")];
        let request = CompletionRequest {
            model: DEFAULT_MODEL,
            messages: &messages,
        };
        let value = serde_json::to_value(&request).unwrap();
        assert_eq!(
            value,
            serde_json::json!({
                "model": "meta-llama/llama-4-maverick:free",
                "messages": [
                    {"role": "user", "content": "hello"},
                    {"role": "assistant", "content": "hi"}
                ]
            })
        );
    }

    #[test]
    fn test_from_config_uses_defaults() {
        let client = OpenRouterClient::from_config(&Config::default()).unwrap();
        assert_eq!(client.model(), DEFAULT_MODEL);
        assert_eq!(client.endpoint(), DEFAULT_ENDPOINT);
    }
}

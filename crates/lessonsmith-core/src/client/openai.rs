//! OpenAI-compatible chat-completion client.
//!
//! Posts `{model, messages, temperature, max_tokens}` to
//! `{api_base}/chat/completions` and returns the first choice's message
//! content. Any endpoint speaking the same wire format works by pointing
//! `api_base` at it.

use async_trait::async_trait;
use serde::Deserialize;
use serde_json::{Value, json};
use tracing::debug;

use super::error::ServiceError;
use super::trait_def::GenerationClient;
use super::types::CompletionRequest;
use crate::config::GenerationConfig;

/// HTTP client for the OpenAI chat-completions API.
#[derive(Clone)]
pub struct OpenAiClient {
    http: reqwest::Client,
    api_key: Option<String>,
    url: String,
}

impl std::fmt::Debug for OpenAiClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OpenAiClient").field("url", &self.url).finish()
    }
}

impl OpenAiClient {
    pub fn new(config: &GenerationConfig) -> Self {
        Self {
            http: reqwest::Client::new(),
            api_key: config.api_key.clone(),
            url: config.completions_url(),
        }
    }

    /// Create from environment variables (see [`GenerationConfig::from_env`]).
    pub fn from_env() -> Self {
        Self::new(&GenerationConfig::from_env())
    }
}

// ---------------------------------------------------------------------------
// Wire format helpers
// ---------------------------------------------------------------------------

/// Build the JSON request body for one completion.
fn request_body(request: &CompletionRequest) -> Value {
    json!({
        "model": request.model,
        "messages": [
            {"role": "system", "content": request.system},
            {"role": "user", "content": request.user},
        ],
        "temperature": request.temperature,
        "max_tokens": request.max_tokens,
    })
}

#[derive(Deserialize)]
struct ResponseMessage {
    content: Option<String>,
}

#[derive(Deserialize)]
struct Choice {
    message: ResponseMessage,
}

#[derive(Deserialize)]
struct ApiResponse {
    choices: Vec<Choice>,
}

/// Extract the assistant text from a response body.
fn parse_response_body(body: &str) -> Result<String, ServiceError> {
    let response: ApiResponse = serde_json::from_str(body)
        .map_err(|e| ServiceError::MalformedResponse(e.to_string()))?;
    response
        .choices
        .into_iter()
        .next()
        .and_then(|c| c.message.content)
        .ok_or(ServiceError::EmptyResponse)
}

#[async_trait]
impl GenerationClient for OpenAiClient {
    fn name(&self) -> &str {
        "openai"
    }

    async fn complete(&self, request: &CompletionRequest) -> Result<String, ServiceError> {
        let api_key = self.api_key.as_deref().ok_or(ServiceError::MissingApiKey)?;

        debug!(
            model = %request.model,
            temperature = request.temperature,
            prompt_len = request.user.len(),
            "sending chat completion"
        );

        let response = self
            .http
            .post(&self.url)
            .bearer_auth(api_key)
            .json(&request_body(request))
            .send()
            .await?;

        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            return Err(ServiceError::Status {
                status: status.as_u16(),
                body,
            });
        }

        parse_response_body(&body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_request() -> CompletionRequest {
        CompletionRequest {
            model: "gpt-4".to_string(),
            temperature: 0.3,
            max_tokens: 4000,
            system: "You are a curriculum designer.".to_string(),
            user: "Analyze photosynthesis.".to_string(),
        }
    }

    #[test]
    fn body_carries_model_sampling_and_messages() {
        let body = request_body(&sample_request());
        assert_eq!(body["model"], "gpt-4");
        assert_eq!(body["max_tokens"], 4000);
        assert!((body["temperature"].as_f64().unwrap() - 0.3).abs() < 1e-6);

        let messages = body["messages"].as_array().unwrap();
        assert_eq!(messages.len(), 2);
        assert_eq!(messages[0]["role"], "system");
        assert_eq!(messages[0]["content"], "You are a curriculum designer.");
        assert_eq!(messages[1]["role"], "user");
        assert_eq!(messages[1]["content"], "Analyze photosynthesis.");
    }

    #[test]
    fn parses_first_choice_content() {
        let body = r#"{"choices": [
            {"message": {"role": "assistant", "content": "first"}},
            {"message": {"role": "assistant", "content": "second"}}
        ]}"#;
        assert_eq!(parse_response_body(body).unwrap(), "first");
    }

    #[test]
    fn no_choices_is_empty_response() {
        let result = parse_response_body(r#"{"choices": []}"#);
        assert!(matches!(result, Err(ServiceError::EmptyResponse)));
    }

    #[test]
    fn null_content_is_empty_response() {
        let result = parse_response_body(r#"{"choices": [{"message": {"content": null}}]}"#);
        assert!(matches!(result, Err(ServiceError::EmptyResponse)));
    }

    #[test]
    fn garbage_body_is_malformed() {
        let result = parse_response_body("<html>bad gateway</html>");
        assert!(matches!(result, Err(ServiceError::MalformedResponse(_))));
    }

    #[tokio::test]
    async fn missing_key_fails_without_network() {
        let config = GenerationConfig {
            api_key: None,
            api_base: "http://127.0.0.1:9".to_string(),
            model: "gpt-4".to_string(),
            max_tokens: 10,
        };
        let client = OpenAiClient::new(&config);
        let result = client.complete(&sample_request()).await;
        assert!(matches!(result, Err(ServiceError::MissingApiKey)));
    }
}

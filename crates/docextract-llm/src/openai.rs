//! OpenAI Structured Outputs Client
//!
//! Sends one chat completion per chunk with a strict `json_schema` response
//! format, so the service itself rejects output that does not match the
//! contract.
//!
//! # Examples
//!
//! ```no_run
//! use docextract_llm::OpenAiClient;
//!
//! let client = OpenAiClient::new("sk-...", "gpt-4o-2024-08-06").unwrap();
//! ```

use crate::{http_client, status_error, LlmError};
use async_trait::async_trait;
use docextract_domain::{ModelClient, ModelReply, ModelRequest};
use serde::Deserialize;
use serde_json::{json, Value};
use std::time::Duration;
use tracing::debug;

/// Default OpenAI API base URL
pub const DEFAULT_BASE_URL: &str = "https://api.openai.com/v1";

/// Default timeout for a single completion (120 seconds)
pub const DEFAULT_TIMEOUT_SECS: u64 = 120;

/// OpenAI chat completions client
pub struct OpenAiClient {
    base_url: String,
    api_key: String,
    model: String,
    timeout: Duration,
    client: reqwest::Client,
}

#[derive(Deserialize)]
struct CompletionResponse {
    choices: Vec<Choice>,
}

#[derive(Deserialize)]
struct Choice {
    message: AssistantMessage,
}

#[derive(Deserialize)]
struct AssistantMessage {
    #[serde(default)]
    content: Option<String>,
    #[serde(default)]
    refusal: Option<String>,
}

impl OpenAiClient {
    /// Create a client for `model` using the default base URL
    pub fn new(api_key: impl Into<String>, model: impl Into<String>) -> Result<Self, LlmError> {
        let timeout = Duration::from_secs(DEFAULT_TIMEOUT_SECS);
        Ok(Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            api_key: api_key.into(),
            model: model.into(),
            timeout,
            client: http_client(timeout)?,
        })
    }

    /// Replace the per-request transport timeout
    pub fn with_timeout(mut self, timeout: Duration) -> Result<Self, LlmError> {
        self.client = http_client(timeout)?;
        self.timeout = timeout;
        Ok(self)
    }

    /// Per-request transport timeout
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Point the client at a compatible endpoint (proxy, gateway, Azure-style deployment)
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }

    /// Base URL requests are sent to
    pub fn base_url(&self) -> &str {
        &self.base_url
    }
}

/// Build the chat completion request body
pub(crate) fn request_body(model: &str, request: &ModelRequest<'_>) -> Value {
    json!({
        "model": model,
        "messages": [
            { "role": "system", "content": request.system_prompt },
            { "role": "user", "content": request.user_text },
        ],
        "response_format": {
            "type": "json_schema",
            "json_schema": {
                "name": request.contract.name,
                "schema": request.contract.schema,
                "strict": request.contract.strict,
            }
        }
    })
}

/// Turn a completion response body into a reply
pub(crate) fn parse_completion(body: &str) -> Result<ModelReply, LlmError> {
    let response: CompletionResponse = serde_json::from_str(body)
        .map_err(|e| LlmError::InvalidResponse(format!("Failed to parse response: {}", e)))?;

    let message = response
        .choices
        .into_iter()
        .next()
        .map(|choice| choice.message)
        .ok_or_else(|| LlmError::InvalidResponse("Response has no choices".to_string()))?;

    if let Some(refusal) = message.refusal {
        return Ok(ModelReply::refused(refusal));
    }

    match message.content {
        Some(content) => {
            let parsed = serde_json::from_str(&content).map_err(|e| {
                LlmError::InvalidResponse(format!("Failed to parse structured content: {}", e))
            })?;
            Ok(ModelReply::parsed(parsed))
        }
        None => Ok(ModelReply::default()),
    }
}

#[async_trait]
impl ModelClient for OpenAiClient {
    type Error = LlmError;

    fn model_name(&self) -> &str {
        &self.model
    }

    async fn call(&self, request: ModelRequest<'_>) -> Result<ModelReply, Self::Error> {
        let url = format!("{}/chat/completions", self.base_url);
        let body = request_body(&self.model, &request);
        debug!(model = %self.model, chars = request.user_text.len(), "Sending chat completion");

        let response = self
            .client
            .post(&url)
            .bearer_auth(&self.api_key)
            .json(&body)
            .send()
            .await
            .map_err(|e| LlmError::Communication(format!("Request failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(status_error(response, &self.model).await);
        }

        let text = response
            .text()
            .await
            .map_err(|e| LlmError::Communication(format!("Failed to read response: {}", e)))?;
        parse_completion(&text)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use docextract_domain::OutputContract;

    fn contract() -> OutputContract {
        OutputContract {
            name: "ContractModel".to_string(),
            schema: json!({
                "type": "object",
                "properties": { "title": { "type": ["string", "null"] } },
                "required": ["title"],
                "additionalProperties": false
            }),
            strict: true,
        }
    }

    #[test]
    fn test_client_creation() {
        let client = OpenAiClient::new("key", "gpt-4o")
            .unwrap()
            .with_base_url("http://localhost:8080/v1/");
        assert_eq!(client.model_name(), "gpt-4o");
        assert_eq!(client.base_url(), "http://localhost:8080/v1");
        assert_eq!(client.timeout(), Duration::from_secs(DEFAULT_TIMEOUT_SECS));
    }

    #[test]
    fn test_timeout_override() {
        let client = OpenAiClient::new("key", "gpt-4o")
            .unwrap()
            .with_timeout(Duration::from_secs(600))
            .unwrap();
        assert_eq!(client.timeout(), Duration::from_secs(600));
    }

    #[test]
    fn test_request_body_carries_strict_schema() {
        let contract = contract();
        let body = request_body(
            "gpt-4o",
            &ModelRequest {
                system_prompt: "Extract.",
                user_text: "Lease between A and B",
                contract: &contract,
            },
        );

        assert_eq!(body["messages"][0]["role"], "system");
        assert_eq!(body["messages"][1]["content"], "Lease between A and B");
        assert_eq!(body["response_format"]["type"], "json_schema");
        assert_eq!(body["response_format"]["json_schema"]["name"], "ContractModel");
        assert_eq!(body["response_format"]["json_schema"]["strict"], true);
        assert_eq!(
            body["response_format"]["json_schema"]["schema"]["additionalProperties"],
            false
        );
    }

    #[test]
    fn test_parse_content() {
        let body = r#"{"choices":[{"message":{"role":"assistant","content":"{\"title\":\"Lease\"}","refusal":null}}]}"#;
        let reply = parse_completion(body).unwrap();
        assert_eq!(reply, ModelReply::parsed(json!({ "title": "Lease" })));
    }

    #[test]
    fn test_parse_refusal() {
        let body = r#"{"choices":[{"message":{"role":"assistant","content":null,"refusal":"I can't help with that."}}]}"#;
        let reply = parse_completion(body).unwrap();
        assert_eq!(reply.refusal.as_deref(), Some("I can't help with that."));
        assert!(reply.parsed.is_none());
    }

    #[test]
    fn test_parse_empty_message() {
        let body = r#"{"choices":[{"message":{"role":"assistant"}}]}"#;
        assert_eq!(parse_completion(body).unwrap(), ModelReply::default());
    }

    #[test]
    fn test_parse_invalid_content() {
        let body = r#"{"choices":[{"message":{"content":"{\"title\": "}}]}"#;
        assert!(matches!(
            parse_completion(body),
            Err(LlmError::InvalidResponse(_))
        ));
        assert!(matches!(
            parse_completion(r#"{"choices":[]}"#),
            Err(LlmError::InvalidResponse(_))
        ));
    }

    #[tokio::test]
    async fn test_unreachable_endpoint() {
        let client = OpenAiClient::new("key", "gpt-4o")
            .unwrap()
            .with_base_url("http://localhost:99999/v1");
        let contract = contract();

        let result = client
            .call(ModelRequest {
                system_prompt: "s",
                user_text: "u",
                contract: &contract,
            })
            .await;
        assert!(matches!(result, Err(LlmError::Communication(_))));
    }

    #[tokio::test]
    #[ignore] // Requires OPENAI_API_KEY and network access
    async fn test_openai_integration() {
        let key = std::env::var("OPENAI_API_KEY").unwrap();
        let client = OpenAiClient::new(key, "gpt-4o-mini").unwrap();
        let contract = contract();

        let reply = client
            .call(ModelRequest {
                system_prompt: "Extract the document title.",
                user_text: "RESIDENTIAL LEASE AGREEMENT\nThis lease is made between...",
                contract: &contract,
            })
            .await
            .unwrap();
        assert!(reply.parsed.is_some());
    }
}

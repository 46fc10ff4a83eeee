//! Ollama Client Implementation
//!
//! Provides structured extraction against a local Ollama instance. The
//! output contract is passed as the chat `format`, which constrains decoding
//! to the schema.
//!
//! # Examples
//!
//! ```no_run
//! use docextract_llm::OllamaClient;
//!
//! let client = OllamaClient::new("http://localhost:11434", "llama3.1").unwrap();
//! ```

use crate::{http_client, status_error, LlmError};
use async_trait::async_trait;
use docextract_domain::{ModelClient, ModelReply, ModelRequest};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::time::Duration;

/// Default Ollama API endpoint
pub const DEFAULT_ENDPOINT: &str = "http://localhost:11434";

/// Default timeout for a single chat request (120 seconds)
pub const DEFAULT_TIMEOUT_SECS: u64 = 120;

/// Ollama chat API client for local inference
pub struct OllamaClient {
    endpoint: String,
    model: String,
    timeout: Duration,
    client: reqwest::Client,
}

/// Request body for the Ollama chat API
#[derive(Serialize)]
struct OllamaChatRequest<'a> {
    model: &'a str,
    messages: [ChatMessage<'a>; 2],
    format: &'a Value,
    stream: bool,
    options: ChatOptions,
}

#[derive(Serialize)]
struct ChatMessage<'a> {
    role: &'static str,
    content: &'a str,
}

#[derive(Serialize)]
struct ChatOptions {
    temperature: f32,
}

/// Response from the Ollama chat API
#[derive(Deserialize)]
struct OllamaChatResponse {
    message: OllamaMessage,
}

#[derive(Deserialize)]
struct OllamaMessage {
    #[serde(default)]
    content: String,
}

impl OllamaClient {
    /// Create a new Ollama client
    ///
    /// # Parameters
    ///
    /// - `endpoint`: Ollama API endpoint (e.g., "http://localhost:11434")
    /// - `model`: Model to use (e.g., "llama3.1", "qwen2.5")
    pub fn new(endpoint: impl Into<String>, model: impl Into<String>) -> Result<Self, LlmError> {
        let timeout = Duration::from_secs(DEFAULT_TIMEOUT_SECS);
        Ok(Self {
            endpoint: endpoint.into().trim_end_matches('/').to_string(),
            model: model.into(),
            timeout,
            client: http_client(timeout)?,
        })
    }

    /// Replace the per-request transport timeout
    ///
    /// Local models on CPU can need far longer than the default.
    pub fn with_timeout(mut self, timeout: Duration) -> Result<Self, LlmError> {
        self.client = http_client(timeout)?;
        self.timeout = timeout;
        Ok(self)
    }

    /// Per-request transport timeout
    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    /// Create a client for `http://localhost:11434`
    pub fn default_endpoint(model: impl Into<String>) -> Result<Self, LlmError> {
        Self::new(DEFAULT_ENDPOINT, model)
    }
}

/// Turn the chat response content into a reply
fn parse_content(content: &str) -> Result<ModelReply, LlmError> {
    if content.trim().is_empty() {
        return Ok(ModelReply::default());
    }
    serde_json::from_str(content)
        .map(ModelReply::parsed)
        .map_err(|e| LlmError::InvalidResponse(format!("Failed to parse structured response: {}", e)))
}

#[async_trait]
impl ModelClient for OllamaClient {
    type Error = LlmError;

    fn model_name(&self) -> &str {
        &self.model
    }

    async fn call(&self, request: ModelRequest<'_>) -> Result<ModelReply, Self::Error> {
        let url = format!("{}/api/chat", self.endpoint);

        let request_body = OllamaChatRequest {
            model: &self.model,
            messages: [
                ChatMessage {
                    role: "system",
                    content: request.system_prompt,
                },
                ChatMessage {
                    role: "user",
                    content: request.user_text,
                },
            ],
            format: &request.contract.schema,
            stream: false,
            options: ChatOptions { temperature: 0.0 },
        };

        let response = self
            .client
            .post(&url)
            .json(&request_body)
            .send()
            .await
            .map_err(|e| LlmError::Communication(format!("Request failed: {}", e)))?;

        if !response.status().is_success() {
            return Err(status_error(response, &self.model).await);
        }

        let chat = response
            .json::<OllamaChatResponse>()
            .await
            .map_err(|e| LlmError::InvalidResponse(format!("Failed to parse response: {}", e)))?;
        parse_content(&chat.message.content)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use docextract_domain::OutputContract;
    use serde_json::json;

    #[test]
    fn test_ollama_client_creation() {
        let client = OllamaClient::new("http://localhost:11434/", "llama3.1").unwrap();
        assert_eq!(client.endpoint, "http://localhost:11434");
        assert_eq!(client.model_name(), "llama3.1");
    }

    #[test]
    fn test_ollama_client_default_endpoint() {
        let client = OllamaClient::default_endpoint("mistral").unwrap();
        assert_eq!(client.endpoint, DEFAULT_ENDPOINT);
        assert_eq!(client.model, "mistral");
    }

    #[test]
    fn test_request_serialization() {
        let schema = json!({ "type": "object" });
        let body = OllamaChatRequest {
            model: "llama3.1",
            messages: [
                ChatMessage { role: "system", content: "s" },
                ChatMessage { role: "user", content: "u" },
            ],
            format: &schema,
            stream: false,
            options: ChatOptions { temperature: 0.0 },
        };

        let value = serde_json::to_value(&body).unwrap();
        assert_eq!(value["format"], schema);
        assert_eq!(value["stream"], false);
        assert_eq!(value["messages"][1]["role"], "user");
    }

    #[test]
    fn test_parse_content() {
        assert_eq!(
            parse_content(r#"{"title":"Lease"}"#).unwrap(),
            ModelReply::parsed(json!({ "title": "Lease" }))
        );
        assert_eq!(parse_content("  ").unwrap(), ModelReply::default());
        assert!(matches!(parse_content("not json"), Err(LlmError::InvalidResponse(_))));
    }

    #[tokio::test]
    async fn test_ollama_error_handling() {
        // Use invalid endpoint to trigger error
        let client = OllamaClient::new("http://localhost:99999", "llama3.1").unwrap();
        let contract = OutputContract {
            name: "ContractModel".to_string(),
            schema: json!({ "type": "object" }),
            strict: true,
        };

        let result = client
            .call(ModelRequest {
                system_prompt: "s",
                user_text: "u",
                contract: &contract,
            })
            .await;

        match result {
            Err(LlmError::Communication(_)) => {} // Expected
            other => panic!("Expected Communication error, got {:?}", other),
        }
    }

    // Integration tests (requires running Ollama)
    #[tokio::test]
    #[ignore] // Only run when Ollama is available
    async fn test_ollama_chat_integration() {
        let client = OllamaClient::default_endpoint("llama3.1").unwrap();
        let contract = OutputContract {
            name: "ContractModel".to_string(),
            schema: json!({
                "type": "object",
                "properties": { "title": { "type": ["string", "null"] } },
                "required": ["title"],
                "additionalProperties": false
            }),
            strict: true,
        };

        let reply = client
            .call(ModelRequest {
                system_prompt: "Extract the document title.",
                user_text: "SERVICE AGREEMENT\nThis agreement...",
                contract: &contract,
            })
            .await
            .unwrap();
        assert!(reply.parsed.is_some());
    }
}

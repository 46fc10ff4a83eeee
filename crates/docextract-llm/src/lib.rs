//! docextract Model Clients
//!
//! Structured-output model services behind the `ModelClient` trait from
//! `docextract-domain`.
//!
//! # Clients
//!
//! - `MockModel`: scripted replies for deterministic testing
//! - `OpenAiClient`: OpenAI chat completions with a strict `json_schema` response format
//! - `OllamaClient`: local Ollama chat API with a `format` schema
//!
//! None of the clients retry; a failed call is a failed chunk.
//!
//! # Examples
//!
//! ```
//! use docextract_domain::{ModelClient, ModelReply, ModelRequest, SchemaCompiler};
//! use docextract_llm::MockModel;
//! use serde_json::json;
//!
//! # #[tokio::main]
//! # async fn main() {
//! let contract = SchemaCompiler::new()
//!     .compile(&json!({ "properties": { "title": { "type": "string" } } }))
//!     .unwrap()
//!     .contract();
//!
//! let model = MockModel::new(ModelReply::parsed(json!({ "title": "Lease" })));
//! let reply = model
//!     .call(ModelRequest { system_prompt: "Extract", user_text: "...", contract: &contract })
//!     .await
//!     .unwrap();
//! assert_eq!(reply.parsed, Some(json!({ "title": "Lease" })));
//! # }
//! ```

#![warn(missing_docs)]

pub mod mock;
pub mod ollama;
pub mod openai;

use thiserror::Error;

pub use mock::{CapturedRequest, MockModel};
pub use ollama::OllamaClient;
pub use openai::OpenAiClient;

/// Errors that can occur during model calls
#[derive(Error, Debug)]
pub enum LlmError {
    /// Network or API communication error
    #[error("Communication error: {0}")]
    Communication(String),

    /// Invalid response from the model service
    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    /// Rate limit exceeded
    #[error("Rate limit exceeded")]
    RateLimitExceeded,

    /// Model not available
    #[error("Model not available: {0}")]
    ModelNotAvailable(String),

    /// Client configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Generic error
    #[error("LLM error: {0}")]
    Other(String),
}

/// HTTP client whose whole-request timeout is `timeout`
pub(crate) fn http_client(timeout: std::time::Duration) -> Result<reqwest::Client, LlmError> {
    reqwest::Client::builder()
        .timeout(timeout)
        .build()
        .map_err(|e| LlmError::Config(format!("Failed to build HTTP client: {}", e)))
}

/// Map a non-success HTTP status to an error
pub(crate) async fn status_error(response: reqwest::Response, model: &str) -> LlmError {
    let status = response.status();
    match status {
        reqwest::StatusCode::NOT_FOUND => LlmError::ModelNotAvailable(model.to_string()),
        reqwest::StatusCode::TOO_MANY_REQUESTS => LlmError::RateLimitExceeded,
        _ => {
            let error_text = response
                .text()
                .await
                .unwrap_or_else(|_| "Unknown error".to_string());
            LlmError::Communication(format!("HTTP {}: {}", status, error_text))
        }
    }
}

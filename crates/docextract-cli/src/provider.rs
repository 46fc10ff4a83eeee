//! Model service selected by configuration.

use crate::config::{ProviderConfig, ProviderKind};
use crate::error::Result;
use async_trait::async_trait;
use docextract_domain::{ModelClient, ModelReply, ModelRequest};
use docextract_llm::{LlmError, OllamaClient, OpenAiClient};
use std::time::Duration;

/// Either supported model client
pub enum Provider {
    /// OpenAI structured outputs
    OpenAi(OpenAiClient),
    /// Local Ollama
    Ollama(OllamaClient),
}

impl Provider {
    /// Build the configured client for `model`.
    ///
    /// OpenAI needs its API key in the environment; a missing key is a
    /// startup error. `timeout` bounds each HTTP request.
    pub fn from_config(config: &ProviderConfig, model: &str, timeout: Duration) -> Result<Self> {
        match config.kind {
            ProviderKind::OpenAi => {
                let mut client = OpenAiClient::new(config.api_key()?, model)?.with_timeout(timeout)?;
                if let Some(endpoint) = &config.endpoint {
                    client = client.with_base_url(endpoint.clone());
                }
                Ok(Provider::OpenAi(client))
            }
            ProviderKind::Ollama => {
                let client = match &config.endpoint {
                    Some(endpoint) => OllamaClient::new(endpoint.clone(), model)?,
                    None => OllamaClient::default_endpoint(model)?,
                };
                Ok(Provider::Ollama(client.with_timeout(timeout)?))
            }
        }
    }
}

#[async_trait]
impl ModelClient for Provider {
    type Error = LlmError;

    fn model_name(&self) -> &str {
        match self {
            Provider::OpenAi(client) => client.model_name(),
            Provider::Ollama(client) => client.model_name(),
        }
    }

    async fn call(&self, request: ModelRequest<'_>) -> std::result::Result<ModelReply, Self::Error> {
        match self {
            Provider::OpenAi(client) => client.call(request).await,
            Provider::Ollama(client) => client.call(request).await,
        }
    }
}

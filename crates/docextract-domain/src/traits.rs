//! Trait definitions for external collaborators
//!
//! These traits define the boundaries between extraction logic and
//! infrastructure. Implementations live in other crates.

use crate::schema::OutputContract;
use crate::status::StatusUpdate;
use async_trait::async_trait;
use serde_json::Value;
use std::fmt::Display;

/// One structured-output request: system framing, chunk text, contract
#[derive(Debug, Clone, Copy)]
pub struct ModelRequest<'a> {
    /// System prompt (instructions plus any previous data to merge)
    pub system_prompt: &'a str,
    /// Chunk text sent as the user message
    pub user_text: &'a str,
    /// Contract the reply must satisfy
    pub contract: &'a OutputContract,
}

/// Reply from the model service
///
/// A refusal and a parsed value are mutually exclusive in practice; a reply
/// carrying neither is treated as a parse failure by the caller.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ModelReply {
    /// Refusal reason when the model declined to answer
    pub refusal: Option<String>,
    /// Structured value parsed from the reply
    pub parsed: Option<Value>,
}

impl ModelReply {
    /// A reply with a parsed value
    pub fn parsed(value: Value) -> Self {
        Self {
            refusal: None,
            parsed: Some(value),
        }
    }

    /// A refusal
    pub fn refused(reason: impl Into<String>) -> Self {
        Self {
            refusal: Some(reason.into()),
            parsed: None,
        }
    }
}

/// Trait for structured-output model services
///
/// Implemented by the infrastructure layer (docextract-llm). Implementations
/// must be safe for concurrent use across documents.
#[async_trait]
pub trait ModelClient: Send + Sync {
    /// Error type for transport or decoding failures
    type Error: Display + Send;

    /// Name of the model serving requests
    fn model_name(&self) -> &str;

    /// Send one request. No retries are performed.
    async fn call(&self, request: ModelRequest<'_>) -> Result<ModelReply, Self::Error>;
}

/// Trait for the document-status store
///
/// Implemented by the infrastructure layer (docextract-store).
#[async_trait]
pub trait StatusStore: Send + Sync {
    /// Error type for store operations
    type Error: Display + Send;

    /// Record a status transition
    async fn update(&self, update: StatusUpdate) -> Result<(), Self::Error>;
}

//! Scripted model client for deterministic testing

use crate::LlmError;
use async_trait::async_trait;
use docextract_domain::{ModelClient, ModelReply, ModelRequest};
use std::collections::VecDeque;
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

/// A request as seen by the mock
#[derive(Debug, Clone, PartialEq)]
pub struct CapturedRequest {
    /// System prompt sent
    pub system_prompt: String,
    /// Chunk text sent
    pub user_text: String,
    /// Name of the contract attached
    pub contract_name: String,
}

#[derive(Debug, Default)]
struct MockState {
    script: VecDeque<Result<ModelReply, String>>,
    requests: Vec<CapturedRequest>,
}

/// Mock model client
///
/// Scripted replies are consumed in order; once the script runs out every
/// call gets the default reply. Clones share the script, the call count and
/// the captured requests.
///
/// # Examples
///
/// ```
/// use docextract_domain::ModelReply;
/// use docextract_llm::MockModel;
/// use serde_json::json;
///
/// let model = MockModel::new(ModelReply::parsed(json!({})))
///     .with_reply(ModelReply::parsed(json!({ "title": "first" })))
///     .with_error("connection reset");
/// assert_eq!(model.call_count(), 0);
/// ```
#[derive(Debug, Clone)]
pub struct MockModel {
    name: String,
    default_reply: ModelReply,
    state: Arc<Mutex<MockState>>,
}

impl MockModel {
    /// Create a mock that answers every call with `reply`
    pub fn new(reply: ModelReply) -> Self {
        Self {
            name: "mock-model".to_string(),
            default_reply: reply,
            state: Arc::new(Mutex::new(MockState::default())),
        }
    }

    /// Set the reported model name
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Queue a reply for the next unanswered call
    pub fn with_reply(self, reply: ModelReply) -> Self {
        self.state().script.push_back(Ok(reply));
        self
    }

    /// Queue a transport failure for the next unanswered call
    pub fn with_error(self, message: impl Into<String>) -> Self {
        self.state().script.push_back(Err(message.into()));
        self
    }

    /// Number of calls made so far
    pub fn call_count(&self) -> usize {
        self.state().requests.len()
    }

    /// Every request received, in call order
    pub fn requests(&self) -> Vec<CapturedRequest> {
        self.state().requests.clone()
    }

    /// Forget captured requests (the script is left as is)
    pub fn reset_call_count(&self) {
        self.state().requests.clear();
    }

    fn state(&self) -> MutexGuard<'_, MockState> {
        self.state.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for MockModel {
    fn default() -> Self {
        Self::new(ModelReply::default())
    }
}

#[async_trait]
impl ModelClient for MockModel {
    type Error = LlmError;

    fn model_name(&self) -> &str {
        &self.name
    }

    async fn call(&self, request: ModelRequest<'_>) -> Result<ModelReply, Self::Error> {
        let mut state = self.state();
        state.requests.push(CapturedRequest {
            system_prompt: request.system_prompt.to_string(),
            user_text: request.user_text.to_string(),
            contract_name: request.contract.name.clone(),
        });

        match state.script.pop_front() {
            Some(Ok(reply)) => Ok(reply),
            Some(Err(message)) => Err(LlmError::Other(message)),
            None => Ok(self.default_reply.clone()),
        }
    }
}

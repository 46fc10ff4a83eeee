//! Terminal result of processing one document

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Terminal status reported upward
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ExtractionStatus {
    /// Every chunk succeeded
    Success,
    /// Failure, possibly with partial data
    Failed,
}

impl ExtractionStatus {
    /// Status name as stored and displayed
    pub fn as_str(&self) -> &'static str {
        match self {
            ExtractionStatus::Success => "success",
            ExtractionStatus::Failed => "failed",
        }
    }
}

/// `processDocument` result: status, optional data, human-readable message.
///
/// A partial failure collapses to `Failed` with whatever data was accumulated
/// before the failing chunk.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExtractionOutcome {
    /// Terminal status
    pub status: ExtractionStatus,
    /// Structured result (final or partial)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<Value>,
    /// Outcome description
    pub message: String,
}

impl ExtractionOutcome {
    /// Successful outcome
    pub fn success(data: Value, message: impl Into<String>) -> Self {
        Self {
            status: ExtractionStatus::Success,
            data: Some(data),
            message: message.into(),
        }
    }

    /// Failed outcome without data
    pub fn failed(message: impl Into<String>) -> Self {
        Self {
            status: ExtractionStatus::Failed,
            data: None,
            message: message.into(),
        }
    }

    /// Failed outcome carrying the data accumulated before the failure
    pub fn partial(data: Value, message: impl Into<String>) -> Self {
        Self {
            status: ExtractionStatus::Failed,
            data: Some(data),
            message: message.into(),
        }
    }

    /// True when the outcome is a success
    pub fn is_success(&self) -> bool {
        self.status == ExtractionStatus::Success
    }
}

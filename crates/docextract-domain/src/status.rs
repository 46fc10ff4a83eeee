//! Document tracker lifecycle

use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::fmt;

/// Unique identifier for a tracked document based on UUIDv7
///
/// UUIDv7 keeps tracker rows chronologically sortable without coordination.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct DocumentId(u128);

impl DocumentId {
    /// Generate a new UUIDv7-based DocumentId
    ///
    /// # Examples
    ///
    /// ```
    /// use docextract_domain::DocumentId;
    ///
    /// let id = DocumentId::new();
    /// assert!(id.value() > 0);
    /// ```
    pub fn new() -> Self {
        Self(uuid::Uuid::now_v7().as_u128())
    }

    /// Create a DocumentId from a raw u128 value
    pub fn from_value(value: u128) -> Self {
        Self(value)
    }

    /// Parse a DocumentId from its UUID string form
    ///
    /// # Examples
    ///
    /// ```
    /// use docextract_domain::DocumentId;
    ///
    /// let id = DocumentId::new();
    /// let parsed = DocumentId::parse(&id.to_string()).unwrap();
    /// assert_eq!(id, parsed);
    /// ```
    pub fn parse(s: &str) -> Result<Self, String> {
        uuid::Uuid::parse_str(s)
            .map(|u| Self(u.as_u128()))
            .map_err(|e| format!("Invalid document id: {}", e))
    }

    /// Get the raw u128 value
    pub fn value(&self) -> u128 {
        self.0
    }
}

impl Default for DocumentId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for DocumentId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", uuid::Uuid::from_u128(self.0))
    }
}

/// Tracker status of a document request
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum DocumentStatus {
    /// Request accepted, nothing started yet
    Initiated,
    /// Extraction running
    InProgress,
    /// Finished successfully
    Success,
    /// Finished with a failure (possibly partial data)
    Failed,
}

impl DocumentStatus {
    /// Status name as stored
    pub fn as_str(&self) -> &'static str {
        match self {
            DocumentStatus::Initiated => "initiated",
            DocumentStatus::InProgress => "inprogress",
            DocumentStatus::Success => "success",
            DocumentStatus::Failed => "failed",
        }
    }

    /// Parse a stored status name
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "initiated" => Some(DocumentStatus::Initiated),
            "inprogress" => Some(DocumentStatus::InProgress),
            "success" => Some(DocumentStatus::Success),
            "failed" => Some(DocumentStatus::Failed),
            _ => None,
        }
    }

    /// Whether no further transitions follow
    pub fn is_terminal(&self) -> bool {
        matches!(self, DocumentStatus::Success | DocumentStatus::Failed)
    }
}

impl fmt::Display for DocumentStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A status transition emitted to the document-status store
#[derive(Debug, Clone, PartialEq)]
pub struct StatusUpdate {
    /// Tracked document
    pub id: DocumentId,
    /// New status
    pub status: DocumentStatus,
    /// Extracted (or partial) data
    pub data: Option<Value>,
    /// Human-readable message
    pub message: Option<String>,
    /// Structured error details
    pub errors: Option<Value>,
}

impl StatusUpdate {
    /// Bare transition with no payload
    pub fn new(id: DocumentId, status: DocumentStatus) -> Self {
        Self {
            id,
            status,
            data: None,
            message: None,
            errors: None,
        }
    }

    /// Attach a message
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }

    /// Attach data
    pub fn with_data(mut self, data: Option<Value>) -> Self {
        self.data = data;
        self
    }

    /// Attach error details
    pub fn with_errors(mut self, errors: Value) -> Self {
        self.errors = Some(errors);
        self
    }
}

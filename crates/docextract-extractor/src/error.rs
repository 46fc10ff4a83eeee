//! Error types for the Extractor

use docextract_domain::{ConformError, SchemaError};
use docextract_gatekeeper::StrictnessError;
use docextract_ingest::IngestError;
use thiserror::Error;

/// Errors that can occur during startup or document processing
///
/// Startup errors (`Config`, `Schema`, `Strictness`, `Tokenizer`) abort
/// initialization. Everything else is per document and is folded into an
/// `ExtractionOutcome` message at the document boundary.
#[derive(Error, Debug)]
pub enum ExtractorError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Schema could not be loaded or compiled
    #[error("Schema error: {0}")]
    Schema(#[from] SchemaError),

    /// Compiled schema is not a strict output contract
    #[error(transparent)]
    Strictness(#[from] StrictnessError),

    /// No vocabulary could be loaded
    #[error("Tokenizer error: {0}")]
    Tokenizer(String),

    /// Overlap does not leave the window room to advance
    #[error("Token overlap ({overlap}) must be less than max tokens ({max_tokens})")]
    InvalidChunking {
        /// Window width
        max_tokens: usize,
        /// Requested overlap
        overlap: usize,
    },

    /// File extension not handled
    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),

    /// Extracted text is empty or whitespace
    #[error("No text content found")]
    NoTextContent,

    /// Failure while pulling text out of the document
    #[error("Text extraction failed: {0}")]
    Extraction(String),

    /// The model declined to answer
    #[error("Refusal: {0}")]
    ModelRefusal(String),

    /// Transport or service failure during a model call
    #[error("Model call failed: {0}")]
    ModelCall(String),

    /// Model call did not finish in time
    #[error("Model call timed out after {0}s")]
    Timeout(u64),

    /// Reply carried neither a refusal nor a structured value
    #[error("Failed to parse response")]
    UnparsedResponse,

    /// Reply does not match the compiled schema
    #[error("Failed to parse response: {0}")]
    NonConforming(#[from] ConformError),
}

impl From<IngestError> for ExtractorError {
    fn from(e: IngestError) -> Self {
        match e {
            IngestError::UnsupportedFormat(extension) => ExtractorError::UnsupportedFormat(extension),
            other => ExtractorError::Extraction(other.to_string()),
        }
    }
}

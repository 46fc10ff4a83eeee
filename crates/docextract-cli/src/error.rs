//! Error types for the CLI application.

use thiserror::Error;

/// Result type alias for CLI operations.
pub type Result<T> = std::result::Result<T, CliError>;

/// CLI-specific errors.
#[derive(Debug, Error)]
pub enum CliError {
    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),

    /// Schema could not be loaded or compiled
    #[error("Schema error: {0}")]
    Schema(#[from] docextract_domain::SchemaError),

    /// Schema is not a strict output contract
    #[error(transparent)]
    Strictness(#[from] docextract_gatekeeper::StrictnessError),

    /// Extractor startup or processing error
    #[error(transparent)]
    Extractor(#[from] docextract_extractor::ExtractorError),

    /// Model client error
    #[error(transparent)]
    Llm(#[from] docextract_llm::LlmError),

    /// Tracker database error
    #[error(transparent)]
    Store(#[from] docextract_store::StoreError),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Serialization error
    #[error("Serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// TOML parsing error
    #[error("TOML parsing error: {0}")]
    Toml(#[from] toml::de::Error),

    /// Invalid input
    #[error("Invalid input: {0}")]
    InvalidInput(String),

    /// Tracked request does not exist
    #[error("Request not found: {0}")]
    NotFound(String),
}

//! Ingest error types

use std::path::PathBuf;
use thiserror::Error;

/// Errors that can occur while pulling text out of a document
#[derive(Error, Debug)]
pub enum IngestError {
    /// File extension not handled
    #[error("Unsupported format: {0}")]
    UnsupportedFormat(String),

    /// File could not be read
    #[error("Failed to read {path}: {source}")]
    Io {
        /// File path
        path: PathBuf,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },

    /// DOCX container or body could not be read
    #[error("DOCX error: {0}")]
    Docx(String),

    /// PDF library or document failure
    #[error("PDF error: {0}")]
    Pdf(String),

    /// OCR recognizer failure
    #[error("OCR error: {0}")]
    Ocr(String),
}

//! Error types for schema loading and compilation

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while locating, reading or compiling a schema description.
///
/// All of these are fatal at startup.
#[derive(Error, Debug)]
pub enum SchemaError {
    /// Schema file not found in any of the searched locations
    #[error("Schema not found: {requested} (searched: {})", display_paths(.searched))]
    NotFound {
        /// Path as configured
        requested: String,
        /// Candidate paths that were tried, in order
        searched: Vec<PathBuf>,
    },

    /// Schema file exists but could not be read
    #[error("Failed to read schema {path}: {source}")]
    Read {
        /// Resolved path
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// Schema text is not well-formed JSON
    #[error("Malformed schema JSON: {0}")]
    Malformed(String),

    /// Schema JSON is well-formed but the root is not an object
    #[error("Schema root must be a JSON object, found {0}")]
    InvalidRoot(String),
}

impl From<serde_json::Error> for SchemaError {
    fn from(e: serde_json::Error) -> Self {
        SchemaError::Malformed(e.to_string())
    }
}

fn display_paths(paths: &[PathBuf]) -> String {
    paths
        .iter()
        .map(|p| p.display().to_string())
        .collect::<Vec<_>>()
        .join(", ")
}

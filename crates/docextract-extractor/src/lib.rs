//! docextract Extractor
//!
//! Drives a compiled schema across a document, chunk by chunk, through a
//! structured-output model service.
//!
//! # Overview
//!
//! The Extractor is the document pathway: it pulls text out of a PDF, DOCX or
//! TXT file, splits it into overlapping token windows and asks the model to
//! fill the schema for each window in turn, carrying the previous result
//! forward as context to merge.
//!
//! # Architecture
//!
//! ```text
//! File → TextExtractor → Tokenizer/chunks → ModelClient (per chunk) → Sanitizer → Outcome
//! ```
//!
//! # Key Features
//!
//! - **Startup validation**: the schema is compiled and checked for strictness
//!   before any document is accepted
//! - **Token chunking**: fixed-width windows with overlap, measured in the
//!   target model's vocabulary
//! - **Sequential merge**: each chunk's reply replaces the accumulated data
//! - **Partial results**: a failing chunk keeps whatever was extracted before it
//! - **Tracking**: optional lifecycle reporting to a status store
//!
//! # Example Usage
//!
//! ```no_run
//! use docextract_domain::ModelReply;
//! use docextract_extractor::{Extractor, ExtractorConfig};
//! use docextract_llm::MockModel;
//! use serde_json::json;
//! use std::path::Path;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let model = MockModel::new(ModelReply::parsed(json!({ "title": "Lease" })));
//! let config = ExtractorConfig {
//!     schema_path: "schemas/contract.schema.json".to_string(),
//!     ..ExtractorConfig::default()
//! };
//!
//! let extractor = Extractor::initialize(config, model)?;
//! let outcome = extractor.process_document(Path::new("lease.pdf")).await;
//!
//! println!("{}: {}", outcome.status.as_str(), outcome.message);
//! # Ok(())
//! # }
//! ```

#![warn(missing_docs)]

mod chunking;
mod config;
mod error;
mod extractor;
mod prompt;


pub use chunking::{plan_windows, Chunk, ChunkSequence, Tokenizer};
pub use config::{ExtractorConfig, Vocabulary, DEFAULT_INSTRUCTIONS};
pub use error::ExtractorError;
pub use extractor::Extractor;
pub use prompt::PromptBuilder;

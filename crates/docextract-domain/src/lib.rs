//! docextract Domain Layer
//!
//! Core model for schema-driven document extraction. This crate owns the
//! concepts every other layer shares and has no I/O beyond reading a schema
//! file at startup.
//!
//! ## Key Concepts
//!
//! - **SchemaNode**: a compiled, immutable type descriptor (scalar, object,
//!   open map, array, any) built once from a JSON-Schema-like description
//! - **Output contract**: the strict JSON Schema rendered from a compiled
//!   schema and enforced by the model-call service
//! - **Conformance**: a descriptor-driven decoder that checks a model reply
//!   against the compiled shape
//! - **Sanitizer**: strips control characters from every string leaf
//! - **Outcome / Status**: the terminal result of processing one document and
//!   the tracker lifecycle (`initiated → inprogress → success | failed`)
//!
//! ## Architecture
//!
//! Collaborators (model service, status store) are described by traits in
//! [`traits`]; infrastructure implementations live in other crates.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod compiler;
pub mod conform;
pub mod error;
pub mod outcome;
pub mod sanitize;
pub mod schema;
pub mod status;
pub mod traits;

// Re-exports for convenience
pub use compiler::SchemaCompiler;
pub use conform::ConformError;
pub use error::SchemaError;
pub use outcome::{ExtractionOutcome, ExtractionStatus};
pub use sanitize::{sanitize, sanitize_str};
pub use schema::{CompiledSchema, Field, ObjectNode, OutputContract, ScalarKind, SchemaNode};
pub use status::{DocumentId, DocumentStatus, StatusUpdate};
pub use traits::{ModelClient, ModelReply, ModelRequest, StatusStore};

//! docextract Gatekeeper
//!
//! Checks a compiled schema against the constraints of a strict
//! structured-output contract before any document is accepted.
//!
//! The Gatekeeper verifies:
//! - Every object forbids undeclared properties
//! - Every declared property is required
//! - Arrays carry an element schema and every node is typed
//! - Nesting depth, property count and total name length stay within limits
//!
//! # Examples
//!
//! ```
//! use docextract_domain::SchemaCompiler;
//! use docextract_gatekeeper::{ContractLimits, StrictnessValidator};
//! use serde_json::json;
//!
//! let schema = SchemaCompiler::new()
//!     .compile(&json!({ "properties": { "title": { "type": "string" } } }))
//!     .unwrap();
//!
//! let validator = StrictnessValidator::new(ContractLimits::default());
//! assert!(validator.validate(&schema).is_ok());
//! ```

#![warn(missing_docs)]

mod config;
mod error;
mod validator;

pub use config::ContractLimits;
pub use error::StrictnessError;
pub use validator::{ContractStats, StrictnessValidator, Violation};

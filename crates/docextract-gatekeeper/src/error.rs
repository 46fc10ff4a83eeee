//! Gatekeeper error types

use crate::Violation;
use thiserror::Error;

/// Errors raised while checking an output contract
#[derive(Error, Debug)]
pub enum StrictnessError {
    /// The contract breaks one or more strict-output rules
    #[error("Schema '{name}' is not a strict output contract: {}", join(.violations))]
    Violations {
        /// Contract name
        name: String,
        /// Every violation found, in walk order
        violations: Vec<Violation>,
    },

    /// Configuration error
    #[error("Configuration error: {0}")]
    Config(String),
}

impl StrictnessError {
    /// Violations carried by this error (empty for configuration errors)
    pub fn violations(&self) -> &[Violation] {
        match self {
            StrictnessError::Violations { violations, .. } => violations,
            StrictnessError::Config(_) => &[],
        }
    }
}

fn join(violations: &[Violation]) -> String {
    violations
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("; ")
}

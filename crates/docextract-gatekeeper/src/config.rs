//! Gatekeeper configuration

use crate::StrictnessError;
use serde::{Deserialize, Serialize};

/// Size limits a structured-output contract must respect
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ContractLimits {
    /// Maximum levels of object nesting (the root object is level 1)
    pub max_nesting_depth: usize,

    /// Maximum number of object properties across the whole contract
    pub max_properties: usize,

    /// Maximum total characters across all property names
    pub max_total_name_chars: usize,
}

impl Default for ContractLimits {
    fn default() -> Self {
        Self::openai()
    }
}

impl ContractLimits {
    /// Limits enforced by current OpenAI structured outputs
    pub fn openai() -> Self {
        Self {
            max_nesting_depth: 10,
            max_properties: 5000,
            max_total_name_chars: 120_000,
        }
    }

    /// Limits of earlier structured-output releases and small local models
    pub fn legacy() -> Self {
        Self {
            max_nesting_depth: 5,
            max_properties: 100,
            max_total_name_chars: 15_000,
        }
    }

    /// Reject limits that would refuse every contract
    pub fn validate(&self) -> Result<(), StrictnessError> {
        if self.max_nesting_depth == 0 {
            return Err(StrictnessError::Config(
                "max_nesting_depth must be at least 1".to_string(),
            ));
        }
        if self.max_properties == 0 {
            return Err(StrictnessError::Config(
                "max_properties must be at least 1".to_string(),
            ));
        }
        if self.max_total_name_chars == 0 {
            return Err(StrictnessError::Config(
                "max_total_name_chars must be at least 1".to_string(),
            ));
        }
        Ok(())
    }
}

//! System prompt construction for chunk extraction

use crate::config::DEFAULT_INSTRUCTIONS;
use serde_json::Value;

/// Builds the system prompt sent with each chunk
#[derive(Debug, Clone)]
pub struct PromptBuilder {
    instructions: String,
}

impl PromptBuilder {
    /// Create a builder with the default extraction instructions
    pub fn new() -> Self {
        Self::with_instructions(DEFAULT_INSTRUCTIONS)
    }

    /// Create a builder with custom instructions
    pub fn with_instructions(instructions: impl Into<String>) -> Self {
        Self {
            instructions: instructions.into(),
        }
    }

    /// Instructions shared by every chunk
    pub fn instructions(&self) -> &str {
        &self.instructions
    }

    /// Build the system prompt for one chunk
    ///
    /// Data accumulated from earlier chunks is appended for the model to merge
    /// and update. An absent or empty previous result adds nothing.
    pub fn system_prompt(&self, previous: Option<&Value>) -> String {
        let mut prompt = self.instructions.clone();

        if let Some(previous) = previous.filter(|v| has_content(v)) {
            let rendered =
                serde_json::to_string_pretty(previous).unwrap_or_else(|_| previous.to_string());
            prompt.push_str("\n\nPrevious data (merge and update):\n");
            prompt.push_str(&rendered);
        }

        prompt
    }
}

impl Default for PromptBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// False for `null` and `{}`
pub(crate) fn has_content(value: &Value) -> bool {
    match value {
        Value::Null => false,
        Value::Object(map) => !map.is_empty(),
        _ => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_first_chunk_prompt() {
        let prompt = PromptBuilder::new().system_prompt(None);
        assert_eq!(prompt, DEFAULT_INSTRUCTIONS);
    }

    #[test]
    fn test_previous_data_appended() {
        let previous = json!({ "title": "Lease", "parties": ["Alpha"] });
        let prompt = PromptBuilder::new().system_prompt(Some(&previous));

        assert!(prompt.starts_with(DEFAULT_INSTRUCTIONS));
        assert!(prompt.contains("Previous data (merge and update):\n{"));
        assert!(prompt.contains("\"title\": \"Lease\""));
    }

    #[test]
    fn test_empty_previous_data_ignored() {
        let builder = PromptBuilder::with_instructions("Extract.");
        assert_eq!(builder.system_prompt(Some(&json!({}))), "Extract.");
        assert_eq!(builder.system_prompt(Some(&Value::Null)), "Extract.");
        assert_eq!(builder.instructions(), "Extract.");
    }
}

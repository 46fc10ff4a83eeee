//! Strict output contract validation

use crate::{ContractLimits, StrictnessError};
use docextract_domain::{CompiledSchema, OutputContract};
use serde_json::{Map, Value};
use std::fmt;
use tracing::{error, info};

/// A single strict-output rule broken by a contract
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Violation {
    /// Root of the contract is not an object
    RootNotObject,

    /// Object accepts undeclared properties
    AdditionalPropertiesAllowed {
        /// Path of the object
        path: String,
    },

    /// Object declares properties that are not required
    NotAllRequired {
        /// Path of the object
        path: String,
        /// Declared but optional properties
        missing: Vec<String>,
    },

    /// Array without an element schema
    MissingItems {
        /// Path of the array
        path: String,
    },

    /// Node with neither `type` nor `anyOf`
    UntypedNode {
        /// Path of the node
        path: String,
    },

    /// Object nested deeper than allowed
    NestingTooDeep {
        /// Path of the first object past the limit
        path: String,
        /// Allowed depth
        limit: usize,
    },

    /// Too many properties across the contract
    TooManyProperties {
        /// Properties counted
        count: usize,
        /// Allowed properties
        limit: usize,
    },

    /// Property names too long in total
    NamesTooLong {
        /// Characters counted
        count: usize,
        /// Allowed characters
        limit: usize,
    },
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Violation::RootNotObject => write!(f, "root must be an object"),
            Violation::AdditionalPropertiesAllowed { path } => {
                write!(f, "{}: additionalProperties must be false", path)
            }
            Violation::NotAllRequired { path, missing } => {
                write!(f, "{}: properties not required: {}", path, missing.join(", "))
            }
            Violation::MissingItems { path } => write!(f, "{}: array has no items schema", path),
            Violation::UntypedNode { path } => write!(f, "{}: node has no type", path),
            Violation::NestingTooDeep { path, limit } => {
                write!(f, "{}: nesting exceeds {} levels", path, limit)
            }
            Violation::TooManyProperties { count, limit } => {
                write!(f, "{} properties exceed the limit of {}", count, limit)
            }
            Violation::NamesTooLong { count, limit } => {
                write!(f, "{} property name characters exceed the limit of {}", count, limit)
            }
        }
    }
}

/// Size figures gathered while walking a contract
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ContractStats {
    /// Deepest object level reached (root = 1)
    pub max_depth: usize,
    /// Object properties across the contract
    pub properties: usize,
    /// Characters across all property names
    pub name_chars: usize,
}

/// Validates output contracts against strict structured-output rules
///
/// Run once at startup; a failure must abort initialization.
pub struct StrictnessValidator {
    limits: ContractLimits,
}

impl StrictnessValidator {
    /// Create a validator with the given limits
    pub fn new(limits: ContractLimits) -> Self {
        Self { limits }
    }

    /// Create a validator with default limits
    pub fn default_limits() -> Self {
        Self::new(ContractLimits::default())
    }

    /// Limits in force
    pub fn limits(&self) -> &ContractLimits {
        &self.limits
    }

    /// Render the contract of a compiled schema and validate it
    pub fn validate(&self, schema: &CompiledSchema) -> Result<ContractStats, StrictnessError> {
        self.validate_contract(&schema.contract())
    }

    /// Validate an already rendered contract
    pub fn validate_contract(
        &self,
        contract: &OutputContract,
    ) -> Result<ContractStats, StrictnessError> {
        let (stats, violations) = self.inspect(&contract.schema);

        if violations.is_empty() {
            info!(
                contract = %contract.name,
                depth = stats.max_depth,
                properties = stats.properties,
                "Output contract is strict"
            );
            Ok(stats)
        } else {
            for violation in &violations {
                error!(contract = %contract.name, "{}", violation);
            }
            Err(StrictnessError::Violations {
                name: contract.name.clone(),
                violations,
            })
        }
    }

    /// Walk a JSON Schema and collect every violation with size statistics
    pub fn inspect(&self, schema: &Value) -> (ContractStats, Vec<Violation>) {
        let mut walk = Walk {
            limits: &self.limits,
            stats: ContractStats::default(),
            violations: Vec::new(),
        };

        if !has_type(schema, "object") {
            walk.violations.push(Violation::RootNotObject);
        }
        walk.node(schema, "$", 0);

        let Walk {
            stats,
            mut violations,
            ..
        } = walk;

        if stats.properties > self.limits.max_properties {
            violations.push(Violation::TooManyProperties {
                count: stats.properties,
                limit: self.limits.max_properties,
            });
        }
        if stats.name_chars > self.limits.max_total_name_chars {
            violations.push(Violation::NamesTooLong {
                count: stats.name_chars,
                limit: self.limits.max_total_name_chars,
            });
        }

        (stats, violations)
    }
}

struct Walk<'a> {
    limits: &'a ContractLimits,
    stats: ContractStats,
    violations: Vec<Violation>,
}

impl Walk<'_> {
    fn node(&mut self, node: &Value, path: &str, depth: usize) {
        if let Some(branches) = node.get("anyOf").and_then(Value::as_array) {
            for (idx, branch) in branches.iter().enumerate() {
                self.node(branch, &format!("{}<{}>", path, idx), depth);
            }
            return;
        }

        if node.get("type").is_none() {
            self.violations.push(Violation::UntypedNode {
                path: path.to_string(),
            });
            return;
        }

        if has_type(node, "object") {
            self.object(node, path, depth + 1);
        } else if has_type(node, "array") {
            match node.get("items") {
                Some(items) if items.is_object() => {
                    self.node(items, &format!("{}[]", path), depth);
                }
                _ => self.violations.push(Violation::MissingItems {
                    path: path.to_string(),
                }),
            }
        }
    }

    fn object(&mut self, node: &Value, path: &str, depth: usize) {
        if depth > self.limits.max_nesting_depth {
            self.violations.push(Violation::NestingTooDeep {
                path: path.to_string(),
                limit: self.limits.max_nesting_depth,
            });
            return;
        }
        self.stats.max_depth = self.stats.max_depth.max(depth);

        if node.get("additionalProperties") != Some(&Value::Bool(false)) {
            self.violations.push(Violation::AdditionalPropertiesAllowed {
                path: path.to_string(),
            });
        }

        let empty = Map::new();
        let properties = node
            .get("properties")
            .and_then(Value::as_object)
            .unwrap_or(&empty);
        let required: Vec<&str> = node
            .get("required")
            .and_then(Value::as_array)
            .map(|names| names.iter().filter_map(Value::as_str).collect())
            .unwrap_or_default();

        let missing: Vec<String> = properties
            .keys()
            .filter(|key| !required.contains(&key.as_str()))
            .cloned()
            .collect();
        if !missing.is_empty() {
            self.violations.push(Violation::NotAllRequired {
                path: path.to_string(),
                missing,
            });
        }

        for (name, child) in properties {
            self.stats.properties += 1;
            self.stats.name_chars += name.chars().count();
            self.node(child, &format!("{}.{}", path, name), depth);
        }
    }
}

/// True when `type` is `kind` or a type list containing `kind`
fn has_type(node: &Value, kind: &str) -> bool {
    match node.get("type") {
        Some(Value::String(t)) => t == kind,
        Some(Value::Array(types)) => types.iter().any(|t| t.as_str() == Some(kind)),
        _ => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use docextract_domain::SchemaCompiler;
    use serde_json::json;

    fn compile(description: Value) -> CompiledSchema {
        SchemaCompiler::new().compile(&description).unwrap()
    }

    fn contract(schema: Value) -> OutputContract {
        OutputContract {
            name: "Handwritten".to_string(),
            schema,
            strict: true,
        }
    }

    #[test]
    fn test_scalar_only_schema_passes() {
        let schema = compile(json!({
            "properties": {
                "title": { "type": "string" },
                "term_years": { "type": "integer" },
                "rate": { "type": "number" },
                "active": { "type": "boolean" }
            }
        }));

        let stats = StrictnessValidator::default_limits().validate(&schema).unwrap();
        assert_eq!(stats.properties, 4);
        assert_eq!(stats.max_depth, 1);
    }

    #[test]
    fn test_nested_objects_and_arrays_pass() {
        let schema = compile(json!({
            "properties": {
                "parties": {
                    "type": "array",
                    "items": {
                        "type": "object",
                        "properties": {
                            "name": { "type": "string" },
                            "address": {
                                "type": "object",
                                "properties": { "city": { "type": "string" } }
                            }
                        }
                    }
                },
                "tags": { "type": "array" },
                "notes": {}
            }
        }));

        let stats = StrictnessValidator::default_limits().validate(&schema).unwrap();
        assert_eq!(stats.max_depth, 3);
        assert_eq!(stats.properties, 6);
    }

    #[test]
    fn test_open_map_is_rejected() {
        let schema = compile(json!({
            "properties": { "metadata": { "type": "object" } }
        }));

        let err = StrictnessValidator::default_limits().validate(&schema).unwrap_err();
        assert_eq!(
            err.violations(),
            &[Violation::AdditionalPropertiesAllowed {
                path: "$.metadata".to_string()
            }]
        );
        assert!(err.to_string().contains("ContractModel"));
    }

    #[test]
    fn test_optional_property_is_rejected() {
        let raw = contract(json!({
            "type": "object",
            "properties": { "a": { "type": "string" }, "b": { "type": "string" } },
            "required": ["a"],
            "additionalProperties": false
        }));

        let err = StrictnessValidator::default_limits()
            .validate_contract(&raw)
            .unwrap_err();
        assert_eq!(
            err.violations(),
            &[Violation::NotAllRequired {
                path: "$".to_string(),
                missing: vec!["b".to_string()]
            }]
        );
    }

    #[test]
    fn test_missing_items_and_untyped_nodes_are_rejected() {
        let raw = contract(json!({
            "type": "object",
            "properties": { "list": { "type": "array" }, "blob": {} },
            "required": ["list", "blob"],
            "additionalProperties": false
        }));

        let (_, violations) = StrictnessValidator::default_limits().inspect(&raw.schema);
        assert_eq!(
            violations,
            vec![
                Violation::MissingItems {
                    path: "$.list".to_string()
                },
                Violation::UntypedNode {
                    path: "$.blob".to_string()
                },
            ]
        );
    }

    #[test]
    fn test_root_must_be_object() {
        let raw = contract(json!({ "type": "array", "items": { "type": "string" } }));
        let (_, violations) = StrictnessValidator::default_limits().inspect(&raw.schema);
        assert_eq!(violations, vec![Violation::RootNotObject]);
    }

    #[test]
    fn test_nesting_limit() {
        let mut inner = json!({ "type": "string" });
        for _ in 0..6 {
            inner = json!({ "type": "object", "properties": { "child": inner } });
        }
        let schema = compile(inner);

        assert!(StrictnessValidator::default_limits().validate(&schema).is_ok());

        let err = StrictnessValidator::new(ContractLimits::legacy())
            .validate(&schema)
            .unwrap_err();
        assert!(matches!(
            &err.violations()[0],
            Violation::NestingTooDeep { limit: 5, path } if path == "$.child.child.child.child.child"
        ));
    }

    #[test]
    fn test_property_count_limit() {
        let properties: Map<String, Value> = (0..101)
            .map(|i| (format!("field_{}", i), json!({ "type": "string" })))
            .collect();
        let schema = compile(json!({ "properties": properties }));

        assert!(StrictnessValidator::default_limits().validate(&schema).is_ok());

        let err = StrictnessValidator::new(ContractLimits::legacy())
            .validate(&schema)
            .unwrap_err();
        assert_eq!(
            err.violations(),
            &[Violation::TooManyProperties {
                count: 101,
                limit: 100
            }]
        );
    }

    #[test]
    fn test_name_length_limit() {
        let limits = ContractLimits {
            max_total_name_chars: 8,
            ..ContractLimits::default()
        };
        let schema = compile(json!({
            "properties": { "abcde": { "type": "string" }, "fghij": { "type": "string" } }
        }));

        let err = StrictnessValidator::new(limits).validate(&schema).unwrap_err();
        assert_eq!(
            err.violations(),
            &[Violation::NamesTooLong { count: 10, limit: 8 }]
        );
    }

    #[test]
    fn test_any_branches_are_walked() {
        let raw = contract(json!({
            "type": "object",
            "properties": {
                "value": { "anyOf": [{ "type": "string" }, { "description": "untyped" }] }
            },
            "required": ["value"],
            "additionalProperties": false
        }));

        let (_, violations) = StrictnessValidator::default_limits().inspect(&raw.schema);
        assert_eq!(
            violations,
            vec![Violation::UntypedNode {
                path: "$.value<1>".to_string()
            }]
        );
    }
}

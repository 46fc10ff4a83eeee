//! Descriptor-driven conformance checks for model replies

use crate::schema::{ObjectNode, ScalarKind, SchemaNode};
use serde_json::Value;
use thiserror::Error;

/// A value that does not match its compiled descriptor
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ConformError {
    /// Value has the wrong JSON kind
    #[error("{path}: expected {expected}, found {found}")]
    TypeMismatch {
        /// JSON path of the offending value
        path: String,
        /// Expected kind
        expected: String,
        /// Actual kind
        found: String,
    },

    /// Declared field absent from the object
    #[error("{path}: missing required field '{field}'")]
    MissingField {
        /// JSON path of the object
        path: String,
        /// Field name
        field: String,
    },

    /// Undeclared field present in a closed object
    #[error("{path}: unknown field '{field}'")]
    UnknownField {
        /// JSON path of the object
        path: String,
        /// Field name
        field: String,
    },
}

impl SchemaNode {
    /// Check `value` against this descriptor, starting at JSON path `$`
    pub fn conform(&self, value: &Value) -> Result<(), ConformError> {
        conform_at(self, value, "$")
    }
}

impl ObjectNode {
    /// Check `value` against this closed object
    pub fn conform(&self, value: &Value) -> Result<(), ConformError> {
        conform_object(self, value, "$")
    }
}

fn conform_at(node: &SchemaNode, value: &Value, path: &str) -> Result<(), ConformError> {
    match node {
        // Rendered as a union of nullable scalars
        SchemaNode::Any => match value {
            Value::Array(_) | Value::Object(_) => Err(mismatch(path, "scalar", value)),
            _ => Ok(()),
        },
        SchemaNode::Scalar(kind) => conform_scalar(*kind, value, path),
        SchemaNode::Map => match value {
            Value::Object(_) => Ok(()),
            other => Err(mismatch(path, "map", other)),
        },
        SchemaNode::Array(items) => {
            let elements = value.as_array().ok_or_else(|| mismatch(path, "array", value))?;
            for (idx, element) in elements.iter().enumerate() {
                conform_at(items, element, &format!("{}[{}]", path, idx))?;
            }
            Ok(())
        }
        SchemaNode::Object(object) => conform_object(object, value, path),
    }
}

fn conform_object(object: &ObjectNode, value: &Value, path: &str) -> Result<(), ConformError> {
    let map = value.as_object().ok_or_else(|| mismatch(path, "object", value))?;

    for field in &object.fields {
        let child = map.get(&field.name).ok_or_else(|| ConformError::MissingField {
            path: path.to_string(),
            field: field.name.clone(),
        })?;
        conform_at(&field.node, child, &format!("{}.{}", path, field.name))?;
    }

    if let Some(extra) = map.keys().find(|key| object.field(key).is_none()) {
        return Err(ConformError::UnknownField {
            path: path.to_string(),
            field: extra.clone(),
        });
    }

    Ok(())
}

fn conform_scalar(kind: ScalarKind, value: &Value, path: &str) -> Result<(), ConformError> {
    let ok = match (kind, value) {
        (_, Value::Null) => true,
        (ScalarKind::String, Value::String(_)) => true,
        (ScalarKind::Boolean, Value::Bool(_)) => true,
        (ScalarKind::Number, Value::Number(_)) => true,
        (ScalarKind::Integer, Value::Number(n)) => {
            n.is_i64() || n.is_u64() || n.as_f64().is_some_and(|f| f.fract() == 0.0)
        }
        _ => false,
    };

    if ok {
        Ok(())
    } else {
        Err(mismatch(path, kind.as_str(), value))
    }
}

fn mismatch(path: &str, expected: &str, found: &Value) -> ConformError {
    ConformError::TypeMismatch {
        path: path.to_string(),
        expected: expected.to_string(),
        found: kind_of(found).to_string(),
    }
}

fn kind_of(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(n) if n.is_f64() => "number",
        Value::Number(_) => "integer",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::SchemaCompiler;
    use serde_json::json;

    fn contract_schema() -> ObjectNode {
        SchemaCompiler::new()
            .compile(&json!({
                "properties": {
                    "title": { "type": "string" },
                    "term_years": { "type": "integer" },
                    "parties": {
                        "type": "array",
                        "items": {
                            "type": "object",
                            "properties": { "name": { "type": "string" } }
                        }
                    },
                    "extra": { "type": "object" },
                    "note": { "description": "untyped" }
                }
            }))
            .unwrap()
            .root
    }

    #[test]
    fn test_conforming_value_passes() {
        let value = json!({
            "title": "Provider Agreement",
            "term_years": 3,
            "parties": [{ "name": "Acme" }],
            "extra": { "anything": [1, 2] },
            "note": "free text"
        });
        assert!(contract_schema().conform(&value).is_ok());
    }

    #[test]
    fn test_null_scalars_allowed() {
        let value = json!({
            "title": null,
            "term_years": null,
            "parties": [],
            "extra": {},
            "note": null
        });
        assert!(contract_schema().conform(&value).is_ok());
    }

    #[test]
    fn test_integral_float_accepted_for_integer() {
        let value = json!({ "title": "x", "term_years": 3.0, "parties": [], "extra": {}, "note": 1 });
        assert!(contract_schema().conform(&value).is_ok());

        let value = json!({ "title": "x", "term_years": 3.5, "parties": [], "extra": {}, "note": 1 });
        assert!(matches!(
            contract_schema().conform(&value),
            Err(ConformError::TypeMismatch { .. })
        ));
    }

    #[test]
    fn test_missing_field_rejected() {
        let value = json!({ "title": "x", "parties": [], "extra": {}, "note": 1 });
        assert_eq!(
            contract_schema().conform(&value),
            Err(ConformError::MissingField {
                path: "$".to_string(),
                field: "term_years".to_string()
            })
        );
    }

    #[test]
    fn test_unknown_field_rejected() {
        let value = json!({
            "title": "x",
            "term_years": 1,
            "parties": [],
            "extra": {},
            "note": null,
            "surprise": true
        });
        assert!(matches!(
            contract_schema().conform(&value),
            Err(ConformError::UnknownField { field, .. }) if field == "surprise"
        ));
    }

    #[test]
    fn test_error_path_points_into_arrays() {
        let value = json!({
            "title": "x",
            "term_years": 1,
            "parties": [{ "name": "ok" }, { "name": 7 }],
            "extra": {},
            "note": null
        });
        let err = contract_schema().conform(&value).unwrap_err();
        assert_eq!(err.to_string(), "$.parties[1].name: expected string, found integer");
    }

    #[test]
    fn test_untyped_field_accepts_only_scalars() {
        for note in [json!("text"), json!(4.5), json!(false), Value::Null] {
            let value = json!({
                "title": "x",
                "term_years": 1,
                "parties": [],
                "extra": {},
                "note": note
            });
            assert!(contract_schema().conform(&value).is_ok());
        }

        for note in [json!({ "nested": 1 }), json!(["a"])] {
            let value = json!({
                "title": "x",
                "term_years": 1,
                "parties": [],
                "extra": {},
                "note": note
            });
            let err = contract_schema().conform(&value).unwrap_err();
            assert!(err.to_string().starts_with("$.note: expected scalar"), "{}", err);
        }
    }
}

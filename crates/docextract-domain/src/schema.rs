//! Schema module - compiled type descriptors and the output contract

use serde::{Deserialize, Serialize};
use serde_json::{json, Map, Value};
use std::fmt;

/// Default name of the root model when none is given
pub const DEFAULT_MODEL_NAME: &str = "ContractModel";

/// Scalar leaf kinds supported by the structured-output contract
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ScalarKind {
    /// UTF-8 string
    String,
    /// Whole number
    Integer,
    /// Floating point number
    Number,
    /// true / false
    Boolean,
}

impl ScalarKind {
    /// JSON Schema type name
    pub fn as_str(&self) -> &'static str {
        match self {
            ScalarKind::String => "string",
            ScalarKind::Integer => "integer",
            ScalarKind::Number => "number",
            ScalarKind::Boolean => "boolean",
        }
    }

    /// Parse a JSON Schema type name
    pub fn parse(s: &str) -> Option<Self> {
        match s {
            "string" => Some(ScalarKind::String),
            "integer" => Some(ScalarKind::Integer),
            "number" => Some(ScalarKind::Number),
            "boolean" => Some(ScalarKind::Boolean),
            _ => None,
        }
    }
}

impl fmt::Display for ScalarKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A compiled type descriptor
///
/// Trees are immutable once built and are shared read-only across every
/// extraction request.
#[derive(Debug, Clone, PartialEq)]
pub enum SchemaNode {
    /// Nullable scalar leaf
    Scalar(ScalarKind),
    /// Closed object: only the declared fields, all of them mandatory
    Object(ObjectNode),
    /// Open key-value map of unconstrained values (object without properties)
    Map,
    /// Homogeneous array
    Array(Box<SchemaNode>),
    /// Unconstrained value (unknown or missing `type`)
    Any,
}

/// A closed object with an ordered list of mandatory fields
#[derive(Debug, Clone, PartialEq, Default)]
pub struct ObjectNode {
    /// Diagnostic model name (`Party`, `Party_Address`, ...)
    pub name: String,
    /// Fields in declaration order
    pub fields: Vec<Field>,
}

/// A single declared field of an object node
#[derive(Debug, Clone, PartialEq)]
pub struct Field {
    /// Property name
    pub name: String,
    /// Field type
    pub node: SchemaNode,
    /// Human description forwarded to the model
    pub description: String,
}

impl Field {
    /// Every field of a compiled object is mandatory.
    ///
    /// "Missing" values are expressed with the nullable scalar encoding,
    /// never by omitting the field.
    pub fn is_required(&self) -> bool {
        true
    }
}

impl ObjectNode {
    /// Create an empty closed object
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            fields: Vec::new(),
        }
    }

    /// Look up a field by name
    pub fn field(&self, name: &str) -> Option<&Field> {
        self.fields.iter().find(|f| f.name == name)
    }

    /// Field names in declaration order
    pub fn field_names(&self) -> impl Iterator<Item = &str> {
        self.fields.iter().map(|f| f.name.as_str())
    }
}

impl SchemaNode {
    /// Short kind label for diagnostics
    pub fn kind_name(&self) -> &'static str {
        match self {
            SchemaNode::Scalar(kind) => kind.as_str(),
            SchemaNode::Object(_) => "object",
            SchemaNode::Map => "map",
            SchemaNode::Array(_) => "array",
            SchemaNode::Any => "any",
        }
    }

    /// Render this node as a JSON Schema fragment for the output contract
    pub fn to_json_schema(&self, description: Option<&str>) -> Value {
        let mut schema = match self {
            SchemaNode::Scalar(kind) => json!({ "type": [kind.as_str(), "null"] }),
            SchemaNode::Object(object) => object.to_json_schema(),
            SchemaNode::Map => json!({ "type": "object", "additionalProperties": true }),
            SchemaNode::Array(items) => json!({
                "type": "array",
                "items": items.to_json_schema(None),
            }),
            SchemaNode::Any => json!({
                "anyOf": [
                    { "type": "string" },
                    { "type": "number" },
                    { "type": "boolean" },
                    { "type": "null" },
                ]
            }),
        };

        if let (Some(text), Some(obj)) = (description, schema.as_object_mut()) {
            if !text.is_empty() {
                obj.insert("description".to_string(), Value::String(text.to_string()));
            }
        }
        schema
    }
}

impl ObjectNode {
    /// Render as a closed JSON Schema object: every property required,
    /// no additional properties.
    pub fn to_json_schema(&self) -> Value {
        let mut properties = Map::new();
        let mut required = Vec::with_capacity(self.fields.len());

        for field in &self.fields {
            properties.insert(
                field.name.clone(),
                field.node.to_json_schema(Some(&field.description)),
            );
            if field.is_required() {
                required.push(Value::String(field.name.clone()));
            }
        }

        json!({
            "type": "object",
            "properties": Value::Object(properties),
            "required": Value::Array(required),
            "additionalProperties": false,
        })
    }
}

/// A schema compiled once at startup
#[derive(Debug, Clone, PartialEq)]
pub struct CompiledSchema {
    /// Root model; always a closed object
    pub root: ObjectNode,
}

impl CompiledSchema {
    /// Root model name
    pub fn name(&self) -> &str {
        &self.root.name
    }

    /// The root as a generic node (for conformance checks)
    pub fn root_node(&self) -> SchemaNode {
        SchemaNode::Object(self.root.clone())
    }

    /// Render the strict structured-output contract
    pub fn contract(&self) -> OutputContract {
        OutputContract {
            name: self.root.name.clone(),
            schema: self.root.to_json_schema(),
            strict: true,
        }
    }
}

/// The JSON Schema contract handed to the model-call service
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutputContract {
    /// Contract name (`json_schema.name`)
    pub name: String,
    /// Rendered JSON Schema
    pub schema: Value,
    /// Whether the service must enforce the schema exactly
    pub strict: bool,
}

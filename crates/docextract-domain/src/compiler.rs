//! Schema compiler - JSON-Schema-like description to [`CompiledSchema`]
//!
//! Rules:
//! - `object` recurses into `properties`; every property becomes a mandatory
//!   field regardless of any `required` list in the source. An object with no
//!   properties degrades to an open [`SchemaNode::Map`].
//! - `array` recurses into `items`; missing or empty `items` defaults the
//!   element type to string with a warning.
//! - `string | integer | number | boolean` map 1:1 to scalars.
//! - anything else (unknown or missing `type`) becomes [`SchemaNode::Any`].

use crate::error::SchemaError;
use crate::schema::{CompiledSchema, Field, ObjectNode, ScalarKind, SchemaNode, DEFAULT_MODEL_NAME};
use serde_json::Value;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use tracing::{error, info, warn};

/// Builds compiled schemas from JSON descriptions
#[derive(Debug, Clone)]
pub struct SchemaCompiler {
    model_name: String,
    app_root: Option<PathBuf>,
}

impl Default for SchemaCompiler {
    fn default() -> Self {
        Self::new()
    }
}

impl SchemaCompiler {
    /// Create a compiler producing a root model named `ContractModel`
    pub fn new() -> Self {
        Self {
            model_name: DEFAULT_MODEL_NAME.to_string(),
            app_root: None,
        }
    }

    /// Use a different root model name
    pub fn with_model_name(mut self, name: impl Into<String>) -> Self {
        self.model_name = name.into();
        self
    }

    /// Fallback directory searched after the current working directory
    pub fn with_app_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.app_root = Some(root.into());
        self
    }

    /// Locate, read and compile a schema file
    pub fn load(&self, schema_path: &str) -> Result<CompiledSchema, SchemaError> {
        let path = self.resolve(schema_path)?;
        info!("Loading schema from: {}", path.display());

        let text = fs::read_to_string(&path).map_err(|source| SchemaError::Read {
            path: path.clone(),
            source,
        })?;

        self.compile_str(&text).inspect_err(|e| {
            error!("Failed to build model from schema: {}", e);
        })
    }

    /// Resolve a configured schema path.
    ///
    /// Absolute paths are used as given. Relative paths are tried against the
    /// current working directory, then against the application root; the
    /// first existing candidate wins.
    pub fn resolve(&self, schema_path: &str) -> Result<PathBuf, SchemaError> {
        let normalized = schema_path.replace('\\', "/");
        let requested = PathBuf::from(&normalized);

        if requested.is_absolute() {
            if requested.exists() {
                return Ok(requested);
            }
            return Err(SchemaError::NotFound {
                requested: schema_path.to_string(),
                searched: vec![requested],
            });
        }

        let mut searched = Vec::new();
        if let Ok(cwd) = env::current_dir() {
            searched.push(cwd.join(&requested));
        }
        if let Some(root) = &self.app_root {
            searched.push(root.join(&requested));
        }

        if let Some(found) = searched.iter().find(|p| p.exists()) {
            return Ok(found.clone());
        }

        error!("Schema file not found.");
        for candidate in &searched {
            error!("Searched: {}", candidate.display());
        }
        Err(SchemaError::NotFound {
            requested: schema_path.to_string(),
            searched,
        })
    }

    /// Compile a schema from JSON text
    pub fn compile_str(&self, text: &str) -> Result<CompiledSchema, SchemaError> {
        let value: Value = serde_json::from_str(text)?;
        self.compile(&value)
    }

    /// Compile a parsed schema description.
    ///
    /// The root's `properties` always form the closed root model.
    pub fn compile(&self, description: &Value) -> Result<CompiledSchema, SchemaError> {
        let root = description
            .as_object()
            .ok_or_else(|| SchemaError::InvalidRoot(json_kind(description).to_string()))?;

        let mut model = ObjectNode::new(self.model_name.clone());
        if let Some(properties) = root.get("properties").and_then(Value::as_object) {
            for (name, info) in properties {
                model.fields.push(Field {
                    name: name.clone(),
                    node: compile_node(info, &capitalize(name)),
                    description: description_of(info),
                });
            }
        }

        Ok(CompiledSchema { root: model })
    }
}

/// Recursively resolve one schema fragment
fn compile_node(info: &Value, name_hint: &str) -> SchemaNode {
    let json_type = info.get("type").and_then(Value::as_str);

    match json_type {
        Some("array") => {
            let items = info.get("items").filter(|items| !is_empty_schema(items));
            match items {
                Some(items) => SchemaNode::Array(Box::new(compile_node(items, &format!("{}Item", name_hint)))),
                None => {
                    warn!(
                        "Array field '{}' is missing 'items' schema. Defaulting to list of strings.",
                        name_hint
                    );
                    SchemaNode::Array(Box::new(SchemaNode::Scalar(ScalarKind::String)))
                }
            }
        }
        Some("object") => {
            let properties = info
                .get("properties")
                .and_then(Value::as_object)
                .filter(|props| !props.is_empty());

            let Some(properties) = properties else {
                return SchemaNode::Map;
            };

            let mut object = ObjectNode::new(name_hint);
            for (field_name, field_info) in properties {
                object.fields.push(Field {
                    name: field_name.clone(),
                    node: compile_node(field_info, &format!("{}_{}", name_hint, capitalize(field_name))),
                    description: description_of(field_info),
                });
            }
            SchemaNode::Object(object)
        }
        Some(other) => ScalarKind::parse(other).map_or(SchemaNode::Any, SchemaNode::Scalar),
        None => SchemaNode::Any,
    }
}

fn is_empty_schema(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::Object(map) => map.is_empty(),
        Value::Array(items) => items.is_empty(),
        _ => false,
    }
}

fn description_of(info: &Value) -> String {
    info.get("description")
        .and_then(Value::as_str)
        .unwrap_or_default()
        .to_string()
}

fn capitalize(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars.flat_map(char::to_lowercase)).collect(),
        None => String::new(),
    }
}

fn json_kind(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// Convenience for loading against a specific root without building a compiler
pub fn load_schema(schema_path: &str, app_root: Option<&Path>) -> Result<CompiledSchema, SchemaError> {
    let compiler = match app_root {
        Some(root) => SchemaCompiler::new().with_app_root(root),
        None => SchemaCompiler::new(),
    };
    compiler.load(schema_path)
}

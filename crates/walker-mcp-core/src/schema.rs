//! Conversion between JSON Schema and parameter lists.
//!
//! Parameter contracts are declared as typed structs deriving
//! [`schemars::JsonSchema`], flattened into an ordered [`ParameterSpec`] list,
//! and rendered back as a plain draft-07 compatible object schema when
//! advertised to clients.

use schemars::JsonSchema;
use serde_json::{json, Value};

use crate::descriptor::{JsonObject, ParameterSpec, ParameterType};
use crate::{Error, Result};

/// Derive the parameter list of a typed parameter struct.
pub fn parameters_for<T: JsonSchema>() -> Result<Vec<ParameterSpec>> {
    let schema = schemars::schema_for!(T);
    let value = serde_json::to_value(&schema)?;
    parameters_from_schema(&value)
}

/// Flatten an object schema into its parameter list.
///
/// Only flat objects with primitive or nullable-primitive properties are
/// supported; `$ref` properties are rejected.
pub fn parameters_from_schema(schema: &Value) -> Result<Vec<ParameterSpec>> {
    let object = schema
        .as_object()
        .ok_or_else(|| Error::InvalidDescriptor("input schema must be an object".to_string()))?;

    let required: Vec<&str> = object
        .get("required")
        .and_then(Value::as_array)
        .map(|names| names.iter().filter_map(Value::as_str).collect())
        .unwrap_or_default();

    let Some(properties) = object.get("properties").and_then(Value::as_object) else {
        return Ok(Vec::new());
    };

    properties
        .iter()
        .map(|(name, property)| {
            let kind = property_type(property).ok_or_else(|| {
                Error::InvalidDescriptor(format!("parameter '{name}' has an unsupported schema"))
            })?;
            Ok(ParameterSpec {
                name: name.clone(),
                kind,
                required: required.contains(&name.as_str()),
                description: property
                    .get("description")
                    .and_then(Value::as_str)
                    .map(str::to_string),
            })
        })
        .collect()
}

/// Resolve the primitive type of a property schema.
///
/// Handles `{"type": "string"}`, `{"type": ["string", "null"]}` and
/// `{"anyOf": [{"type": "string"}, {"type": "null"}]}`.
fn property_type(property: &Value) -> Option<ParameterType> {
    match property.get("type") {
        Some(Value::String(name)) => ParameterType::from_schema_type(name),
        Some(Value::Array(names)) => names
            .iter()
            .filter_map(Value::as_str)
            .find(|name| *name != "null")
            .and_then(ParameterType::from_schema_type),
        _ => property
            .get("anyOf")
            .and_then(Value::as_array)
            .and_then(|branches| {
                branches
                    .iter()
                    .filter(|branch| !is_null_type(branch))
                    .find_map(property_type)
            }),
    }
}

fn is_null_type(schema: &Value) -> bool {
    schema.get("type").and_then(Value::as_str) == Some("null")
}

/// Render a parameter list as an object schema.
pub fn render_input_schema(parameters: &[ParameterSpec]) -> JsonObject {
    let mut properties = JsonObject::new();
    let mut required = Vec::new();

    for parameter in parameters {
        let mut property = JsonObject::new();
        property.insert("type".to_string(), json!(parameter.kind.as_str()));
        if let Some(description) = &parameter.description {
            property.insert("description".to_string(), json!(description));
        }
        properties.insert(parameter.name.clone(), Value::Object(property));
        if parameter.required {
            required.push(json!(parameter.name));
        }
    }

    let mut schema = JsonObject::new();
    schema.insert("type".to_string(), json!("object"));
    schema.insert("properties".to_string(), Value::Object(properties));
    if !required.is_empty() {
        schema.insert("required".to_string(), Value::Array(required));
    }
    schema
}

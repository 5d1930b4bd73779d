//! Operation descriptors: the registered metadata and handler for one
//! invocable capability.

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use schemars::JsonSchema;
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::schema;
use crate::{Error, Result};

/// A JSON object, as carried by tool arguments and input schemas.
pub type JsonObject = serde_json::Map<String, Value>;

/// JSON type of a declared parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ParameterType {
    /// JSON string
    String,
    /// JSON number without a fractional part
    Integer,
    /// Any JSON number
    Number,
    /// JSON boolean
    Boolean,
    /// JSON object
    Object,
    /// JSON array
    Array,
}

impl ParameterType {
    /// JSON Schema name of this type.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::String => "string",
            Self::Integer => "integer",
            Self::Number => "number",
            Self::Boolean => "boolean",
            Self::Object => "object",
            Self::Array => "array",
        }
    }

    /// Parse a JSON Schema `type` keyword.
    pub fn from_schema_type(name: &str) -> Option<Self> {
        match name {
            "string" => Some(Self::String),
            "integer" => Some(Self::Integer),
            "number" => Some(Self::Number),
            "boolean" => Some(Self::Boolean),
            "object" => Some(Self::Object),
            "array" => Some(Self::Array),
            _ => None,
        }
    }

    /// Check whether a JSON value is of this type.
    pub fn matches(&self, value: &Value) -> bool {
        match self {
            Self::String => value.is_string(),
            Self::Integer => value.is_i64() || value.is_u64(),
            Self::Number => value.is_number(),
            Self::Boolean => value.is_boolean(),
            Self::Object => value.is_object(),
            Self::Array => value.is_array(),
        }
    }
}

impl fmt::Display for ParameterType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One entry of an operation's input contract.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ParameterSpec {
    /// Parameter name
    pub name: String,
    /// Expected JSON type
    #[serde(rename = "type")]
    pub kind: ParameterType,
    /// Whether the caller must supply it
    pub required: bool,
    /// Human-readable description
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl ParameterSpec {
    /// A parameter the caller must supply.
    pub fn required(
        name: impl Into<String>,
        kind: ParameterType,
        description: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            kind,
            required: true,
            description: Some(description.into()),
        }
    }

    /// A parameter the caller may omit.
    pub fn optional(
        name: impl Into<String>,
        kind: ParameterType,
        description: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            kind,
            required: false,
            description: Some(description.into()),
        }
    }
}

/// Arguments of one invocation, keyed by parameter name.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Arguments(JsonObject);

impl Arguments {
    /// Empty argument set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Look up a raw argument value.
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.0.get(name)
    }

    /// Look up a string argument.
    pub fn get_str(&self, name: &str) -> Option<&str> {
        self.0.get(name).and_then(Value::as_str)
    }

    /// Add or replace an argument.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<Value>) {
        self.0.insert(name.into(), value.into());
    }

    /// Number of supplied arguments.
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether no arguments were supplied.
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Deserialize the arguments into a typed parameter struct.
    pub fn parse<T: DeserializeOwned>(&self) -> Result<T> {
        serde_json::from_value(Value::Object(self.0.clone()))
            .map_err(|e| Error::MalformedRequest(format!("invalid arguments: {e}")))
    }

    /// Consume into the underlying JSON object.
    pub fn into_inner(self) -> JsonObject {
        self.0
    }
}

impl From<JsonObject> for Arguments {
    fn from(object: JsonObject) -> Self {
        Self(object)
    }
}

impl From<Option<JsonObject>> for Arguments {
    fn from(object: Option<JsonObject>) -> Self {
        Self(object.unwrap_or_default())
    }
}

impl TryFrom<Value> for Arguments {
    type Error = Error;

    fn try_from(value: Value) -> Result<Self> {
        match value {
            Value::Object(object) => Ok(Self(object)),
            Value::Null => Ok(Self::default()),
            other => Err(Error::MalformedRequest(format!(
                "arguments must be an object, got {other}"
            ))),
        }
    }
}

/// Executes one operation.
///
/// Handlers are async so that they may suspend on I/O; a handler that does
/// no I/O simply returns without awaiting anything.
#[async_trait]
pub trait OperationHandler: Send + Sync {
    /// Run the operation with already-validated arguments.
    async fn invoke(&self, arguments: Arguments) -> Result<String>;
}

/// Registered metadata (name, input contract, handler) for one operation.
#[derive(Clone)]
pub struct OperationDescriptor {
    name: String,
    description: String,
    parameters: Vec<ParameterSpec>,
    handler: Arc<dyn OperationHandler>,
}

impl OperationDescriptor {
    /// Create a descriptor with no parameters.
    pub fn new<H>(name: impl Into<String>, description: impl Into<String>, handler: H) -> Self
    where
        H: OperationHandler + 'static,
    {
        Self {
            name: name.into(),
            description: description.into(),
            parameters: Vec::new(),
            handler: Arc::new(handler),
        }
    }

    /// Append one parameter to the input contract.
    pub fn with_parameter(mut self, parameter: ParameterSpec) -> Self {
        self.parameters.push(parameter);
        self
    }

    /// Declare the input contract from a typed parameter struct.
    ///
    /// Doc comments on the fields become parameter descriptions and
    /// non-optional fields become required parameters.
    pub fn with_parameters_from<T: JsonSchema>(mut self) -> Result<Self> {
        self.parameters = schema::parameters_for::<T>()?;
        Ok(self)
    }

    /// Operation name.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Human-readable description.
    pub fn description(&self) -> &str {
        &self.description
    }

    /// Declared parameters, in declaration order.
    pub fn parameters(&self) -> &[ParameterSpec] {
        &self.parameters
    }

    /// Shared handle to the handler.
    pub fn handler(&self) -> Arc<dyn OperationHandler> {
        Arc::clone(&self.handler)
    }

    /// JSON Schema object advertised to callers.
    pub fn input_schema(&self) -> JsonObject {
        schema::render_input_schema(&self.parameters)
    }

    /// Check arguments against the declared parameters.
    ///
    /// Undeclared arguments are ignored.
    pub fn validate(&self, arguments: &Arguments) -> Result<()> {
        for parameter in &self.parameters {
            match arguments.get(&parameter.name) {
                None if parameter.required => {
                    return Err(Error::MalformedRequest(format!(
                        "missing required argument '{}'",
                        parameter.name
                    )));
                }
                Some(value) if !parameter.kind.matches(value) => {
                    return Err(Error::MalformedRequest(format!(
                        "argument '{}' must be of type {}",
                        parameter.name, parameter.kind
                    )));
                }
                _ => {}
            }
        }
        Ok(())
    }
}

impl fmt::Debug for OperationDescriptor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OperationDescriptor")
            .field("name", &self.name)
            .field("description", &self.description)
            .field("parameters", &self.parameters)
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    struct Echo;

    #[async_trait]
    impl OperationHandler for Echo {
        async fn invoke(&self, arguments: Arguments) -> Result<String> {
            Ok(arguments.get_str("text").unwrap_or_default().to_string())
        }
    }

    fn echo_descriptor() -> OperationDescriptor {
        OperationDescriptor::new("echo", "Echo text back", Echo)
            .with_parameter(ParameterSpec::required(
                "text",
                ParameterType::String,
                "Text to echo",
            ))
            .with_parameter(ParameterSpec::optional(
                "repeat",
                ParameterType::Integer,
                "Repeat count",
            ))
    }

    fn args(value: Value) -> Arguments {
        Arguments::try_from(value).unwrap()
    }

    #[test]
    fn test_parameter_type_matches() {
        assert!(ParameterType::String.matches(&json!("")));
        assert!(!ParameterType::String.matches(&json!(1)));
        assert!(ParameterType::Integer.matches(&json!(3)));
        assert!(!ParameterType::Integer.matches(&json!(3.5)));
        assert!(ParameterType::Number.matches(&json!(3.5)));
        assert!(ParameterType::Boolean.matches(&json!(false)));
        assert!(ParameterType::Object.matches(&json!({})));
        assert!(ParameterType::Array.matches(&json!([])));
    }

    #[test]
    fn test_validate_accepts_required_only() {
        let descriptor = echo_descriptor();
        assert!(descriptor.validate(&args(json!({"text": "hi"}))).is_ok());
    }

    #[test]
    fn test_validate_missing_required() {
        let descriptor = echo_descriptor();
        let err = descriptor.validate(&Arguments::new()).unwrap_err();
        assert!(matches!(err, Error::MalformedRequest(_)));
        assert_eq!(
            err.to_string(),
            "Malformed request: missing required argument 'text'"
        );
    }

    #[test]
    fn test_validate_wrong_type() {
        let descriptor = echo_descriptor();
        let err = descriptor
            .validate(&args(json!({"text": "hi", "repeat": "twice"})))
            .unwrap_err();
        assert_eq!(
            err.to_string(),
            "Malformed request: argument 'repeat' must be of type integer"
        );
    }

    #[test]
    fn test_validate_ignores_extra_arguments() {
        let descriptor = echo_descriptor();
        assert!(descriptor
            .validate(&args(json!({"text": "hi", "verbose": true})))
            .is_ok());
    }

    #[test]
    fn test_arguments_from_non_object() {
        let err = Arguments::try_from(json!(["text"])).unwrap_err();
        assert!(matches!(err, Error::MalformedRequest(_)));
        assert!(Arguments::try_from(Value::Null).unwrap().is_empty());
    }

    #[test]
    fn test_arguments_parse_typed() {
        #[derive(Deserialize)]
        struct Params {
            text: String,
        }

        let parsed: Params = args(json!({"text": "hi"})).parse().unwrap();
        assert_eq!(parsed.text, "hi");

        let err = args(json!({})).parse::<Params>().err().unwrap();
        assert!(matches!(err, Error::MalformedRequest(_)));
    }

    #[tokio::test]
    async fn test_handler_invocation() {
        let descriptor = echo_descriptor();
        let output = descriptor
            .handler()
            .invoke(args(json!({"text": "hello"})))
            .await
            .unwrap();
        assert_eq!(output, "hello");
    }

    #[test]
    fn test_debug_omits_handler() {
        let debug = format!("{:?}", echo_descriptor());
        assert!(debug.contains("echo"));
        assert!(debug.contains(".."));
    }
}

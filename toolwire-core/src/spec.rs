use serde::{Deserialize, Serialize};
use serde_json::json;

use crate::callable::Callable;
use crate::schema::{default_parameters, derive_parameters};
use crate::Value;

pub const MAX_NAME_LEN: usize = 64;

/// Serializable description of a function a model may call.
///
/// The invokable side lives in [`crate::FunctionRegistry`], keyed by `name`.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
pub struct FunctionSpec {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    /// JSON Schema object for the arguments.
    #[serde(default = "default_parameters")]
    pub parameters: Value,
}

impl FunctionSpec {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            description: None,
            parameters: default_parameters(),
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_parameters(mut self, parameters: Value) -> Self {
        self.parameters = parameters;
        self
    }

    /// Derives a spec from a callable's name, documentation and type hints.
    /// Unusable hints fall back to the permissive schema; this never fails.
    pub fn from_callable<C: Callable + ?Sized>(callable: &C) -> Self {
        let parameters = derive_parameters(callable.name(), &callable.type_hints()).into_schema();
        Self {
            name: callable.name().to_string(),
            description: callable.description().map(str::to_string),
            parameters,
        }
    }

    /// Checks `name` against `[A-Za-z0-9_-]{1,64}`.
    pub fn validate_name(name: &str) -> Result<(), String> {
        if name.is_empty() {
            return Err("name must not be empty".to_string());
        }
        if name.len() > MAX_NAME_LEN {
            return Err(format!("name exceeds {MAX_NAME_LEN} characters"));
        }
        if let Some(bad) = name
            .chars()
            .find(|c| !(c.is_ascii_alphanumeric() || *c == '_' || *c == '-'))
        {
            return Err(format!("name contains invalid character {bad:?}"));
        }
        Ok(())
    }

    pub fn to_transport(&self) -> serde_json::Result<Value> {
        serde_json::to_value(self)
    }

    /// Wraps the spec in the provider tool envelope.
    pub fn to_tool(&self) -> serde_json::Result<Value> {
        Ok(json!({"type": "function", "function": self.to_transport()?}))
    }
}

/// A call issued by the model, before it is resolved against a registry.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
pub struct FunctionCall {
    pub name: String,
    /// JSON-encoded argument object as produced by the model.
    #[serde(default)]
    pub arguments: String,
}

impl FunctionCall {
    pub fn new(name: impl Into<String>, arguments: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            arguments: arguments.into(),
        }
    }
}

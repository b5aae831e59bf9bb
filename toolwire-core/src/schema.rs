//! Schema derivation for callables.
//!
//! A callable describes its signature as a [`TypeHints`] value. [`derive_schema`]
//! is a pure mapping from that description to the JSON Schema object sent to
//! the model. [`derive_parameters`] wraps it so that derivation never fails the
//! caller: an unusable description degrades to the permissive schema.

use std::collections::HashSet;

use schemars::JsonSchema;
use serde_json::{json, Map};

use crate::error::SchemaError;
use crate::Value;

pub(crate) const RETURN_SLOT: &str = "return";

/// Declared type of a parameter or return value.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum TypeHint {
    String,
    Integer,
    Number,
    Boolean,
    Null,
    Any,
    Array(Box<TypeHint>),
    /// String-keyed object with values of one type.
    Map(Box<TypeHint>),
    /// Free-form object.
    Object,
    Optional(Box<TypeHint>),
    Enum(Vec<String>),
    /// A type the describing side could not resolve, named as written.
    Unresolved(String),
}

impl TypeHint {
    pub fn array(item: TypeHint) -> Self {
        TypeHint::Array(Box::new(item))
    }

    pub fn map(value: TypeHint) -> Self {
        TypeHint::Map(Box::new(value))
    }

    pub fn optional(inner: TypeHint) -> Self {
        TypeHint::Optional(Box::new(inner))
    }

    pub fn enumeration<I, S>(variants: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        TypeHint::Enum(variants.into_iter().map(Into::into).collect())
    }

    pub fn unresolved(type_name: impl Into<String>) -> Self {
        TypeHint::Unresolved(type_name.into())
    }

    pub fn is_optional(&self) -> bool {
        matches!(self, TypeHint::Optional(_))
    }

    fn to_schema(&self, slot: &str) -> Result<Value, SchemaError> {
        let schema = match self {
            TypeHint::String => json!({"type": "string"}),
            TypeHint::Integer => json!({"type": "integer"}),
            TypeHint::Number => json!({"type": "number"}),
            TypeHint::Boolean => json!({"type": "boolean"}),
            TypeHint::Null => json!({"type": "null"}),
            TypeHint::Any => json!({}),
            TypeHint::Array(item) => json!({"type": "array", "items": item.to_schema(slot)?}),
            TypeHint::Map(value) => {
                json!({"type": "object", "additionalProperties": value.to_schema(slot)?})
            }
            TypeHint::Object => json!({"type": "object"}),
            TypeHint::Optional(inner) => inner.to_schema(slot)?,
            TypeHint::Enum(variants) => {
                if variants.is_empty() {
                    return Err(SchemaError::EmptyEnum(slot.to_string()));
                }
                json!({"type": "string", "enum": variants})
            }
            TypeHint::Unresolved(type_name) => {
                return Err(SchemaError::UnresolvedType {
                    parameter: slot.to_string(),
                    type_name: type_name.clone(),
                })
            }
        };
        Ok(schema)
    }

    fn check_resolved(&self, slot: &str) -> Result<(), SchemaError> {
        self.to_schema(slot).map(|_| ())
    }
}

#[derive(Clone, Debug, PartialEq, Eq)]
pub struct ParamHint {
    pub name: String,
    pub hint: TypeHint,
    pub description: Option<String>,
}

impl ParamHint {
    pub fn new(name: impl Into<String>, hint: TypeHint) -> Self {
        Self {
            name: name.into(),
            hint,
            description: None,
        }
    }

    pub fn describe(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }
}

/// Ordered parameter hints plus the declared return type.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct TypeHints {
    pub params: Vec<ParamHint>,
    pub returns: Option<TypeHint>,
}

impl TypeHints {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn param(mut self, name: impl Into<String>, hint: TypeHint) -> Self {
        self.params.push(ParamHint::new(name, hint));
        self
    }

    pub fn param_with(mut self, param: ParamHint) -> Self {
        self.params.push(param);
        self
    }

    pub fn returns(mut self, hint: TypeHint) -> Self {
        self.returns = Some(hint);
        self
    }

    pub fn get(&self, name: &str) -> Option<&ParamHint> {
        self.params.iter().find(|param| param.name == name)
    }
}

/// `{"type": "object", "properties": {}}`: accepts any arguments.
pub fn default_parameters() -> Value {
    json!({"type": "object", "properties": {}})
}

/// Maps type hints to a JSON Schema object describing the parameters.
pub fn derive_schema(hints: &TypeHints) -> Result<Value, SchemaError> {
    let mut seen = HashSet::new();
    let mut properties = Map::new();
    let mut required = Vec::new();

    for param in &hints.params {
        if !seen.insert(param.name.as_str()) {
            return Err(SchemaError::DuplicateParameter(param.name.clone()));
        }

        let mut schema = param.hint.to_schema(&param.name)?;
        if let (Some(description), Some(object)) = (&param.description, schema.as_object_mut()) {
            object.insert("description".to_string(), Value::String(description.clone()));
        }
        properties.insert(param.name.clone(), schema);

        if !param.hint.is_optional() {
            required.push(Value::String(param.name.clone()));
        }
    }

    if let Some(returns) = &hints.returns {
        returns.check_resolved(RETURN_SLOT)?;
    }

    let mut root = Map::new();
    root.insert("type".to_string(), Value::String("object".to_string()));
    root.insert("properties".to_string(), Value::Object(properties));
    if !required.is_empty() {
        root.insert("required".to_string(), Value::Array(required));
    }
    Ok(Value::Object(root))
}

/// Outcome of deriving a parameter schema for a named callable.
#[derive(Clone, Debug, PartialEq)]
pub enum SchemaDerivation {
    Derived(Value),
    Fallback { reason: SchemaError },
}

impl SchemaDerivation {
    pub fn is_fallback(&self) -> bool {
        matches!(self, SchemaDerivation::Fallback { .. })
    }

    /// The schema to advertise. Fallbacks advertise [`default_parameters`].
    pub fn into_schema(self) -> Value {
        match self {
            SchemaDerivation::Derived(schema) => schema,
            SchemaDerivation::Fallback { .. } => default_parameters(),
        }
    }

    /// Keeps a derived schema, or logs `reason` for `name` and falls back.
    pub(crate) fn settle(name: &str, derived: Result<Value, SchemaError>) -> Self {
        match derived {
            Ok(schema) => SchemaDerivation::Derived(schema),
            Err(reason) => {
                tracing::warn!(
                    function = %name,
                    error = %reason,
                    "could not derive parameter schema; accepting any arguments"
                );
                SchemaDerivation::Fallback { reason }
            }
        }
    }
}

/// Derives the parameter schema for `name`, logging and degrading on failure.
pub fn derive_parameters(name: &str, hints: &TypeHints) -> SchemaDerivation {
    SchemaDerivation::settle(name, derive_schema(hints))
}

/// Renders the schemars schema of `T` as an object schema suitable for a
/// function's `parameters`.
pub fn schema_for<T: JsonSchema>() -> Result<Value, SchemaError> {
    let root = schemars::schema_for!(T);
    let value =
        serde_json::to_value(&root).map_err(|err| SchemaError::NotAnObject(err.to_string()))?;

    let Value::Object(mut object) = value else {
        return Err(SchemaError::NotAnObject(T::schema_name()));
    };
    if object.get("type").and_then(Value::as_str) != Some("object") {
        return Err(SchemaError::NotAnObject(T::schema_name()));
    }

    object.remove("$schema");
    object.remove("title");
    object
        .entry("properties")
        .or_insert_with(|| Value::Object(Map::new()));
    Ok(Value::Object(object))
}

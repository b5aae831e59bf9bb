use std::fmt;
use std::sync::Arc;

use serde::de::DeserializeOwned;

use crate::callable::{Callable, TypedFunction};
use crate::error::{FunctionError, InvocationError};
use crate::schema::{TypeHint, TypeHints};
use crate::{Arguments, Value};

/// Validating handle around a callable. Arguments are checked and coerced
/// against the callable's declared signature before its body runs.
#[derive(Clone)]
pub struct Entrypoint {
    inner: Arc<dyn ErasedEntrypoint>,
}

impl fmt::Debug for Entrypoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Entrypoint")
            .field("name", &self.inner.name())
            .finish()
    }
}

impl Entrypoint {
    pub fn from_callable<C>(callable: C) -> Self
    where
        C: Callable + 'static,
    {
        Self::from_shared(Arc::new(callable))
    }

    pub fn from_shared(callable: Arc<dyn Callable>) -> Self {
        let hints = callable.type_hints();
        Self {
            inner: Arc::new(HintedEntrypoint { callable, hints }),
        }
    }

    pub fn from_typed<T>(function: T) -> Self
    where
        T: TypedFunction + 'static,
    {
        Self {
            inner: Arc::new(TypedEntrypoint { function }),
        }
    }

    pub fn name(&self) -> &str {
        self.inner.name()
    }

    /// Validates `args` and calls through. `None` is a zero-argument call.
    pub fn invoke(&self, args: Option<Arguments>) -> Result<Value, InvocationError> {
        self.inner.invoke(args.unwrap_or_default())
    }
}

trait ErasedEntrypoint: Send + Sync {
    fn name(&self) -> &str;
    fn invoke(&self, args: Arguments) -> Result<Value, InvocationError>;
}

struct HintedEntrypoint {
    callable: Arc<dyn Callable>,
    hints: TypeHints,
}

impl ErasedEntrypoint for HintedEntrypoint {
    fn name(&self) -> &str {
        self.callable.name()
    }

    fn invoke(&self, args: Arguments) -> Result<Value, InvocationError> {
        let name = self.callable.name();
        let args = validate_arguments(&self.hints, args).map_err(|reason| {
            InvocationError::InvalidArguments {
                name: name.to_string(),
                reason,
            }
        })?;

        self.callable
            .call(args)
            .map_err(|err| InvocationError::from_function(name, err))
    }
}

struct TypedEntrypoint<T> {
    function: T,
}

impl<T> ErasedEntrypoint for TypedEntrypoint<T>
where
    T: TypedFunction,
{
    fn name(&self) -> &str {
        T::NAME
    }

    fn invoke(&self, args: Arguments) -> Result<Value, InvocationError> {
        let typed_args = deserialize_typed::<T::Args>(args).map_err(|err| {
            InvocationError::InvalidArguments {
                name: T::NAME.to_string(),
                reason: err.to_string(),
            }
        })?;

        let output = self
            .function
            .run(typed_args)
            .map_err(|err| InvocationError::from_function(T::NAME, err))?;

        serde_json::to_value(output).map_err(|err| InvocationError::Execution {
            name: T::NAME.to_string(),
            source: FunctionError::Json(err),
        })
    }
}

// Unit-like argument types only deserialize from `null`, so an empty map gets
// a second chance in that form.
fn deserialize_typed<A: DeserializeOwned>(args: Arguments) -> serde_json::Result<A> {
    let empty = args.is_empty();
    match serde_json::from_value(Value::Object(args)) {
        Err(err) if empty => serde_json::from_value(Value::Null).map_err(|_| err),
        outcome => outcome,
    }
}

/// Checks `args` against the declared parameters: no unknown names, every
/// non-optional parameter present, every value coercible to its hint.
pub fn validate_arguments(hints: &TypeHints, mut args: Arguments) -> Result<Arguments, String> {
    if let Some(unknown) = args.keys().find(|key| hints.get(key).is_none()) {
        return Err(format!("unexpected argument '{unknown}'"));
    }

    let mut validated = Arguments::new();
    for param in &hints.params {
        match args.remove(&param.name) {
            Some(value) => {
                let value = coerce(&param.hint, value, &param.name)?;
                validated.insert(param.name.clone(), value);
            }
            None if param.hint.is_optional() => {}
            None => return Err(format!("missing required argument '{}'", param.name)),
        }
    }
    Ok(validated)
}

fn coerce(hint: &TypeHint, value: Value, path: &str) -> Result<Value, String> {
    let mismatch =
        |expected: &str, value: &Value| format!("'{path}': expected {expected}, got {value}");

    match hint {
        TypeHint::Any | TypeHint::Unresolved(_) => Ok(value),
        TypeHint::Optional(_) if value.is_null() => Ok(Value::Null),
        TypeHint::Optional(inner) => coerce(inner, value, path),
        TypeHint::Null if value.is_null() => Ok(value),
        TypeHint::Null => Err(mismatch("null", &value)),
        TypeHint::String if value.is_string() => Ok(value),
        TypeHint::String => Err(mismatch("string", &value)),
        TypeHint::Integer => coerce_integer(&value).ok_or_else(|| mismatch("integer", &value)),
        TypeHint::Number => coerce_number(&value).ok_or_else(|| mismatch("number", &value)),
        TypeHint::Boolean => {
            let flag = match (&value, value.as_str()) {
                (Value::Bool(flag), _) => Some(*flag),
                (_, Some("true")) => Some(true),
                (_, Some("false")) => Some(false),
                _ => None,
            };
            flag.map(Value::Bool).ok_or_else(|| mismatch("boolean", &value))
        }
        TypeHint::Enum(variants) => {
            let listed = value
                .as_str()
                .is_some_and(|text| variants.iter().any(|variant| variant == text));
            if listed {
                Ok(value)
            } else {
                Err(mismatch(&format!("one of {variants:?}"), &value))
            }
        }
        TypeHint::Object if value.is_object() => Ok(value),
        TypeHint::Object => Err(mismatch("object", &value)),
        TypeHint::Array(item) => match value {
            Value::Array(items) => items
                .into_iter()
                .enumerate()
                .map(|(index, item_value)| coerce(item, item_value, &format!("{path}[{index}]")))
                .collect::<Result<Vec<_>, _>>()
                .map(Value::Array),
            other => Err(mismatch("array", &other)),
        },
        TypeHint::Map(value_hint) => match value {
            Value::Object(entries) => entries
                .into_iter()
                .map(|(key, entry)| {
                    let entry = coerce(value_hint, entry, &format!("{path}.{key}"))?;
                    Ok::<_, String>((key, entry))
                })
                .collect::<Result<Arguments, String>>()
                .map(Value::Object),
            other => Err(mismatch("object", &other)),
        },
    }
}

fn coerce_integer(value: &Value) -> Option<Value> {
    match value {
        Value::Number(number) if number.is_i64() || number.is_u64() => Some(value.clone()),
        Value::Number(number) => {
            let float = number.as_f64()?;
            if float.fract() == 0.0 && float >= i64::MIN as f64 && float < i64::MAX as f64 {
                Some(Value::from(float as i64))
            } else {
                None
            }
        }
        Value::String(text) => text.trim().parse::<i64>().ok().map(Value::from),
        _ => None,
    }
}

fn coerce_number(value: &Value) -> Option<Value> {
    match value {
        Value::Number(_) => Some(value.clone()),
        Value::String(text) => text
            .trim()
            .parse::<f64>()
            .ok()
            .and_then(serde_json::Number::from_f64)
            .map(Value::Number),
        _ => None,
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    fn args(value: Value) -> Arguments {
        match value {
            Value::Object(map) => map,
            _ => panic!("arguments must be an object"),
        }
    }

    #[test]
    fn integer_accepts_integral_floats_and_numeric_strings() {
        let hints = TypeHints::new()
            .param("a", TypeHint::Integer)
            .param("b", TypeHint::Integer);

        let validated = validate_arguments(&hints, args(json!({"a": 2.0, "b": "3"}))).unwrap();

        assert_eq!(Value::Object(validated), json!({"a": 2, "b": 3}));
    }

    #[test]
    fn integer_rejects_fractional_values() {
        let hints = TypeHints::new().param("a", TypeHint::Integer);

        let err = validate_arguments(&hints, args(json!({"a": 2.5}))).unwrap_err();

        assert!(err.contains("'a'"));
        assert!(err.contains("integer"));
    }

    #[test]
    fn integer_rejects_floats_beyond_i64_range() {
        let hints = TypeHints::new().param("n", TypeHint::Integer);

        let err = validate_arguments(&hints, args(json!({"n": 9.223372036854775808e18})))
            .unwrap_err();
        assert!(err.contains("'n'"));

        let lowest = validate_arguments(&hints, args(json!({"n": -9.223372036854775808e18})))
            .unwrap();
        assert_eq!(lowest["n"], json!(i64::MIN));
    }

    #[test]
    fn optional_parameters_may_be_missing_or_null() {
        let hints = TypeHints::new()
            .param("query", TypeHint::String)
            .param("limit", TypeHint::optional(TypeHint::Integer));

        assert!(validate_arguments(&hints, args(json!({"query": "rust"}))).is_ok());
        assert!(validate_arguments(&hints, args(json!({"query": "rust", "limit": null}))).is_ok());
    }

    #[test]
    fn missing_and_unknown_arguments_are_rejected() {
        let hints = TypeHints::new().param("query", TypeHint::String);

        let missing = validate_arguments(&hints, Arguments::new()).unwrap_err();
        assert_eq!(missing, "missing required argument 'query'");

        let unknown =
            validate_arguments(&hints, args(json!({"query": "x", "extra": 1}))).unwrap_err();
        assert_eq!(unknown, "unexpected argument 'extra'");
    }

    #[test]
    fn nested_values_are_coerced_with_paths() {
        let hints = TypeHints::new()
            .param("ids", TypeHint::array(TypeHint::Integer))
            .param("flags", TypeHint::map(TypeHint::Boolean));

        let validated = validate_arguments(
            &hints,
            args(json!({"ids": ["1", 2], "flags": {"dry_run": "true"}})),
        )
        .unwrap();
        assert_eq!(
            Value::Object(validated),
            json!({"ids": [1, 2], "flags": {"dry_run": true}})
        );

        let err = validate_arguments(&hints, args(json!({"ids": [1, "x"], "flags": {}})))
            .unwrap_err();
        assert!(err.contains("ids[1]"));
    }

    #[test]
    fn enum_requires_a_listed_variant() {
        let hints = TypeHints::new().param("unit", TypeHint::enumeration(["celsius", "kelvin"]));

        assert!(validate_arguments(&hints, args(json!({"unit": "kelvin"}))).is_ok());
        assert!(validate_arguments(&hints, args(json!({"unit": "rankine"}))).is_err());
    }

    #[test]
    fn unresolved_hints_accept_anything() {
        let hints = TypeHints::new().param("payload", TypeHint::unresolved("Payload"));

        let validated =
            validate_arguments(&hints, args(json!({"payload": {"any": [1, 2]}}))).unwrap();
        assert_eq!(validated["payload"], json!({"any": [1, 2]}));
    }
}

use serde_json::json;
use toolwire_core::{FnFunction, FunctionSpec, TypeHint, TypeHints, Value};

fn add_function() -> FnFunction {
    FnFunction::new("add", |args| {
        let a = args["a"].as_i64().unwrap_or_default();
        let b = args["b"].as_i64().unwrap_or_default();
        Ok(Value::from(a + b))
    })
    .with_description("Add two integers.")
    .with_hints(
        TypeHints::new()
            .param("a", TypeHint::Integer)
            .param("b", TypeHint::Integer)
            .returns(TypeHint::Integer),
    )
}

#[test]
fn from_callable_takes_name_description_and_schema() {
    let spec = FunctionSpec::from_callable(&add_function());

    assert_eq!(spec.name, "add");
    assert_eq!(spec.description.as_deref(), Some("Add two integers."));
    assert_eq!(spec.parameters["type"], "object");
    assert_eq!(spec.parameters["required"], json!(["a", "b"]));
}

#[test]
fn from_callable_with_unresolvable_hints_uses_permissive_schema() {
    let callable = FnFunction::new("lookup", |_| Ok(Value::Null))
        .with_hints(TypeHints::new().param("user", TypeHint::unresolved("UserRecord")));

    let spec = FunctionSpec::from_callable(&callable);

    assert_eq!(spec.name, "lookup");
    assert!(spec.description.is_none());
    assert_eq!(spec.parameters, json!({"type": "object", "properties": {}}));
}

#[test]
fn new_spec_defaults_to_no_argument_schema() {
    let spec = FunctionSpec::new("get_time");
    assert_eq!(spec.parameters, json!({"type": "object", "properties": {}}));
}

#[test]
fn transport_omits_missing_description() {
    let spec = FunctionSpec::new("get_time");
    assert_eq!(
        spec.to_transport().unwrap(),
        json!({"name": "get_time", "parameters": {"type": "object", "properties": {}}})
    );

    let described = spec.with_description("Current time");
    assert_eq!(described.to_transport().unwrap()["description"], "Current time");
}

#[test]
fn deserializing_without_parameters_uses_default_schema() {
    let spec: FunctionSpec = serde_json::from_value(json!({"name": "ping"})).unwrap();
    assert_eq!(spec.parameters, json!({"type": "object", "properties": {}}));
}

#[test]
fn to_tool_wraps_spec_in_function_envelope() {
    let spec = FunctionSpec::new("get_time").with_description("Current time");

    let tool = spec.to_tool().unwrap();

    assert_eq!(tool["type"], "function");
    assert_eq!(tool["function"]["name"], "get_time");
    assert_eq!(tool["function"]["description"], "Current time");
}

#[test]
fn validate_name_enforces_charset_and_length() {
    assert!(FunctionSpec::validate_name("get_weather-v2").is_ok());
    assert!(FunctionSpec::validate_name(&"a".repeat(64)).is_ok());

    assert!(FunctionSpec::validate_name("").is_err());
    assert!(FunctionSpec::validate_name(&"a".repeat(65)).is_err());

    let err = FunctionSpec::validate_name("get weather").unwrap_err();
    assert!(err.contains("' '"));
}

use std::error::Error;

use toolwire_core::{
    FunctionError, InvocationError, InvocationErrorKind, RegistryError, SchemaError,
};

#[test]
fn error_display_for_unresolved_type() {
    let err = SchemaError::UnresolvedType {
        parameter: "user".to_string(),
        type_name: "User".to_string(),
    };
    assert_eq!(
        format!("{err}"),
        "unresolved type 'User' for parameter 'user'"
    );
}

#[test]
fn error_display_for_function_error() {
    let err = FunctionError::InvalidInput("missing field".to_string());
    assert_eq!(format!("{err}"), "invalid input: missing field");
}

#[test]
fn error_display_for_json() {
    let parse_error = serde_json::from_str::<serde_json::Value>("not json").unwrap_err();
    let err = FunctionError::from(parse_error);
    assert!(format!("{err}").starts_with("json error: "));
}

#[test]
fn execution_error_keeps_its_source() {
    let err = InvocationError::Execution {
        name: "search".to_string(),
        source: FunctionError::ExecutionFailed("timeout".to_string()),
    };
    assert_eq!(
        format!("{err}"),
        "function 'search' failed: execution failed: timeout"
    );
    assert!(err.source().is_some());
    assert_eq!(err.kind(), InvocationErrorKind::Execution);
    assert_eq!(err.function_name(), "search");
}

#[test]
fn invocation_error_kinds_display_as_snake_case() {
    let err = InvocationError::AlreadyRun {
        name: "tick".to_string(),
    };
    assert_eq!(format!("{err}"), "invocation of 'tick' has already run");
    assert_eq!(err.kind().to_string(), "already_run");
    assert_eq!(InvocationErrorKind::ArgumentMismatch.to_string(), "argument_mismatch");
}

#[test]
fn registry_schema_error_chains_to_schema_error() {
    let err = RegistryError::Schema {
        name: "lookup".to_string(),
        source: SchemaError::DuplicateParameter("a".to_string()),
    };
    assert_eq!(
        format!("{err}"),
        "schema derivation failed for 'lookup': parameter 'a' is declared more than once"
    );
    assert!(err.source().is_some());
}

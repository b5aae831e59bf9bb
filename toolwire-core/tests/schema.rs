mod support;

use schemars::JsonSchema;
use serde::Deserialize;
use serde_json::json;
use support::{capture_logs, lines_with};
use toolwire_core::schema::{default_parameters, derive_parameters, derive_schema, schema_for};
use toolwire_core::{ParamHint, SchemaDerivation, SchemaError, TypeHint, TypeHints};

#[test]
fn derives_object_schema_with_required_parameters() {
    let hints = TypeHints::new()
        .param("a", TypeHint::Integer)
        .param("b", TypeHint::Integer)
        .returns(TypeHint::Integer);

    let schema = derive_schema(&hints).unwrap();

    assert_eq!(
        schema,
        json!({
            "type": "object",
            "properties": {
                "a": {"type": "integer"},
                "b": {"type": "integer"}
            },
            "required": ["a", "b"]
        })
    );
}

#[test]
fn optional_parameters_are_not_required() {
    let hints = TypeHints::new()
        .param_with(ParamHint::new("city", TypeHint::String).describe("City name"))
        .param("days", TypeHint::optional(TypeHint::Integer));

    let schema = derive_schema(&hints).unwrap();

    assert_eq!(schema["properties"]["city"]["description"], "City name");
    assert_eq!(schema["properties"]["days"], json!({"type": "integer"}));
    assert_eq!(schema["required"], json!(["city"]));
}

#[test]
fn zero_parameters_match_the_permissive_default() {
    let schema = derive_schema(&TypeHints::new().returns(TypeHint::String)).unwrap();
    assert_eq!(schema, default_parameters());
    assert_eq!(schema, json!({"type": "object", "properties": {}}));
}

#[test]
fn nested_hints_map_to_nested_schemas() {
    let hints = TypeHints::new()
        .param("tags", TypeHint::array(TypeHint::String))
        .param("weights", TypeHint::map(TypeHint::Number))
        .param("unit", TypeHint::enumeration(["c", "f"]))
        .param("extra", TypeHint::Any)
        .param("options", TypeHint::Object);

    let schema = derive_schema(&hints).unwrap();
    let properties = &schema["properties"];

    assert_eq!(properties["tags"], json!({"type": "array", "items": {"type": "string"}}));
    assert_eq!(
        properties["weights"],
        json!({"type": "object", "additionalProperties": {"type": "number"}})
    );
    assert_eq!(properties["unit"], json!({"type": "string", "enum": ["c", "f"]}));
    assert_eq!(properties["extra"], json!({}));
    assert_eq!(properties["options"], json!({"type": "object"}));
}

#[test]
fn unresolved_parameter_type_is_an_error() {
    let hints = TypeHints::new().param("user", TypeHint::array(TypeHint::unresolved("User")));

    let err = derive_schema(&hints).unwrap_err();

    assert_eq!(
        err,
        SchemaError::UnresolvedType {
            parameter: "user".to_string(),
            type_name: "User".to_string(),
        }
    );
}

#[test]
fn unresolved_return_type_is_an_error() {
    let hints = TypeHints::new()
        .param("a", TypeHint::Integer)
        .returns(TypeHint::unresolved("Report"));

    let err = derive_schema(&hints).unwrap_err();
    assert!(err.to_string().contains("'return'"));
}

#[test]
fn duplicate_and_empty_enum_parameters_are_errors() {
    let duplicate = TypeHints::new()
        .param("a", TypeHint::Integer)
        .param("a", TypeHint::String);
    assert_eq!(
        derive_schema(&duplicate).unwrap_err(),
        SchemaError::DuplicateParameter("a".to_string())
    );

    let empty = TypeHints::new().param("mode", TypeHint::Enum(Vec::new()));
    assert_eq!(
        derive_schema(&empty).unwrap_err(),
        SchemaError::EmptyEnum("mode".to_string())
    );
}

#[test]
fn derive_parameters_falls_back_and_warns() {
    let hints = TypeHints::new().param("user", TypeHint::unresolved("User"));

    let (derivation, logs) = capture_logs(|| derive_parameters("lookup_user", &hints));

    assert!(derivation.is_fallback());
    assert_eq!(derivation.into_schema(), default_parameters());

    let warnings = lines_with(&logs, "WARN");
    assert_eq!(warnings.len(), 1);
    assert!(warnings[0].contains("lookup_user"));
    assert!(warnings[0].contains("User"));
}

#[test]
fn derive_parameters_passes_valid_schemas_through() {
    let hints = TypeHints::new().param("q", TypeHint::String);

    let derivation = derive_parameters("search", &hints);

    assert_eq!(
        derivation,
        SchemaDerivation::Derived(derive_schema(&hints).unwrap())
    );
}

#[derive(Deserialize, JsonSchema)]
#[allow(dead_code)]
struct SearchArgs {
    /// Text to look for.
    query: String,
    limit: Option<u32>,
}

#[test]
fn schema_for_typed_args_is_a_clean_object_schema() {
    let schema = schema_for::<SearchArgs>().unwrap();

    assert_eq!(schema["type"], "object");
    assert!(schema.get("$schema").is_none());
    assert!(schema.get("title").is_none());
    assert_eq!(schema["properties"]["query"]["type"], "string");
    assert_eq!(schema["required"], json!(["query"]));
}

#[test]
fn schema_for_rejects_non_object_types() {
    let err = schema_for::<Vec<String>>().unwrap_err();
    assert!(matches!(err, SchemaError::NotAnObject(_)));
}

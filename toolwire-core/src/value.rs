pub type Value = serde_json::Value;

/// Named arguments for a function call, kept in insertion order.
pub type Arguments = serde_json::Map<String, Value>;

/// Renders an argument value for call strings: strings bare, everything
/// else as compact JSON.
pub(crate) fn render_value(value: &Value) -> String {
    match value {
        Value::String(text) => text.clone(),
        other => other.to_string(),
    }
}

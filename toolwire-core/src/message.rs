use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::Value;

/// Well-known message roles. The role field stays an open string so
/// provider-specific roles pass through untouched.
pub mod roles {
    pub const SYSTEM: &str = "system";
    pub const USER: &str = "user";
    pub const ASSISTANT: &str = "assistant";
    pub const FUNCTION: &str = "function";
}

/// One turn in a conversation.
#[derive(Clone, Debug, Default, Deserialize, Serialize, PartialEq)]
pub struct Message {
    pub role: String,
    /// Always serialized, as `null` when absent: an assistant turn may carry
    /// only a function call.
    #[serde(default)]
    pub content: Option<String>,
    /// Name of the function whose output is `content` when `role` is `function`.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub function_call: Option<Value>,
    /// Token counts, latency and similar. Not part of the transport form.
    #[serde(skip)]
    pub metrics: BTreeMap<String, Value>,
}

impl Message {
    pub fn new(role: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            role: role.into(),
            content: Some(content.into()),
            ..Self::default()
        }
    }

    pub fn system(content: impl Into<String>) -> Self {
        Self::new(roles::SYSTEM, content)
    }

    pub fn user(content: impl Into<String>) -> Self {
        Self::new(roles::USER, content)
    }

    pub fn assistant(content: impl Into<String>) -> Self {
        Self::new(roles::ASSISTANT, content)
    }

    /// Reports a function's output back into the conversation.
    pub fn function(name: impl Into<String>, content: impl Into<String>) -> Self {
        Self {
            name: Some(name.into()),
            ..Self::new(roles::FUNCTION, content)
        }
    }

    pub fn with_function_call(mut self, payload: Value) -> Self {
        self.function_call = Some(payload);
        self
    }

    pub fn with_metric(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.metrics.insert(key.into(), value.into());
        self
    }

    pub fn is_function(&self) -> bool {
        self.role == roles::FUNCTION
    }

    pub fn to_transport(&self) -> serde_json::Result<Value> {
        serde_json::to_value(self)
    }

    /// Renders the message to the `tracing` sink at `level`.
    pub fn log(&self, level: LogLevel) {
        if self.is_function() {
            emit(level, &format!("FUNCTION: {}", self.name.as_deref().unwrap_or(UNSET)));
            emit(level, self.content.as_deref().unwrap_or(UNSET));
        } else {
            emit(
                level,
                &format!("{}: {}", self.role.to_uppercase(), self.display_body()),
            );
        }
    }

    fn display_body(&self) -> String {
        match (&self.content, &self.function_call) {
            (Some(content), _) if !content.is_empty() => content.clone(),
            (_, Some(call)) => call.to_string(),
            (content, None) => content.clone().unwrap_or_default(),
        }
    }
}

const UNSET: &str = "<none>";

fn emit(level: LogLevel, line: &str) {
    match level {
        LogLevel::Debug => tracing::debug!("{line}"),
        LogLevel::Info => tracing::info!("{line}"),
        LogLevel::Warning => tracing::warn!("{line}"),
        LogLevel::Error => tracing::error!("{line}"),
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum LogLevel {
    #[default]
    Debug,
    Info,
    Warning,
    Error,
}

impl LogLevel {
    /// Parses a level name. Anything unrecognized is `Debug`.
    pub fn from_name(name: &str) -> Self {
        match name.trim().to_ascii_lowercase().as_str() {
            "info" => LogLevel::Info,
            "warning" | "warn" => LogLevel::Warning,
            "error" => LogLevel::Error,
            _ => LogLevel::Debug,
        }
    }
}

impl From<&str> for LogLevel {
    fn from(name: &str) -> Self {
        LogLevel::from_name(name)
    }
}

impl fmt::Display for LogLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            LogLevel::Debug => "debug",
            LogLevel::Info => "info",
            LogLevel::Warning => "warning",
            LogLevel::Error => "error",
        };
        f.write_str(label)
    }
}

/// Retrieved context for a query, with the time the lookup took.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq)]
pub struct References {
    pub query: String,
    pub references: String,
    /// Elapsed seconds.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub time: Option<f64>,
}

impl References {
    pub fn new(query: impl Into<String>, references: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            references: references.into(),
            time: None,
        }
    }

    pub fn with_time(mut self, seconds: f64) -> Self {
        self.time = Some(seconds);
        self
    }
}

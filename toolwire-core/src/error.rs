use std::fmt;

use thiserror::Error;

/// Failure to turn a callable's type hints into a JSON Schema object.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum SchemaError {
    #[error("unresolved type '{type_name}' for parameter '{parameter}'")]
    UnresolvedType {
        parameter: String,
        type_name: String,
    },
    #[error("parameter '{0}' is declared more than once")]
    DuplicateParameter(String),
    #[error("enum for parameter '{0}' has no variants")]
    EmptyEnum(String),
    #[error("schema is not an object schema: {0}")]
    NotAnObject(String),
}

/// Error returned by the body of a callable.
#[derive(Debug, Error)]
pub enum FunctionError {
    #[error("invalid input: {0}")]
    InvalidInput(String),
    #[error("execution failed: {0}")]
    ExecutionFailed(String),
    #[error("json error: {0}")]
    Json(#[from] serde_json::Error),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InvocationErrorKind {
    NoEntrypoint,
    UnknownFunction,
    ArgumentMismatch,
    Execution,
    Panicked,
    AlreadyRun,
}

impl fmt::Display for InvocationErrorKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            InvocationErrorKind::NoEntrypoint => "no_entrypoint",
            InvocationErrorKind::UnknownFunction => "unknown_function",
            InvocationErrorKind::ArgumentMismatch => "argument_mismatch",
            InvocationErrorKind::Execution => "execution",
            InvocationErrorKind::Panicked => "panicked",
            InvocationErrorKind::AlreadyRun => "already_run",
        };
        f.write_str(label)
    }
}

/// Outcome of a failed invocation. This is the only error a caller of
/// [`crate::FunctionInvocation::run`] can observe.
#[derive(Debug, Error)]
pub enum InvocationError {
    #[error("function '{name}' has no entrypoint")]
    NoEntrypoint { name: String },
    #[error("function '{name}' is not registered")]
    UnknownFunction { name: String },
    #[error("invalid arguments for '{name}': {reason}")]
    InvalidArguments { name: String, reason: String },
    #[error("function '{name}' failed: {source}")]
    Execution {
        name: String,
        #[source]
        source: FunctionError,
    },
    #[error("function '{name}' panicked: {message}")]
    Panicked { name: String, message: String },
    #[error("invocation of '{name}' has already run")]
    AlreadyRun { name: String },
}

impl InvocationError {
    pub fn kind(&self) -> InvocationErrorKind {
        match self {
            InvocationError::NoEntrypoint { .. } => InvocationErrorKind::NoEntrypoint,
            InvocationError::UnknownFunction { .. } => InvocationErrorKind::UnknownFunction,
            InvocationError::InvalidArguments { .. } => InvocationErrorKind::ArgumentMismatch,
            InvocationError::Execution { .. } => InvocationErrorKind::Execution,
            InvocationError::Panicked { .. } => InvocationErrorKind::Panicked,
            InvocationError::AlreadyRun { .. } => InvocationErrorKind::AlreadyRun,
        }
    }

    pub fn function_name(&self) -> &str {
        match self {
            InvocationError::NoEntrypoint { name }
            | InvocationError::UnknownFunction { name }
            | InvocationError::InvalidArguments { name, .. }
            | InvocationError::Execution { name, .. }
            | InvocationError::Panicked { name, .. }
            | InvocationError::AlreadyRun { name } => name,
        }
    }

    /// Maps an error raised by a callable body. Input errors are argument
    /// mismatches from the caller's point of view.
    pub(crate) fn from_function(name: &str, err: FunctionError) -> Self {
        match err {
            FunctionError::InvalidInput(reason) => InvocationError::InvalidArguments {
                name: name.to_string(),
                reason,
            },
            other => InvocationError::Execution {
                name: name.to_string(),
                source: other,
            },
        }
    }
}

#[derive(Debug, Error)]
pub enum RegistryError {
    #[error("invalid function name {name:?}: {reason}")]
    InvalidName { name: String, reason: String },
    #[error("duplicate function name: {name}")]
    DuplicateName { name: String },
    #[error("schema derivation failed for '{name}': {source}")]
    Schema {
        name: String,
        #[source]
        source: SchemaError,
    },
}

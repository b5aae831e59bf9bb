use std::fmt;

use schemars::JsonSchema;
use serde::de::DeserializeOwned;
use serde::Serialize;

use crate::error::FunctionError;
use crate::schema::TypeHints;
use crate::{Arguments, Value};

/// A host function that can be described to a model and invoked with
/// model-supplied arguments.
///
/// `call` receives arguments already checked against [`Callable::type_hints`]
/// when it runs behind an [`crate::Entrypoint`].
pub trait Callable: Send + Sync {
    fn name(&self) -> &str;

    fn description(&self) -> Option<&str> {
        None
    }

    fn type_hints(&self) -> TypeHints;

    fn call(&self, args: Arguments) -> Result<Value, FunctionError>;
}

type Body = Box<dyn Fn(Arguments) -> Result<Value, FunctionError> + Send + Sync>;

/// A [`Callable`] assembled from a closure and explicit type hints.
pub struct FnFunction {
    name: String,
    description: Option<String>,
    hints: TypeHints,
    body: Body,
}

impl fmt::Debug for FnFunction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnFunction")
            .field("name", &self.name)
            .field("description", &self.description)
            .field("hints", &self.hints)
            .finish()
    }
}

impl FnFunction {
    pub fn new<F>(name: impl Into<String>, body: F) -> Self
    where
        F: Fn(Arguments) -> Result<Value, FunctionError> + Send + Sync + 'static,
    {
        Self {
            name: name.into(),
            description: None,
            hints: TypeHints::default(),
            body: Box::new(body),
        }
    }

    pub fn with_description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    pub fn with_hints(mut self, hints: TypeHints) -> Self {
        self.hints = hints;
        self
    }
}

impl Callable for FnFunction {
    fn name(&self) -> &str {
        &self.name
    }

    fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    fn type_hints(&self) -> TypeHints {
        self.hints.clone()
    }

    fn call(&self, args: Arguments) -> Result<Value, FunctionError> {
        (self.body)(args)
    }
}

/// A function whose arguments are a typed struct. The advertised schema comes
/// from `schemars`, and arguments are validated by deserializing into `Args`.
pub trait TypedFunction: Send + Sync {
    type Args: DeserializeOwned + JsonSchema;
    type Output: Serialize;

    const NAME: &'static str;
    const DESCRIPTION: Option<&'static str> = None;

    fn run(&self, args: Self::Args) -> Result<Self::Output, FunctionError>;
}

mod callable;
mod config;
mod entrypoint;
mod error;
mod invocation;
mod message;
mod registry;
pub mod prelude;
pub mod schema;
mod spec;
mod value;

pub use callable::{Callable, FnFunction, TypedFunction};
pub use config::RegistryConfig;
pub use entrypoint::{validate_arguments, Entrypoint};
pub use error::{FunctionError, InvocationError, InvocationErrorKind, RegistryError, SchemaError};
pub use invocation::{FunctionInvocation, InvocationState};
pub use message::{roles, LogLevel, Message, References};
pub use registry::{FunctionRegistry, RegistryBuilder};
pub use schema::{ParamHint, SchemaDerivation, TypeHint, TypeHints};
pub use spec::{FunctionCall, FunctionSpec, MAX_NAME_LEN};
pub use value::{Arguments, Value};

#[cfg(feature = "macros")]
pub use toolwire_macros::function;

#[doc(hidden)]
pub use serde_json;

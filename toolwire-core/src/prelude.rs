// Prelude module for toolwire-core
//
// Import commonly used types with: `use toolwire_core::prelude::*;`

pub use crate::{
    // Arguments & values
    Arguments,
    // Callables
    Callable,
    FnFunction,
    // Calls & invocation
    FunctionCall,
    FunctionError,
    FunctionInvocation,
    FunctionRegistry,
    FunctionSpec,
    InvocationError,
    InvocationState,
    LogLevel,
    // Conversation
    Message,
    References,
    RegistryConfig,
    TypeHint,
    TypeHints,
    TypedFunction,
    Value,
};

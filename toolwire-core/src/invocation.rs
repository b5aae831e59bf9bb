use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use crate::entrypoint::Entrypoint;
use crate::error::InvocationError;
use crate::message::Message;
use crate::registry::FunctionRegistry;
use crate::spec::FunctionSpec;
use crate::value::render_value;
use crate::{Arguments, Value};

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InvocationState {
    Pending,
    Succeeded,
    Failed,
}

/// One attempt to run a function with concrete arguments.
///
/// An invocation runs at most once. Later calls to [`run`](Self::run) return
/// [`InvocationError::AlreadyRun`] and leave the recorded outcome alone.
#[derive(Clone, Debug)]
pub struct FunctionInvocation {
    function: Arc<FunctionSpec>,
    arguments: Option<Arguments>,
    result: Option<Value>,
    state: InvocationState,
}

impl FunctionInvocation {
    pub fn new(function: Arc<FunctionSpec>, arguments: Option<Arguments>) -> Self {
        Self {
            function,
            arguments,
            result: None,
            state: InvocationState::Pending,
        }
    }

    pub fn function(&self) -> &FunctionSpec {
        &self.function
    }

    pub fn arguments(&self) -> Option<&Arguments> {
        self.arguments.as_ref()
    }

    pub fn result(&self) -> Option<&Value> {
        self.result.as_ref()
    }

    pub fn take_result(&mut self) -> Option<Value> {
        self.result.take()
    }

    pub fn state(&self) -> InvocationState {
        self.state
    }

    pub fn succeeded(&self) -> bool {
        self.state == InvocationState::Succeeded
    }

    /// `name()` without arguments, otherwise `name(k1=v1, k2=v2)` in
    /// argument order.
    pub fn call_string(&self) -> String {
        let Some(arguments) = &self.arguments else {
            return format!("{}()", self.function.name);
        };
        let rendered = arguments
            .iter()
            .map(|(key, value)| format!("{key}={}", render_value(value)))
            .collect::<Vec<_>>()
            .join(", ");
        format!("{}({rendered})", self.function.name)
    }

    /// Runs the function through the entrypoint `registry` holds for it.
    pub fn run(&mut self, registry: &FunctionRegistry) -> Result<&Value, InvocationError> {
        self.ensure_pending()?;

        let Some(entrypoint) = registry.entrypoint(&self.function.name) else {
            self.state = InvocationState::Failed;
            return Err(InvocationError::NoEntrypoint {
                name: self.function.name.clone(),
            });
        };
        self.execute(entrypoint)
    }

    /// Runs the function through an explicit entrypoint, which must carry the
    /// same name as the invocation's function.
    pub fn run_with(&mut self, entrypoint: &Entrypoint) -> Result<&Value, InvocationError> {
        self.ensure_pending()?;

        if entrypoint.name() != self.function.name {
            self.state = InvocationState::Failed;
            return Err(InvocationError::NoEntrypoint {
                name: self.function.name.clone(),
            });
        }
        self.execute(entrypoint)
    }

    /// Function-role message carrying the result, once the run succeeded.
    pub fn to_message(&self) -> Option<Message> {
        let result = self.result.as_ref()?;
        Some(Message::function(
            self.function.name.clone(),
            render_value(result),
        ))
    }

    fn ensure_pending(&self) -> Result<(), InvocationError> {
        if self.state == InvocationState::Pending {
            return Ok(());
        }
        tracing::warn!(
            function = %self.function.name,
            state = ?self.state,
            "invocation already ran; refusing to run it again"
        );
        Err(InvocationError::AlreadyRun {
            name: self.function.name.clone(),
        })
    }

    fn execute(&mut self, entrypoint: &Entrypoint) -> Result<&Value, InvocationError> {
        let call = self.call_string();
        tracing::debug!(function = %self.function.name, "Running: {call}");

        let arguments = self.arguments.clone();
        let outcome = panic::catch_unwind(AssertUnwindSafe(|| entrypoint.invoke(arguments)))
            .unwrap_or_else(|payload| {
                Err(InvocationError::Panicked {
                    name: self.function.name.clone(),
                    message: panic_message(payload.as_ref()),
                })
            });

        match outcome {
            Ok(value) => {
                self.state = InvocationState::Succeeded;
                Ok(&*self.result.insert(value))
            }
            Err(err) => {
                self.state = InvocationState::Failed;
                if self.arguments.is_none() {
                    tracing::warn!(error = %err, "Could not run function {call}: {err}");
                } else {
                    tracing::warn!("Could not run function {call}");
                    tracing::error!(function = %self.function.name, error = %err, "{err}");
                }
                Err(err)
            }
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic payload".to_string()
    }
}

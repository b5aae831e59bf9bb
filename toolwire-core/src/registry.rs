use std::collections::{HashMap, HashSet};
use std::fmt;
use std::sync::Arc;

use crate::callable::{Callable, TypedFunction};
use crate::config::RegistryConfig;
use crate::entrypoint::Entrypoint;
use crate::error::{InvocationError, RegistryError, SchemaError};
use crate::invocation::FunctionInvocation;
use crate::schema::{default_parameters, derive_parameters, schema_for, SchemaDerivation};
use crate::spec::{FunctionCall, FunctionSpec};
use crate::{Arguments, Value};

/// Specs advertised to the model, keyed by name, with the entrypoints that
/// can run them. Read-only once built.
pub struct FunctionRegistry {
    config: RegistryConfig,
    specs: Vec<Arc<FunctionSpec>>,
    index: HashMap<String, usize>,
    entrypoints: HashMap<String, Entrypoint>,
}

impl fmt::Debug for FunctionRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FunctionRegistry")
            .field("config", &self.config)
            .field("names", &self.names())
            .field("entrypoints_len", &self.entrypoints.len())
            .finish()
    }
}

impl FunctionRegistry {
    pub fn builder() -> RegistryBuilder {
        RegistryBuilder::default()
    }

    pub fn config(&self) -> &RegistryConfig {
        &self.config
    }

    pub fn len(&self) -> usize {
        self.specs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.specs.is_empty()
    }

    /// Names in registration order.
    pub fn names(&self) -> Vec<&str> {
        self.specs.iter().map(|spec| spec.name.as_str()).collect()
    }

    pub fn specs(&self) -> &[Arc<FunctionSpec>] {
        &self.specs
    }

    pub fn spec(&self, name: &str) -> Option<Arc<FunctionSpec>> {
        self.index.get(name).map(|&slot| Arc::clone(&self.specs[slot]))
    }

    /// Provider tool envelopes for every registered spec.
    pub fn tools(&self) -> serde_json::Result<Vec<Value>> {
        self.specs.iter().map(|spec| spec.to_tool()).collect()
    }

    pub fn entrypoint(&self, name: &str) -> Option<&Entrypoint> {
        self.entrypoints.get(name)
    }

    pub fn has_entrypoint(&self, name: &str) -> bool {
        self.entrypoints.contains_key(name)
    }

    pub fn invocation(
        &self,
        name: &str,
        arguments: Option<Arguments>,
    ) -> Result<FunctionInvocation, InvocationError> {
        let spec = self
            .spec(name)
            .ok_or_else(|| InvocationError::UnknownFunction {
                name: name.to_string(),
            })?;
        Ok(FunctionInvocation::new(spec, arguments))
    }

    /// Builds an invocation from a model-issued call. Empty, whitespace-only
    /// or `null` argument text means no arguments.
    pub fn resolve(&self, call: &FunctionCall) -> Result<FunctionInvocation, InvocationError> {
        let arguments = parse_arguments(&call.name, &call.arguments)?;
        self.invocation(&call.name, arguments)
    }

    /// Runs `name` once and returns its result.
    pub fn invoke(
        &self,
        name: &str,
        arguments: Option<Arguments>,
    ) -> Result<Value, InvocationError> {
        let mut invocation = self.invocation(name, arguments)?;
        invocation.run(self)?;
        Ok(invocation.take_result().unwrap_or(Value::Null))
    }
}

fn parse_arguments(name: &str, text: &str) -> Result<Option<Arguments>, InvocationError> {
    let text = text.trim();
    if text.is_empty() {
        return Ok(None);
    }

    let invalid = |reason: String| InvocationError::InvalidArguments {
        name: name.to_string(),
        reason,
    };
    match serde_json::from_str::<Value>(text).map_err(|err| invalid(err.to_string()))? {
        Value::Null => Ok(None),
        Value::Object(arguments) => Ok(Some(arguments)),
        other => Err(invalid(format!("expected a JSON object, got {other}"))),
    }
}

struct PendingEntry {
    spec: FunctionSpec,
    schema_error: Option<SchemaError>,
    entrypoint: Option<Entrypoint>,
}

#[derive(Default)]
pub struct RegistryBuilder {
    config: RegistryConfig,
    entries: Vec<PendingEntry>,
}

impl RegistryBuilder {
    pub fn config(mut self, config: RegistryConfig) -> Self {
        self.config = config;
        self
    }

    /// Registers a callable. Its spec is derived from its name, description
    /// and type hints; its entrypoint validates arguments against the hints.
    pub fn register<C>(self, callable: C) -> Self
    where
        C: Callable + 'static,
    {
        self.register_shared(Arc::new(callable))
    }

    pub fn register_shared(mut self, callable: Arc<dyn Callable>) -> Self {
        let name = callable.name().to_string();
        let derivation = derive_parameters(&name, &callable.type_hints());
        let spec = FunctionSpec {
            name,
            description: callable.description().map(str::to_string),
            parameters: default_parameters(),
        };
        self.push(spec, derivation, Some(Entrypoint::from_shared(callable)));
        self
    }

    /// Registers a typed function whose schema comes from `T::Args`.
    pub fn register_typed<T>(mut self, function: T) -> Self
    where
        T: TypedFunction + 'static,
    {
        let derivation = SchemaDerivation::settle(T::NAME, schema_for::<T::Args>());
        let spec = FunctionSpec {
            name: T::NAME.to_string(),
            description: T::DESCRIPTION.map(str::to_string),
            parameters: default_parameters(),
        };
        self.push(spec, derivation, Some(Entrypoint::from_typed(function)));
        self
    }

    /// Adds a spec the model may see but the host cannot run.
    pub fn advertise(mut self, spec: FunctionSpec) -> Self {
        self.entries.push(PendingEntry {
            spec,
            schema_error: None,
            entrypoint: None,
        });
        self
    }

    fn push(
        &mut self,
        mut spec: FunctionSpec,
        derivation: SchemaDerivation,
        entrypoint: Option<Entrypoint>,
    ) {
        let schema_error = match &derivation {
            SchemaDerivation::Fallback { reason } => Some(reason.clone()),
            SchemaDerivation::Derived(_) => None,
        };
        spec.parameters = derivation.into_schema();
        self.entries.push(PendingEntry {
            spec,
            schema_error,
            entrypoint,
        });
    }

    pub fn build(self) -> Result<FunctionRegistry, RegistryError> {
        let mut seen = HashSet::new();
        let mut specs = Vec::with_capacity(self.entries.len());
        let mut index = HashMap::new();
        let mut entrypoints = HashMap::new();

        for entry in self.entries {
            let name = entry.spec.name.clone();

            if self.config.strict_names {
                FunctionSpec::validate_name(&name).map_err(|reason| RegistryError::InvalidName {
                    name: name.clone(),
                    reason,
                })?;
            } else if name.trim().is_empty() {
                return Err(RegistryError::InvalidName {
                    name,
                    reason: "name must not be empty".to_string(),
                });
            }

            if !seen.insert(name.clone()) {
                return Err(RegistryError::DuplicateName { name });
            }

            if let Some(source) = entry.schema_error {
                if !self.config.schema_fallback {
                    return Err(RegistryError::Schema { name, source });
                }
            }

            if let Some(entrypoint) = entry.entrypoint {
                entrypoints.insert(name.clone(), entrypoint);
            }
            index.insert(name, specs.len());
            specs.push(Arc::new(entry.spec));
        }

        tracing::debug!(functions = specs.len(), "function registry built");

        Ok(FunctionRegistry {
            config: self.config,
            specs,
            index,
            entrypoints,
        })
    }
}

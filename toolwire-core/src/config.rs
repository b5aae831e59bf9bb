use serde::{Deserialize, Serialize};

/// Registry behaviour. Deserializable so hosts can load it alongside their
/// own configuration.
#[derive(Clone, Debug, Deserialize, Serialize, PartialEq, Eq)]
#[serde(default)]
pub struct RegistryConfig {
    /// Reject function names outside `[A-Za-z0-9_-]{1,64}` at build time.
    pub strict_names: bool,
    /// Advertise the permissive schema when a callable's hints cannot be
    /// turned into one. When off, such callables fail the build.
    pub schema_fallback: bool,
}

impl Default for RegistryConfig {
    fn default() -> Self {
        Self {
            strict_names: true,
            schema_fallback: true,
        }
    }
}

impl RegistryConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn strict_names(mut self, value: bool) -> Self {
        self.strict_names = value;
        self
    }

    pub fn schema_fallback(mut self, value: bool) -> Self {
        self.schema_fallback = value;
        self
    }
}

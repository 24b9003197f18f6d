//! # Value-Source Descriptors
//!
//! A descriptor declares where a slot's candidate values come from. Each slot carries at
//! most one [`ValueSource`]; an operation may instead carry one [`OperationSource`]
//! that produces the argument sets for all slots at once. The two styles are mutually
//! exclusive.
//!
//! ## Module Structure
//!
//! - **`values`**: explicit literal lists
//! - **`enums`**: enum constants with include/exclude/pattern filters
//! - **`range`**: arithmetic sequences over integers and floats
//!
//! Custom sources are referenced through [`ProviderRef`] and looked up in the
//! [`ProviderRegistry`](crate::registry::ProviderRegistry).
//!
//! Every descriptor is checked with [`ValueSource::check`] before any provider runs, so
//! configuration mistakes surface as `ConfigurationError` ahead of resolution.

use serde::{Deserialize, Serialize};
use tracing::trace;

use crate::config_err;
use crate::diagnostics::CartesianError;
use crate::registry::{ParameterProvider, ProviderRegistry};
use crate::signature::ParameterSlot;
use crate::value::Value;

pub mod enums;
pub mod range;
pub mod values;

pub use enums::{EnumSource, FilterMode};
pub use range::{NumericRange, Range};
pub use values::ValuesProvider;

/// Reference to a registered custom provider, plus the configuration payload handed to
/// the provider's `accept` hook.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProviderRef {
    pub id: String,
    #[serde(default)]
    pub config: serde_json::Value,
}

impl ProviderRef {
    pub fn new(id: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            config: serde_json::Value::Null,
        }
    }

    pub fn with_config(mut self, config: serde_json::Value) -> Self {
        self.config = config;
        self
    }
}

/// Descriptor attached to a single slot.
#[derive(Debug, Clone, PartialEq)]
pub enum ValueSource {
    Values(Vec<Value>),
    Enum(EnumSource),
    Range(NumericRange),
    Provider(ProviderRef),
}

impl ValueSource {
    /// Explicit literal values.
    pub fn values<I, T>(values: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<Value>,
    {
        ValueSource::Values(values.into_iter().map(Into::into).collect())
    }

    /// A registered single-parameter provider without configuration.
    pub fn provider(id: impl Into<String>) -> Self {
        ValueSource::Provider(ProviderRef::new(id))
    }

    pub fn kind_name(&self) -> &'static str {
        match self {
            ValueSource::Values(_) => "values",
            ValueSource::Enum(_) => "enum",
            ValueSource::Range(_) => "range",
            ValueSource::Provider(_) => "provider",
        }
    }

    /// Validates the descriptor against its slot without producing any values.
    pub fn check(
        &self,
        slot: &ParameterSlot,
        registry: &ProviderRegistry,
    ) -> Result<(), CartesianError> {
        match self {
            ValueSource::Values(values) => values::check_literals(values),
            ValueSource::Enum(source) => source.check(slot),
            ValueSource::Range(range) => range.check(),
            ValueSource::Provider(reference) => {
                if registry.has_parameter_provider(&reference.id) {
                    Ok(())
                } else {
                    Err(config_err!(
                        "",
                        "no parameter provider registered under '{}' (parameter '{}')",
                        reference.id,
                        slot.name
                    ))
                }
            }
        }
    }

    /// Produces the slot's candidate values.
    pub fn materialize(
        &self,
        slot: &ParameterSlot,
        registry: &ProviderRegistry,
    ) -> Result<Vec<Value>, CartesianError> {
        let values = match self {
            ValueSource::Values(values) => {
                ValuesProvider::new(values.clone()).provide_arguments(slot)?
            }
            ValueSource::Enum(source) => source.provide_arguments(slot)?,
            ValueSource::Range(range) => range.provide_arguments(slot)?,
            ValueSource::Provider(reference) => {
                let mut provider = registry.parameter_provider(&reference.id)?;
                provider.accept(&reference.config)?;
                provider.provide_arguments(slot)?
            }
        };
        trace!(
            parameter = %slot.name,
            source = self.kind_name(),
            count = values.len(),
            "materialized value source"
        );
        Ok(values)
    }
}

/// Descriptor attached to a whole operation.
#[derive(Debug, Clone, PartialEq)]
pub enum OperationSource {
    /// A named [`ArgumentSetsFactory`](crate::registry::ArgumentSetsFactory).
    Factory(String),
    /// A registered whole-operation provider.
    Provider(ProviderRef),
}

impl OperationSource {
    pub fn factory(name: impl Into<String>) -> Self {
        OperationSource::Factory(name.into())
    }

    pub fn provider(id: impl Into<String>) -> Self {
        OperationSource::Provider(ProviderRef::new(id))
    }

    pub fn kind_name(&self) -> &'static str {
        match self {
            OperationSource::Factory(_) => "factory",
            OperationSource::Provider(_) => "provider",
        }
    }

    /// Confirms the referenced factory or provider is registered.
    pub fn check(&self, registry: &ProviderRegistry) -> Result<(), CartesianError> {
        match self {
            OperationSource::Factory(name) if !registry.has_factory(name) => Err(config_err!(
                "",
                "no argument sets factory registered under '{}'",
                name
            )),
            OperationSource::Provider(reference)
                if !registry.has_operation_provider(&reference.id) =>
            {
                Err(config_err!(
                    "",
                    "no operation provider registered under '{}'",
                    reference.id
                ))
            }
            _ => Ok(()),
        }
    }
}

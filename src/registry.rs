//! # Provider Registry
//!
//! Maps provider identities to constructors for custom value sources. Two provider shapes
//! exist, plus plain factory functions:
//!
//! - [`ParameterProvider`]: materializes the values of one slot.
//! - [`OperationProvider`]: produces the complete [`ArgumentSets`] for an operation.
//! - [`ArgumentSetsFactory`]: a named `fn() -> ArgumentSets`.
//!
//! Providers are default-constructed afresh for every resolution and configured through
//! their `accept` hook before producing values, so one registry can serve concurrent
//! resolutions without sharing provider state.
//!
//! Registry Invariant: build the registry once at startup, then share it read-only
//! (by reference, `Arc`, or [`ProviderRegistry::install_global`]).

use std::fmt;

use im::HashMap;
use once_cell::sync::{Lazy, OnceCell};
use tracing::warn;

use crate::arguments::ArgumentSets;
use crate::config_err;
use crate::diagnostics::CartesianError;
use crate::signature::ParameterSlot;
use crate::value::Value;

/// A custom source of values for a single slot.
///
/// Providers must not look at other slots. `accept` runs once, before
/// `provide_arguments`, with the descriptor's configuration payload (`Null` when none
/// was given).
pub trait ParameterProvider: Send {
    fn accept(&mut self, _config: &serde_json::Value) -> Result<(), CartesianError> {
        Ok(())
    }

    fn provide_arguments(&self, slot: &ParameterSlot) -> Result<Vec<Value>, CartesianError>;
}

/// A custom source of argument sets for a whole operation.
///
/// Receives every slot of the operation, host-supplied ones included, and must return
/// one entry per non-host slot in declaration order. The result is validated like any
/// other argument sets.
pub trait OperationProvider: Send {
    fn accept(&mut self, _config: &serde_json::Value) -> Result<(), CartesianError> {
        Ok(())
    }

    fn provide_arguments(&self, slots: &[ParameterSlot]) -> Result<ArgumentSets, CartesianError>;
}

/// A named function producing the argument sets of an operation.
pub type ArgumentSetsFactory = fn() -> ArgumentSets;

pub type ParameterProviderCtor = fn() -> Box<dyn ParameterProvider>;
pub type OperationProviderCtor = fn() -> Box<dyn OperationProvider>;

fn construct_parameter<P: ParameterProvider + Default + 'static>() -> Box<dyn ParameterProvider> {
    Box::new(P::default())
}

fn construct_operation<P: OperationProvider + Default + 'static>() -> Box<dyn OperationProvider> {
    Box::new(P::default())
}

static GLOBAL: OnceCell<ProviderRegistry> = OnceCell::new();
static EMPTY: Lazy<ProviderRegistry> = Lazy::new(ProviderRegistry::new);

/// Registry for all custom providers and factories, inspectable at runtime.
#[derive(Clone, Default)]
pub struct ProviderRegistry {
    parameter_providers: HashMap<String, ParameterProviderCtor>,
    operation_providers: HashMap<String, OperationProviderCtor>,
    factories: HashMap<String, ArgumentSetsFactory>,
}

impl fmt::Debug for ProviderRegistry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ProviderRegistry")
            .field("parameter_providers", &self.parameter_providers.keys().collect::<Vec<_>>())
            .field("operation_providers", &self.operation_providers.keys().collect::<Vec<_>>())
            .field("factories", &self.factories.keys().collect::<Vec<_>>())
            .finish()
    }
}

impl ProviderRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Installs the process-wide registry. Fails, handing the registry back, if one was
    /// installed already.
    pub fn install_global(registry: ProviderRegistry) -> Result<(), ProviderRegistry> {
        GLOBAL.set(registry)
    }

    /// The process-wide registry, or an empty one when none was installed.
    pub fn global() -> &'static ProviderRegistry {
        GLOBAL.get().unwrap_or_else(|| &*EMPTY)
    }

    // API for extensibility.
    pub fn register_parameter_provider<P>(&mut self, id: &str)
    where
        P: ParameterProvider + Default + 'static,
    {
        self.register_parameter_ctor(id, construct_parameter::<P>);
    }

    pub fn register_parameter_ctor(&mut self, id: &str, ctor: ParameterProviderCtor) {
        if self.parameter_providers.insert(id.to_string(), ctor).is_some() {
            warn!(provider = id, "replaced parameter provider registration");
        }
    }

    pub fn register_operation_provider<P>(&mut self, id: &str)
    where
        P: OperationProvider + Default + 'static,
    {
        self.register_operation_ctor(id, construct_operation::<P>);
    }

    pub fn register_operation_ctor(&mut self, id: &str, ctor: OperationProviderCtor) {
        if self.operation_providers.insert(id.to_string(), ctor).is_some() {
            warn!(provider = id, "replaced operation provider registration");
        }
    }

    pub fn register_factory(&mut self, name: &str, factory: ArgumentSetsFactory) {
        if self.factories.insert(name.to_string(), factory).is_some() {
            warn!(factory = name, "replaced argument sets factory registration");
        }
    }

    /// Chaining form of [`register_parameter_provider`](Self::register_parameter_provider).
    pub fn with_parameter_provider<P>(mut self, id: &str) -> Self
    where
        P: ParameterProvider + Default + 'static,
    {
        self.register_parameter_provider::<P>(id);
        self
    }

    pub fn with_operation_provider<P>(mut self, id: &str) -> Self
    where
        P: OperationProvider + Default + 'static,
    {
        self.register_operation_provider::<P>(id);
        self
    }

    pub fn with_factory(mut self, name: &str, factory: ArgumentSetsFactory) -> Self {
        self.register_factory(name, factory);
        self
    }

    pub fn has_parameter_provider(&self, id: &str) -> bool {
        self.parameter_providers.contains_key(id)
    }

    pub fn has_operation_provider(&self, id: &str) -> bool {
        self.operation_providers.contains_key(id)
    }

    pub fn has_factory(&self, name: &str) -> bool {
        self.factories.contains_key(name)
    }

    /// Constructs a fresh instance of the parameter provider registered under `id`.
    pub fn parameter_provider(&self, id: &str) -> Result<Box<dyn ParameterProvider>, CartesianError> {
        self.parameter_providers
            .get(id)
            .map(|ctor| ctor())
            .ok_or_else(|| config_err!("", "no parameter provider registered under '{}'", id))
    }

    /// Constructs a fresh instance of the operation provider registered under `id`.
    pub fn operation_provider(&self, id: &str) -> Result<Box<dyn OperationProvider>, CartesianError> {
        self.operation_providers
            .get(id)
            .map(|ctor| ctor())
            .ok_or_else(|| config_err!("", "no operation provider registered under '{}'", id))
    }

    pub fn factory(&self, name: &str) -> Result<ArgumentSetsFactory, CartesianError> {
        self.factories
            .get(name)
            .copied()
            .ok_or_else(|| config_err!("", "no argument sets factory registered under '{}'", name))
    }

    /// All registered identities, sorted.
    pub fn list(&self) -> Vec<String> {
        let mut ids: Vec<String> = self
            .parameter_providers
            .keys()
            .chain(self.operation_providers.keys())
            .chain(self.factories.keys())
            .cloned()
            .collect();
        ids.sort();
        ids
    }

    pub fn len(&self) -> usize {
        self.parameter_providers.len() + self.operation_providers.len() + self.factories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

//! # Resolution Engine
//!
//! Drives one operation from declared descriptors to a lazily enumerable set of
//! invocations:
//!
//! 1. exclusive-style check,
//! 2. descriptor checks (no provider runs before all of them pass),
//! 3. argument sets resolution, per parameter or through the operation source,
//! 4. binding checks against the signature,
//! 5. freezing into a [`CartesianProduct`] plus a [`NameFormatter`].
//!
//! Errors raised anywhere in the pipeline name the operation they were raised for.

use std::sync::Arc;

use tracing::debug;

use crate::arguments::ArgumentSets;
use crate::diagnostics::CartesianError;
use crate::expansion::{CartesianProduct, InvocationTuple, Invocations};
use crate::naming::NameFormatter;
use crate::registry::ProviderRegistry;
use crate::settings::EngineSettings;
use crate::signature::{HostResolver, NoHostInjection, OperationDecl, ParameterSlot};
use crate::sources::OperationSource;
use crate::validation::{check_argument_sets, check_descriptors, check_exclusive_style};
use crate::value::Value;

// ============================================================================
// ENGINE
// ============================================================================

/// Resolves operations against a provider registry.
///
/// The engine holds no per-resolution state; one instance may resolve operations from
/// several threads at once.
#[derive(Clone)]
pub struct CartesianEngine {
    registry: Arc<ProviderRegistry>,
    host: Arc<dyn HostResolver>,
    settings: EngineSettings,
}

impl std::fmt::Debug for CartesianEngine {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CartesianEngine")
            .field("registry", &self.registry)
            .field("settings", &self.settings)
            .finish_non_exhaustive()
    }
}

impl Default for CartesianEngine {
    fn default() -> Self {
        Self::new(ProviderRegistry::new())
    }
}

impl CartesianEngine {
    pub fn new(registry: impl Into<Arc<ProviderRegistry>>) -> Self {
        Self {
            registry: registry.into(),
            host: Arc::new(NoHostInjection),
            settings: EngineSettings::default(),
        }
    }

    /// An engine over a snapshot of the process-wide registry.
    pub fn with_global_registry() -> Self {
        Self::new(ProviderRegistry::global().clone())
    }

    pub fn with_settings(mut self, settings: EngineSettings) -> Self {
        self.settings = settings;
        self
    }

    /// Sets the host's type-based injection rules. Undescribed slots the host injects are
    /// left to the host; described ones are reported as conflicts.
    pub fn with_host(mut self, host: impl HostResolver + 'static) -> Self {
        self.host = Arc::new(host);
        self
    }

    pub fn registry(&self) -> &ProviderRegistry {
        &self.registry
    }

    pub fn settings(&self) -> &EngineSettings {
        &self.settings
    }

    /// Resolves `op` into its invocations.
    pub fn resolve(&self, op: &OperationDecl) -> Result<Resolution, CartesianError> {
        check_exclusive_style(op)?;
        let op = &op.clone().claim_host_slots(self.host.as_ref());
        check_descriptors(op, &self.registry, self.host.as_ref())?;

        let sets = self
            .argument_sets(op)
            .map_err(|e| e.for_operation(&op.name))?;
        check_argument_sets(op, &sets, self.host.as_ref())?;

        let product = CartesianProduct::new(sets).map_err(|e| e.for_operation(&op.name))?;
        let pattern = op
            .name_pattern
            .clone()
            .unwrap_or_else(|| self.settings.name_pattern.clone());
        let formatter =
            NameFormatter::new(pattern, op.display_name.clone()).with_settings(&self.settings);

        debug!(
            operation = %op.name,
            style = op.source.as_ref().map_or("parameter", OperationSource::kind_name),
            slots = op.parameters.len(),
            invocations = product.len(),
            "resolved operation"
        );

        Ok(Resolution {
            operation: Arc::new(op.clone()),
            product,
            formatter: Arc::new(formatter),
        })
    }

    /// Resolves every operation, stopping at the first failure.
    pub fn resolve_all<'a, I>(&self, ops: I) -> Result<Vec<Resolution>, CartesianError>
    where
        I: IntoIterator<Item = &'a OperationDecl>,
    {
        ops.into_iter().map(|op| self.resolve(op)).collect()
    }

    fn argument_sets(&self, op: &OperationDecl) -> Result<ArgumentSets, CartesianError> {
        match &op.source {
            Some(OperationSource::Factory(name)) => {
                let factory = self.registry.factory(name)?;
                Ok(factory())
            }
            Some(OperationSource::Provider(reference)) => {
                let mut provider = self.registry.operation_provider(&reference.id)?;
                provider.accept(&reference.config)?;
                let slots: Vec<ParameterSlot> = op.slots().cloned().collect();
                provider.provide_arguments(&slots)
            }
            None => {
                let mut sets = ArgumentSets::new();
                for param in op.parameters.iter().filter(|p| !p.slot.host_supplied) {
                    if let Some(source) = &param.source {
                        sets.add(source.materialize(&param.slot, &self.registry)?);
                    }
                }
                Ok(sets)
            }
        }
    }
}

// ============================================================================
// RESOLUTION
// ============================================================================

/// The resolved invocations of one operation.
///
/// Cheap to clone and safe to share between threads; every accessor reads immutable
/// data.
#[derive(Debug, Clone)]
pub struct Resolution {
    operation: Arc<OperationDecl>,
    product: CartesianProduct,
    formatter: Arc<NameFormatter>,
}

impl Resolution {
    pub fn operation(&self) -> &OperationDecl {
        &self.operation
    }

    pub fn product(&self) -> &CartesianProduct {
        &self.product
    }

    pub fn formatter(&self) -> &NameFormatter {
        &self.formatter
    }

    /// Number of invocations.
    pub fn len(&self) -> usize {
        self.product.len()
    }

    pub fn is_empty(&self) -> bool {
        self.product.is_empty()
    }

    /// Lazily decodes every invocation, in enumeration order.
    pub fn invocations(&self) -> Invocations {
        self.product.iter()
    }

    pub fn get(&self, index: usize) -> Option<InvocationTuple> {
        self.product.get(index)
    }

    pub fn display_name(&self, tuple: &InvocationTuple) -> String {
        self.formatter.format(tuple)
    }

    pub fn slots(&self) -> impl Iterator<Item = &ParameterSlot> {
        self.operation.slots()
    }

    /// Pairs every slot with its argument from `tuple`. Host-supplied slots get `None`;
    /// the host binds those itself.
    pub fn bind<'a>(&'a self, tuple: &'a InvocationTuple) -> Vec<(&'a ParameterSlot, Option<&'a Value>)> {
        let mut arguments = tuple.arguments().iter();
        self.operation
            .slots()
            .map(|slot| {
                let value = if slot.host_supplied {
                    None
                } else {
                    arguments.next()
                };
                (slot, value)
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::diagnostics::ErrorType;
    use crate::sources::ValueSource;
    use crate::value::ParamType;

    fn numbers_and_chars() -> OperationDecl {
        OperationDecl::new("numbers_and_chars")
            .parameter("number", ParamType::Int, ValueSource::values([1, 2, 4]))
            .parameter("character", ParamType::String, ValueSource::values(["A", "B"]))
    }

    #[test]
    fn resolves_per_parameter_descriptors() {
        let resolution = CartesianEngine::default().resolve(&numbers_and_chars()).unwrap();
        assert_eq!(resolution.len(), 6);
        let third = resolution.get(2).unwrap();
        assert_eq!(third.arguments(), &[Value::Int(2), Value::from("A")]);
        assert_eq!(resolution.display_name(&third), "[3] 2, A");
    }

    #[test]
    fn operation_pattern_overrides_settings() {
        let op = numbers_and_chars().with_name_pattern("{displayName}: {1}{0}");
        let resolution = CartesianEngine::default().resolve(&op).unwrap();
        let first = resolution.invocations().next().unwrap();
        assert_eq!(resolution.display_name(&first), "numbers_and_chars: A1");
    }

    #[test]
    fn bind_skips_host_supplied_slots() {
        let op = OperationDecl::new("op")
            .parameter("a", ParamType::Int, ValueSource::values([7]))
            .host_parameter("info", ParamType::Other("TestInfo".into()))
            .parameter("b", ParamType::Bool, ValueSource::values([true]));
        let resolution = CartesianEngine::default().resolve(&op).unwrap();
        let tuple = resolution.get(0).unwrap();
        let bound: Vec<(&str, Option<&Value>)> = resolution
            .bind(&tuple)
            .into_iter()
            .map(|(slot, value)| (slot.name.as_str(), value))
            .collect();
        assert_eq!(
            bound,
            vec![
                ("a", Some(&Value::Int(7))),
                ("info", None),
                ("b", Some(&Value::Bool(true))),
            ]
        );
    }

    #[test]
    fn errors_name_the_operation() {
        let op = OperationDecl::new("ranged").parameter(
            "n",
            ParamType::Int,
            ValueSource::Range(crate::sources::Range::new(3i64, 1).into()),
        );
        let err = CartesianEngine::default().resolve(&op).unwrap_err();
        assert_eq!(err.error_type(), ErrorType::Configuration);
        assert_eq!(err.operation(), "ranged");
    }

    #[test]
    fn operations_without_parameters_run_once() {
        let resolution = CartesianEngine::default().resolve(&OperationDecl::new("plain")).unwrap();
        assert_eq!(resolution.len(), 1);
        assert_eq!(resolution.display_name(&resolution.get(0).unwrap()), "[1] ");
    }
}

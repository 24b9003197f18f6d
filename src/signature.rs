//! Operation signatures: the slots of a test operation and the descriptors attached to
//! them, as supplied by the host framework.

use std::sync::Arc;

use crate::sources::{OperationSource, ValueSource};
use crate::value::ParamType;

/// One formal parameter of a test operation.
#[derive(Debug, Clone, PartialEq)]
pub struct ParameterSlot {
    pub index: usize,
    pub name: String,
    pub ty: ParamType,
    /// The host injects this parameter itself; it never takes part in the argument sets.
    pub host_supplied: bool,
}

impl ParameterSlot {
    pub fn new(index: usize, name: impl Into<String>, ty: ParamType) -> Self {
        Self {
            index,
            name: name.into(),
            ty,
            host_supplied: false,
        }
    }
}

/// A slot together with the (optional) descriptor attached to it.
#[derive(Debug, Clone)]
pub struct ParameterDecl {
    pub slot: ParameterSlot,
    pub source: Option<ValueSource>,
}

/// Everything the engine needs to know about one test operation.
///
/// # Examples
///
/// ```rust
/// use cartesian_engine::signature::OperationDecl;
/// use cartesian_engine::sources::ValueSource;
/// use cartesian_engine::value::ParamType;
///
/// let op = OperationDecl::new("numbers_and_chars")
///     .parameter("number", ParamType::Int, ValueSource::values([1, 2, 4]))
///     .parameter("character", ParamType::String, ValueSource::values(["A", "B"]));
/// assert_eq!(op.slots().count(), 2);
/// ```
#[derive(Debug, Clone)]
pub struct OperationDecl {
    pub name: String,
    pub display_name: String,
    /// Overrides the engine-wide display name pattern.
    pub name_pattern: Option<String>,
    pub parameters: Vec<ParameterDecl>,
    pub source: Option<OperationSource>,
}

impl OperationDecl {
    /// Creates an operation with no parameters; the display name defaults to `name`.
    pub fn new(name: impl Into<String>) -> Self {
        let name = name.into();
        Self {
            display_name: name.clone(),
            name,
            name_pattern: None,
            parameters: Vec::new(),
            source: None,
        }
    }

    pub fn with_display_name(mut self, display_name: impl Into<String>) -> Self {
        self.display_name = display_name.into();
        self
    }

    pub fn with_name_pattern(mut self, pattern: impl Into<String>) -> Self {
        self.name_pattern = Some(pattern.into());
        self
    }

    /// Appends a parameter carrying a value source.
    pub fn parameter(self, name: impl Into<String>, ty: ParamType, source: ValueSource) -> Self {
        self.push(name, ty, Some(source), false)
    }

    /// Appends a parameter without a value source (used with operation-level sources).
    pub fn bare_parameter(self, name: impl Into<String>, ty: ParamType) -> Self {
        self.push(name, ty, None, false)
    }

    /// Appends a parameter that the host injects itself.
    pub fn host_parameter(self, name: impl Into<String>, ty: ParamType) -> Self {
        self.push(name, ty, None, true)
    }

    /// Appends a fully specified declaration; the slot index is reassigned to its position.
    pub fn declare(mut self, mut decl: ParameterDecl) -> Self {
        decl.slot.index = self.parameters.len();
        self.parameters.push(decl);
        self
    }

    pub fn with_source(mut self, source: OperationSource) -> Self {
        self.source = Some(source);
        self
    }

    fn push(
        self,
        name: impl Into<String>,
        ty: ParamType,
        source: Option<ValueSource>,
        host_supplied: bool,
    ) -> Self {
        let mut slot = ParameterSlot::new(0, name, ty);
        slot.host_supplied = host_supplied;
        self.declare(ParameterDecl { slot, source })
    }

    pub fn slots(&self) -> impl Iterator<Item = &ParameterSlot> {
        self.parameters.iter().map(|p| &p.slot)
    }

    /// Slots that take their values from the argument sets, in declaration order.
    pub fn cartesian_slots(&self) -> impl Iterator<Item = &ParameterSlot> {
        self.slots().filter(|s| !s.host_supplied)
    }

    pub fn has_parameter_sources(&self) -> bool {
        self.parameters.iter().any(|p| p.source.is_some())
    }

    /// Marks every undescribed slot that `host` injects by type as host supplied.
    ///
    /// Slots that carry a descriptor are left alone, so the binding checks still report
    /// them as conflicts.
    pub fn claim_host_slots(mut self, host: &dyn HostResolver) -> Self {
        for param in &mut self.parameters {
            if param.source.is_none() && !param.slot.host_supplied && host.supplies(&param.slot) {
                param.slot.host_supplied = true;
            }
        }
        self
    }
}

/// The host framework's type-based auto-injection, consulted for conflict detection.
///
/// A slot the host would fill on its own must not also receive a value from the
/// argument sets.
pub trait HostResolver: Send + Sync {
    fn supplies(&self, slot: &ParameterSlot) -> bool;
}

/// A host that injects nothing by type.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoHostInjection;

impl HostResolver for NoHostInjection {
    fn supplies(&self, _slot: &ParameterSlot) -> bool {
        false
    }
}

/// A host that injects every slot whose declared type is one of the listed
/// [`ParamType::Other`] names.
#[derive(Debug, Clone, Default)]
pub struct InjectedTypes {
    types: Vec<String>,
}

impl InjectedTypes {
    pub fn new<I, S>(types: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            types: types.into_iter().map(Into::into).collect(),
        }
    }
}

impl HostResolver for InjectedTypes {
    fn supplies(&self, slot: &ParameterSlot) -> bool {
        match &slot.ty {
            ParamType::Other(name) => self.types.iter().any(|t| t == name),
            _ => false,
        }
    }
}

impl<T: HostResolver + ?Sized> HostResolver for Arc<T> {
    fn supplies(&self, slot: &ParameterSlot) -> bool {
        (**self).supplies(slot)
    }
}

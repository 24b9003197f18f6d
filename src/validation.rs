//! # Validation Layer
//!
//! Checks that run around resolution, in this order:
//!
//! 1. [`check_exclusive_style`]: per-parameter descriptors XOR one operation source.
//! 2. [`check_descriptors`]: every descriptor is well formed and every referenced provider
//!    exists. No provider has run yet.
//! 3. [`check_argument_sets`]: the resolved sets cover exactly the cartesian slots, in
//!    order, with assignable values and no slot the host claims as well.
//!
//! Steps 1 and 2 raise `ConfigurationError`; step 3 raises `ParameterResolutionError`.
//! Conflicts and missing descriptors found in step 2 are binding problems and are
//! reported as `ParameterResolutionError` too.

use crate::arguments::ArgumentSets;
use crate::diagnostics::CartesianError;
use crate::registry::ProviderRegistry;
use crate::signature::{HostResolver, OperationDecl, ParameterSlot};
use crate::{config_err, resolution_err};

/// Rejects operations that mix per-parameter descriptors with an operation source.
pub fn check_exclusive_style(op: &OperationDecl) -> Result<(), CartesianError> {
    let Some(source) = &op.source else {
        return Ok(());
    };
    let annotated: Vec<&str> = op
        .parameters
        .iter()
        .filter(|p| p.source.is_some())
        .map(|p| p.slot.name.as_str())
        .collect();
    if annotated.is_empty() {
        return Ok(());
    }
    Err(config_err!(
        &op.name,
        "an operation-level {} source cannot be combined with parameter value sources (on {})",
        source.kind_name(),
        annotated.join(", ")
    )
    .with_help("declare values either per parameter or through the operation source, not both"))
}

/// Validates every descriptor attached to the operation without producing values.
pub fn check_descriptors(
    op: &OperationDecl,
    registry: &ProviderRegistry,
    host: &dyn HostResolver,
) -> Result<(), CartesianError> {
    if let Some(source) = &op.source {
        return source.check(registry).map_err(|e| e.for_operation(&op.name));
    }
    for param in op.parameters.iter().filter(|p| !p.slot.host_supplied) {
        if let Some(source) = &param.source {
            source
                .check(&param.slot, registry)
                .map_err(|e| e.for_operation(&op.name))?;
        }
    }
    for param in &op.parameters {
        let slot = &param.slot;
        match &param.source {
            Some(_) if slot.host_supplied || host.supplies(slot) => {
                return Err(conflict(op, slot))
            }
            None if !slot.host_supplied => {
                return Err(resolution_err!(
                    &op.name,
                    "parameter '{}' (index {}) has no value source",
                    slot.name,
                    slot.index
                )
                .with_help("attach a value source or mark the parameter as host supplied"))
            }
            _ => {}
        }
    }
    Ok(())
}

/// Validates resolved argument sets against the operation's slots.
pub fn check_argument_sets(
    op: &OperationDecl,
    sets: &ArgumentSets,
    host: &dyn HostResolver,
) -> Result<(), CartesianError> {
    let slots: Vec<&ParameterSlot> = op.cartesian_slots().collect();

    if sets.len() != slots.len() {
        let direction = if sets.len() < slots.len() { "few" } else { "many" };
        return Err(resolution_err!(
            &op.name,
            "too {} argument sets: the operation has {} resolvable parameter(s) but {} set(s) were supplied",
            direction,
            slots.len(),
            sets.len()
        ));
    }

    for (position, (slot, values)) in slots.iter().zip(sets.entries()).enumerate() {
        if host.supplies(slot) {
            return Err(conflict(op, slot));
        }
        if let Some(value) = values.iter().find(|v| !slot.ty.accepts(v)) {
            return Err(resolution_err!(
                &op.name,
                "argument set {} holds {} value '{}', which cannot be bound to parameter '{}' of type {}",
                position,
                value.kind_name(),
                value,
                slot.name,
                slot.ty
            )
            .with_help("argument sets must follow the parameter declaration order"));
        }
    }
    Ok(())
}

fn conflict(op: &OperationDecl, slot: &ParameterSlot) -> CartesianError {
    resolution_err!(
        &op.name,
        "conflicting parameters: '{}' (index {}) is supplied by the host and by a value source",
        slot.name,
        slot.index
    )
}

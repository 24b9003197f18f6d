//! Shared fixtures for the integration tests.

#![allow(dead_code)]

use std::sync::Arc;

use cartesian_engine::prelude::*;

/// Six constants, used wherever a test needs an enum with enough members to filter.
pub enum Album {
    Debut,
    Fearless,
    Red,
    Eras,
    Forever,
    Midnights,
}

impl CartesianEnum for Album {
    const TYPE_NAME: &'static str = "Album";
    const CONSTANTS: &'static [&'static str] =
        &["DEBUT", "FEARLESS", "RED", "ERAS", "FOREVER", "MIDNIGHTS"];
}

pub fn album() -> Arc<EnumType> {
    EnumType::of::<Album>()
}

/// Single-parameter provider yielding `count` (default 2) strings derived from the slot
/// name.
#[derive(Default)]
pub struct Labels {
    count: u64,
}

impl ParameterProvider for Labels {
    fn accept(&mut self, config: &serde_json::Value) -> Result<(), CartesianError> {
        self.count = config.get("count").and_then(serde_json::Value::as_u64).unwrap_or(2);
        Ok(())
    }

    fn provide_arguments(&self, slot: &ParameterSlot) -> Result<Vec<Value>, CartesianError> {
        Ok((0..self.count)
            .map(|i| Value::from(format!("{}{}", slot.name, i)))
            .collect())
    }
}

/// Whole-operation provider that always yields two entries, whatever the signature.
#[derive(Default)]
pub struct TwoEntries;

impl OperationProvider for TwoEntries {
    fn provide_arguments(&self, _slots: &[ParameterSlot]) -> Result<ArgumentSets, CartesianError> {
        Ok(ArgumentSets::arguments_for_first_parameter([1, 2]).arguments_for_next_parameter(["x"]))
    }
}

/// Whole-operation provider that feeds `[1, 2, 4] x ["A", "B"]`.
#[derive(Default)]
pub struct NumbersAndChars;

impl OperationProvider for NumbersAndChars {
    fn provide_arguments(&self, _slots: &[ParameterSlot]) -> Result<ArgumentSets, CartesianError> {
        Ok(ArgumentSets::arguments_for_first_parameter([1, 2, 4])
            .arguments_for_next_parameter(["A", "B"]))
    }
}

pub fn bits() -> ArgumentSets {
    ArgumentSets::arguments_for_first_parameter(["0", "1"]).arguments_for_next_parameter(["0", "1"])
}

pub fn registry() -> ProviderRegistry {
    ProviderRegistry::new()
        .with_parameter_provider::<Labels>("labels")
        .with_operation_provider::<TwoEntries>("two-entries")
        .with_operation_provider::<NumbersAndChars>("numbers-and-chars")
        .with_factory("bits", bits)
}

pub fn engine() -> CartesianEngine {
    cartesian_engine::logging::init_test_tracing();
    CartesianEngine::new(registry())
}

/// Renders every invocation as comma-joined values.
pub fn rendered(resolution: &Resolution) -> Vec<String> {
    resolution
        .invocations()
        .map(|tuple| {
            tuple
                .arguments()
                .iter()
                .map(ToString::to_string)
                .collect::<Vec<_>>()
                .join(",")
        })
        .collect()
}

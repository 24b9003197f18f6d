//! End-to-end resolution scenarios: descriptors in, named invocations out.

mod common;

use cartesian_engine::prelude::*;
use serde_json::json;

use common::{album, engine, rendered};

fn numbers_and_chars() -> OperationDecl {
    OperationDecl::new("numbers_and_chars")
        .parameter("number", ParamType::Int, ValueSource::values([1, 2, 4]))
        .parameter("character", ParamType::String, ValueSource::values(["A", "B"]))
}

#[test]
fn test_per_parameter_values_expand_in_order() {
    let resolution = engine().resolve(&numbers_and_chars()).unwrap();

    assert_eq!(resolution.len(), 6);
    assert_eq!(rendered(&resolution), vec!["1,A", "1,B", "2,A", "2,B", "4,A", "4,B"]);

    let third = resolution.invocations().nth(2).unwrap();
    assert_eq!(third.arguments(), &[Value::Int(2), Value::from("A")]);
}

#[test]
fn test_operation_provider_matches_per_parameter_style() {
    let op = OperationDecl::new("numbers_and_chars")
        .bare_parameter("number", ParamType::Int)
        .bare_parameter("character", ParamType::String)
        .with_source(OperationSource::provider("numbers-and-chars"));
    let from_provider = engine().resolve(&op).unwrap();
    let from_values = engine().resolve(&numbers_and_chars()).unwrap();
    assert_eq!(rendered(&from_provider), rendered(&from_values));
}

#[test]
fn test_factory_with_custom_display_names() {
    let op = OperationDecl::new("bits")
        .bare_parameter("first", ParamType::String)
        .bare_parameter("second", ParamType::String)
        .with_source(OperationSource::factory("bits"))
        .with_name_pattern("{index} => first bit: {0} second bit: {1}");
    let resolution = engine().resolve(&op).unwrap();

    let names: Vec<String> = resolution
        .invocations()
        .map(|tuple| resolution.display_name(&tuple))
        .collect();
    assert_eq!(
        names,
        vec![
            "1 => first bit: 0 second bit: 0",
            "2 => first bit: 0 second bit: 1",
            "3 => first bit: 1 second bit: 0",
            "4 => first bit: 1 second bit: 1",
        ]
    );
}

#[test]
fn test_duplicate_literals_do_not_repeat_invocations() {
    let op = OperationDecl::new("dupes")
        .parameter("a", ParamType::Int, ValueSource::values([1, 1, 3]))
        .parameter("b", ParamType::Int, ValueSource::values([2, 2]));
    let resolution = engine().resolve(&op).unwrap();
    assert_eq!(rendered(&resolution), vec!["1,2", "3,2"]);
}

#[test]
fn test_empty_value_list_yields_no_invocations() {
    let none: [i64; 0] = [];
    let op = OperationDecl::new("empty")
        .parameter("a", ParamType::Int, ValueSource::values([1, 2]))
        .parameter("b", ParamType::Int, ValueSource::values(none));
    let resolution = engine().resolve(&op).unwrap();
    assert!(resolution.is_empty());
    assert_eq!(resolution.invocations().count(), 0);
}

#[test]
fn test_mixed_style_is_a_configuration_error() {
    let op = numbers_and_chars().with_source(OperationSource::factory("bits"));
    let err = engine().resolve(&op).unwrap_err();
    assert_eq!(err.error_type(), ErrorType::Configuration);
    assert_eq!(err.operation(), "numbers_and_chars");
}

#[test]
fn test_operation_provider_arity_mismatch() {
    let three = OperationDecl::new("three")
        .bare_parameter("a", ParamType::Int)
        .bare_parameter("b", ParamType::String)
        .bare_parameter("c", ParamType::Bool)
        .with_source(OperationSource::provider("two-entries"));
    let err = engine().resolve(&three).unwrap_err();
    assert_eq!(err.error_type(), ErrorType::ParameterResolution);
    assert_eq!(err.operation(), "three");
    assert!(err.message().contains("too few"), "{}", err.message());

    let one = OperationDecl::new("one")
        .bare_parameter("a", ParamType::Int)
        .with_source(OperationSource::provider("two-entries"));
    let err = engine().resolve(&one).unwrap_err();
    assert_eq!(err.error_type(), ErrorType::ParameterResolution);
    assert!(err.message().contains("too many"), "{}", err.message());
}

#[test]
fn test_wrongly_ordered_sets_fail_binding() {
    let op = OperationDecl::new("swapped")
        .bare_parameter("character", ParamType::String)
        .bare_parameter("number", ParamType::Int)
        .with_source(OperationSource::provider("numbers-and-chars"));
    let err = engine().resolve(&op).unwrap_err();
    assert_eq!(err.error_type(), ErrorType::ParameterResolution);
}

#[test]
fn test_enum_exclusion_keeps_declaration_order() {
    let op = OperationDecl::new("albums").parameter(
        "album",
        ParamType::Enum(album()),
        ValueSource::Enum(EnumSource::all().excluding(["ERAS", "FOREVER"])),
    );
    let resolution = engine().resolve(&op).unwrap();
    assert_eq!(rendered(&resolution), vec!["DEBUT", "FEARLESS", "RED", "MIDNIGHTS"]);
}

#[test]
fn test_enum_pattern_modes() {
    let resolve = |source: EnumSource| {
        let op = OperationDecl::new("albums").parameter(
            "album",
            ParamType::Enum(album()),
            ValueSource::Enum(source),
        );
        rendered(&engine().resolve(&op).unwrap())
    };
    assert_eq!(resolve(EnumSource::all().matching_any(["F.*", "R.*"])), vec!["FEARLESS", "RED", "FOREVER"]);
    assert_eq!(resolve(EnumSource::all().matching_all([".*E.*", ".*S"])), vec!["FEARLESS", "ERAS"]);
    assert_eq!(resolve(EnumSource::all().matching_none([".*E.*"])), vec!["MIDNIGHTS"]);
}

#[test]
fn test_enum_type_must_be_inferable() {
    let op = OperationDecl::new("untyped").parameter(
        "album",
        ParamType::String,
        ValueSource::Enum(EnumSource::all()),
    );
    let err = engine().resolve(&op).unwrap_err();
    assert_eq!(err.error_type(), ErrorType::Configuration);
    assert_eq!(err.operation(), "untyped");
}

#[test]
fn test_unknown_enum_names_are_rejected() {
    let op = OperationDecl::new("albums").parameter(
        "album",
        ParamType::Enum(album()),
        ValueSource::Enum(EnumSource::all().including(["REPUTATION"])),
    );
    let err = engine().resolve(&op).unwrap_err();
    assert_eq!(err.error_type(), ErrorType::Configuration);
}

#[test]
fn test_ranges_open_and_closed() {
    let resolve = |range: Range<i64>| {
        let op = OperationDecl::new("range").parameter(
            "n",
            ParamType::Int,
            ValueSource::Range(range.into()),
        );
        rendered(&engine().resolve(&op).unwrap())
    };
    assert_eq!(resolve(Range::new(1, 3)), vec!["1", "2"]);
    assert_eq!(resolve(Range::new(1, 3).closed()), vec!["1", "2", "3"]);
    assert_eq!(resolve(Range::new(3, 1).step(-1)), vec!["3", "2"]);
}

#[test]
fn test_float_ranges_bind_to_float_slots() {
    let op = OperationDecl::new("ratios").parameter(
        "ratio",
        ParamType::Float,
        ValueSource::Range(Range::new(0.0, 1.0).step(0.25).closed().into()),
    );
    let resolution = engine().resolve(&op).unwrap();
    assert_eq!(rendered(&resolution), vec!["0.0", "0.25", "0.5", "0.75", "1.0"]);
}

#[test]
fn test_illegal_range_is_a_configuration_error() {
    let op = OperationDecl::new("range").parameter(
        "n",
        ParamType::Int,
        ValueSource::Range(Range::new(1i64, 3).step(0).into()),
    );
    let err = engine().resolve(&op).unwrap_err();
    assert_eq!(err.error_type(), ErrorType::Configuration);
}

#[test]
fn test_configuration_errors_win_over_binding_errors() {
    let op = OperationDecl::new("both")
        .bare_parameter("missing", ParamType::Int)
        .parameter("n", ParamType::Int, ValueSource::Range(Range::new(2i64, 2).into()));
    let err = engine().resolve(&op).unwrap_err();
    assert_eq!(err.error_type(), ErrorType::Configuration);
}

#[test]
fn test_mixed_literal_kinds_are_rejected() {
    let op = OperationDecl::new("mixed").parameter(
        "a",
        ParamType::Any,
        ValueSource::Values(vec![Value::Int(1), Value::from("one")]),
    );
    let err = engine().resolve(&op).unwrap_err();
    assert_eq!(err.error_type(), ErrorType::Configuration);
}

#[test]
fn test_custom_parameter_provider_receives_config() {
    let op = OperationDecl::new("labelled")
        .parameter(
            "tag",
            ParamType::String,
            ValueSource::Provider(ProviderRef::new("labels").with_config(json!({"count": 3}))),
        )
        .parameter("flag", ParamType::Bool, ValueSource::values([true]));
    let resolution = engine().resolve(&op).unwrap();
    assert_eq!(rendered(&resolution), vec!["tag0,true", "tag1,true", "tag2,true"]);

    // A fresh provider per resolution: the default count applies again.
    let op = OperationDecl::new("labelled").parameter("tag", ParamType::String, ValueSource::provider("labels"));
    assert_eq!(engine().resolve(&op).unwrap().len(), 2);
}

#[test]
fn test_unknown_provider_is_a_configuration_error() {
    let op = OperationDecl::new("unknown").parameter("a", ParamType::Int, ValueSource::provider("nope"));
    let err = engine().resolve(&op).unwrap_err();
    assert_eq!(err.error_type(), ErrorType::Configuration);
    assert_eq!(err.operation(), "unknown");

    let op = OperationDecl::new("unknown").with_source(OperationSource::factory("nope"));
    assert_eq!(engine().resolve(&op).unwrap_err().error_type(), ErrorType::Configuration);
}

#[test]
fn test_host_injected_parameters_conflict_with_descriptors() {
    let engine = engine().with_host(InjectedTypes::new(["TestInfo"]));
    let op = OperationDecl::new("injected").parameter(
        "info",
        ParamType::Other("TestInfo".into()),
        ValueSource::values([Option::<&str>::None]),
    );
    let err = engine.resolve(&op).unwrap_err();
    assert_eq!(err.error_type(), ErrorType::ParameterResolution);
    assert!(err.message().contains("conflicting parameters"));
}

#[test]
fn test_host_supplied_slots_are_left_to_the_host() {
    let op = OperationDecl::new("reported")
        .parameter("n", ParamType::Int, ValueSource::values([1, 2]))
        .host_parameter("reporter", ParamType::Other("Reporter".into()));
    let resolution = engine().resolve(&op).unwrap();
    assert_eq!(resolution.len(), 2);

    let tuple = resolution.get(1).unwrap();
    let bound = resolution.bind(&tuple);
    assert_eq!(bound[0].1, Some(&Value::Int(2)));
    assert_eq!(bound[1].0.name, "reporter");
    assert_eq!(bound[1].1, None);
}

#[test]
fn test_host_injected_slots_without_descriptors_are_skipped() {
    let engine = engine().with_host(InjectedTypes::new(["TestInfo"]));
    let op = OperationDecl::new("injected")
        .parameter("n", ParamType::Int, ValueSource::values([1, 2]))
        .bare_parameter("info", ParamType::Other("TestInfo".into()));
    let resolution = engine.resolve(&op).unwrap();
    assert_eq!(resolution.len(), 2);
    assert_eq!(rendered(&resolution), vec!["1", "2"]);

    let tuple = resolution.get(0).unwrap();
    let bound = resolution.bind(&tuple);
    assert_eq!(bound[0].1, Some(&Value::Int(1)));
    assert_eq!(bound[1].0.name, "info");
    assert!(bound[1].0.host_supplied);
    assert_eq!(bound[1].1, None);
}

#[test]
fn test_operation_provider_skips_host_injected_slots() {
    let engine = engine().with_host(InjectedTypes::new(["TestInfo"]));
    let op = OperationDecl::new("numbers_and_chars")
        .bare_parameter("number", ParamType::Int)
        .bare_parameter("character", ParamType::String)
        .bare_parameter("info", ParamType::Other("TestInfo".into()))
        .with_source(OperationSource::provider("numbers-and-chars"));
    let resolution = engine.resolve(&op).unwrap();
    assert_eq!(resolution.len(), 6);
    assert_eq!(rendered(&resolution)[5], "4,B");
}

#[test]
fn test_invalid_pattern_degrades_to_marked_name() {
    let op = numbers_and_chars().with_name_pattern("{0");
    let resolution = engine().resolve(&op).unwrap();
    let name = resolution.display_name(&resolution.get(0).unwrap());
    assert!(
        name.starts_with("numbers_and_chars [1] (invalid display name pattern:"),
        "{name}"
    );
}

#[test]
fn test_settings_supply_the_default_pattern() {
    let settings = EngineSettings {
        name_pattern: "{displayName} ({arguments})".to_string(),
        arguments_separator: "/".to_string(),
        ..EngineSettings::default()
    };
    let resolution = engine()
        .with_settings(settings)
        .resolve(&numbers_and_chars().with_display_name("Numbers"))
        .unwrap();
    let last = resolution.invocations().last().unwrap();
    assert_eq!(resolution.display_name(&last), "Numbers (4/B)");
}

#[test]
fn test_global_registry() {
    let _ = ProviderRegistry::install_global(common::registry());
    let op = OperationDecl::new("bits")
        .bare_parameter("first", ParamType::String)
        .bare_parameter("second", ParamType::String)
        .with_source(OperationSource::factory("bits"));
    let resolution = CartesianEngine::with_global_registry().resolve(&op).unwrap();
    assert_eq!(resolution.len(), 4);
}

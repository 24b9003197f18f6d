//! # Plan Files
//!
//! Declarative operation descriptors in YAML or JSON, for hosts that keep their test
//! matrix outside of code.
//!
//! ```yaml
//! settings:
//!   name_pattern: "{displayName} [{index}]"
//! enums:
//!   - name: Album
//!     constants: [DEBUT, FEARLESS, RED]
//! operations:
//!   - name: albums_by_year
//!     parameters:
//!       - name: album
//!         type: enum:Album
//!         source:
//!           enum: { mode: EXCLUDE, names: [RED] }
//!       - name: year
//!         type: int
//!         source:
//!           range: { from: 2006, to: 2008, closed: true }
//!       - name: info
//!         type: TestInfo
//!         host_supplied: true
//! ```
//!
//! Literal values are converted to the declared slot type while loading; any remaining
//! mismatch is left for the binding checks of the engine.

use std::collections::HashMap;
use std::fs;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::info;
use walkdir::WalkDir;

use crate::config_err;
use crate::diagnostics::CartesianError;
use crate::settings::EngineSettings;
use crate::signature::{OperationDecl, ParameterDecl, ParameterSlot};
use crate::sources::{
    EnumSource, FilterMode, NumericRange, OperationSource, ProviderRef, Range, ValueSource,
};
use crate::value::{EnumType, ParamType, Value};

// ============================================================================
// LOADED PLANS
// ============================================================================

/// The contents of one plan file, converted to engine types.
#[derive(Debug, Clone, Default)]
pub struct Plan {
    /// File the plan was loaded from, if any.
    pub path: Option<PathBuf>,
    pub settings: EngineSettings,
    pub enums: Vec<Arc<EnumType>>,
    pub operations: Vec<OperationDecl>,
}

impl Plan {
    pub fn enum_type(&self, name: &str) -> Option<&Arc<EnumType>> {
        self.enums.iter().find(|ty| ty.name() == name)
    }

    pub fn operation(&self, name: &str) -> Option<&OperationDecl> {
        self.operations.iter().find(|op| op.name == name)
    }
}

pub fn parse_plan_yaml(text: &str) -> Result<Plan, CartesianError> {
    let file: PlanFile = serde_yaml::from_str(text)
        .map_err(|e| config_err!("", "invalid YAML plan: {}", e).with_source(e))?;
    file.into_plan()
}

pub fn parse_plan_json(text: &str) -> Result<Plan, CartesianError> {
    let file: PlanFile = serde_json::from_str(text)
        .map_err(|e| config_err!("", "invalid JSON plan: {}", e).with_source(e))?;
    file.into_plan()
}

/// Loads a plan file; `.json` files are read as JSON, everything else as YAML.
pub fn load_plan_file<P: AsRef<Path>>(path: P) -> Result<Plan, CartesianError> {
    let path = path.as_ref();
    let text = fs::read_to_string(path).map_err(|e| {
        config_err!("", "failed to read plan file '{}': {}", path.display(), e).with_source(e)
    })?;

    let parsed = if is_json(path) {
        parse_plan_json(&text)
    } else {
        parse_plan_yaml(&text)
    };
    let mut plan = parsed.map_err(|e| {
        let message = format!("{} ({})", e.message(), path.display());
        relabel(e, message)
    })?;

    info!(
        path = %path.display(),
        enums = plan.enums.len(),
        operations = plan.operations.len(),
        "loaded plan file"
    );
    plan.path = Some(path.to_path_buf());
    Ok(plan)
}

/// Loads every `.yaml`, `.yml` and `.json` file under `root`, sorted by path.
pub fn load_plan_dir<P: AsRef<Path>>(root: P) -> Result<Vec<Plan>, CartesianError> {
    let mut files = Vec::new();
    for entry in WalkDir::new(root.as_ref()) {
        let entry = entry.map_err(|e| {
            config_err!("", "failed to walk plan directory: {}", e).with_source(e)
        })?;
        if entry.file_type().is_file() && is_plan_file(entry.path()) {
            files.push(entry.path().to_path_buf());
        }
    }
    files.sort();
    files.iter().map(load_plan_file).collect()
}

fn is_json(path: &Path) -> bool {
    path.extension().map(|ext| ext == "json").unwrap_or(false)
}

fn is_plan_file(path: &Path) -> bool {
    path.extension()
        .map(|ext| ext == "yaml" || ext == "yml" || ext == "json")
        .unwrap_or(false)
}

fn relabel(error: CartesianError, message: String) -> CartesianError {
    match error {
        CartesianError::Configuration {
            operation,
            help,
            source,
            ..
        } => CartesianError::Configuration {
            operation,
            message,
            help,
            source,
        },
        other => other,
    }
}

// ============================================================================
// SERIALIZED FORM
// ============================================================================

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct PlanFile {
    settings: EngineSettings,
    enums: Vec<EnumTypeDef>,
    operations: Vec<OperationDef>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
struct EnumTypeDef {
    name: String,
    constants: Vec<String>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
struct OperationDef {
    name: String,
    #[serde(default)]
    display_name: Option<String>,
    #[serde(default)]
    name_pattern: Option<String>,
    #[serde(default)]
    parameters: Vec<ParameterDef>,
    #[serde(default)]
    source: Option<OperationSourceDef>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
struct ParameterDef {
    name: String,
    #[serde(rename = "type")]
    ty: String,
    #[serde(default)]
    host_supplied: bool,
    #[serde(default)]
    source: Option<ValueSourceDef>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct ValueSourceDef {
    values: Option<Vec<serde_json::Value>>,
    #[serde(rename = "enum")]
    enumeration: Option<EnumSourceDef>,
    range: Option<RangeDef>,
    provider: Option<ProviderRef>,
}

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct EnumSourceDef {
    #[serde(rename = "type")]
    enum_type: Option<String>,
    mode: FilterMode,
    names: Vec<String>,
}

#[derive(Debug, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
struct RangeDef {
    #[serde(default)]
    from: Option<serde_json::Number>,
    to: serde_json::Number,
    #[serde(default)]
    step: Option<serde_json::Number>,
    #[serde(default)]
    closed: bool,
}

#[derive(Debug, Default, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct OperationSourceDef {
    factory: Option<String>,
    provider: Option<ProviderRef>,
}

// ============================================================================
// CONVERSION
// ============================================================================

type EnumTable = HashMap<String, Arc<EnumType>>;

impl PlanFile {
    fn into_plan(self) -> Result<Plan, CartesianError> {
        let mut table = EnumTable::new();
        let mut enums = Vec::with_capacity(self.enums.len());
        for def in self.enums {
            if table.contains_key(&def.name) {
                return Err(config_err!("", "enum '{}' is declared twice", def.name));
            }
            let ty = Arc::new(EnumType::new(def.name.clone(), def.constants));
            table.insert(def.name, Arc::clone(&ty));
            enums.push(ty);
        }

        let operations = self
            .operations
            .into_iter()
            .map(|op| op.into_decl(&table))
            .collect::<Result<Vec<_>, _>>()?;

        Ok(Plan {
            path: None,
            settings: self.settings,
            enums,
            operations,
        })
    }
}

impl OperationDef {
    fn into_decl(self, enums: &EnumTable) -> Result<OperationDecl, CartesianError> {
        let name = self.name;
        let mut decl = OperationDecl::new(name.clone());
        if let Some(display_name) = self.display_name {
            decl = decl.with_display_name(display_name);
        }
        if let Some(pattern) = self.name_pattern {
            decl = decl.with_name_pattern(pattern);
        }

        for param in self.parameters {
            let ty = parse_param_type(&param.ty, enums).map_err(|e| e.for_operation(&name))?;
            let mut slot = ParameterSlot::new(0, param.name, ty);
            slot.host_supplied = param.host_supplied;
            let source = param
                .source
                .map(|def| def.into_source(&slot, enums))
                .transpose()
                .map_err(|e| e.for_operation(&name))?;
            decl = decl.declare(ParameterDecl { slot, source });
        }

        if let Some(source) = self.source {
            decl = decl.with_source(source.into_source(&name)?);
        }
        Ok(decl)
    }
}

impl ValueSourceDef {
    fn into_source(
        self,
        slot: &ParameterSlot,
        enums: &EnumTable,
    ) -> Result<ValueSource, CartesianError> {
        let given = [
            self.values.is_some(),
            self.enumeration.is_some(),
            self.range.is_some(),
            self.provider.is_some(),
        ]
        .iter()
        .filter(|set| **set)
        .count();
        if given != 1 {
            return Err(config_err!(
                "",
                "parameter '{}' must declare exactly one of values, enum, range or provider (found {})",
                slot.name,
                given
            ));
        }

        if let Some(values) = self.values {
            let values = values
                .iter()
                .map(|v| convert_literal(v, &slot.ty, &slot.name))
                .collect::<Result<Vec<_>, _>>()?;
            return Ok(ValueSource::Values(values));
        }
        if let Some(def) = self.enumeration {
            let enum_type = def
                .enum_type
                .map(|name| lookup_enum(&name, enums))
                .transpose()?;
            return Ok(ValueSource::Enum(EnumSource {
                enum_type,
                names: def.names,
                mode: def.mode,
            }));
        }
        if let Some(def) = self.range {
            return Ok(ValueSource::Range(def.into_range(&slot.ty)));
        }
        match self.provider {
            Some(reference) => Ok(ValueSource::Provider(reference)),
            None => Err(config_err!("", "parameter '{}' has an empty source", slot.name)),
        }
    }
}

impl RangeDef {
    /// Integral unless the slot is a float slot or any bound is fractional. A missing
    /// `from` starts the range at zero.
    fn into_range(self, ty: &ParamType) -> NumericRange {
        let from = self.from.unwrap_or_else(|| serde_json::Number::from(0u64));
        let step = self.step.clone();
        let integral = (
            from.as_i64(),
            self.to.as_i64(),
            step.as_ref().map_or(Some(1), serde_json::Number::as_i64),
        );
        match integral {
            (Some(from), Some(to), Some(step)) if *ty != ParamType::Float => {
                let range = Range { from, to, step, closed: self.closed };
                NumericRange::Integral(range)
            }
            _ => {
                let float = |n: &serde_json::Number| n.as_f64().unwrap_or(f64::NAN);
                let range = Range {
                    from: float(&from),
                    to: float(&self.to),
                    step: step.as_ref().map_or(1.0, float),
                    closed: self.closed,
                };
                NumericRange::Floating(range)
            }
        }
    }
}

impl OperationSourceDef {
    fn into_source(self, operation: &str) -> Result<OperationSource, CartesianError> {
        match (self.factory, self.provider) {
            (Some(factory), None) => Ok(OperationSource::Factory(factory)),
            (None, Some(reference)) => Ok(OperationSource::Provider(reference)),
            _ => Err(config_err!(
                operation,
                "an operation source must declare exactly one of factory or provider"
            )),
        }
    }
}

fn lookup_enum(name: &str, enums: &EnumTable) -> Result<Arc<EnumType>, CartesianError> {
    enums.get(name).cloned().ok_or_else(|| {
        let mut known: Vec<&str> = enums.keys().map(String::as_str).collect();
        known.sort_unstable();
        config_err!("", "unknown enum type '{}'", name)
            .with_help(format!("declared enums: {}", known.join(", ")))
    })
}

/// Parses `bool`, `int`, `float`, `char`, `string`, `any` and `enum:<Name>`; any other
/// name is a host-only type.
fn parse_param_type(name: &str, enums: &EnumTable) -> Result<ParamType, CartesianError> {
    Ok(match name.trim() {
        "bool" => ParamType::Bool,
        "int" => ParamType::Int,
        "float" => ParamType::Float,
        "char" => ParamType::Char,
        "string" => ParamType::String,
        "any" => ParamType::Any,
        other => match other.strip_prefix("enum:") {
            Some(enum_name) => ParamType::Enum(lookup_enum(enum_name.trim(), enums)?),
            None => ParamType::Other(other.to_string()),
        },
    })
}

fn convert_literal(
    literal: &serde_json::Value,
    ty: &ParamType,
    parameter: &str,
) -> Result<Value, CartesianError> {
    use serde_json::Value as Json;

    Ok(match (literal, ty) {
        (Json::Null, _) => Value::Null,
        (Json::Bool(b), _) => Value::Bool(*b),
        (Json::Number(n), ParamType::Float) => n.as_f64().map(Value::Float).unwrap_or(Value::Null),
        (Json::Number(n), _) => match n.as_i64() {
            Some(i) => Value::Int(i),
            None => n.as_f64().map(Value::Float).unwrap_or(Value::Null),
        },
        (Json::String(s), ParamType::Char) => {
            let mut chars = s.chars();
            match (chars.next(), chars.next()) {
                (Some(c), None) => Value::Char(c),
                _ => {
                    return Err(config_err!(
                        "",
                        "'{}' is not a single character (parameter '{}')",
                        s,
                        parameter
                    ))
                }
            }
        }
        (Json::String(s), ParamType::Enum(enum_type)) => {
            enum_type.constant(s).map(Value::Enum).ok_or_else(|| {
                config_err!(
                    "",
                    "'{}' is not a constant of enum '{}' (parameter '{}')",
                    s,
                    enum_type.name(),
                    parameter
                )
            })?
        }
        (Json::String(s), _) => Value::String(s.clone()),
        (Json::Array(_) | Json::Object(_), _) => {
            return Err(config_err!(
                "",
                "parameter '{}' lists a nested collection; only scalar literals are supported",
                parameter
            ))
        }
    })
}

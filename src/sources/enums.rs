//! Enum constant sources.
//!
//! The constant set is taken from an explicit [`EnumType`] or, when none is given,
//! inferred from the slot's declared type. A [`FilterMode`] then narrows it down by
//! name. Name patterns are regular expressions that must match the whole identifier.

use std::collections::HashSet;
use std::sync::Arc;

use regex::Regex;
use serde::{Deserialize, Serialize};

use crate::config_err;
use crate::diagnostics::CartesianError;
use crate::registry::ParameterProvider;
use crate::signature::ParameterSlot;
use crate::value::{EnumConstant, EnumType, Value};

/// How the name list of an [`EnumSource`] selects constants.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum FilterMode {
    /// Keep only the named constants, or all of them when no names are given.
    #[default]
    Include,
    /// Keep every constant except the named ones.
    Exclude,
    /// Keep constants whose identifier matches every pattern.
    MatchAll,
    /// Keep constants whose identifier matches at least one pattern.
    MatchAny,
    /// Keep constants whose identifier matches none of the patterns.
    MatchNone,
}

impl FilterMode {
    pub fn is_pattern_mode(&self) -> bool {
        matches!(
            self,
            FilterMode::MatchAll | FilterMode::MatchAny | FilterMode::MatchNone
        )
    }
}

/// Descriptor for a slot whose values are enum constants.
///
/// # Examples
///
/// ```rust
/// use std::sync::Arc;
/// use cartesian_engine::sources::EnumSource;
/// use cartesian_engine::value::EnumType;
///
/// let ty = Arc::new(EnumType::new("Bit", ["ZERO", "ONE"]));
/// let selected = EnumSource::all().excluding(["ZERO"]).select(&ty).unwrap();
/// assert_eq!(selected[0].name(), "ONE");
/// ```
#[derive(Debug, Clone, PartialEq, Default)]
pub struct EnumSource {
    /// Explicit constant type; inferred from the slot when `None`.
    pub enum_type: Option<Arc<EnumType>>,
    pub names: Vec<String>,
    pub mode: FilterMode,
}

impl EnumSource {
    /// Every constant of the slot's enum type.
    pub fn all() -> Self {
        Self::default()
    }

    /// Every constant of an explicitly given type.
    pub fn of(enum_type: Arc<EnumType>) -> Self {
        Self {
            enum_type: Some(enum_type),
            ..Self::default()
        }
    }

    pub fn including<I, S>(self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.with_names(FilterMode::Include, names)
    }

    pub fn excluding<I, S>(self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.with_names(FilterMode::Exclude, names)
    }

    pub fn matching_all<I, S>(self, patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.with_names(FilterMode::MatchAll, patterns)
    }

    pub fn matching_any<I, S>(self, patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.with_names(FilterMode::MatchAny, patterns)
    }

    pub fn matching_none<I, S>(self, patterns: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.with_names(FilterMode::MatchNone, patterns)
    }

    pub fn with_names<I, S>(mut self, mode: FilterMode, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.mode = mode;
        self.names = names.into_iter().map(Into::into).collect();
        self
    }

    /// Determines the constant type: explicit first, then the slot's declared type.
    pub fn resolve_type(&self, slot: &ParameterSlot) -> Result<Arc<EnumType>, CartesianError> {
        if let Some(ty) = &self.enum_type {
            return Ok(Arc::clone(ty));
        }
        slot.ty.as_enum().cloned().ok_or_else(|| {
            config_err!(
                "",
                "could not infer enum type for parameter '{}' of type {}",
                slot.name,
                slot.ty
            )
            .with_help("declare the parameter with an enum type or name the enum explicitly")
        })
    }

    /// Validates type inference, names and patterns without selecting anything.
    pub fn check(&self, slot: &ParameterSlot) -> Result<(), CartesianError> {
        let ty = self.resolve_type(slot)?;
        self.select(&ty).map(|_| ())
    }

    /// Applies the filter to `ty`'s constants, keeping declaration order.
    pub fn select(&self, ty: &Arc<EnumType>) -> Result<Vec<EnumConstant>, CartesianError> {
        check_duplicates(&self.names)?;
        let constants = ty.values();
        let selected = match self.mode {
            FilterMode::Include if self.names.is_empty() => constants,
            FilterMode::Include => {
                check_names_exist(ty, &self.names)?;
                constants
                    .into_iter()
                    .filter(|c| self.names.iter().any(|n| n == c.name()))
                    .collect()
            }
            FilterMode::Exclude => {
                check_names_exist(ty, &self.names)?;
                constants
                    .into_iter()
                    .filter(|c| !self.names.iter().any(|n| n == c.name()))
                    .collect()
            }
            FilterMode::MatchAll | FilterMode::MatchAny | FilterMode::MatchNone => {
                let patterns = compile_patterns(self.mode, &self.names)?;
                constants
                    .into_iter()
                    .filter(|c| {
                        let mut hits = patterns.iter().map(|p| p.is_match(c.name()));
                        match self.mode {
                            FilterMode::MatchAll => hits.all(|hit| hit),
                            FilterMode::MatchAny => hits.any(|hit| hit),
                            _ => !hits.any(|hit| hit),
                        }
                    })
                    .collect()
            }
        };
        Ok(selected)
    }
}

impl ParameterProvider for EnumSource {
    fn provide_arguments(&self, slot: &ParameterSlot) -> Result<Vec<Value>, CartesianError> {
        let ty = self.resolve_type(slot)?;
        Ok(self.select(&ty)?.into_iter().map(Value::Enum).collect())
    }
}

fn check_duplicates(names: &[String]) -> Result<(), CartesianError> {
    let mut seen = HashSet::new();
    let duplicates: Vec<&str> = names
        .iter()
        .filter(|n| !seen.insert(n.as_str()))
        .map(String::as_str)
        .collect();
    if duplicates.is_empty() {
        Ok(())
    } else {
        Err(config_err!(
            "",
            "duplicate enum constant name(s): {}",
            duplicates.join(", ")
        ))
    }
}

fn check_names_exist(ty: &EnumType, names: &[String]) -> Result<(), CartesianError> {
    let unknown: Vec<&str> = names
        .iter()
        .filter(|n| !ty.constants().contains(n))
        .map(String::as_str)
        .collect();
    if unknown.is_empty() {
        return Ok(());
    }
    Err(config_err!(
        "",
        "invalid enum constant name(s) for {}: {}",
        ty.name(),
        unknown.join(", ")
    )
    .with_help(format!("valid names are: {}", ty.constants().join(", "))))
}

fn compile_patterns(mode: FilterMode, patterns: &[String]) -> Result<Vec<Regex>, CartesianError> {
    if patterns.is_empty() {
        return Err(config_err!(
            "",
            "enum filter mode {:?} requires at least one pattern",
            mode
        ));
    }
    patterns
        .iter()
        .map(|p| {
            Regex::new(&format!("^(?:{p})$")).map_err(|e| {
                config_err!("", "invalid enum name pattern '{}'", p).with_source(e)
            })
        })
        .collect()
}

//! Engine-wide settings, loadable from YAML or JSON.

use serde::{Deserialize, Serialize};

use crate::config_err;
use crate::diagnostics::CartesianError;

pub const DEFAULT_NAME_PATTERN: &str = "[{index}] {arguments}";

/// Defaults applied to every operation the engine resolves.
///
/// Every field is optional in serialized form:
///
/// ```rust
/// use cartesian_engine::settings::EngineSettings;
/// let settings = EngineSettings::from_yaml_str("null_literal: none").unwrap();
/// assert_eq!(settings.null_literal, "none");
/// assert_eq!(settings.arguments_separator, ", ");
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EngineSettings {
    /// Display name pattern for operations that do not declare their own.
    pub name_pattern: String,
    /// Joins the values rendered by `{arguments}`.
    pub arguments_separator: String,
    /// How `Null` arguments render in display names.
    pub null_literal: String,
}

impl Default for EngineSettings {
    fn default() -> Self {
        Self {
            name_pattern: DEFAULT_NAME_PATTERN.to_string(),
            arguments_separator: ", ".to_string(),
            null_literal: "null".to_string(),
        }
    }
}

impl EngineSettings {
    pub fn from_yaml_str(text: &str) -> Result<Self, CartesianError> {
        serde_yaml::from_str(text)
            .map_err(|e| config_err!("", "invalid engine settings: {}", e).with_source(e))
    }

    pub fn from_json_str(text: &str) -> Result<Self, CartesianError> {
        serde_json::from_str(text)
            .map_err(|e| config_err!("", "invalid engine settings: {}", e).with_source(e))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn missing_fields_take_defaults() {
        let settings = EngineSettings::from_json_str(r#"{"name_pattern": "{displayName}"}"#).unwrap();
        assert_eq!(settings.name_pattern, "{displayName}");
        assert_eq!(settings.null_literal, "null");
    }

    #[test]
    fn malformed_settings_are_configuration_errors() {
        let err = EngineSettings::from_yaml_str("name_pattern: [1, 2]").unwrap_err();
        assert_eq!(err.error_type(), crate::diagnostics::ErrorType::Configuration);
    }
}

//! # Error Reporting
//!
//! Every failure the engine surfaces to a host is a [`CartesianError`]. There are exactly
//! two kinds, and both are fatal for the affected operation:
//!
//! - **Configuration**: the declarative setup is malformed or contradictory. Raised before
//!   any provider runs (exclusive-style violations, enum inference failures, illegal
//!   ranges, unknown provider identities, unreadable plan files).
//! - **ParameterResolution**: the argument sets cannot be bound to the operation's slots
//!   (too few, too many, wrongly ordered, or claimed by the host as well).
//!
//! Display-name formatting problems are not errors at this level; see
//! [`crate::naming`] for the degraded rendering.
//!
//! # Error Construction Macros
//!
//! - `config_err!(operation, "message {}", arg)`
//! - `resolution_err!(operation, "message {}", arg)`
//!
//! Both accept `format!`-style arguments. Attach help with
//! [`CartesianError::with_help`] and an underlying cause with
//! [`CartesianError::with_source`].

use std::fmt;

use miette::Diagnostic;
use thiserror::Error;

/// Boxed underlying cause carried by a [`CartesianError`].
pub type ErrorSource = Box<dyn std::error::Error + Send + Sync + 'static>;

/// Type-safe error classification, used by tests and hosts instead of string matching.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ErrorType {
    /// Malformed or conflicting declarative setup.
    Configuration,
    /// Arity, order or conflict problems while binding argument sets to slots.
    ParameterResolution,
}

impl ErrorType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ErrorType::Configuration => "Configuration",
            ErrorType::ParameterResolution => "ParameterResolution",
        }
    }
}

impl fmt::Display for ErrorType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Unified error type for every failure mode of parameter resolution.
#[derive(Debug, Error)]
pub enum CartesianError {
    #[error("Configuration error in '{operation}': {message}")]
    Configuration {
        operation: String,
        message: String,
        help: Option<String>,
        #[source]
        source: Option<ErrorSource>,
    },
    #[error("Parameter resolution error in '{operation}': {message}")]
    ParameterResolution {
        operation: String,
        message: String,
        help: Option<String>,
        #[source]
        source: Option<ErrorSource>,
    },
}

impl CartesianError {
    /// Creates a configuration error for `operation`.
    pub fn configuration(operation: impl Into<String>, message: impl Into<String>) -> Self {
        CartesianError::Configuration {
            operation: operation.into(),
            message: message.into(),
            help: None,
            source: None,
        }
    }

    /// Creates a parameter resolution error for `operation`.
    pub fn parameter_resolution(operation: impl Into<String>, message: impl Into<String>) -> Self {
        CartesianError::ParameterResolution {
            operation: operation.into(),
            message: message.into(),
            help: None,
            source: None,
        }
    }

    /// Attaches a help message, replacing any earlier one.
    pub fn with_help(mut self, text: impl Into<String>) -> Self {
        match &mut self {
            CartesianError::Configuration { help, .. }
            | CartesianError::ParameterResolution { help, .. } => *help = Some(text.into()),
        }
        self
    }

    /// Attaches the underlying cause.
    pub fn with_source(mut self, cause: impl Into<ErrorSource>) -> Self {
        match &mut self {
            CartesianError::Configuration { source, .. }
            | CartesianError::ParameterResolution { source, .. } => *source = Some(cause.into()),
        }
        self
    }

    /// Returns the type-safe classification of this error.
    pub fn error_type(&self) -> ErrorType {
        match self {
            CartesianError::Configuration { .. } => ErrorType::Configuration,
            CartesianError::ParameterResolution { .. } => ErrorType::ParameterResolution,
        }
    }

    /// Name of the operation the error was raised for.
    pub fn operation(&self) -> &str {
        match self {
            CartesianError::Configuration { operation, .. }
            | CartesianError::ParameterResolution { operation, .. } => operation,
        }
    }

    pub fn message(&self) -> &str {
        match self {
            CartesianError::Configuration { message, .. }
            | CartesianError::ParameterResolution { message, .. } => message,
        }
    }

    /// Re-labels the error with the operation it was finally raised for. Providers and
    /// descriptor checks build errors before they know which operation they serve.
    pub(crate) fn for_operation(mut self, name: &str) -> Self {
        match &mut self {
            CartesianError::Configuration { operation, .. }
            | CartesianError::ParameterResolution { operation, .. } => {
                if operation.is_empty() {
                    *operation = name.to_string();
                }
            }
        }
        self
    }

    fn help_text(&self) -> Option<&String> {
        match self {
            CartesianError::Configuration { help, .. }
            | CartesianError::ParameterResolution { help, .. } => help.as_ref(),
        }
    }
}

impl Diagnostic for CartesianError {
    fn code<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        let code = match self {
            CartesianError::Configuration { .. } => "cartesian::configuration",
            CartesianError::ParameterResolution { .. } => "cartesian::parameter_resolution",
        };
        Some(Box::new(code))
    }

    fn help<'a>(&'a self) -> Option<Box<dyn fmt::Display + 'a>> {
        self.help_text()
            .map(|h| Box::new(h) as Box<dyn fmt::Display + 'a>)
    }
}

/// Constructs a [`CartesianError::Configuration`] with a formatted message.
#[macro_export]
macro_rules! config_err {
    ($operation:expr, $msg:literal $(, $arg:expr)* $(,)?) => {
        $crate::CartesianError::configuration($operation, format!($msg $(, $arg)*))
    };
}

/// Constructs a [`CartesianError::ParameterResolution`] with a formatted message.
#[macro_export]
macro_rules! resolution_err {
    ($operation:expr, $msg:literal $(, $arg:expr)* $(,)?) => {
        $crate::CartesianError::parameter_resolution($operation, format!($msg $(, $arg)*))
    };
}

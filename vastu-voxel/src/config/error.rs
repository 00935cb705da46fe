//! Configuration errors.

use thiserror::Error;

/// A parameter failed to parse or validate.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum ConfigError {
    /// Value present but violates an invariant
    #[error("invalid parameter '{name}': {reason}")]
    InvalidParam {
        /// Parameter name
        name: String,
        /// Violated invariant
        reason: String,
    },

    /// Value present but of the wrong type
    #[error("parameter '{name}' has the wrong type, expected {expected}")]
    WrongType {
        /// Parameter name
        name: String,
        /// Expected type
        expected: &'static str,
    },

    /// String parameter names no known variant
    #[error("unknown {kind} '{value}'")]
    UnknownVariant {
        /// What was being selected (e.g. "map kind")
        kind: &'static str,
        /// Value found in the parameters
        value: String,
    },
}

impl ConfigError {
    /// Shorthand for [`ConfigError::InvalidParam`].
    pub fn invalid(name: impl Into<String>, reason: impl Into<String>) -> Self {
        ConfigError::InvalidParam {
            name: name.into(),
            reason: reason.into(),
        }
    }
}

/// Failure while loading a configuration or scenario file.
#[derive(Debug, Clone, Error)]
pub enum ConfigLoadError {
    /// I/O error
    #[error("IO error: {0}")]
    Io(String),

    /// YAML parse error
    #[error("Parse error: {0}")]
    Parse(String),

    /// File parsed but a section is invalid
    #[error(transparent)]
    Invalid(#[from] ConfigError),
}

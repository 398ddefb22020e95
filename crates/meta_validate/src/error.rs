//! Error types for the validate module.

use thiserror::Error;

/// Result type alias for validation operations.
pub type ValidationResult<T> = Result<T, ValidationError>;

/// Errors that can occur while configuring or running validation.
#[derive(Error, Debug)]
pub enum ValidationError {
    #[error("Unknown validation rule: {0}")]
    UnknownRule(String),

    #[error("Metamodel invalid: {errors} error(s), {warnings} warning(s)")]
    Failed { errors: usize, warnings: usize },

    #[error("YAML error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

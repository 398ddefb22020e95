//! Error types for the facets module.

use meta_model::ModelError;
use thiserror::Error;

/// Result type alias for facet processing.
pub type FacetResult<T> = Result<T, FacetError>;

/// Programming-model errors raised while processing a class.
#[derive(Error, Debug)]
pub enum FacetError {
    #[error("Factory '{factory}' failed on {holder}: {message}")]
    FactoryFailed {
        factory: String,
        holder: String,
        message: String,
    },

    #[error("Invalid pattern '{pattern}' on {holder}: {message}")]
    InvalidPattern {
        holder: String,
        pattern: String,
        message: String,
    },

    #[error("Ambiguous member {class}#{member}: both {first} and {second} are declared")]
    AmbiguousMember {
        class: String,
        member: String,
        first: String,
        second: String,
    },

    #[error("Factory not registered: {0}")]
    FactoryNotFound(String),

    #[error("Model error: {0}")]
    Model(#[from] ModelError),
}

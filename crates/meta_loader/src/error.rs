//! Error types for the loader module.

use std::path::PathBuf;

use meta_facets::FacetError;
use meta_model::ModelError;
use thiserror::Error;

/// Result type alias for loader operations.
pub type LoaderResult<T> = Result<T, LoaderError>;

/// Errors that can occur while building specifications.
#[derive(Error, Debug)]
pub enum LoaderError {
    #[error("Class not found: {0}")]
    ClassNotFound(String),

    #[error("Inheritance cycle at {class}: {}", .cycle.join(" -> "))]
    InheritanceCycle { class: String, cycle: Vec<String> },

    #[error("Build failed for {class}: {message}")]
    BuildFailed { class: String, message: String },

    #[error("Supertype {supertype} of {class} unavailable: {message}")]
    SupertypeFailed {
        class: String,
        supertype: String,
        message: String,
    },

    #[error("Invalid domain document {path}: {message}")]
    InvalidDocument { path: PathBuf, message: String },

    #[error("Thread pool error: {0}")]
    ThreadPool(String),

    #[error("Metamodel incomplete: {} class(es) failed to build", .failures.len())]
    MetaModelIncomplete { failures: Vec<(String, String)> },

    #[error("Facet error: {0}")]
    Facet(#[from] FacetError),

    #[error("Model error: {0}")]
    Model(#[from] ModelError),

    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),
}

impl LoaderError {
    /// Per-class failures carried by a `MetaModelIncomplete` error.
    pub fn failures(&self) -> &[(String, String)] {
        match self {
            LoaderError::MetaModelIncomplete { failures } => failures,
            _ => &[],
        }
    }
}

//! # meta_facets
//!
//! The programming model of the metamodel facet engine.
//!
//! This crate provides:
//! - **Facet factories**: independent units contributing facets per feature type
//! - **Programming model**: the ordered registry of factories, built-ins first
//! - **Processing contexts**: what a factory sees while processing one element
//! - **Method removal**: per-class bookkeeping of consumed support methods
//!
//! ## Example
//!
//! ```rust
//! use std::sync::Arc;
//! use meta_facets::{FacetResult, FnFactory, ProcessContext, ProgrammingModel};
//! use meta_model::{FacetType, FacetValue, FeatureType, Precedence};
//!
//! fn audited(ctx: &mut ProcessContext<'_>) -> FacetResult<()> {
//!     if ctx.annotation("Audited").is_some() {
//!         ctx.add_facet(FacetType::CssClass, Precedence::Explicit, FacetValue::Text("audited".into()));
//!     }
//!     Ok(())
//! }
//!
//! let model = ProgrammingModel::standard()
//!     .with_factory(Arc::new(FnFactory::new("audited", &[FeatureType::Object], audited)));
//! assert!(model.contains("audited"));
//! ```

pub mod context;
pub mod error;
pub mod factories;
pub mod factory;
pub mod prefix;
pub mod programming_model;

pub use context::{MethodRemover, ProcessContext};
pub use error::{FacetError, FacetResult};
pub use factories::{mixin_contributing, STANDARD_FACTORIES};
pub use factory::{FacetFactory, FnFactory, ProcessFn};
pub use prefix::{classify, is_support_method, MethodPrefix};
pub use programming_model::ProgrammingModel;

//! # meta_validate
//!
//! Metamodel validation for the facet engine.
//!
//! This crate provides:
//! - **Rules**: the standard checks run over a finished metamodel
//! - **Validator**: evaluates a rule set against a snapshot
//! - **Reports**: every violation, with severity and the identifier at fault
//!
//! ## Example
//!
//! ```rust
//! use meta_loader::SpecificationLoader;
//! use meta_model::{BeanSort, ClassDescriptor, ClassUniverse, MethodDescriptor, TypeRef};
//! use meta_validate::Validator;
//!
//! let universe = ClassUniverse::new().with_class(
//!     ClassDescriptor::new("shop.Customer")
//!         .sort(BeanSort::Entity)
//!         .method(MethodDescriptor::new("getName").returns(TypeRef::of("String"))),
//! );
//! let loader = SpecificationLoader::with_defaults(universe).unwrap();
//! let snapshot = loader.create_meta_model().unwrap();
//!
//! let report = Validator::default().validate(&snapshot);
//! assert!(report.is_valid());
//! ```

pub mod error;
pub mod rules;
pub mod validator;

pub use error::{ValidationError, ValidationResult};
pub use rules::{RuleSet, RuleSeverity, RuleType, ValidationRule, Violation};
pub use validator::{ValidationReport, Validator};

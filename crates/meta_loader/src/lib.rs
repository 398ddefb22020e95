//! # meta_loader
//!
//! Builds and caches the object specifications of a domain model.
//!
//! This crate provides:
//! - **Introspector**: runs the programming model over a class and its members
//! - **Specification loader**: a thread-safe cache with build-once semantics
//! - **Snapshots**: read-only views of a finished metamodel
//! - **Discovery**: loading class descriptors from YAML documents
//!
//! ## Example
//!
//! ```rust
//! use meta_loader::SpecificationLoader;
//! use meta_model::{BeanSort, ClassDescriptor, ClassUniverse, MethodDescriptor, TypeRef};
//!
//! let universe = ClassUniverse::new().with_class(
//!     ClassDescriptor::new("shop.Customer")
//!         .sort(BeanSort::Entity)
//!         .method(MethodDescriptor::new("getName").returns(TypeRef::of("String")))
//!         .method(MethodDescriptor::new("placeOrder")),
//! );
//!
//! let loader = SpecificationLoader::with_defaults(universe).unwrap();
//! let customer = loader.specification_for("shop.Customer").unwrap();
//! assert!(customer.member("name").is_some());
//! assert!(customer.member("placeOrder").is_some());
//! ```

pub mod discovery;
pub mod error;
pub mod introspector;
pub mod loader;
pub mod snapshot;

pub use discovery::DomainSource;
pub use error::{LoaderError, LoaderResult};
pub use introspector::{Introspector, ScannedMethods, SpecificationResolver, PROGRAMMATIC};
pub use loader::SpecificationLoader;
pub use snapshot::{LoaderStats, MetaModelSnapshot};

//! # meta_model
//!
//! Core types of the metamodel facet engine.
//!
//! This crate provides:
//! - **Identifiers**: names of classes, members and action parameters
//! - **Class descriptors**: the reflective surface of a domain class, read from YAML
//! - **Facets and holders**: typed capabilities with precedence-based override
//! - **Object specifications**: the finished, queryable model of one class
//! - **Configuration**: settings shared by the loader, the factories and the validator
//!
//! ## Example
//!
//! ```rust
//! use meta_model::{Facet, FacetHolder, FacetType, FacetValue, Identifier, Precedence};
//!
//! let id = Identifier::class("shop.Customer");
//! let mut holder = FacetHolder::new(id.clone());
//! holder.add_facet(Facet::new(
//!     FacetType::CssClass,
//!     Precedence::FromConfiguration,
//!     id.clone(),
//!     FacetValue::Text("from-config".to_string()),
//! ));
//! holder.add_facet(Facet::new(
//!     FacetType::CssClass,
//!     Precedence::Explicit,
//!     id,
//!     FacetValue::Text("from-method".to_string()),
//! ));
//!
//! assert_eq!(holder.facet(FacetType::CssClass).and_then(|f| f.text()), Some("from-method"));
//! ```

pub mod class;
pub mod config;
pub mod error;
pub mod facet;
pub mod holder;
pub mod identifier;
pub mod member;
pub mod naming;
pub mod order;
pub mod spec;
pub mod universe;

pub use class::{
    Annotated, Annotation, BeanSort, ClassDescriptor, ConstructorDescriptor, MethodDescriptor,
    MethodKey, MixinShape, ParameterDescriptor, TypeRef,
};
pub use config::{CssClassPattern, MetaModelConfig, ValidationConfig};
pub use error::{ModelError, ModelResult};
pub use facet::{ActionSemantics, Contributing, Facet, FacetType, FacetValue, Precedence};
pub use holder::{FacetHolder, FacetOutcome, HasFacets};
pub use identifier::{FeatureType, Identifier};
pub use member::{
    ActionParameter, MemberDescription, MemberKind, ObjectMember, ParameterDescription,
};
pub use spec::{IntrospectionState, ObjectSpecification, SpecDescription, SpecificationParts};
pub use universe::{ClassUniverse, DomainDocument, VALUE_TYPES};

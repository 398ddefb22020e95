//! Object members: properties, collections and actions.

use std::fmt;
use std::sync::{Arc, Weak};

use serde::{Deserialize, Serialize};

use crate::class::TypeRef;
use crate::facet::{Facet, FacetType};
use crate::holder::{FacetHolder, HasFacets};
use crate::identifier::FeatureType;
use crate::spec::ObjectSpecification;

/// The three kinds of object member.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum MemberKind {
    Property,
    Collection,
    Action,
}

impl MemberKind {
    pub fn feature_type(&self) -> FeatureType {
        match self {
            MemberKind::Property => FeatureType::Property,
            MemberKind::Collection => FeatureType::Collection,
            MemberKind::Action => FeatureType::Action,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            MemberKind::Property => "property",
            MemberKind::Collection => "collection",
            MemberKind::Action => "action",
        }
    }
}

impl fmt::Display for MemberKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Upgrade a type reference, hiding specifications still being built.
fn upgrade_ready(reference: &Option<Weak<ObjectSpecification>>) -> Option<Arc<ObjectSpecification>> {
    reference
        .as_ref()
        .and_then(Weak::upgrade)
        .filter(|spec| spec.is_fully_introspected())
}

/// A parameter of an action.
#[derive(Debug)]
pub struct ActionParameter {
    index: usize,
    name: String,
    type_ref: TypeRef,
    facets: FacetHolder,
    type_spec: Option<Weak<ObjectSpecification>>,
}

impl ActionParameter {
    pub fn new(index: usize, name: impl Into<String>, type_ref: TypeRef, facets: FacetHolder) -> Self {
        Self {
            index,
            name: name.into(),
            type_ref,
            facets,
            type_spec: None,
        }
    }

    pub fn with_type_spec(mut self, spec: Option<Weak<ObjectSpecification>>) -> Self {
        self.type_spec = spec;
        self
    }

    pub fn index(&self) -> usize {
        self.index
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn type_ref(&self) -> &TypeRef {
        &self.type_ref
    }

    /// Specification of the parameter type, once it is fully introspected.
    pub fn type_specification(&self) -> Option<Arc<ObjectSpecification>> {
        upgrade_ready(&self.type_spec)
    }

    /// Specification of the parameter type in whatever state it is in.
    pub fn type_reference(&self) -> Option<Arc<ObjectSpecification>> {
        self.type_spec.as_ref().and_then(Weak::upgrade)
    }

    pub fn describe(&self) -> ParameterDescription {
        ParameterDescription {
            index: self.index,
            name: self.name.clone(),
            type_name: self.type_ref.to_string(),
            facets: self.facets.facets().cloned().collect(),
        }
    }
}

impl HasFacets for ActionParameter {
    fn facet_holder(&self) -> &FacetHolder {
        &self.facets
    }
}

/// A property, collection or action owned by an [`ObjectSpecification`].
#[derive(Debug)]
pub struct ObjectMember {
    id: String,
    kind: MemberKind,
    type_ref: TypeRef,
    facets: FacetHolder,
    parameters: Vec<ActionParameter>,
    declaring_class: String,
    mixed_in_from: Option<String>,
    type_spec: Option<Weak<ObjectSpecification>>,
}

impl ObjectMember {
    pub fn new(
        id: impl Into<String>,
        kind: MemberKind,
        type_ref: TypeRef,
        facets: FacetHolder,
        declaring_class: impl Into<String>,
    ) -> Self {
        Self {
            id: id.into(),
            kind,
            type_ref,
            facets,
            parameters: Vec::new(),
            declaring_class: declaring_class.into(),
            mixed_in_from: None,
            type_spec: None,
        }
    }

    pub fn with_parameters(mut self, parameters: Vec<ActionParameter>) -> Self {
        self.parameters = parameters;
        self
    }

    pub fn with_mixin(mut self, mixin: impl Into<String>) -> Self {
        self.mixed_in_from = Some(mixin.into());
        self
    }

    pub fn with_type_spec(mut self, spec: Option<Weak<ObjectSpecification>>) -> Self {
        self.type_spec = spec;
        self
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    pub fn kind(&self) -> MemberKind {
        self.kind
    }

    /// Return type for properties and actions, container type for collections.
    pub fn type_ref(&self) -> &TypeRef {
        &self.type_ref
    }

    /// Name of the type the member refers to (element type for collections).
    pub fn referenced_type(&self) -> &str {
        match self.facets.facet(FacetType::TypeOf).and_then(Facet::text) {
            Some(type_of) => type_of,
            None => self.type_ref.referenced_type(),
        }
    }

    /// Specification of the referenced type, once it is fully introspected.
    pub fn type_specification(&self) -> Option<Arc<ObjectSpecification>> {
        upgrade_ready(&self.type_spec)
    }

    pub fn type_reference(&self) -> Option<Arc<ObjectSpecification>> {
        self.type_spec.as_ref().and_then(Weak::upgrade)
    }

    pub fn parameters(&self) -> &[ActionParameter] {
        &self.parameters
    }

    pub fn parameter(&self, index: usize) -> Option<&ActionParameter> {
        self.parameters.get(index)
    }

    pub fn declaring_class(&self) -> &str {
        &self.declaring_class
    }

    pub fn mixed_in_from(&self) -> Option<&str> {
        self.mixed_in_from.as_deref()
    }

    pub fn is_property(&self) -> bool {
        self.kind == MemberKind::Property
    }

    pub fn is_collection(&self) -> bool {
        self.kind == MemberKind::Collection
    }

    pub fn is_action(&self) -> bool {
        self.kind == MemberKind::Action
    }

    /// Display name: the `Named` facet, else the id.
    pub fn name(&self) -> &str {
        self.facets
            .facet(FacetType::Named)
            .and_then(Facet::text)
            .unwrap_or(&self.id)
    }

    /// Declared order sequence, if any.
    pub fn sequence(&self) -> Option<&str> {
        self.facets.facet(FacetType::MemberOrder).and_then(Facet::text)
    }

    /// A property with a setter that is not statically disabled.
    pub fn is_editable(&self) -> bool {
        self.kind == MemberKind::Property
            && self.facets.contains(FacetType::PropertySetter)
            && !self.facets.contains(FacetType::Disabled)
    }

    pub fn is_hidden(&self) -> bool {
        self.facets
            .facet(FacetType::Hidden)
            .map(|f| f.flag().unwrap_or(true))
            .unwrap_or(false)
    }

    pub fn describe(&self) -> MemberDescription {
        MemberDescription {
            id: self.id.clone(),
            kind: self.kind,
            type_name: self.type_ref.to_string(),
            facets: self.facets.facets().cloned().collect(),
            parameters: self.parameters.iter().map(ActionParameter::describe).collect(),
            mixed_in_from: self.mixed_in_from.clone(),
        }
    }
}

impl HasFacets for ObjectMember {
    fn facet_holder(&self) -> &FacetHolder {
        &self.facets
    }
}

/// Serializable view of an action parameter.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ParameterDescription {
    pub index: usize,
    pub name: String,
    pub type_name: String,
    pub facets: Vec<Facet>,
}

/// Serializable view of a member.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MemberDescription {
    pub id: String,
    pub kind: MemberKind,
    pub type_name: String,
    pub facets: Vec<Facet>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub parameters: Vec<ParameterDescription>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub mixed_in_from: Option<String>,
}

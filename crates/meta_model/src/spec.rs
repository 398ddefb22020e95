//! Object specifications: the finished per-class descriptor.
//!
//! A specification is allocated as a placeholder before its class is
//! introspected, so that cyclic references between classes resolve to the
//! same instance. The loader fills it in place with [`ObjectSpecification::install`]
//! once the facet pipeline has run; from then on it is read-only.

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, OnceLock, Weak};

use parking_lot::RwLock;
use serde::{Deserialize, Serialize};

use crate::class::{BeanSort, ClassDescriptor};
use crate::facet::{Facet, FacetType};
use crate::holder::FacetHolder;
use crate::member::{MemberDescription, MemberKind, ObjectMember};

/// Lifecycle state of a specification.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IntrospectionState {
    Introspecting,
    FullyIntrospected,
}

/// Everything the introspector produces for one class.
#[derive(Debug)]
pub struct SpecificationParts {
    pub descriptor: Arc<ClassDescriptor>,
    pub facets: FacetHolder,
    pub superclass: Option<Weak<ObjectSpecification>>,
    pub interfaces: Vec<Weak<ObjectSpecification>>,
    /// Members in their final display order.
    pub members: Vec<Arc<ObjectMember>>,
    /// Support methods no factory consumed.
    pub orphaned_methods: Vec<String>,
}

#[derive(Debug)]
struct Introspected {
    parts: SpecificationParts,
    member_index: OnceLock<HashMap<String, usize>>,
}

impl Introspected {
    fn member_index(&self) -> &HashMap<String, usize> {
        self.member_index.get_or_init(|| {
            let mut index = HashMap::with_capacity(self.parts.members.len());
            for (i, member) in self.parts.members.iter().enumerate() {
                // First member in display order wins on a colliding id.
                index.entry(member.id().to_string()).or_insert(i);
            }
            index
        })
    }
}

/// The behavioral descriptor of one class.
pub struct ObjectSpecification {
    name: String,
    introspected: RwLock<Option<Arc<Introspected>>>,
}

impl ObjectSpecification {
    /// A specification in the `Introspecting` state.
    pub fn placeholder(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            introspected: RwLock::new(None),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn state(&self) -> IntrospectionState {
        if self.introspected.read().is_some() {
            IntrospectionState::FullyIntrospected
        } else {
            IntrospectionState::Introspecting
        }
    }

    pub fn is_fully_introspected(&self) -> bool {
        self.state() == IntrospectionState::FullyIntrospected
    }

    /// Finalize the specification in place.
    pub fn install(&self, parts: SpecificationParts) {
        *self.introspected.write() = Some(Arc::new(Introspected {
            parts,
            member_index: OnceLock::new(),
        }));
    }

    /// Return to the `Introspecting` state ahead of a rebuild.
    pub fn reset(&self) {
        *self.introspected.write() = None;
    }

    fn current(&self) -> Option<Arc<Introspected>> {
        self.introspected.read().clone()
    }

    pub fn descriptor(&self) -> Option<Arc<ClassDescriptor>> {
        self.current().map(|i| i.parts.descriptor.clone())
    }

    pub fn sort(&self) -> BeanSort {
        self.current()
            .map(|i| i.parts.descriptor.sort)
            .unwrap_or_default()
    }

    pub fn is_abstract(&self) -> bool {
        self.current()
            .map(|i| i.parts.descriptor.is_abstract)
            .unwrap_or(false)
    }

    /// The `LogicalTypeName` facet, else the class name.
    pub fn logical_type_name(&self) -> String {
        self.facet(FacetType::LogicalTypeName)
            .and_then(|f| f.text().map(str::to_string))
            .unwrap_or_else(|| self.name.clone())
    }

    pub fn facet(&self, facet_type: FacetType) -> Option<Facet> {
        self.current()
            .and_then(|i| i.parts.facets.facet(facet_type).cloned())
    }

    pub fn contains_facet(&self, facet_type: FacetType) -> bool {
        self.current()
            .map(|i| i.parts.facets.contains(facet_type))
            .unwrap_or(false)
    }

    pub fn facets(&self) -> Vec<Facet> {
        self.current()
            .map(|i| i.parts.facets.facets().cloned().collect())
            .unwrap_or_default()
    }

    pub fn superclass(&self) -> Option<Arc<ObjectSpecification>> {
        self.current()
            .and_then(|i| i.parts.superclass.as_ref().and_then(Weak::upgrade))
    }

    pub fn interfaces(&self) -> Vec<Arc<ObjectSpecification>> {
        self.current()
            .map(|i| i.parts.interfaces.iter().filter_map(Weak::upgrade).collect())
            .unwrap_or_default()
    }

    /// All members in display order.
    pub fn members(&self) -> Vec<Arc<ObjectMember>> {
        self.current()
            .map(|i| i.parts.members.clone())
            .unwrap_or_default()
    }

    pub fn member(&self, id: &str) -> Option<Arc<ObjectMember>> {
        let introspected = self.current()?;
        let index = *introspected.member_index().get(id)?;
        introspected.parts.members.get(index).cloned()
    }

    fn members_of(&self, kind: MemberKind) -> Vec<Arc<ObjectMember>> {
        self.current()
            .map(|i| {
                i.parts
                    .members
                    .iter()
                    .filter(|m| m.kind() == kind)
                    .cloned()
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn properties(&self) -> Vec<Arc<ObjectMember>> {
        self.members_of(MemberKind::Property)
    }

    pub fn collections(&self) -> Vec<Arc<ObjectMember>> {
        self.members_of(MemberKind::Collection)
    }

    pub fn actions(&self) -> Vec<Arc<ObjectMember>> {
        self.members_of(MemberKind::Action)
    }

    pub fn orphaned_methods(&self) -> Vec<String> {
        self.current()
            .map(|i| i.parts.orphaned_methods.clone())
            .unwrap_or_default()
    }

    /// Whether instances can not be edited at all.
    pub fn is_immutable(&self) -> bool {
        self.facet(FacetType::Immutable)
            .and_then(|f| f.flag())
            .unwrap_or(false)
    }

    pub fn describe(&self) -> SpecDescription {
        let introspected = self.current();
        SpecDescription {
            name: self.name.clone(),
            logical_type_name: self.logical_type_name(),
            state: self.state(),
            sort: self.sort(),
            superclass: introspected
                .as_ref()
                .and_then(|i| i.parts.descriptor.superclass.clone()),
            interfaces: introspected
                .as_ref()
                .map(|i| i.parts.descriptor.interfaces.clone())
                .unwrap_or_default(),
            facets: self.facets(),
            members: self.members().iter().map(|m| m.describe()).collect(),
            orphaned_methods: self.orphaned_methods(),
        }
    }
}

impl fmt::Debug for ObjectSpecification {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ObjectSpecification")
            .field("name", &self.name)
            .field("state", &self.state())
            .field(
                "members",
                &self.members().iter().map(|m| m.id().to_string()).collect::<Vec<_>>(),
            )
            .finish()
    }
}

/// Serializable view of a specification.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct SpecDescription {
    pub name: String,
    pub logical_type_name: String,
    pub state: IntrospectionState,
    pub sort: BeanSort,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub superclass: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub interfaces: Vec<String>,
    pub facets: Vec<Facet>,
    pub members: Vec<MemberDescription>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub orphaned_methods: Vec<String>,
}

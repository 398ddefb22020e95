//! Processing contexts handed to facet factories.

use std::collections::HashSet;
use std::sync::Arc;

use meta_model::{
    Annotated, Annotation, ClassDescriptor, Facet, FacetHolder, FacetOutcome, FacetType,
    FacetValue, FeatureType, Identifier, MetaModelConfig, MethodDescriptor, MethodKey,
    ParameterDescriptor, Precedence, TypeRef,
};
use tracing::trace;

/// The methods of one class build that factories have not yet consumed.
///
/// One remover exists per class build and is shared by every factory that
/// runs for that class. A removed method is never turned into a member.
#[derive(Debug, Default)]
pub struct MethodRemover {
    methods: Vec<Arc<MethodDescriptor>>,
    removed: HashSet<MethodKey>,
}

impl MethodRemover {
    /// Methods in discovery order.
    pub fn new(methods: Vec<Arc<MethodDescriptor>>) -> Self {
        Self {
            methods,
            removed: HashSet::new(),
        }
    }

    fn is_live(&self, method: &MethodDescriptor) -> bool {
        !self.removed.contains(&method.key())
    }

    /// First live method called `name`, with exactly `parameter_types` when given.
    pub fn find_method(
        &self,
        name: &str,
        parameter_types: Option<&[String]>,
    ) -> Option<Arc<MethodDescriptor>> {
        self.methods
            .iter()
            .filter(|m| m.name == name && self.is_live(m))
            .find(|m| parameter_types.map_or(true, |types| m.has_parameter_types(types)))
            .cloned()
    }

    /// Find a method and mark it consumed.
    pub fn take_method(
        &mut self,
        name: &str,
        parameter_types: Option<&[String]>,
    ) -> Option<Arc<MethodDescriptor>> {
        let method = self.find_method(name, parameter_types)?;
        self.removed.insert(method.key());
        Some(method)
    }

    /// Mark a method consumed. Returns false if it was already gone.
    pub fn remove_method(&mut self, key: &MethodKey) -> bool {
        self.methods.iter().any(|m| &m.key() == key) && self.removed.insert(key.clone())
    }

    pub fn is_removed(&self, key: &MethodKey) -> bool {
        self.removed.contains(key)
    }

    /// Live methods in discovery order.
    pub fn remaining(&self) -> Vec<Arc<MethodDescriptor>> {
        self.methods
            .iter()
            .filter(|m| self.is_live(m))
            .cloned()
            .collect()
    }

    pub fn remaining_count(&self) -> usize {
        self.methods.iter().filter(|m| self.is_live(m)).count()
    }
}

/// Everything a factory may look at or change while processing one element.
pub struct ProcessContext<'a> {
    class: &'a ClassDescriptor,
    feature_type: FeatureType,
    method: Option<Arc<MethodDescriptor>>,
    parameter_index: Option<usize>,
    member_id: Option<&'a str>,
    support_suffix: String,
    holder: &'a mut FacetHolder,
    remover: &'a mut MethodRemover,
    config: &'a MetaModelConfig,
    factory: String,
}

impl<'a> ProcessContext<'a> {
    /// Context for the class itself.
    pub fn for_object(
        class: &'a ClassDescriptor,
        holder: &'a mut FacetHolder,
        remover: &'a mut MethodRemover,
        config: &'a MetaModelConfig,
    ) -> Self {
        Self {
            class,
            feature_type: FeatureType::Object,
            method: None,
            parameter_index: None,
            member_id: None,
            support_suffix: String::new(),
            holder,
            remover,
            config,
            factory: String::new(),
        }
    }

    /// Context for a property, collection or action.
    ///
    /// `support_suffix` is appended to support prefixes when looking up
    /// support methods (`Name` for `hideName`).
    #[allow(clippy::too_many_arguments)]
    pub fn for_member(
        class: &'a ClassDescriptor,
        feature_type: FeatureType,
        method: Arc<MethodDescriptor>,
        member_id: &'a str,
        support_suffix: impl Into<String>,
        holder: &'a mut FacetHolder,
        remover: &'a mut MethodRemover,
        config: &'a MetaModelConfig,
    ) -> Self {
        Self {
            class,
            feature_type,
            method: Some(method),
            parameter_index: None,
            member_id: Some(member_id),
            support_suffix: support_suffix.into(),
            holder,
            remover,
            config,
            factory: String::new(),
        }
    }

    /// Context for parameter `index` of an action.
    #[allow(clippy::too_many_arguments)]
    pub fn for_parameter(
        class: &'a ClassDescriptor,
        action: Arc<MethodDescriptor>,
        index: usize,
        member_id: &'a str,
        support_suffix: impl Into<String>,
        holder: &'a mut FacetHolder,
        remover: &'a mut MethodRemover,
        config: &'a MetaModelConfig,
    ) -> Self {
        Self {
            class,
            feature_type: FeatureType::ActionParameter,
            method: Some(action),
            parameter_index: Some(index),
            member_id: Some(member_id),
            support_suffix: support_suffix.into(),
            holder,
            remover,
            config,
            factory: String::new(),
        }
    }

    pub(crate) fn enter_factory(&mut self, name: &str) {
        self.factory.clear();
        self.factory.push_str(name);
    }

    /// Name of the factory currently running.
    pub fn factory(&self) -> &str {
        &self.factory
    }

    pub fn class(&self) -> &'a ClassDescriptor {
        self.class
    }

    pub fn feature_type(&self) -> FeatureType {
        self.feature_type
    }

    /// The member method, or the action for a parameter.
    pub fn method(&self) -> Option<&MethodDescriptor> {
        self.method.as_deref()
    }

    pub fn parameter_index(&self) -> Option<usize> {
        self.parameter_index
    }

    pub fn parameter(&self) -> Option<&ParameterDescriptor> {
        let index = self.parameter_index?;
        self.method.as_ref()?.parameters.get(index)
    }

    pub fn member_id(&self) -> Option<&str> {
        self.member_id
    }

    pub fn support_suffix(&self) -> &str {
        &self.support_suffix
    }

    pub fn config(&self) -> &'a MetaModelConfig {
        self.config
    }

    pub fn identifier(&self) -> &Identifier {
        self.holder.identifier()
    }

    pub fn holder(&self) -> &FacetHolder {
        self.holder
    }

    /// Annotations of the element being processed.
    pub fn annotations(&self) -> &[Annotation] {
        match self.feature_type {
            FeatureType::Object => self.class.annotations(),
            FeatureType::ActionParameter => self
                .parameter()
                .map(|p| p.annotations())
                .unwrap_or(&[]),
            _ => self.method().map(|m| m.annotations()).unwrap_or(&[]),
        }
    }

    pub fn annotation(&self, name: &str) -> Option<&Annotation> {
        self.annotations().iter().find(|a| a.name == name)
    }

    /// First string attribute `key` on any of the named annotations.
    pub fn annotation_str(&self, names: &[&str], key: &str) -> Option<&str> {
        names
            .iter()
            .filter_map(|name| self.annotation(name))
            .find_map(|a| a.attr_str(key))
    }

    /// Type of the element: the return type of a property, collection or
    /// action, the declared type of a parameter.
    pub fn type_ref(&self) -> Option<&TypeRef> {
        match self.feature_type {
            FeatureType::Object => None,
            FeatureType::ActionParameter => self.parameter().map(|p| &p.type_ref),
            _ => self.method().map(|m| &m.returns),
        }
    }

    /// Attach a facet built from the current holder and factory.
    pub fn add_facet(
        &mut self,
        facet_type: FacetType,
        precedence: Precedence,
        value: FacetValue,
    ) -> FacetOutcome {
        let facet = Facet::new(facet_type, precedence, self.holder.identifier().clone(), value)
            .with_source(self.factory.clone());
        self.holder.add_facet(facet)
    }

    pub fn find_method(
        &self,
        name: &str,
        parameter_types: Option<&[String]>,
    ) -> Option<Arc<MethodDescriptor>> {
        self.remover.find_method(name, parameter_types)
    }

    /// Consume a method so that it never becomes a member.
    pub fn take_method(
        &mut self,
        name: &str,
        parameter_types: Option<&[String]>,
    ) -> Option<Arc<MethodDescriptor>> {
        let method = self.remover.take_method(name, parameter_types)?;
        trace!("{}: '{}' consumed {}", self.holder.identifier(), self.factory, method.key());
        Some(method)
    }

    pub fn remove_method(&mut self, key: &MethodKey) -> bool {
        self.remover.remove_method(key)
    }

    /// Live methods in discovery order.
    pub fn remaining_methods(&self) -> Vec<Arc<MethodDescriptor>> {
        self.remover.remaining()
    }
}

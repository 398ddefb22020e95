//! Built-in facet factories.
//!
//! The programming model is declared as a table: each row names a factory,
//! the feature types it processes and the function that does the work.
//! Row order is the registration order.

mod action;
mod common;
mod member;
mod object;
mod value;

use std::sync::Arc;

use meta_model::{Annotation, FeatureType, MethodDescriptor};

use crate::context::ProcessContext;
use crate::factory::FnFactory;

pub use object::mixin_contributing;

const ALL: &[FeatureType] = &FeatureType::ALL;
const OBJECT: &[FeatureType] = &[FeatureType::Object];
const OBJECT_AND_ACTION: &[FeatureType] = &[FeatureType::Object, FeatureType::Action];
const OBJECT_AND_MEMBERS: &[FeatureType] = &[
    FeatureType::Object,
    FeatureType::Property,
    FeatureType::Collection,
    FeatureType::Action,
];
const MEMBERS: &[FeatureType] = &FeatureType::MEMBERS;
const PROPERTY: &[FeatureType] = &[FeatureType::Property];
const COLLECTION: &[FeatureType] = &[FeatureType::Collection];
const ASSOCIATIONS: &[FeatureType] = &[FeatureType::Property, FeatureType::Collection];
const PROPERTY_AND_PARAMETER: &[FeatureType] =
    &[FeatureType::Property, FeatureType::ActionParameter];
const VALIDATED: &[FeatureType] = &[
    FeatureType::Property,
    FeatureType::Action,
    FeatureType::ActionParameter,
];
const ACTION: &[FeatureType] = &[FeatureType::Action];

/// The built-in programming model, in registration order.
pub static STANDARD_FACTORIES: &[FnFactory] = &[
    FnFactory::new("named-inferred", ALL, common::named_inferred),
    FnFactory::new("logical-type-name-inferred", OBJECT, object::logical_type_name_inferred),
    FnFactory::new("title-to-string", OBJECT, object::title_to_string),
    FnFactory::new("title-method", OBJECT, object::title_method),
    FnFactory::new("title-annotation", OBJECT, object::title_annotation),
    FnFactory::new("icon-name-method", OBJECT, object::icon_name_method),
    FnFactory::new("css-class-method", OBJECT, object::css_class_method),
    FnFactory::new("layout-method", OBJECT, object::layout_method),
    FnFactory::new("disabled-object-method", OBJECT, object::disabled_object_method),
    FnFactory::new("domain-object-annotation", OBJECT, object::domain_object_annotation),
    FnFactory::new("editing-from-configuration", OBJECT, object::editing_from_configuration),
    FnFactory::new("mixin", OBJECT, object::mixin),
    FnFactory::new("value-semantics", OBJECT, object::value_semantics),
    FnFactory::new("css-class-from-configuration", OBJECT_AND_ACTION, common::css_class_from_configuration),
    FnFactory::new("named-annotation", ALL, common::named_annotation),
    FnFactory::new("described-as-annotation", ALL, common::described_as_annotation),
    FnFactory::new("hidden-annotation", OBJECT_AND_MEMBERS, common::hidden_annotation),
    FnFactory::new("css-class-annotation", OBJECT_AND_MEMBERS, common::css_class_annotation),
    FnFactory::new("member-order-annotation", MEMBERS, common::member_order_annotation),
    FnFactory::new("property-accessor", PROPERTY, member::property_accessor),
    FnFactory::new("collection-accessor", COLLECTION, member::collection_accessor),
    FnFactory::new("collection-type-of-annotation", COLLECTION, member::collection_type_of_annotation),
    FnFactory::new("property-setter", PROPERTY, member::property_setter),
    FnFactory::new("editing-annotation", ASSOCIATIONS, member::editing_annotation),
    FnFactory::new("collection-add-remove", COLLECTION, member::collection_add_remove),
    FnFactory::new("mandatory", PROPERTY_AND_PARAMETER, value::mandatory),
    FnFactory::new("max-length", PROPERTY_AND_PARAMETER, value::max_length),
    FnFactory::new("regex", PROPERTY_AND_PARAMETER, value::regex_pattern),
    FnFactory::new("choices-method", PROPERTY_AND_PARAMETER, value::choices_method),
    FnFactory::new("default-method", PROPERTY_AND_PARAMETER, value::default_method),
    FnFactory::new("auto-complete-method", PROPERTY_AND_PARAMETER, value::auto_complete_method),
    FnFactory::new("hide-method", MEMBERS, member::hide_method),
    FnFactory::new("disable-method", MEMBERS, member::disable_method),
    FnFactory::new("validate-method", VALIDATED, member::validate_method),
    FnFactory::new("action-invocation", ACTION, action::action_invocation),
    FnFactory::new("action-semantics-inferred", ACTION, action::action_semantics_inferred),
    FnFactory::new("action-annotation", ACTION, action::action_annotation),
];

/// Layout annotation carrying presentation hints for the current feature type.
fn layout_annotation(feature_type: FeatureType) -> &'static str {
    match feature_type {
        FeatureType::Object => "DomainObjectLayout",
        FeatureType::Property => "PropertyLayout",
        FeatureType::Collection => "CollectionLayout",
        FeatureType::Action => "ActionLayout",
        FeatureType::ActionParameter => "ParameterLayout",
    }
}

/// Semantic annotation of the current feature type.
fn feature_annotation(feature_type: FeatureType) -> &'static str {
    match feature_type {
        FeatureType::Object => "DomainObject",
        FeatureType::Property => "Property",
        FeatureType::Collection => "Collection",
        FeatureType::Action => "Action",
        FeatureType::ActionParameter => "Parameter",
    }
}

/// An attribute rendered as text; numbers and booleans are stringified.
fn attr_text(annotation: &Annotation, key: &str) -> Option<String> {
    match annotation.attr(key)? {
        serde_json::Value::String(s) => Some(s.clone()),
        serde_json::Value::Number(n) => Some(n.to_string()),
        serde_json::Value::Bool(b) => Some(b.to_string()),
        _ => None,
    }
}

/// First text attribute found by `(annotation, key)` lookups, in order.
fn annotation_text(ctx: &ProcessContext<'_>, lookups: &[(&str, &str)]) -> Option<String> {
    lookups
        .iter()
        .find_map(|(name, key)| ctx.annotation(name).and_then(|a| attr_text(a, key)))
}

/// Consume a zero-argument method returning a value.
fn take_query_method(ctx: &mut ProcessContext<'_>, name: &str) -> Option<Arc<MethodDescriptor>> {
    let method = ctx.find_method(name, Some(&[]))?;
    if method.is_void() {
        return None;
    }
    ctx.take_method(name, Some(&[]))
}

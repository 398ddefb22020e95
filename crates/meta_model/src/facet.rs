//! Facets: typed capabilities attached to a holder.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::identifier::Identifier;

/// The capability a facet provides. A holder has at most one active facet
/// per type.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FacetType {
    Named,
    Description,
    LogicalTypeName,
    Title,
    IconName,
    CssClass,
    Layout,
    DisabledObject,
    Immutable,
    Nature,
    Mixin,
    Value,
    Hidden,
    HideForContext,
    Disabled,
    DisableForContext,
    ValidateForContext,
    MemberOrder,
    PropertyAccessor,
    PropertySetter,
    PropertyClear,
    CollectionAccessor,
    CollectionAddTo,
    CollectionRemoveFrom,
    CollectionValidateAddTo,
    CollectionValidateRemoveFrom,
    TypeOf,
    Mandatory,
    MaxLength,
    RegEx,
    Choices,
    Default,
    AutoComplete,
    ActionInvocation,
    ActionSemantics,
    DomainEvent,
}

impl FacetType {
    pub fn as_str(&self) -> &'static str {
        match self {
            FacetType::Named => "named",
            FacetType::Description => "description",
            FacetType::LogicalTypeName => "logical_type_name",
            FacetType::Title => "title",
            FacetType::IconName => "icon_name",
            FacetType::CssClass => "css_class",
            FacetType::Layout => "layout",
            FacetType::DisabledObject => "disabled_object",
            FacetType::Immutable => "immutable",
            FacetType::Nature => "nature",
            FacetType::Mixin => "mixin",
            FacetType::Value => "value",
            FacetType::Hidden => "hidden",
            FacetType::HideForContext => "hide_for_context",
            FacetType::Disabled => "disabled",
            FacetType::DisableForContext => "disable_for_context",
            FacetType::ValidateForContext => "validate_for_context",
            FacetType::MemberOrder => "member_order",
            FacetType::PropertyAccessor => "property_accessor",
            FacetType::PropertySetter => "property_setter",
            FacetType::PropertyClear => "property_clear",
            FacetType::CollectionAccessor => "collection_accessor",
            FacetType::CollectionAddTo => "collection_add_to",
            FacetType::CollectionRemoveFrom => "collection_remove_from",
            FacetType::CollectionValidateAddTo => "collection_validate_add_to",
            FacetType::CollectionValidateRemoveFrom => "collection_validate_remove_from",
            FacetType::TypeOf => "type_of",
            FacetType::Mandatory => "mandatory",
            FacetType::MaxLength => "max_length",
            FacetType::RegEx => "regex",
            FacetType::Choices => "choices",
            FacetType::Default => "default",
            FacetType::AutoComplete => "auto_complete",
            FacetType::ActionInvocation => "action_invocation",
            FacetType::ActionSemantics => "action_semantics",
            FacetType::DomainEvent => "domain_event",
        }
    }
}

impl fmt::Display for FacetType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Precedence tier of a facet. Higher tiers override lower ones.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Precedence {
    /// Derived from naming conventions or types.
    Inferred,
    /// Supplied by the programming model itself (e.g. a `title()` method).
    Default,
    /// Derived from application configuration.
    FromConfiguration,
    /// Declared explicitly, typically by an annotation or dedicated method.
    Explicit,
    /// Imposed by an event subscriber.
    EventOverride,
}

impl fmt::Display for Precedence {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Precedence::Inferred => "inferred",
            Precedence::Default => "default",
            Precedence::FromConfiguration => "from_configuration",
            Precedence::Explicit => "explicit",
            Precedence::EventOverride => "event_override",
        };
        write!(f, "{}", s)
    }
}

/// Semantics of an action invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionSemantics {
    Safe,
    Idempotent,
    NonIdempotent,
}

impl ActionSemantics {
    /// Parse the annotation spelling (`SAFE`, `IDEMPOTENT`, `NON_IDEMPOTENT`).
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_uppercase().replace('-', "_").as_str() {
            "SAFE" | "SAFE_AND_REQUEST_CACHEABLE" => Some(Self::Safe),
            "IDEMPOTENT" | "IDEMPOTENT_ARE_YOU_SURE" => Some(Self::Idempotent),
            "NON_IDEMPOTENT" | "NON_IDEMPOTENT_ARE_YOU_SURE" => Some(Self::NonIdempotent),
            _ => None,
        }
    }
}

/// Which kind of member a mixin contributes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Contributing {
    Action,
    Property,
    Collection,
}

/// Payload of a facet.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum FacetValue {
    Marker,
    Text(String),
    Method(String),
    Methods(Vec<String>),
    Flag(bool),
    Number(u64),
    Semantics(ActionSemantics),
    Mixin {
        target: String,
        main_method: String,
        contributing: Contributing,
    },
    Invocation {
        method: String,
        return_type: String,
    },
}

/// A capability attached to a holder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Facet {
    pub facet_type: FacetType,
    pub precedence: Precedence,
    /// Back-reference to the holder the facet is attached to.
    pub holder: Identifier,
    /// Name of the factory that contributed the facet.
    pub source: String,
    pub value: FacetValue,
}

impl Facet {
    pub fn new(
        facet_type: FacetType,
        precedence: Precedence,
        holder: Identifier,
        value: FacetValue,
    ) -> Self {
        Self {
            facet_type,
            precedence,
            holder,
            source: String::new(),
            value,
        }
    }

    pub fn with_source(mut self, source: impl Into<String>) -> Self {
        self.source = source.into();
        self
    }

    /// Text payload, or the method name for method-backed facets.
    pub fn text(&self) -> Option<&str> {
        match &self.value {
            FacetValue::Text(s) | FacetValue::Method(s) => Some(s),
            FacetValue::Invocation { method, .. } => Some(method),
            _ => None,
        }
    }

    pub fn method(&self) -> Option<&str> {
        match &self.value {
            FacetValue::Method(m) => Some(m),
            FacetValue::Invocation { method, .. } => Some(method),
            _ => None,
        }
    }

    pub fn methods(&self) -> &[String] {
        match &self.value {
            FacetValue::Methods(m) => m,
            _ => &[],
        }
    }

    pub fn flag(&self) -> Option<bool> {
        match self.value {
            FacetValue::Flag(b) => Some(b),
            _ => None,
        }
    }

    pub fn number(&self) -> Option<u64> {
        match self.value {
            FacetValue::Number(n) => Some(n),
            _ => None,
        }
    }

    pub fn semantics(&self) -> Option<ActionSemantics> {
        match self.value {
            FacetValue::Semantics(s) => Some(s),
            _ => None,
        }
    }
}

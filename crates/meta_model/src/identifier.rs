//! Identifiers naming the class, member or parameter being introspected.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::naming::simple_name;

/// The kind of model element a facet factory is asked to process.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeatureType {
    Object,
    Property,
    Collection,
    Action,
    ActionParameter,
}

impl FeatureType {
    /// Every feature type, in processing order.
    pub const ALL: [FeatureType; 5] = [
        FeatureType::Object,
        FeatureType::Property,
        FeatureType::Collection,
        FeatureType::Action,
        FeatureType::ActionParameter,
    ];

    /// Feature types that are object members.
    pub const MEMBERS: [FeatureType; 3] = [
        FeatureType::Property,
        FeatureType::Collection,
        FeatureType::Action,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            FeatureType::Object => "object",
            FeatureType::Property => "property",
            FeatureType::Collection => "collection",
            FeatureType::Action => "action",
            FeatureType::ActionParameter => "action-parameter",
        }
    }

    pub fn is_member(&self) -> bool {
        matches!(
            self,
            FeatureType::Property | FeatureType::Collection | FeatureType::Action
        )
    }
}

impl fmt::Display for FeatureType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Immutable name of a class, a member of a class, or an action parameter.
///
/// `parameter_types` is `None` for classes, properties and collections and
/// `Some` for actions (and their parameters), so that a zero-argument action
/// still renders as `placeOrder()`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Identifier {
    class_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    member_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    parameter_types: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    parameter_index: Option<usize>,
}

impl Identifier {
    /// Identifier of a class.
    pub fn class(class_name: impl Into<String>) -> Self {
        Self {
            class_name: class_name.into(),
            member_name: None,
            parameter_types: None,
            parameter_index: None,
        }
    }

    /// Identifier of a property or collection.
    pub fn property(class_name: impl Into<String>, member_name: impl Into<String>) -> Self {
        Self {
            class_name: class_name.into(),
            member_name: Some(member_name.into()),
            parameter_types: None,
            parameter_index: None,
        }
    }

    /// Identifier of an action.
    pub fn action(
        class_name: impl Into<String>,
        member_name: impl Into<String>,
        parameter_types: Vec<String>,
    ) -> Self {
        Self {
            class_name: class_name.into(),
            member_name: Some(member_name.into()),
            parameter_types: Some(parameter_types),
            parameter_index: None,
        }
    }

    /// Identifier of the parameter at `index` of this action.
    pub fn parameter(&self, index: usize) -> Self {
        Self {
            class_name: self.class_name.clone(),
            member_name: self.member_name.clone(),
            parameter_types: Some(self.parameter_types.clone().unwrap_or_default()),
            parameter_index: Some(index),
        }
    }

    pub fn class_name(&self) -> &str {
        &self.class_name
    }

    pub fn simple_class_name(&self) -> &str {
        simple_name(&self.class_name)
    }

    pub fn member_name(&self) -> Option<&str> {
        self.member_name.as_deref()
    }

    pub fn parameter_types(&self) -> &[String] {
        self.parameter_types.as_deref().unwrap_or(&[])
    }

    pub fn parameter_index(&self) -> Option<usize> {
        self.parameter_index
    }

    /// Identifier of the owning class.
    pub fn class_identifier(&self) -> Identifier {
        Identifier::class(self.class_name.clone())
    }

    /// The most specific name: parameter index, member name, or class name.
    pub fn local_name(&self) -> &str {
        self.member_name.as_deref().unwrap_or_else(|| self.simple_class_name())
    }

    pub fn is_class(&self) -> bool {
        self.member_name.is_none()
    }
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.class_name)?;
        if let Some(member) = &self.member_name {
            write!(f, "#{}", member)?;
            if let Some(types) = &self.parameter_types {
                write!(f, "({})", types.join(","))?;
            }
        }
        if let Some(index) = self.parameter_index {
            write!(f, "[{}]", index)?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_identifier_display() {
        assert_eq!(Identifier::class("shop.Customer").to_string(), "shop.Customer");
        assert_eq!(
            Identifier::property("shop.Customer", "name").to_string(),
            "shop.Customer#name"
        );

        let action = Identifier::action("shop.Customer", "placeOrder", vec![]);
        assert_eq!(action.to_string(), "shop.Customer#placeOrder()");

        let action = Identifier::action(
            "shop.Customer",
            "addLine",
            vec!["String".to_string(), "int".to_string()],
        );
        assert_eq!(action.parameter(1).to_string(), "shop.Customer#addLine(String,int)[1]");
    }

    #[test]
    fn test_identifier_accessors() {
        let id = Identifier::action("shop.Customer", "placeOrder", vec![]);
        assert_eq!(id.simple_class_name(), "Customer");
        assert_eq!(id.member_name(), Some("placeOrder"));
        assert_eq!(id.class_identifier(), Identifier::class("shop.Customer"));
        assert!(!id.is_class());
        assert_eq!(id.parameter(0).parameter_index(), Some(0));
    }

    #[test]
    fn test_property_and_zero_arg_action_differ() {
        let property = Identifier::property("A", "x");
        let action = Identifier::action("A", "x", vec![]);
        assert_ne!(property, action);
    }
}

//! Naming-convention prefixes.
//!
//! A method name is classified by the first prefix, in priority order, that
//! it starts with and that is followed by an upper-case letter or a digit.
//! Collection-mutation prefixes are tried before property prefixes, which are
//! tried before accessor prefixes, so `validateAddToOrders` is never read as a
//! `validate` method for a member called `AddToOrders`.

use std::fmt;

/// A reserved method-name prefix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MethodPrefix {
    ValidateAddTo,
    ValidateRemoveFrom,
    AddTo,
    RemoveFrom,
    Modify,
    Clear,
    Set,
    Hide,
    Disable,
    Validate,
    Default,
    Choices,
    AutoComplete,
    Get,
    Is,
}

impl MethodPrefix {
    /// Every prefix, in matching priority.
    pub const PRIORITY: [MethodPrefix; 15] = [
        MethodPrefix::ValidateAddTo,
        MethodPrefix::ValidateRemoveFrom,
        MethodPrefix::AddTo,
        MethodPrefix::RemoveFrom,
        MethodPrefix::Modify,
        MethodPrefix::Clear,
        MethodPrefix::Set,
        MethodPrefix::Hide,
        MethodPrefix::Disable,
        MethodPrefix::Validate,
        MethodPrefix::Default,
        MethodPrefix::Choices,
        MethodPrefix::AutoComplete,
        MethodPrefix::Get,
        MethodPrefix::Is,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            MethodPrefix::ValidateAddTo => "validateAddTo",
            MethodPrefix::ValidateRemoveFrom => "validateRemoveFrom",
            MethodPrefix::AddTo => "addTo",
            MethodPrefix::RemoveFrom => "removeFrom",
            MethodPrefix::Modify => "modify",
            MethodPrefix::Clear => "clear",
            MethodPrefix::Set => "set",
            MethodPrefix::Hide => "hide",
            MethodPrefix::Disable => "disable",
            MethodPrefix::Validate => "validate",
            MethodPrefix::Default => "default",
            MethodPrefix::Choices => "choices",
            MethodPrefix::AutoComplete => "autoComplete",
            MethodPrefix::Get => "get",
            MethodPrefix::Is => "is",
        }
    }

    /// Accessor prefixes name members; every other prefix names a support method.
    pub fn is_accessor(&self) -> bool {
        matches!(self, MethodPrefix::Get | MethodPrefix::Is)
    }

    pub fn is_support(&self) -> bool {
        !self.is_accessor()
    }

    /// Support method name for the member with `suffix`, e.g. `hideName`.
    pub fn method_name(&self, suffix: &str) -> String {
        format!("{}{}", self.as_str(), suffix)
    }

    /// Support method name for parameter `index` of an action, e.g. `default0PlaceOrder`.
    pub fn parameter_method_name(&self, index: usize, suffix: &str) -> String {
        format!("{}{}{}", self.as_str(), index, suffix)
    }

    /// The remainder of `name` after this prefix, if the prefix applies.
    pub fn strip<'a>(&self, name: &'a str) -> Option<&'a str> {
        let rest = name.strip_prefix(self.as_str())?;
        match rest.chars().next() {
            Some(c) if c.is_uppercase() || c.is_ascii_digit() => Some(rest),
            _ => None,
        }
    }
}

impl fmt::Display for MethodPrefix {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// The first matching prefix of `name` and the remainder.
pub fn classify(name: &str) -> Option<(MethodPrefix, &str)> {
    MethodPrefix::PRIORITY
        .iter()
        .find_map(|prefix| prefix.strip(name).map(|rest| (*prefix, rest)))
}

/// Whether `name` is a support method name (any non-accessor prefix).
pub fn is_support_method(name: &str) -> bool {
    classify(name)
        .map(|(prefix, _)| prefix.is_support())
        .unwrap_or(false)
}

//! Reflective surface of a domain class.
//!
//! A [`ClassDescriptor`] is the read-only input the introspector works from:
//! the class name, its sort, its supertypes, its annotations, its
//! constructors and its methods. Descriptors are usually deserialized from
//! YAML, but they can also be assembled with the builder methods:
//!
//! ```rust
//! use meta_model::{BeanSort, ClassDescriptor, MethodDescriptor, TypeRef};
//!
//! let customer = ClassDescriptor::new("shop.Customer")
//!     .sort(BeanSort::Entity)
//!     .method(MethodDescriptor::new("title").returns(TypeRef::of("String")))
//!     .method(MethodDescriptor::new("getName").returns(TypeRef::of("String")))
//!     .method(MethodDescriptor::new("setName").param("name", TypeRef::of("String")))
//!     .method(MethodDescriptor::new("placeOrder"));
//!
//! assert_eq!(customer.simple_name(), "Customer");
//! ```

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

use crate::naming::{decapitalize, simple_name};

/// Reference to a type as written in a method signature.
///
/// Collections carry their element type: `List<Order>` has `name = "List"`
/// and `element = Some("Order")`. Serialized as the plain string form.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct TypeRef {
    pub name: String,
    pub element: Option<String>,
}

impl TypeRef {
    pub const VOID: &'static str = "void";

    pub fn void() -> Self {
        Self::of(Self::VOID)
    }

    pub fn of(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            element: None,
        }
    }

    pub fn collection_of(container: impl Into<String>, element: impl Into<String>) -> Self {
        Self {
            name: container.into(),
            element: Some(element.into()),
        }
    }

    pub fn is_void(&self) -> bool {
        self.name == Self::VOID
    }

    pub fn is_collection(&self) -> bool {
        self.element.is_some()
    }

    pub fn is_boolean(&self) -> bool {
        matches!(self.name.as_str(), "boolean" | "Boolean")
    }

    pub fn is_string(&self) -> bool {
        matches!(self.name.as_str(), "String" | "java.lang.String")
    }

    /// The type a member refers to: the element type for collections.
    pub fn referenced_type(&self) -> &str {
        self.element.as_deref().unwrap_or(&self.name)
    }
}

impl Default for TypeRef {
    fn default() -> Self {
        Self::void()
    }
}

/// Containers whose type argument is the element type of a collection member.
const COLLECTION_CONTAINERS: &[&str] = &[
    "Collection",
    "Iterable",
    "List",
    "ArrayList",
    "LinkedList",
    "Set",
    "HashSet",
    "LinkedHashSet",
    "SortedSet",
    "TreeSet",
];

/// Wrappers that stand for their single type argument.
const OPTIONAL_WRAPPERS: &[&str] = &["Optional"];

impl From<String> for TypeRef {
    fn from(raw: String) -> Self {
        let raw = raw.trim();
        if raw.is_empty() {
            return Self::void();
        }
        if let Some(element) = raw.strip_suffix("[]") {
            let element = Self::from(element);
            return Self::collection_of(raw, element.to_string());
        }
        let (Some(open), true) = (raw.find('<'), raw.ends_with('>')) else {
            return Self::of(raw);
        };
        let container = simple_name(raw[..open].trim());
        let argument = raw[open + 1..raw.len() - 1].trim();
        if OPTIONAL_WRAPPERS.contains(&container) {
            Self::from(argument)
        } else if COLLECTION_CONTAINERS.contains(&container) {
            Self::collection_of(raw[..open].trim(), Self::from(argument).to_string())
        } else {
            Self::of(raw)
        }
    }
}

impl From<&str> for TypeRef {
    fn from(raw: &str) -> Self {
        Self::from(raw.to_string())
    }
}

impl From<TypeRef> for String {
    fn from(type_ref: TypeRef) -> Self {
        type_ref.to_string()
    }
}

impl fmt::Display for TypeRef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.element {
            Some(_) if self.name.ends_with("[]") => write!(f, "{}", self.name),
            Some(element) => write!(f, "{}<{}>", self.name, element),
            None => write!(f, "{}", self.name),
        }
    }
}

/// An annotation with its attribute values.
///
/// Single-valued annotations such as `@Named("Client")` keep their value
/// under the `value` attribute.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Annotation {
    pub name: String,
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub attributes: BTreeMap<String, serde_json::Value>,
}

impl Annotation {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            attributes: BTreeMap::new(),
        }
    }

    /// Annotation with a single `value` attribute.
    pub fn valued(name: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
        Self::new(name).with("value", value)
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<serde_json::Value>) -> Self {
        self.attributes.insert(key.into(), value.into());
        self
    }

    pub fn attr(&self, key: &str) -> Option<&serde_json::Value> {
        self.attributes.get(key)
    }

    pub fn attr_str(&self, key: &str) -> Option<&str> {
        self.attr(key).and_then(|v| v.as_str())
    }

    pub fn attr_u64(&self, key: &str) -> Option<u64> {
        self.attr(key).and_then(|v| v.as_u64())
    }

    pub fn attr_bool(&self, key: &str) -> Option<bool> {
        self.attr(key).and_then(|v| v.as_bool())
    }
}

/// Anything carrying annotations.
pub trait Annotated {
    fn annotations(&self) -> &[Annotation];

    fn annotation(&self, name: &str) -> Option<&Annotation> {
        self.annotations().iter().find(|a| a.name == name)
    }

    fn has_annotation(&self, name: &str) -> bool {
        self.annotation(name).is_some()
    }

    /// First string attribute `key` found on any of the named annotations.
    fn annotation_str(&self, names: &[&str], key: &str) -> Option<&str> {
        names
            .iter()
            .filter_map(|name| self.annotation(name))
            .find_map(|a| a.attr_str(key))
    }
}

/// A method parameter.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ParameterDescriptor {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(rename = "type")]
    pub type_ref: TypeRef,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub annotations: Vec<Annotation>,
}

impl ParameterDescriptor {
    pub fn new(name: impl Into<String>, type_ref: TypeRef) -> Self {
        Self {
            name: Some(name.into()),
            type_ref,
            annotations: Vec::new(),
        }
    }

    pub fn unnamed(type_ref: TypeRef) -> Self {
        Self {
            name: None,
            type_ref,
            annotations: Vec::new(),
        }
    }

    pub fn annotated(mut self, annotation: Annotation) -> Self {
        self.annotations.push(annotation);
        self
    }
}

impl Annotated for ParameterDescriptor {
    fn annotations(&self) -> &[Annotation] {
        &self.annotations
    }
}

/// Signature key used to de-duplicate and remove methods.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct MethodKey {
    pub name: String,
    pub parameter_types: Vec<String>,
}

impl fmt::Display for MethodKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}({})", self.name, self.parameter_types.join(","))
    }
}

/// A method on a class.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MethodDescriptor {
    pub name: String,
    #[serde(default)]
    pub returns: TypeRef,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub parameters: Vec<ParameterDescriptor>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub annotations: Vec<Annotation>,
    #[serde(default, rename = "static", skip_serializing_if = "is_false")]
    pub is_static: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub synthetic: bool,
    #[serde(default, skip_serializing_if = "is_false")]
    pub bridge: bool,
}

fn is_false(value: &bool) -> bool {
    !*value
}

impl MethodDescriptor {
    /// A public, zero-argument, void method.
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            returns: TypeRef::void(),
            parameters: Vec::new(),
            annotations: Vec::new(),
            is_static: false,
            synthetic: false,
            bridge: false,
        }
    }

    pub fn returns(mut self, type_ref: TypeRef) -> Self {
        self.returns = type_ref;
        self
    }

    pub fn param(mut self, name: impl Into<String>, type_ref: TypeRef) -> Self {
        self.parameters.push(ParameterDescriptor::new(name, type_ref));
        self
    }

    pub fn parameter(mut self, parameter: ParameterDescriptor) -> Self {
        self.parameters.push(parameter);
        self
    }

    pub fn annotated(mut self, annotation: Annotation) -> Self {
        self.annotations.push(annotation);
        self
    }

    pub fn static_method(mut self) -> Self {
        self.is_static = true;
        self
    }

    pub fn synthetic(mut self) -> Self {
        self.synthetic = true;
        self
    }

    pub fn bridge(mut self) -> Self {
        self.bridge = true;
        self
    }

    pub fn parameter_types(&self) -> Vec<String> {
        self.parameters
            .iter()
            .map(|p| p.type_ref.to_string())
            .collect()
    }

    pub fn key(&self) -> MethodKey {
        MethodKey {
            name: self.name.clone(),
            parameter_types: self.parameter_types(),
        }
    }

    pub fn is_void(&self) -> bool {
        self.returns.is_void()
    }

    /// Whether the parameter types equal `types`, compared textually.
    pub fn has_parameter_types(&self, types: &[String]) -> bool {
        self.parameters.len() == types.len()
            && self
                .parameters
                .iter()
                .zip(types)
                .all(|(p, t)| p.type_ref.to_string() == *t)
    }
}

impl Annotated for MethodDescriptor {
    fn annotations(&self) -> &[Annotation] {
        &self.annotations
    }
}

/// A constructor signature.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ConstructorDescriptor {
    #[serde(default)]
    pub parameters: Vec<ParameterDescriptor>,
}

/// What kind of domain class a descriptor describes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BeanSort {
    Entity,
    ViewModel,
    Mixin,
    Service,
    Value,
    Abstract,
    #[default]
    Unknown,
}

impl BeanSort {
    pub fn as_str(&self) -> &'static str {
        match self {
            BeanSort::Entity => "entity",
            BeanSort::ViewModel => "view_model",
            BeanSort::Mixin => "mixin",
            BeanSort::Service => "service",
            BeanSort::Value => "value",
            BeanSort::Abstract => "abstract",
            BeanSort::Unknown => "unknown",
        }
    }

    /// Sorts that the bean-discovery source hands to the loader eagerly.
    pub fn is_domain(&self) -> bool {
        matches!(
            self,
            BeanSort::Entity | BeanSort::ViewModel | BeanSort::Mixin | BeanSort::Service
        )
    }
}

impl fmt::Display for BeanSort {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// How a mixin attaches to its target.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MixinShape {
    pub target: String,
    pub main_method: String,
    pub member_name: String,
}

/// The reflective surface of one class.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClassDescriptor {
    pub name: String,
    #[serde(default)]
    pub sort: BeanSort,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub superclass: Option<String>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub interfaces: Vec<String>,
    #[serde(default, rename = "abstract", skip_serializing_if = "is_false")]
    pub is_abstract: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub annotations: Vec<Annotation>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub constructors: Vec<ConstructorDescriptor>,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub methods: Vec<MethodDescriptor>,
}

impl ClassDescriptor {
    pub const MIXIN_ANNOTATION: &'static str = "Mixin";
    pub const DEFAULT_MIXIN_METHOD: &'static str = "act";

    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            sort: BeanSort::Unknown,
            superclass: None,
            interfaces: Vec::new(),
            is_abstract: false,
            annotations: Vec::new(),
            constructors: Vec::new(),
            methods: Vec::new(),
        }
    }

    /// Descriptor of a built-in value type.
    pub fn value_type(name: impl Into<String>) -> Self {
        Self::new(name).sort(BeanSort::Value)
    }

    pub fn sort(mut self, sort: BeanSort) -> Self {
        self.sort = sort;
        self
    }

    pub fn extends(mut self, superclass: impl Into<String>) -> Self {
        self.superclass = Some(superclass.into());
        self
    }

    pub fn implements(mut self, interface: impl Into<String>) -> Self {
        self.interfaces.push(interface.into());
        self
    }

    pub fn abstract_class(mut self) -> Self {
        self.is_abstract = true;
        self
    }

    pub fn annotated(mut self, annotation: Annotation) -> Self {
        self.annotations.push(annotation);
        self
    }

    pub fn constructor(mut self, parameters: Vec<ParameterDescriptor>) -> Self {
        self.constructors.push(ConstructorDescriptor { parameters });
        self
    }

    pub fn method(mut self, method: MethodDescriptor) -> Self {
        self.methods.push(method);
        self
    }

    pub fn simple_name(&self) -> &str {
        simple_name(&self.name)
    }

    /// Direct supertypes: the superclass first, then interfaces.
    pub fn supertypes(&self) -> impl Iterator<Item = &str> {
        self.superclass
            .iter()
            .chain(self.interfaces.iter())
            .map(|s| s.as_str())
    }

    pub fn is_mixin(&self) -> bool {
        self.sort == BeanSort::Mixin || self.has_annotation(Self::MIXIN_ANNOTATION)
    }

    /// Target type, main method and contributed member name of a mixin.
    ///
    /// Returns `None` unless the class is a mixin with exactly one
    /// single-argument constructor.
    pub fn mixin_shape(&self) -> Option<MixinShape> {
        if !self.is_mixin() {
            return None;
        }
        let mut single_arg = self
            .constructors
            .iter()
            .filter(|c| c.parameters.len() == 1);
        let constructor = single_arg.next()?;
        if single_arg.next().is_some() {
            return None;
        }

        let main_method = self
            .annotation(Self::MIXIN_ANNOTATION)
            .and_then(|a| a.attr_str("method"))
            .unwrap_or(Self::DEFAULT_MIXIN_METHOD)
            .to_string();

        Some(MixinShape {
            target: constructor.parameters[0].type_ref.name.clone(),
            main_method,
            member_name: self.mixin_member_name(),
        })
    }

    /// `Customer_placeOrder` contributes `placeOrder`; `PlaceOrder` contributes `placeOrder`.
    pub fn mixin_member_name(&self) -> String {
        let simple = self.simple_name();
        match simple.rfind('_') {
            Some(pos) if pos + 1 < simple.len() => simple[pos + 1..].to_string(),
            _ => decapitalize(simple),
        }
    }
}

impl Annotated for ClassDescriptor {
    fn annotations(&self) -> &[Annotation] {
        &self.annotations
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_type_ref_parsing() {
        let list = TypeRef::from("List<shop.Order>");
        assert!(list.is_collection());
        assert_eq!(list.name, "List");
        assert_eq!(list.referenced_type(), "shop.Order");
        assert_eq!(list.to_string(), "List<shop.Order>");

        assert!(TypeRef::from("").is_void());
        assert_eq!(TypeRef::from("String").referenced_type(), "String");
    }

    #[test]
    fn test_only_known_containers_are_collections() {
        let optional = TypeRef::from("Optional<String>");
        assert!(!optional.is_collection());
        assert_eq!(optional, TypeRef::of("String"));

        let map = TypeRef::from("Map<String, BigDecimal>");
        assert!(!map.is_collection());
        assert_eq!(map.referenced_type(), "Map<String, BigDecimal>");

        let set = TypeRef::from("java.util.SortedSet<shop.Order>");
        assert_eq!(set.referenced_type(), "shop.Order");

        let nested = TypeRef::from("List<Optional<shop.Order>>");
        assert_eq!(nested.referenced_type(), "shop.Order");

        let array = TypeRef::from("shop.Order[]");
        assert!(array.is_collection());
        assert_eq!(array.referenced_type(), "shop.Order");
        assert_eq!(array.to_string(), "shop.Order[]");
    }

    #[test]
    fn test_type_ref_serde_as_string() {
        let method: MethodDescriptor =
            serde_yaml::from_str("name: getOrders\nreturns: List<Order>\n").unwrap();
        assert_eq!(method.returns, TypeRef::collection_of("List", "Order"));

        let method: MethodDescriptor = serde_yaml::from_str("name: placeOrder\n").unwrap();
        assert!(method.is_void());
    }

    #[test]
    fn test_method_key() {
        let method = MethodDescriptor::new("addLine")
            .param("product", TypeRef::of("Product"))
            .param("quantity", TypeRef::of("int"));
        assert_eq!(method.key().to_string(), "addLine(Product,int)");
        assert!(method.has_parameter_types(&["Product".to_string(), "int".to_string()]));
    }

    #[test]
    fn test_mixin_shape() {
        let mixin = ClassDescriptor::new("shop.Customer_placeOrder")
            .sort(BeanSort::Mixin)
            .constructor(vec![ParameterDescriptor::new("customer", TypeRef::of("shop.Customer"))])
            .method(MethodDescriptor::new("act"));

        let shape = mixin.mixin_shape().unwrap();
        assert_eq!(shape.target, "shop.Customer");
        assert_eq!(shape.main_method, "act");
        assert_eq!(shape.member_name, "placeOrder");
    }

    #[test]
    fn test_mixin_shape_requires_single_arg_constructor() {
        let mixin = ClassDescriptor::new("shop.Broken").sort(BeanSort::Mixin);
        assert!(mixin.mixin_shape().is_none());

        let not_mixin = ClassDescriptor::new("shop.Customer")
            .constructor(vec![ParameterDescriptor::new("name", TypeRef::of("String"))]);
        assert!(not_mixin.mixin_shape().is_none());
    }

    #[test]
    fn test_annotation_attributes() {
        let annotation = Annotation::new("Property")
            .with("maxLength", 30)
            .with("editing", "DISABLED");
        assert_eq!(annotation.attr_u64("maxLength"), Some(30));
        assert_eq!(annotation.attr_str("editing"), Some("DISABLED"));

        let method = MethodDescriptor::new("getName").annotated(annotation);
        assert_eq!(method.annotation_str(&["PropertyLayout", "Property"], "editing"), Some("DISABLED"));
    }
}

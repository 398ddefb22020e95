//! The set of class descriptors the engine can introspect.

use std::collections::{BTreeMap, HashSet};
use std::sync::Arc;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::class::ClassDescriptor;
use crate::error::ModelResult;

/// Value types every universe knows about.
pub const VALUE_TYPES: &[&str] = &[
    "String",
    "int",
    "long",
    "short",
    "byte",
    "char",
    "boolean",
    "double",
    "float",
    "BigDecimal",
    "BigInteger",
    "LocalDate",
    "LocalDateTime",
    "Instant",
    "UUID",
];

/// On-disk shape of a domain document: a list of classes.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct DomainDocument {
    #[serde(default)]
    pub classes: Vec<ClassDescriptor>,
}

/// Maps class names to descriptors.
///
/// The universe plays the part of the class loader: the loader asks it for
/// the descriptor of a class it has to introspect. Built-in value types are
/// always present.
#[derive(Debug, Clone)]
pub struct ClassUniverse {
    classes: BTreeMap<String, Arc<ClassDescriptor>>,
}

impl Default for ClassUniverse {
    fn default() -> Self {
        Self::new()
    }
}

impl ClassUniverse {
    /// Create a universe holding only the built-in value types.
    pub fn new() -> Self {
        let classes = VALUE_TYPES
            .iter()
            .map(|name| (name.to_string(), Arc::new(ClassDescriptor::value_type(*name))))
            .collect();
        Self { classes }
    }

    /// Parse a YAML domain document.
    pub fn from_yaml_str(content: &str) -> ModelResult<Self> {
        let document: DomainDocument = serde_yaml::from_str(content)?;
        Ok(Self::new().with_classes(document.classes))
    }

    /// Register a class, returning the descriptor it replaced.
    pub fn register(&mut self, descriptor: ClassDescriptor) -> Option<Arc<ClassDescriptor>> {
        debug!("Registering class: {}", descriptor.name);
        self.classes
            .insert(descriptor.name.clone(), Arc::new(descriptor))
    }

    pub fn with_class(mut self, descriptor: ClassDescriptor) -> Self {
        self.register(descriptor);
        self
    }

    pub fn with_classes(mut self, descriptors: impl IntoIterator<Item = ClassDescriptor>) -> Self {
        for descriptor in descriptors {
            self.register(descriptor);
        }
        self
    }

    pub fn get(&self, name: &str) -> Option<Arc<ClassDescriptor>> {
        self.classes.get(name).cloned()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.classes.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.classes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }

    pub fn names(&self) -> Vec<&str> {
        self.classes.keys().map(|s| s.as_str()).collect()
    }

    /// Names of the classes handed to the loader eagerly, in name order.
    pub fn domain_classes(&self) -> Vec<String> {
        self.classes
            .values()
            .filter(|d| d.sort.is_domain() || d.is_mixin())
            .map(|d| d.name.clone())
            .collect()
    }

    /// Superclass chain of `name`, nearest first, excluding `name` itself.
    ///
    /// Stops at the first unknown class or when the chain loops.
    pub fn superclass_chain(&self, name: &str) -> Vec<Arc<ClassDescriptor>> {
        let mut chain = Vec::new();
        let mut seen = HashSet::new();
        seen.insert(name.to_string());

        let mut current = self.get(name).and_then(|d| d.superclass.clone());
        while let Some(superclass) = current {
            if !seen.insert(superclass.clone()) {
                break;
            }
            match self.get(&superclass) {
                Some(descriptor) => {
                    current = descriptor.superclass.clone();
                    chain.push(descriptor);
                }
                None => break,
            }
        }
        chain
    }

    /// `name` followed by every transitive supertype known to the universe.
    pub fn type_closure(&self, name: &str) -> Vec<String> {
        let mut closure = vec![name.to_string()];
        let mut index = 0;
        while index < closure.len() {
            if let Some(descriptor) = self.get(&closure[index]) {
                for supertype in descriptor.supertypes() {
                    if !closure.iter().any(|c| c == supertype) {
                        closure.push(supertype.to_string());
                    }
                }
            }
            index += 1;
        }
        closure
    }

    /// Mixins whose target is `name` or one of its supertypes, in name order.
    pub fn mixins_targeting(&self, name: &str) -> Vec<Arc<ClassDescriptor>> {
        let closure = self.type_closure(name);
        self.classes
            .values()
            .filter(|d| {
                d.mixin_shape()
                    .map(|shape| closure.contains(&shape.target))
                    .unwrap_or(false)
            })
            .cloned()
            .collect()
    }

    /// A supertype path that leads from `name` back to a class already on
    /// the path, if the hierarchy above `name` loops.
    pub fn hierarchy_cycle(&self, name: &str) -> Option<Vec<String>> {
        let mut path = Vec::new();
        let mut finished = HashSet::new();
        self.find_cycle(name, &mut path, &mut finished)
    }

    fn find_cycle(
        &self,
        name: &str,
        path: &mut Vec<String>,
        finished: &mut HashSet<String>,
    ) -> Option<Vec<String>> {
        if let Some(start) = path.iter().position(|p| p == name) {
            let mut cycle = path[start..].to_vec();
            cycle.push(name.to_string());
            return Some(cycle);
        }
        if finished.contains(name) {
            return None;
        }

        path.push(name.to_string());
        if let Some(descriptor) = self.get(name) {
            for supertype in descriptor.supertypes() {
                if let Some(cycle) = self.find_cycle(supertype, path, finished) {
                    return Some(cycle);
                }
            }
        }
        path.pop();
        finished.insert(name.to_string());
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::class::{BeanSort, ParameterDescriptor, TypeRef};

    #[test]
    fn test_value_types_registered() {
        let universe = ClassUniverse::new();
        assert!(universe.contains("String"));
        assert!(universe.contains("boolean"));
        assert_eq!(universe.get("int").unwrap().sort, BeanSort::Value);
        assert!(universe.domain_classes().is_empty());
    }

    #[test]
    fn test_from_yaml() {
        let yaml = r#"
classes:
  - name: shop.Customer
    sort: entity
    methods:
      - name: getName
        returns: String
      - name: placeOrder
  - name: shop.Order
    sort: entity
"#;
        let universe = ClassUniverse::from_yaml_str(yaml).unwrap();
        assert_eq!(universe.domain_classes(), vec!["shop.Customer", "shop.Order"]);
        assert_eq!(universe.get("shop.Customer").unwrap().methods.len(), 2);
    }

    #[test]
    fn test_superclass_chain_and_closure() {
        let universe = ClassUniverse::new()
            .with_class(ClassDescriptor::new("C").extends("B").implements("I"))
            .with_class(ClassDescriptor::new("B").extends("A"))
            .with_class(ClassDescriptor::new("A"))
            .with_class(ClassDescriptor::new("I"));

        let chain: Vec<_> = universe
            .superclass_chain("C")
            .iter()
            .map(|d| d.name.clone())
            .collect();
        assert_eq!(chain, vec!["B", "A"]);
        assert_eq!(universe.type_closure("C"), vec!["C", "B", "I", "A"]);
        assert!(universe.hierarchy_cycle("C").is_none());
    }

    #[test]
    fn test_hierarchy_cycle_detected() {
        let universe = ClassUniverse::new()
            .with_class(ClassDescriptor::new("A").extends("B"))
            .with_class(ClassDescriptor::new("B").extends("A"));

        let cycle = universe.hierarchy_cycle("A").unwrap();
        assert_eq!(cycle, vec!["A", "B", "A"]);
        assert_eq!(universe.superclass_chain("A").len(), 1);
    }

    #[test]
    fn test_mixins_targeting_supertypes() {
        let universe = ClassUniverse::new()
            .with_class(ClassDescriptor::new("Party").sort(BeanSort::Abstract))
            .with_class(ClassDescriptor::new("Customer").extends("Party").sort(BeanSort::Entity))
            .with_class(
                ClassDescriptor::new("Party_notes")
                    .sort(BeanSort::Mixin)
                    .constructor(vec![ParameterDescriptor::new("party", TypeRef::of("Party"))]),
            );

        let mixins = universe.mixins_targeting("Customer");
        assert_eq!(mixins.len(), 1);
        assert_eq!(mixins[0].name, "Party_notes");
        assert!(universe.mixins_targeting("Party_notes").is_empty());
    }
}

//! The ordered registry of facet factories.

use std::sync::Arc;

use meta_model::FeatureType;
use tracing::{debug, trace};

use crate::context::ProcessContext;
use crate::error::{FacetError, FacetResult};
use crate::factories::STANDARD_FACTORIES;
use crate::factory::FacetFactory;

/// The programming model: every facet factory, in registration order.
///
/// Factories run in the order they were registered. Because a holder keeps
/// the incumbent on equal precedence, that order is also the tie-break
/// between factories contributing the same facet type at the same
/// precedence.
#[derive(Clone, Default)]
pub struct ProgrammingModel {
    factories: Vec<Arc<dyn FacetFactory>>,
}

impl ProgrammingModel {
    /// Create an empty programming model.
    pub fn new() -> Self {
        Self {
            factories: Vec::new(),
        }
    }

    /// The built-in factories in their fixed order.
    pub fn standard() -> Self {
        let mut model = Self::new();
        for factory in STANDARD_FACTORIES {
            model.register(Arc::new(*factory));
        }
        model
    }

    /// Append a factory.
    pub fn register(&mut self, factory: Arc<dyn FacetFactory>) {
        debug!("Registering facet factory: {}", factory.name());
        self.factories.push(factory);
    }

    pub fn with_factory(mut self, factory: Arc<dyn FacetFactory>) -> Self {
        self.register(factory);
        self
    }

    /// Insert a factory immediately before the one named `before`.
    pub fn insert_before(&mut self, before: &str, factory: Arc<dyn FacetFactory>) -> FacetResult<()> {
        let index = self.position(before)?;
        debug!("Registering facet factory: {} before {}", factory.name(), before);
        self.factories.insert(index, factory);
        Ok(())
    }

    /// Insert a factory immediately after the one named `after`.
    pub fn insert_after(&mut self, after: &str, factory: Arc<dyn FacetFactory>) -> FacetResult<()> {
        let index = self.position(after)?;
        debug!("Registering facet factory: {} after {}", factory.name(), after);
        self.factories.insert(index + 1, factory);
        Ok(())
    }

    /// Remove a factory by name.
    pub fn unregister(&mut self, name: &str) -> Option<Arc<dyn FacetFactory>> {
        let index = self.position(name).ok()?;
        debug!("Unregistering facet factory: {}", name);
        Some(self.factories.remove(index))
    }

    fn position(&self, name: &str) -> FacetResult<usize> {
        self.factories
            .iter()
            .position(|f| f.name() == name)
            .ok_or_else(|| FacetError::FactoryNotFound(name.to_string()))
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn FacetFactory>> {
        self.factories.iter().find(|f| f.name() == name).cloned()
    }

    pub fn contains(&self, name: &str) -> bool {
        self.factories.iter().any(|f| f.name() == name)
    }

    /// Factory names in registration order.
    pub fn names(&self) -> Vec<&str> {
        self.factories.iter().map(|f| f.name()).collect()
    }

    pub fn len(&self) -> usize {
        self.factories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.factories.is_empty()
    }

    /// Factories that process `feature_type`, in registration order.
    pub fn factories_for(&self, feature_type: FeatureType) -> impl Iterator<Item = &Arc<dyn FacetFactory>> {
        self.factories
            .iter()
            .filter(move |f| f.supports(feature_type))
    }

    /// Run every applicable factory over the element in `ctx`.
    ///
    /// The first factory error aborts processing.
    pub fn process(&self, ctx: &mut ProcessContext<'_>) -> FacetResult<()> {
        for factory in self.factories_for(ctx.feature_type()) {
            trace!("{}: running {}", ctx.identifier(), factory.name());
            ctx.enter_factory(factory.name());
            factory.process(ctx)?;
        }
        Ok(())
    }
}

impl std::fmt::Debug for ProgrammingModel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ProgrammingModel")
            .field("factories", &self.names())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::factory::FnFactory;

    fn noop(_ctx: &mut ProcessContext<'_>) -> FacetResult<()> {
        Ok(())
    }

    const OBJECT: &[FeatureType] = &[FeatureType::Object];

    #[test]
    fn test_standard_model_order() {
        let model = ProgrammingModel::standard();
        assert_eq!(model.len(), STANDARD_FACTORIES.len());
        assert_eq!(model.names()[0], "named-inferred");
        assert_eq!(model.names().last().copied(), Some("action-annotation"));
    }

    #[test]
    fn test_factories_for_feature_type() {
        let model = ProgrammingModel::standard();
        let object: Vec<_> = model
            .factories_for(FeatureType::Object)
            .map(|f| f.name().to_string())
            .collect();
        assert!(object.contains(&"title-method".to_string()));
        assert!(!object.contains(&"property-setter".to_string()));
    }

    #[test]
    fn test_insert_before_and_after() {
        let mut model = ProgrammingModel::new()
            .with_factory(Arc::new(FnFactory::new("a", OBJECT, noop)))
            .with_factory(Arc::new(FnFactory::new("c", OBJECT, noop)));

        model
            .insert_before("c", Arc::new(FnFactory::new("b", OBJECT, noop)))
            .unwrap();
        model
            .insert_after("c", Arc::new(FnFactory::new("d", OBJECT, noop)))
            .unwrap();
        assert_eq!(model.names(), vec!["a", "b", "c", "d"]);

        let missing = model.insert_before("zzz", Arc::new(FnFactory::new("e", OBJECT, noop)));
        assert!(matches!(missing, Err(FacetError::FactoryNotFound(_))));

        assert!(model.unregister("b").is_some());
        assert!(!model.contains("b"));
    }
}

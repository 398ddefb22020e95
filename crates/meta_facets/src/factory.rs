//! The facet factory abstraction.

use std::fmt;

use meta_model::FeatureType;

use crate::context::ProcessContext;
use crate::error::FacetResult;

/// A unit of the programming model.
///
/// A factory is asked to process every element whose feature type it
/// declares, and contributes zero or more facets to that element's holder.
/// It may consume support methods through the context so that they are not
/// also turned into members.
pub trait FacetFactory: Send + Sync {
    /// Unique name, recorded as the source of every facet the factory adds.
    fn name(&self) -> &str;

    /// Feature types this factory processes.
    fn feature_types(&self) -> &[FeatureType];

    fn process(&self, ctx: &mut ProcessContext<'_>) -> FacetResult<()>;

    fn supports(&self, feature_type: FeatureType) -> bool {
        self.feature_types().contains(&feature_type)
    }
}

/// Signature of a table-driven factory.
pub type ProcessFn = fn(&mut ProcessContext<'_>) -> FacetResult<()>;

/// A factory defined by one row of a declarative table.
#[derive(Clone, Copy)]
pub struct FnFactory {
    name: &'static str,
    feature_types: &'static [FeatureType],
    process: ProcessFn,
}

impl FnFactory {
    pub const fn new(
        name: &'static str,
        feature_types: &'static [FeatureType],
        process: ProcessFn,
    ) -> Self {
        Self {
            name,
            feature_types,
            process,
        }
    }
}

impl FacetFactory for FnFactory {
    fn name(&self) -> &str {
        self.name
    }

    fn feature_types(&self) -> &[FeatureType] {
        self.feature_types
    }

    fn process(&self, ctx: &mut ProcessContext<'_>) -> FacetResult<()> {
        (self.process)(ctx)
    }
}

impl fmt::Debug for FnFactory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FnFactory")
            .field("name", &self.name)
            .field("feature_types", &self.feature_types)
            .finish()
    }
}

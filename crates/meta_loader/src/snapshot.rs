//! Read-only views over one metamodel generation.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use meta_model::{ObjectSpecification, SpecDescription};
use serde::Serialize;
use uuid::Uuid;

/// The fully introspected specifications of one generation, sorted by name.
#[derive(Debug, Clone)]
pub struct MetaModelSnapshot {
    generation: Uuid,
    taken_at: DateTime<Utc>,
    specs: Vec<Arc<ObjectSpecification>>,
}

impl MetaModelSnapshot {
    pub(crate) fn new(generation: Uuid, mut specs: Vec<Arc<ObjectSpecification>>) -> Self {
        specs.sort_by(|a, b| a.name().cmp(b.name()));
        Self {
            generation,
            taken_at: Utc::now(),
            specs,
        }
    }

    pub fn generation(&self) -> Uuid {
        self.generation
    }

    pub fn taken_at(&self) -> DateTime<Utc> {
        self.taken_at
    }

    pub fn specifications(&self) -> &[Arc<ObjectSpecification>] {
        &self.specs
    }

    pub fn get(&self, name: &str) -> Option<&Arc<ObjectSpecification>> {
        self.specs
            .binary_search_by(|s| s.name().cmp(name))
            .ok()
            .map(|i| &self.specs[i])
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    pub fn names(&self) -> Vec<&str> {
        self.specs.iter().map(|s| s.name()).collect()
    }

    pub fn len(&self) -> usize {
        self.specs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.specs.is_empty()
    }

    /// Serializable descriptions of every specification, in name order.
    pub fn describe(&self) -> Vec<SpecDescription> {
        self.specs.iter().map(|s| s.describe()).collect()
    }
}

/// Counters describing the loader cache.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct LoaderStats {
    pub generation: Uuid,
    pub generation_started_at: DateTime<Utc>,
    /// Classes known to the universe, value types included.
    pub known_classes: usize,
    pub ready: usize,
    pub in_progress: usize,
    pub failed: usize,
    /// Introspections started since the loader was created.
    pub builds: usize,
}

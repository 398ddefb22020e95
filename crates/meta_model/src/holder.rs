//! Facet holders and the precedence rule.

use std::collections::btree_map::Entry;
use std::collections::BTreeMap;

use serde::Serialize;
use tracing::trace;

use crate::facet::{Facet, FacetType};
use crate::identifier::Identifier;

/// What happened to a facet offered to a holder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FacetOutcome {
    /// No facet of that type was present.
    Installed,
    /// The newcomer had strictly higher precedence; carries the displaced facet.
    Replaced(Facet),
    /// The incumbent had equal or higher precedence; carries the rejected facet.
    Rejected(Facet),
}

impl FacetOutcome {
    /// Whether the offered facet is now the active one.
    pub fn is_active(&self) -> bool {
        !matches!(self, FacetOutcome::Rejected(_))
    }
}

/// Owns at most one active facet per [`FacetType`].
///
/// A facet of a type already present replaces the incumbent only when its
/// precedence is strictly higher. On a tie the incumbent stays, so among
/// equal-precedence candidates the first factory in pipeline order wins.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FacetHolder {
    identifier: Identifier,
    facets: BTreeMap<FacetType, Facet>,
}

impl FacetHolder {
    pub fn new(identifier: Identifier) -> Self {
        Self {
            identifier,
            facets: BTreeMap::new(),
        }
    }

    pub fn identifier(&self) -> &Identifier {
        &self.identifier
    }

    /// Offer a facet. Never fails.
    pub fn add_facet(&mut self, facet: Facet) -> FacetOutcome {
        match self.facets.entry(facet.facet_type) {
            Entry::Vacant(entry) => {
                entry.insert(facet);
                FacetOutcome::Installed
            }
            Entry::Occupied(mut entry) => {
                if facet.precedence > entry.get().precedence {
                    trace!(
                        "{}: {} from '{}' replaces '{}'",
                        self.identifier,
                        facet.facet_type,
                        facet.source,
                        entry.get().source
                    );
                    FacetOutcome::Replaced(entry.insert(facet))
                } else {
                    trace!(
                        "{}: {} from '{}' rejected, '{}' retained",
                        self.identifier,
                        facet.facet_type,
                        facet.source,
                        entry.get().source
                    );
                    FacetOutcome::Rejected(facet)
                }
            }
        }
    }

    pub fn facet(&self, facet_type: FacetType) -> Option<&Facet> {
        self.facets.get(&facet_type)
    }

    pub fn contains(&self, facet_type: FacetType) -> bool {
        self.facets.contains_key(&facet_type)
    }

    /// Active facets, ordered by facet type.
    pub fn facets(&self) -> impl Iterator<Item = &Facet> {
        self.facets.values()
    }

    pub fn facet_types(&self) -> Vec<FacetType> {
        self.facets.keys().copied().collect()
    }

    pub fn len(&self) -> usize {
        self.facets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.facets.is_empty()
    }
}

/// Anything that exposes a [`FacetHolder`].
pub trait HasFacets {
    fn facet_holder(&self) -> &FacetHolder;

    fn facet(&self, facet_type: FacetType) -> Option<&Facet> {
        self.facet_holder().facet(facet_type)
    }

    fn contains_facet(&self, facet_type: FacetType) -> bool {
        self.facet_holder().contains(facet_type)
    }

    fn identifier(&self) -> &Identifier {
        self.facet_holder().identifier()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::facet::{FacetValue, Precedence};

    fn css(precedence: Precedence, class: &str, source: &str) -> Facet {
        Facet::new(
            FacetType::CssClass,
            precedence,
            Identifier::class("A"),
            FacetValue::Text(class.to_string()),
        )
        .with_source(source)
    }

    #[test]
    fn test_higher_precedence_replaces() {
        let mut holder = FacetHolder::new(Identifier::class("A"));
        assert_eq!(
            holder.add_facet(css(Precedence::FromConfiguration, "config", "a")),
            FacetOutcome::Installed
        );

        let outcome = holder.add_facet(css(Precedence::Explicit, "method", "b"));
        assert!(matches!(outcome, FacetOutcome::Replaced(ref old) if old.source == "a"));
        assert_eq!(holder.facet(FacetType::CssClass).unwrap().text(), Some("method"));
    }

    #[test]
    fn test_lower_precedence_rejected() {
        let mut holder = FacetHolder::new(Identifier::class("A"));
        holder.add_facet(css(Precedence::Explicit, "method", "a"));

        let outcome = holder.add_facet(css(Precedence::Inferred, "inferred", "b"));
        assert!(!outcome.is_active());
        assert_eq!(holder.facet(FacetType::CssClass).unwrap().source, "a");
    }

    #[test]
    fn test_equal_precedence_keeps_incumbent() {
        let mut holder = FacetHolder::new(Identifier::class("A"));
        holder.add_facet(css(Precedence::Explicit, "first", "a"));
        holder.add_facet(css(Precedence::Explicit, "second", "b"));

        assert_eq!(holder.facet(FacetType::CssClass).unwrap().text(), Some("first"));
        assert_eq!(holder.len(), 1);
    }

    #[test]
    fn test_absent_facet_is_none() {
        let holder = FacetHolder::new(Identifier::class("A"));
        assert!(holder.facet(FacetType::Title).is_none());
        assert!(!holder.contains(FacetType::Title));
        assert!(holder.is_empty());
    }
}

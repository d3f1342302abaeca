//! Ground knowledge stores.
//!
//! - [`FactStore`]: binary relations, indexed by verb then subject
//! - [`PropositionSet`]: zero-arity tags
//!
//! Both stores deduplicate structurally and only ever grow. [`StoreView`]
//! bundles read-only borrows of every store, including the
//! [`ClassificationGraph`], for the matcher and query evaluator.

pub mod facts;
pub mod propositions;

pub use facts::FactStore;
pub use propositions::PropositionSet;

use crate::graph::ClassificationGraph;
use crate::pattern::Atom;

/// Read-only snapshot of all stores, valid for one fixpoint round.
#[derive(Clone, Copy)]
pub struct StoreView<'a> {
    pub facts: &'a FactStore,
    pub classification: &'a ClassificationGraph,
    pub propositions: &'a PropositionSet,
}

impl<'a> StoreView<'a> {
    pub fn new(
        facts: &'a FactStore,
        classification: &'a ClassificationGraph,
        propositions: &'a PropositionSet,
    ) -> Self {
        Self {
            facts,
            classification,
            propositions,
        }
    }

    /// Whether a ground atom is present in its store.
    pub fn contains(&self, atom: &Atom) -> bool {
        match atom {
            Atom::Fact(fact) => self.facts.contains(fact),
            Atom::Classification(edge) => self.classification.contains(edge),
            Atom::Proposition(tag) => self.propositions.contains(*tag),
        }
    }

    /// Total number of ground atoms across all stores.
    pub fn len(&self) -> usize {
        self.facts.len() + self.classification.len() + self.propositions.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

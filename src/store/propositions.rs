//! Zero-arity propositions asserted true.

use std::collections::BTreeSet;

use crate::symbol::Identifier;

#[derive(Debug, Clone, Default)]
pub struct PropositionSet {
    tags: BTreeSet<Identifier>,
}

impl PropositionSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a tag. Returns `false` if it was already present.
    pub fn insert(&mut self, tag: Identifier) -> bool {
        self.tags.insert(tag)
    }

    pub fn contains(&self, tag: Identifier) -> bool {
        self.tags.contains(&tag)
    }

    pub fn iter(&self) -> impl Iterator<Item = Identifier> + '_ {
        self.tags.iter().copied()
    }

    pub fn len(&self) -> usize {
        self.tags.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tags.is_empty()
    }
}

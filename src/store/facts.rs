//! Fact store: ground `subject verb object` relations.
//!
//! Facts are indexed by verb and then ordered by `(subject, object)`, so a
//! pattern with a known verb only scans that verb's facts, and a known subject
//! narrows the scan to a contiguous range.

use std::collections::{BTreeMap, BTreeSet};

use crate::pattern::GroundFact;
use crate::symbol::{Identifier, Verb};

/// Deduplicated set of ground facts.
#[derive(Debug, Clone, Default)]
pub struct FactStore {
    by_verb: BTreeMap<Verb, BTreeSet<(Identifier, Identifier)>>,
    len: usize,
}

impl FactStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Insert a fact. Returns `false` if it was already present.
    ///
    /// Verb admission is the caller's job; see
    /// [`KnowledgeBase::assert_fact`](crate::kb::KnowledgeBase::assert_fact).
    pub fn insert(&mut self, fact: GroundFact) -> bool {
        let inserted = self
            .by_verb
            .entry(fact.verb)
            .or_default()
            .insert((fact.subject, fact.object));
        if inserted {
            self.len += 1;
        }
        inserted
    }

    pub fn contains(&self, fact: &GroundFact) -> bool {
        self.by_verb
            .get(&fact.verb)
            .is_some_and(|pairs| pairs.contains(&(fact.subject, fact.object)))
    }

    /// All facts with `verb`, ordered by subject then object.
    pub fn with_verb(&self, verb: Verb) -> impl Iterator<Item = GroundFact> + '_ {
        self.by_verb
            .get(&verb)
            .into_iter()
            .flatten()
            .map(move |&(subject, object)| GroundFact::new(subject, verb, object))
    }

    /// All facts `subject verb ?`.
    pub fn with_subject(
        &self,
        verb: Verb,
        subject: Identifier,
    ) -> impl Iterator<Item = GroundFact> + '_ {
        self.by_verb
            .get(&verb)
            .into_iter()
            .flat_map(move |pairs| {
                pairs.range((subject, Identifier::MIN)..=(subject, Identifier::MAX))
            })
            .map(move |&(subject, object)| GroundFact::new(subject, verb, object))
    }

    /// Every fact, ordered by verb, subject, object.
    pub fn iter(&self) -> impl Iterator<Item = GroundFact> + '_ {
        self.by_verb.iter().flat_map(|(&verb, pairs)| {
            pairs
                .iter()
                .map(move |&(subject, object)| GroundFact::new(subject, verb, object))
        })
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::symbol::SymbolId;

    fn id(raw: u64) -> Identifier {
        Identifier::new(SymbolId::new(raw).unwrap())
    }

    fn verb(raw: u64) -> Verb {
        Verb::new(SymbolId::new(raw).unwrap())
    }

    #[test]
    fn insert_deduplicates() {
        let mut store = FactStore::new();
        let fact = GroundFact::new(id(1), verb(10), id(2));
        assert!(store.insert(fact));
        assert!(!store.insert(fact));
        assert_eq!(store.len(), 1);
        assert!(store.contains(&fact));
    }

    #[test]
    fn same_pair_under_different_verbs_is_distinct() {
        let mut store = FactStore::new();
        store.insert(GroundFact::new(id(1), verb(10), id(2)));
        store.insert(GroundFact::new(id(1), verb(11), id(2)));
        assert_eq!(store.len(), 2);
        assert!(!store.contains(&GroundFact::new(id(2), verb(10), id(1))));
    }

    #[test]
    fn with_subject_narrows_the_scan() {
        let mut store = FactStore::new();
        store.insert(GroundFact::new(id(1), verb(10), id(2)));
        store.insert(GroundFact::new(id(1), verb(10), id(3)));
        store.insert(GroundFact::new(id(4), verb(10), id(2)));
        store.insert(GroundFact::new(id(1), verb(11), id(5)));

        let objects: Vec<Identifier> = store
            .with_subject(verb(10), id(1))
            .map(|f| f.object)
            .collect();
        assert_eq!(objects, vec![id(2), id(3)]);
        assert_eq!(store.with_verb(verb(10)).count(), 3);
        assert_eq!(store.with_verb(verb(99)).count(), 0);
    }

    #[test]
    fn iter_visits_every_fact() {
        let mut store = FactStore::new();
        store.insert(GroundFact::new(id(1), verb(11), id(2)));
        store.insert(GroundFact::new(id(3), verb(10), id(4)));
        assert_eq!(store.iter().count(), 2);
    }
}

//! Provenance ledger: tracks how knowledge was derived.
//!
//! Every atom added by the fixpoint driver gets one record naming the rule (or
//! classification closure) that produced it and the round it first appeared.
//! Asserted knowledge has no record.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::infer::RuleId;
use crate::pattern::Atom;

/// How a piece of knowledge was derived.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum DerivationKind {
    /// Conclusion of a rule firing.
    Rule { rule: RuleId },
    /// Edge implied by transitivity of the classification graph.
    Closure,
}

/// A single provenance record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProvenanceRecord {
    pub atom: Atom,
    pub kind: DerivationKind,
    /// Fixpoint round (1-based) in which the atom was first added.
    pub round: usize,
}

/// First-derivation records in insertion order.
#[derive(Debug, Clone, Default)]
pub struct ProvenanceLedger {
    index: BTreeMap<Atom, usize>,
    records: Vec<ProvenanceRecord>,
}

impl ProvenanceLedger {
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a derivation. Later derivations of the same atom are ignored.
    pub fn record(&mut self, atom: Atom, kind: DerivationKind, round: usize) -> bool {
        if self.index.contains_key(&atom) {
            return false;
        }
        self.index.insert(atom, self.records.len());
        self.records.push(ProvenanceRecord { atom, kind, round });
        true
    }

    pub fn get(&self, atom: &Atom) -> Option<&ProvenanceRecord> {
        self.index.get(atom).and_then(|&i| self.records.get(i))
    }

    /// Records in derivation order.
    pub fn iter(&self) -> impl Iterator<Item = &ProvenanceRecord> {
        self.records.iter()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::symbol::{Identifier, SymbolId};

    fn tag(raw: u64) -> Atom {
        Atom::Proposition(Identifier::new(SymbolId::new(raw).unwrap()))
    }

    #[test]
    fn first_derivation_wins() {
        let mut ledger = ProvenanceLedger::new();
        assert!(ledger.record(tag(1), DerivationKind::Rule { rule: RuleId(0) }, 1));
        assert!(!ledger.record(tag(1), DerivationKind::Rule { rule: RuleId(3) }, 2));
        let record = ledger.get(&tag(1)).unwrap();
        assert_eq!(record.kind, DerivationKind::Rule { rule: RuleId(0) });
        assert_eq!(record.round, 1);
        assert_eq!(ledger.len(), 1);
    }

    #[test]
    fn iteration_follows_derivation_order() {
        let mut ledger = ProvenanceLedger::new();
        ledger.record(tag(5), DerivationKind::Closure, 1);
        ledger.record(tag(2), DerivationKind::Closure, 2);
        let atoms: Vec<Atom> = ledger.iter().map(|r| r.atom).collect();
        assert_eq!(atoms, vec![tag(5), tag(2)]);
        assert!(ledger.get(&tag(9)).is_none());
    }
}

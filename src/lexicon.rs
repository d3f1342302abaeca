//! The verb lexicon: which relations may be asserted.

use std::collections::BTreeSet;

use crate::symbol::Verb;

/// Set of declared verbs. Declaring is idempotent.
#[derive(Debug, Clone, Default)]
pub struct Lexicon {
    verbs: BTreeSet<Verb>,
}

impl Lexicon {
    pub fn new() -> Self {
        Self::default()
    }

    /// Declare `verb`. Returns `false` if it was already declared.
    pub fn declare(&mut self, verb: Verb) -> bool {
        self.verbs.insert(verb)
    }

    pub fn contains(&self, verb: Verb) -> bool {
        self.verbs.contains(&verb)
    }

    pub fn iter(&self) -> impl Iterator<Item = Verb> + '_ {
        self.verbs.iter().copied()
    }

    pub fn len(&self) -> usize {
        self.verbs.len()
    }

    pub fn is_empty(&self) -> bool {
        self.verbs.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::symbol::SymbolId;

    fn verb(raw: u64) -> Verb {
        Verb::new(SymbolId::new(raw).unwrap())
    }

    #[test]
    fn redeclaring_is_a_no_op() {
        let mut lexicon = Lexicon::new();
        assert!(lexicon.declare(verb(1)));
        assert!(!lexicon.declare(verb(1)));
        assert_eq!(lexicon.len(), 1);
    }

    #[test]
    fn contains_only_declared_verbs() {
        let mut lexicon = Lexicon::new();
        lexicon.declare(verb(1));
        assert!(lexicon.contains(verb(1)));
        assert!(!lexicon.contains(verb(2)));
    }
}

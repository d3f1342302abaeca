//! The knowledge base: every store plus the rules and lexicon that govern them.
//!
//! A [`KnowledgeBase`] is constructed empty, populated with [`Statement`]s,
//! driven to a fixpoint by [`FixpointDriver`](crate::infer::FixpointDriver) and
//! then queried any number of times. It only ever grows.

use std::collections::BTreeSet;

use crate::error::{LoadError, QueryError};
use crate::graph::ClassificationGraph;
use crate::infer::{Rule, RuleId, RuleSet};
use crate::lexicon::Lexicon;
use crate::pattern::{Atom, Bindings, ClassificationEdge, GroundFact, Pattern};
use crate::provenance::{DerivationKind, ProvenanceLedger, ProvenanceRecord};
use crate::query::{self, Answer};
use crate::registry::SymbolTable;
use crate::store::{FactStore, PropositionSet, StoreView};
use crate::symbol::{Identifier, Verb};

// ---------------------------------------------------------------------------
// Statements
// ---------------------------------------------------------------------------

/// One unit of program input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Statement {
    DeclareVerb(Verb),
    Proposition(Identifier),
    Classification(ClassificationEdge),
    Fact(GroundFact),
    Rule(Rule),
    Query(Pattern),
}

impl Statement {
    pub fn is_query(&self) -> bool {
        matches!(self, Statement::Query(_))
    }

    pub fn render(&self, symbols: &SymbolTable) -> String {
        match self {
            Statement::DeclareVerb(verb) => format!("verb {}", symbols.verb_label(*verb)),
            Statement::Proposition(tag) => symbols.identifier_label(*tag),
            Statement::Classification(edge) => Atom::Classification(*edge).render(symbols),
            Statement::Fact(fact) => Atom::Fact(*fact).render(symbols),
            Statement::Rule(rule) => rule.render(symbols),
            Statement::Query(pattern) => format!("{}?", pattern.render(symbols)),
        }
    }
}

/// What a successful [`KnowledgeBase::load`] did.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoadOutcome {
    /// New knowledge was added.
    Added,
    /// The statement was already known; nothing changed.
    AlreadyKnown,
    /// A rule was validated and stored.
    Rule(RuleId),
}

// ---------------------------------------------------------------------------
// Knowledge base
// ---------------------------------------------------------------------------

#[derive(Debug)]
pub struct KnowledgeBase {
    symbols: SymbolTable,
    lexicon: Lexicon,
    facts: FactStore,
    classification: ClassificationGraph,
    propositions: PropositionSet,
    rules: RuleSet,
    provenance: ProvenanceLedger,
    converged: bool,
}

impl Default for KnowledgeBase {
    fn default() -> Self {
        Self::new()
    }
}

impl KnowledgeBase {
    pub fn new() -> Self {
        Self::with_symbols(SymbolTable::new())
    }

    /// Start from an existing symbol table, e.g. one the parser interned into.
    pub fn with_symbols(symbols: SymbolTable) -> Self {
        Self {
            symbols,
            lexicon: Lexicon::new(),
            facts: FactStore::new(),
            classification: ClassificationGraph::new(),
            propositions: PropositionSet::new(),
            rules: RuleSet::new(),
            provenance: ProvenanceLedger::new(),
            converged: true,
        }
    }

    // -- loading ------------------------------------------------------------

    /// Admit one statement. A rejected statement leaves the knowledge base
    /// unchanged.
    pub fn load(&mut self, statement: Statement) -> Result<LoadOutcome, LoadError> {
        let outcome = match statement {
            Statement::DeclareVerb(verb) => added(self.declare_verb(verb)),
            Statement::Proposition(tag) => added(self.assert_proposition(tag)),
            Statement::Classification(edge) => added(self.assert_classification(edge)),
            Statement::Fact(fact) => added(self.assert_fact(fact)?),
            Statement::Rule(rule) => LoadOutcome::Rule(self.add_rule(rule)?),
            Statement::Query(pattern) => {
                return Err(LoadError::UnexpectedQuery {
                    pattern: pattern.render(&self.symbols),
                });
            }
        };
        Ok(outcome)
    }

    /// Declare a verb. Redeclaring is a no-op returning `false`.
    pub fn declare_verb(&mut self, verb: Verb) -> bool {
        self.lexicon.declare(verb)
    }

    /// Assert a ground fact whose verb must already be declared.
    pub fn assert_fact(&mut self, fact: GroundFact) -> Result<bool, LoadError> {
        if !self.lexicon.contains(fact.verb) {
            return Err(LoadError::UndeclaredVerb {
                verb: self.symbols.verb_label(fact.verb),
                pattern: Atom::Fact(fact).render(&self.symbols),
            });
        }
        let new = self.facts.insert(fact);
        Ok(self.mark(new))
    }

    pub fn assert_classification(&mut self, edge: ClassificationEdge) -> bool {
        let new = self.classification.insert(edge);
        self.mark(new)
    }

    pub fn assert_proposition(&mut self, tag: Identifier) -> bool {
        let new = self.propositions.insert(tag);
        self.mark(new)
    }

    /// Validate a rule against the current lexicon and store it.
    pub fn add_rule(&mut self, rule: Rule) -> Result<RuleId, LoadError> {
        let id = self.rules.add(rule, &self.lexicon, &self.symbols)?;
        self.converged = false;
        tracing::debug!(rule = %id, total = self.rules.len(), "rule added");
        Ok(id)
    }

    fn mark(&mut self, changed: bool) -> bool {
        if changed {
            self.converged = false;
        }
        changed
    }

    // -- fixpoint support ---------------------------------------------------

    /// Close the classification graph, recording each implied edge.
    pub(crate) fn close_classification(
        &mut self,
        round: usize,
        record: bool,
    ) -> BTreeSet<ClassificationEdge> {
        let added = self.classification.close_transitively();
        if record {
            for edge in &added {
                self.provenance
                    .record(Atom::Classification(*edge), DerivationKind::Closure, round);
            }
        }
        added
    }

    /// Merge one derived atom. Conclusions were verb-checked when their rule
    /// was loaded, so no admission check happens here.
    pub(crate) fn merge_derived(
        &mut self,
        atom: Atom,
        rule: RuleId,
        round: usize,
        record: bool,
    ) -> bool {
        let new = match atom {
            Atom::Fact(fact) => self.facts.insert(fact),
            Atom::Classification(edge) => self.classification.insert(edge),
            Atom::Proposition(tag) => self.propositions.insert(tag),
        };
        if new && record {
            self.provenance
                .record(atom, DerivationKind::Rule { rule }, round);
        }
        new
    }

    pub(crate) fn mark_converged(&mut self) {
        self.converged = true;
    }

    /// Upper bound on rounds before a fixpoint must be reached.
    ///
    /// Every productive round adds at least one atom from a finite universe of
    /// `n² · (verbs + 1) + n` possible facts, edges and propositions over `n`
    /// identifiers, plus one final round that observes no change.
    pub fn universe_bound(&self) -> usize {
        let n = self.symbols.identifier_count();
        let verbs = self.lexicon.len();
        n.saturating_mul(n)
            .saturating_mul(verbs.saturating_add(1))
            .saturating_add(n)
            .saturating_add(1)
    }

    // -- queries ------------------------------------------------------------

    /// Answer a ground query against the converged state.
    pub fn answer(&self, pattern: &Pattern) -> Result<Answer, QueryError> {
        let atom = match pattern.ground() {
            Some(atom) => atom,
            None => {
                let variable = pattern
                    .variables()
                    .next()
                    .map(ToString::to_string)
                    .unwrap_or_default();
                return Err(QueryError::VariableInQuery {
                    pattern: pattern.render(&self.symbols),
                    variable,
                });
            }
        };
        self.ensure_converged()?;
        Ok(query::evaluate(&self.view(), &atom))
    }

    /// Every substitution under which `pattern` holds. Ground patterns yield
    /// one empty substitution when proven and none otherwise.
    pub fn solutions(&self, pattern: &Pattern) -> Result<Vec<Bindings>, QueryError> {
        self.ensure_converged()?;
        Ok(query::solutions(&self.view(), pattern))
    }

    fn ensure_converged(&self) -> Result<(), QueryError> {
        if self.converged {
            Ok(())
        } else {
            Err(QueryError::NotConverged)
        }
    }

    /// How a derived atom came to be known; `None` for asserted knowledge.
    pub fn explain(&self, atom: &Atom) -> Option<&ProvenanceRecord> {
        self.provenance.get(atom)
    }

    // -- accessors ----------------------------------------------------------

    pub fn view(&self) -> StoreView<'_> {
        StoreView::new(&self.facts, &self.classification, &self.propositions)
    }

    pub fn is_converged(&self) -> bool {
        self.converged
    }

    pub fn symbols(&self) -> &SymbolTable {
        &self.symbols
    }

    pub fn lexicon(&self) -> &Lexicon {
        &self.lexicon
    }

    pub fn facts(&self) -> &FactStore {
        &self.facts
    }

    pub fn classification(&self) -> &ClassificationGraph {
        &self.classification
    }

    pub fn propositions(&self) -> &PropositionSet {
        &self.propositions
    }

    pub fn rules(&self) -> &RuleSet {
        &self.rules
    }

    pub fn provenance(&self) -> &ProvenanceLedger {
        &self.provenance
    }
}

fn added(new: bool) -> LoadOutcome {
    if new {
        LoadOutcome::Added
    } else {
        LoadOutcome::AlreadyKnown
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::pattern::Slot;

    fn kb_with_loves() -> (KnowledgeBase, Verb) {
        let mut kb = KnowledgeBase::new();
        let loves = kb.symbols().verb("loves").unwrap();
        kb.load(Statement::DeclareVerb(loves)).unwrap();
        (kb, loves)
    }

    #[test]
    fn empty_kb_is_converged() {
        let kb = KnowledgeBase::new();
        assert!(kb.is_converged());
        assert_eq!(kb.universe_bound(), 1);
    }

    #[test]
    fn undeclared_verb_rejects_fact_and_leaves_kb_unchanged() {
        let mut kb = KnowledgeBase::new();
        let hates = kb.symbols().verb("hates").unwrap();
        let a = kb.symbols().identifier("A").unwrap();
        let b = kb.symbols().identifier("B").unwrap();
        let err = kb
            .load(Statement::Fact(GroundFact::new(a, hates, b)))
            .unwrap_err();
        assert!(matches!(err, LoadError::UndeclaredVerb { ref verb, .. } if verb == "hates"));
        assert!(kb.facts().is_empty());
        assert!(kb.is_converged());
    }

    #[test]
    fn reassertion_is_a_noop() {
        let (mut kb, loves) = kb_with_loves();
        let a = kb.symbols().identifier("A").unwrap();
        let fact = GroundFact::new(a, loves, a);
        assert_eq!(kb.load(Statement::Fact(fact)).unwrap(), LoadOutcome::Added);
        assert_eq!(
            kb.load(Statement::Fact(fact)).unwrap(),
            LoadOutcome::AlreadyKnown
        );
        assert_eq!(
            kb.load(Statement::DeclareVerb(loves)).unwrap(),
            LoadOutcome::AlreadyKnown
        );
        assert_eq!(kb.facts().len(), 1);
    }

    #[test]
    fn loading_marks_stale_and_answer_refuses() {
        let mut kb = KnowledgeBase::new();
        let rain = kb.symbols().identifier("rain").unwrap();
        kb.load(Statement::Proposition(rain)).unwrap();
        assert!(!kb.is_converged());
        assert!(matches!(
            kb.answer(&Pattern::proposition(rain)),
            Err(QueryError::NotConverged)
        ));
        kb.mark_converged();
        assert_eq!(kb.answer(&Pattern::proposition(rain)).unwrap(), Answer::Proven);
    }

    #[test]
    fn variable_query_is_rejected() {
        let (kb, loves) = kb_with_loves();
        let a = kb.symbols().identifier("A").unwrap();
        let err = kb
            .answer(&Pattern::fact(a, loves, Slot::var("who")))
            .unwrap_err();
        assert!(matches!(err, QueryError::VariableInQuery { ref variable, .. } if variable == "?who"));
    }

    #[test]
    fn query_statement_cannot_be_loaded() {
        let mut kb = KnowledgeBase::new();
        let rain = kb.symbols().identifier("rain").unwrap();
        let err = kb
            .load(Statement::Query(Pattern::proposition(rain)))
            .unwrap_err();
        assert!(matches!(err, LoadError::UnexpectedQuery { .. }));
    }

    #[test]
    fn universe_bound_counts_identifiers_and_verbs() {
        let (kb, _) = kb_with_loves();
        kb.symbols().identifier("A").unwrap();
        kb.symbols().identifier("B").unwrap();
        // n = 2, verbs = 1: 4 * 2 + 2 + 1
        assert_eq!(kb.universe_bound(), 11);
    }

    #[test]
    fn render_statements() {
        let (kb, loves) = kb_with_loves();
        let a = kb.symbols().identifier("A").unwrap();
        let b = kb.symbols().identifier("B").unwrap();
        assert_eq!(
            Statement::Fact(GroundFact::new(a, loves, b)).render(kb.symbols()),
            "A loves B"
        );
        assert_eq!(
            Statement::Classification(ClassificationEdge::new(a, b)).render(kb.symbols()),
            "A is-a B"
        );
    }
}

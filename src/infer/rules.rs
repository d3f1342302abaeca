//! Forward-chaining rules: a conjunction of premises and one conclusion.
//!
//! Rules are data. They are validated once, when loaded, against the lexicon
//! in force at that moment; after that every firing is known to produce an
//! admissible conclusion.

use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::error::LoadError;
use crate::lexicon::Lexicon;
use crate::pattern::{Pattern, Variable};
use crate::registry::SymbolTable;

// ---------------------------------------------------------------------------
// Rule
// ---------------------------------------------------------------------------

/// Position of a rule in its [`RuleSet`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct RuleId(pub usize);

impl std::fmt::Display for RuleId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "rule-{}", self.0 + 1)
    }
}

/// `if premise₁ and … and premiseₙ then conclusion`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Rule {
    /// Display name; empty names become `rule-N` when the rule is added.
    pub name: String,
    pub premises: Vec<Pattern>,
    pub conclusion: Pattern,
}

impl Rule {
    pub fn new(premises: Vec<Pattern>, conclusion: Pattern) -> Self {
        Self {
            name: String::new(),
            premises,
            conclusion,
        }
    }

    pub fn named(mut self, name: impl Into<String>) -> Self {
        self.name = name.into();
        self
    }

    /// Variables bound by at least one premise.
    pub fn premise_variables(&self) -> BTreeSet<&Variable> {
        self.premises.iter().flat_map(Pattern::variables).collect()
    }

    /// Check the load-time invariants.
    ///
    /// - at least one premise;
    /// - every fact pattern's verb is declared;
    /// - every conclusion variable is bound by a premise.
    pub fn validate(&self, lexicon: &Lexicon, symbols: &SymbolTable) -> Result<(), LoadError> {
        if self.premises.is_empty() {
            return Err(LoadError::MalformedPattern {
                shape: "rule".into(),
                message: format!("rule '{}' has no premises", self.name),
            });
        }

        let patterns = self.premises.iter().chain(std::iter::once(&self.conclusion));
        for pattern in patterns {
            match pattern.verb() {
                Some(verb) if !lexicon.contains(verb) => {
                    return Err(LoadError::UndeclaredVerb {
                        verb: symbols.verb_label(verb),
                        pattern: pattern.render(symbols),
                    });
                }
                _ => {}
            }
        }

        let bound = self.premise_variables();
        if let Some(unbound) = self.conclusion.variables().find(|v| !bound.contains(v)) {
            return Err(LoadError::UnboundConclusionVariable {
                variable: unbound.to_string(),
                rule: self.name.clone(),
            });
        }
        Ok(())
    }

    /// Render as `if A and B then C` with resolved labels.
    pub fn render(&self, symbols: &SymbolTable) -> String {
        let premises: Vec<String> = self.premises.iter().map(|p| p.render(symbols)).collect();
        format!(
            "if {} then {}",
            premises.join(" and "),
            self.conclusion.render(symbols)
        )
    }
}

// ---------------------------------------------------------------------------
// Rule set
// ---------------------------------------------------------------------------

/// Ordered collection of validated rules.
#[derive(Debug, Clone, Default)]
pub struct RuleSet {
    rules: Vec<Rule>,
}

impl RuleSet {
    pub fn new() -> Self {
        Self::default()
    }

    /// Validate and append a rule, naming it `rule-N` if it has no name.
    pub fn add(
        &mut self,
        mut rule: Rule,
        lexicon: &Lexicon,
        symbols: &SymbolTable,
    ) -> Result<RuleId, LoadError> {
        let id = RuleId(self.rules.len());
        if rule.name.is_empty() {
            rule.name = id.to_string();
        }
        rule.validate(lexicon, symbols)?;
        self.rules.push(rule);
        Ok(id)
    }

    pub fn get(&self, id: RuleId) -> Option<&Rule> {
        self.rules.get(id.0)
    }

    pub fn iter(&self) -> impl Iterator<Item = (RuleId, &Rule)> {
        self.rules.iter().enumerate().map(|(i, r)| (RuleId(i), r))
    }

    pub fn as_slice(&self) -> &[Rule] {
        &self.rules
    }

    pub fn len(&self) -> usize {
        self.rules.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rules.is_empty()
    }
}

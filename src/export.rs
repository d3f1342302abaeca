//! Export types for serializing knowledge base state.
//!
//! These types provide human-readable, label-resolved representations
//! of facts, classification edges, rules and provenance suitable for JSON
//! export.

use serde::{Deserialize, Serialize};

use crate::kb::KnowledgeBase;
use crate::provenance::DerivationKind;

/// Exported fact with resolved labels for all positions.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FactExport {
    pub subject: String,
    pub verb: String,
    pub object: String,
}

/// Exported classification edge.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EdgeExport {
    pub child: String,
    pub parent: String,
}

/// Exported rule.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RuleExport {
    pub name: String,
    /// Rendered as `if … then …`.
    pub text: String,
}

/// Exported provenance record with resolved labels.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProvenanceExport {
    /// Rendered derived atom.
    pub atom: String,
    /// Rule name, or `closure` for transitive classification edges.
    pub derived_by: String,
    /// Fixpoint round (1-based).
    pub round: usize,
}

/// A label-resolved view of a whole knowledge base.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Snapshot {
    pub converged: bool,
    pub verbs: Vec<String>,
    pub facts: Vec<FactExport>,
    pub classifications: Vec<EdgeExport>,
    pub propositions: Vec<String>,
    pub rules: Vec<RuleExport>,
    pub provenance: Vec<ProvenanceExport>,
}

impl Snapshot {
    pub fn capture(kb: &KnowledgeBase) -> Self {
        let symbols = kb.symbols();
        let ident = |id| symbols.identifier_label(id);

        Self {
            converged: kb.is_converged(),
            verbs: kb.lexicon().iter().map(|v| symbols.verb_label(v)).collect(),
            facts: kb
                .facts()
                .iter()
                .map(|f| FactExport {
                    subject: ident(f.subject),
                    verb: symbols.verb_label(f.verb),
                    object: ident(f.object),
                })
                .collect(),
            classifications: kb
                .classification()
                .edges()
                .map(|e| EdgeExport {
                    child: ident(e.child),
                    parent: ident(e.parent),
                })
                .collect(),
            propositions: kb.propositions().iter().map(ident).collect(),
            rules: kb
                .rules()
                .iter()
                .map(|(_, rule)| RuleExport {
                    name: rule.name.clone(),
                    text: rule.render(symbols),
                })
                .collect(),
            provenance: kb
                .provenance()
                .iter()
                .map(|record| ProvenanceExport {
                    atom: record.atom.render(symbols),
                    derived_by: match record.kind {
                        DerivationKind::Rule { rule } => kb
                            .rules()
                            .get(rule)
                            .map_or_else(|| rule.to_string(), |r| r.name.clone()),
                        DerivationKind::Closure => "closure".into(),
                    },
                    round: record.round,
                })
                .collect(),
        }
    }

    pub fn to_json_pretty(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }
}

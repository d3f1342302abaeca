//! Forward-chaining fixpoint driver.
//!
//! Each round closes the classification graph, fires every rule against a
//! read-only snapshot of the stores, and merges the buffered conclusions at the
//! round boundary. A round that changes nothing is the fixpoint.

use std::collections::{BTreeMap, BTreeSet};

use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::error::FixpointError;
use crate::kb::KnowledgeBase;
use crate::pattern::Atom;
use crate::provenance::DerivationKind;

use super::matcher;
use super::rules::RuleId;

// ---------------------------------------------------------------------------
// Configuration
// ---------------------------------------------------------------------------

/// Configuration for the fixpoint driver.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FixpointConfig {
    /// Caller-imposed round budget (default: none, bounded by the universe size).
    pub max_rounds: Option<usize>,
    /// Evaluate the rules of one round in parallel (default: true).
    pub parallel: bool,
    /// Keep a provenance record for every derived atom (default: true).
    pub record_provenance: bool,
}

impl Default for FixpointConfig {
    fn default() -> Self {
        Self {
            max_rounds: None,
            parallel: true,
            record_provenance: true,
        }
    }
}

// ---------------------------------------------------------------------------
// Result types
// ---------------------------------------------------------------------------

/// A single atom added during a run.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct Derivation {
    pub atom: Atom,
    pub kind: DerivationKind,
    pub round: usize,
}

/// Result of driving a knowledge base to its fixpoint.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FixpointReport {
    /// Rounds executed, including the final round that observed no change.
    pub rounds: usize,
    /// Edges added by classification closure.
    pub closure_edges: usize,
    /// Every added atom in derivation order.
    pub derivations: Vec<Derivation>,
    /// Per-rule count of conclusions that were new when merged.
    pub rule_stats: BTreeMap<RuleId, usize>,
}

impl FixpointReport {
    /// Atoms added by rule firings, excluding closure edges.
    pub fn rule_derivations(&self) -> usize {
        self.derivations.len() - self.closure_edges
    }
}

// ---------------------------------------------------------------------------
// Driver
// ---------------------------------------------------------------------------

/// Drives a [`KnowledgeBase`] to its fixpoint.
#[derive(Debug, Clone, Default)]
pub struct FixpointDriver {
    config: FixpointConfig,
}

impl FixpointDriver {
    pub fn new(config: FixpointConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &FixpointConfig {
        &self.config
    }

    /// Run closure and rule rounds until no store changes.
    ///
    /// Without a round budget the loop is bounded by
    /// [`KnowledgeBase::universe_bound`], which a monotone run cannot exceed.
    pub fn run(&self, kb: &mut KnowledgeBase) -> Result<FixpointReport, FixpointError> {
        let budget = self
            .config
            .max_rounds
            .unwrap_or_else(|| kb.universe_bound());
        let record = self.config.record_provenance;
        let mut report = FixpointReport::default();

        tracing::info!(
            rules = kb.rules().len(),
            facts = kb.facts().len(),
            edges = kb.classification().len(),
            propositions = kb.propositions().len(),
            budget,
            "fixpoint run starting"
        );

        for round in 1..=budget {
            report.rounds = round;

            let closed = kb.close_classification(round, record);
            report.closure_edges += closed.len();
            report
                .derivations
                .extend(closed.iter().map(|&edge| Derivation {
                    atom: Atom::Classification(edge),
                    kind: DerivationKind::Closure,
                    round,
                }));

            let fired = self.fire_all(kb);

            let mut derived = 0;
            for (index, conclusions) in fired.into_iter().enumerate() {
                let rule = RuleId(index);
                let mut new_for_rule = 0;
                for atom in conclusions {
                    if kb.merge_derived(atom, rule, round, record) {
                        report.derivations.push(Derivation {
                            atom,
                            kind: DerivationKind::Rule { rule },
                            round,
                        });
                        new_for_rule += 1;
                    }
                }
                if new_for_rule > 0 {
                    tracing::trace!(%rule, round, new = new_for_rule, "rule fired");
                    *report.rule_stats.entry(rule).or_insert(0) += new_for_rule;
                }
                derived += new_for_rule;
            }

            tracing::debug!(round, closure = closed.len(), derived, "round complete");

            if closed.is_empty() && derived == 0 {
                kb.mark_converged();
                tracing::info!(
                    rounds = report.rounds,
                    derivations = report.derivations.len(),
                    "fixpoint reached"
                );
                return Ok(report);
            }
        }

        tracing::warn!(rounds = budget, "round budget exhausted before fixpoint");
        Err(FixpointError::RoundBudgetExhausted { rounds: budget })
    }

    /// Evaluate every rule against the current snapshot, in rule order.
    fn fire_all(&self, kb: &KnowledgeBase) -> Vec<BTreeSet<Atom>> {
        let view = kb.view();
        let rules = kb.rules().as_slice();
        if self.config.parallel {
            rules
                .par_iter()
                .map(|rule| matcher::fire(rule, &view))
                .collect()
        } else {
            rules.iter().map(|rule| matcher::fire(rule, &view)).collect()
        }
    }
}

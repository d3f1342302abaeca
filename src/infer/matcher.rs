//! Pattern matching and conjunctive joins.
//!
//! Pure functions over a [`StoreView`]: given a pattern and the bindings
//! accumulated from earlier premises, produce every consistent extension.

use std::collections::BTreeSet;

use crate::pattern::{Atom, Bindings, ClassificationEdge, GroundFact, Pattern, Slot};
use crate::store::StoreView;

use super::rules::Rule;

/// Every extension of `bindings` that satisfies `pattern` against `stores`.
///
/// Classification patterns match the closed graph, so any ancestor satisfies
/// a premise, not only a directly asserted parent.
pub fn match_pattern(pattern: &Pattern, bindings: &Bindings, stores: &StoreView<'_>) -> Vec<Bindings> {
    match pattern {
        Pattern::Fact {
            subject,
            verb,
            object,
        } => {
            let candidates: Box<dyn Iterator<Item = GroundFact> + '_> =
                match bindings.resolve(subject) {
                    Some(s) => Box::new(stores.facts.with_subject(*verb, s)),
                    None => Box::new(stores.facts.with_verb(*verb)),
                };
            candidates
                .filter_map(|fact| extend(bindings, [(subject, fact.subject), (object, fact.object)]))
                .collect()
        }
        Pattern::Classification { child, parent } => {
            match (bindings.resolve(child), bindings.resolve(parent)) {
                (Some(c), Some(p)) => {
                    if stores.classification.contains(&ClassificationEdge::new(c, p)) {
                        vec![bindings.clone()]
                    } else {
                        Vec::new()
                    }
                }
                (Some(c), None) => stores
                    .classification
                    .ancestors(c)
                    .filter_map(|p| extend(bindings, [(parent, p)]))
                    .collect(),
                (None, Some(p)) => stores
                    .classification
                    .descendants(p)
                    .filter_map(|c| extend(bindings, [(child, c)]))
                    .collect(),
                (None, None) => stores
                    .classification
                    .edges()
                    .filter_map(|e| extend(bindings, [(child, e.child), (parent, e.parent)]))
                    .collect(),
            }
        }
        Pattern::Proposition { tag } => {
            if stores.propositions.contains(*tag) {
                vec![bindings.clone()]
            } else {
                Vec::new()
            }
        }
    }
}

/// Clone `bindings` and unify each slot with its value; `None` on conflict.
///
/// Unifying slot by slot keeps a variable repeated inside one pattern
/// consistent, so `?X loves ?X` only matches reflexive facts.
fn extend<const N: usize>(
    bindings: &Bindings,
    pairs: [(&Slot, crate::symbol::Identifier); N],
) -> Option<Bindings> {
    let mut extended = bindings.clone();
    pairs
        .into_iter()
        .all(|(slot, value)| extended.unify(slot, value))
        .then_some(extended)
}

/// Left-to-right join over a premise list.
///
/// The candidate set after premise *k* holds every extension of the survivors
/// of premise *k − 1* that satisfies premise *k*. An empty set short-circuits.
pub fn match_premises(premises: &[Pattern], stores: &StoreView<'_>) -> Vec<Bindings> {
    let mut candidates = vec![Bindings::new()];
    for premise in premises {
        candidates = candidates
            .iter()
            .flat_map(|bindings| match_pattern(premise, bindings, stores))
            .collect();
        if candidates.is_empty() {
            break;
        }
    }
    candidates
}

/// Instantiate a conclusion; `None` if some variable is unbound.
pub fn instantiate(pattern: &Pattern, bindings: &Bindings) -> Option<Atom> {
    match pattern {
        Pattern::Fact {
            subject,
            verb,
            object,
        } => Some(Atom::Fact(GroundFact::new(
            bindings.resolve(subject)?,
            *verb,
            bindings.resolve(object)?,
        ))),
        Pattern::Classification { child, parent } => Some(Atom::Classification(
            ClassificationEdge::new(bindings.resolve(child)?, bindings.resolve(parent)?),
        )),
        Pattern::Proposition { tag } => Some(Atom::Proposition(*tag)),
    }
}

/// All conclusions `rule` yields against `stores` that are not already known.
pub fn fire(rule: &Rule, stores: &StoreView<'_>) -> BTreeSet<Atom> {
    match_premises(&rule.premises, stores)
        .iter()
        .filter_map(|bindings| instantiate(&rule.conclusion, bindings))
        .filter(|atom| !stores.contains(atom))
        .collect()
}

//! Ground knowledge, patterns and substitutions.
//!
//! Ground values ([`GroundFact`], [`ClassificationEdge`], proposition tags) are
//! what the stores hold. A [`Pattern`] is the same shape with [`Slot`]s that may
//! be [`Variable`]s; rule premises, conclusions and queries are patterns.
//! [`Bindings`] map variables to identifiers during one rule firing.

use std::collections::BTreeMap;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::error::LoadError;
use crate::registry::SymbolTable;
use crate::symbol::{Identifier, Verb};

// ---------------------------------------------------------------------------
// Ground values
// ---------------------------------------------------------------------------

/// A ground binary relation: `subject verb object`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct GroundFact {
    pub subject: Identifier,
    pub verb: Verb,
    pub object: Identifier,
}

impl GroundFact {
    pub fn new(subject: Identifier, verb: Verb, object: Identifier) -> Self {
        Self {
            subject,
            verb,
            object,
        }
    }
}

/// `child` is classified as `parent`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct ClassificationEdge {
    pub child: Identifier,
    pub parent: Identifier,
}

impl ClassificationEdge {
    pub fn new(child: Identifier, parent: Identifier) -> Self {
        Self { child, parent }
    }
}

/// Any single piece of ground knowledge.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub enum Atom {
    Fact(GroundFact),
    Classification(ClassificationEdge),
    Proposition(Identifier),
}

impl Atom {
    /// Render with resolved labels, e.g. `Confucius loves YanHui`.
    pub fn render(&self, symbols: &SymbolTable) -> String {
        Pattern::from(*self).render(symbols)
    }
}

// ---------------------------------------------------------------------------
// Variables and slots
// ---------------------------------------------------------------------------

/// A placeholder scoped to one rule, compared by name.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Variable(Arc<str>);

impl Variable {
    pub fn new(name: impl AsRef<str>) -> Self {
        Self(Arc::from(name.as_ref()))
    }

    pub fn name(&self) -> &str {
        &self.0
    }
}

impl std::fmt::Display for Variable {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "?{}", self.0)
    }
}

/// A pattern position: a concrete identifier or a variable.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Slot {
    Bound(Identifier),
    Var(Variable),
}

impl Slot {
    /// Shorthand for `Slot::Var(Variable::new(name))`.
    pub fn var(name: impl AsRef<str>) -> Self {
        Self::Var(Variable::new(name))
    }

    pub fn variable(&self) -> Option<&Variable> {
        match self {
            Slot::Var(v) => Some(v),
            Slot::Bound(_) => None,
        }
    }

    fn render(&self, symbols: &SymbolTable) -> String {
        match self {
            Slot::Bound(id) => symbols.identifier_label(*id),
            Slot::Var(v) => v.to_string(),
        }
    }
}

impl From<Identifier> for Slot {
    fn from(id: Identifier) -> Self {
        Self::Bound(id)
    }
}

// ---------------------------------------------------------------------------
// Patterns
// ---------------------------------------------------------------------------

/// The three statement shapes a pattern can take.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum PatternShape {
    Fact,
    Classification,
    Proposition,
}

impl PatternShape {
    /// Number of identifier slots the shape expects.
    pub fn arity(self) -> usize {
        match self {
            PatternShape::Fact | PatternShape::Classification => 2,
            PatternShape::Proposition => 1,
        }
    }
}

impl std::fmt::Display for PatternShape {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            PatternShape::Fact => write!(f, "fact"),
            PatternShape::Classification => write!(f, "classification"),
            PatternShape::Proposition => write!(f, "proposition"),
        }
    }
}

/// A premise, conclusion or query.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum Pattern {
    Fact {
        subject: Slot,
        verb: Verb,
        object: Slot,
    },
    Classification {
        child: Slot,
        parent: Slot,
    },
    Proposition {
        tag: Identifier,
    },
}

impl Pattern {
    pub fn fact(subject: impl Into<Slot>, verb: Verb, object: impl Into<Slot>) -> Self {
        Self::Fact {
            subject: subject.into(),
            verb,
            object: object.into(),
        }
    }

    pub fn classification(child: impl Into<Slot>, parent: impl Into<Slot>) -> Self {
        Self::Classification {
            child: child.into(),
            parent: parent.into(),
        }
    }

    pub fn proposition(tag: Identifier) -> Self {
        Self::Proposition { tag }
    }

    /// Build a pattern from an untyped slot list, checking arity.
    ///
    /// Facts require a verb; the other shapes must not carry one. Proposition
    /// tags must be concrete.
    pub fn from_slots(
        shape: PatternShape,
        verb: Option<Verb>,
        slots: Vec<Slot>,
    ) -> Result<Self, LoadError> {
        let malformed = |message: String| LoadError::MalformedPattern {
            shape: shape.to_string(),
            message,
        };
        if slots.len() != shape.arity() {
            return Err(malformed(format!(
                "expected {} slot(s), got {}",
                shape.arity(),
                slots.len()
            )));
        }
        let mut slots = slots.into_iter();
        let mut next = || slots.next().ok_or_else(|| malformed("missing slot".into()));
        match (shape, verb) {
            (PatternShape::Fact, Some(verb)) => Ok(Self::Fact {
                subject: next()?,
                verb,
                object: next()?,
            }),
            (PatternShape::Fact, None) => Err(malformed("a fact needs a verb".into())),
            (_, Some(_)) => Err(malformed("only facts carry a verb".into())),
            (PatternShape::Classification, None) => Ok(Self::Classification {
                child: next()?,
                parent: next()?,
            }),
            (PatternShape::Proposition, None) => match next()? {
                Slot::Bound(tag) => Ok(Self::Proposition { tag }),
                Slot::Var(v) => Err(malformed(format!("proposition tag {v} cannot be a variable"))),
            },
        }
    }

    pub fn shape(&self) -> PatternShape {
        match self {
            Pattern::Fact { .. } => PatternShape::Fact,
            Pattern::Classification { .. } => PatternShape::Classification,
            Pattern::Proposition { .. } => PatternShape::Proposition,
        }
    }

    /// The verb of a fact pattern.
    pub fn verb(&self) -> Option<Verb> {
        match self {
            Pattern::Fact { verb, .. } => Some(*verb),
            _ => None,
        }
    }

    /// Variables in slot order, repeats included.
    pub fn variables(&self) -> impl Iterator<Item = &Variable> {
        let slots: [Option<&Slot>; 2] = match self {
            Pattern::Fact {
                subject, object, ..
            } => [Some(subject), Some(object)],
            Pattern::Classification { child, parent } => [Some(child), Some(parent)],
            Pattern::Proposition { .. } => [None, None],
        };
        slots.into_iter().flatten().filter_map(Slot::variable)
    }

    /// The ground atom this pattern denotes, if it has no variables.
    pub fn ground(&self) -> Option<Atom> {
        let bound = |slot: &Slot| match slot {
            Slot::Bound(id) => Some(*id),
            Slot::Var(_) => None,
        };
        match self {
            Pattern::Fact {
                subject,
                verb,
                object,
            } => Some(Atom::Fact(GroundFact::new(
                bound(subject)?,
                *verb,
                bound(object)?,
            ))),
            Pattern::Classification { child, parent } => Some(Atom::Classification(
                ClassificationEdge::new(bound(child)?, bound(parent)?),
            )),
            Pattern::Proposition { tag } => Some(Atom::Proposition(*tag)),
        }
    }

    pub fn is_ground(&self) -> bool {
        self.variables().next().is_none()
    }

    /// Render with resolved labels, e.g. `?X loves YanHui` or `Confucius is-a human`.
    pub fn render(&self, symbols: &SymbolTable) -> String {
        match self {
            Pattern::Fact {
                subject,
                verb,
                object,
            } => format!(
                "{} {} {}",
                subject.render(symbols),
                symbols.verb_label(*verb),
                object.render(symbols)
            ),
            Pattern::Classification { child, parent } => {
                format!("{} is-a {}", child.render(symbols), parent.render(symbols))
            }
            Pattern::Proposition { tag } => symbols.identifier_label(*tag),
        }
    }
}

impl From<Atom> for Pattern {
    fn from(atom: Atom) -> Self {
        match atom {
            Atom::Fact(f) => Pattern::fact(f.subject, f.verb, f.object),
            Atom::Classification(e) => Pattern::classification(e.child, e.parent),
            Atom::Proposition(tag) => Pattern::proposition(tag),
        }
    }
}

// ---------------------------------------------------------------------------
// Bindings
// ---------------------------------------------------------------------------

/// A substitution from variables to identifiers.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Bindings(BTreeMap<Variable, Identifier>);

impl Bindings {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn get(&self, var: &Variable) -> Option<Identifier> {
        self.0.get(var).copied()
    }

    /// Resolve a slot under this substitution.
    pub fn resolve(&self, slot: &Slot) -> Option<Identifier> {
        match slot {
            Slot::Bound(id) => Some(*id),
            Slot::Var(v) => self.get(v),
        }
    }

    /// Unify `slot` with `value`, extending the substitution if needed.
    ///
    /// Returns `false` on a conflict; the substitution is left untouched then.
    pub fn unify(&mut self, slot: &Slot, value: Identifier) -> bool {
        match slot {
            Slot::Bound(id) => *id == value,
            Slot::Var(v) => match self.0.get(v) {
                Some(existing) => *existing == value,
                None => {
                    self.0.insert(v.clone(), value);
                    true
                }
            },
        }
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&Variable, &Identifier)> {
        self.0.iter()
    }

    /// Render as `?X = Confucius, ?Y = YanHui`.
    pub fn render(&self, symbols: &SymbolTable) -> String {
        self.0
            .iter()
            .map(|(var, id)| format!("{var} = {}", symbols.identifier_label(*id)))
            .collect::<Vec<_>>()
            .join(", ")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn table() -> (SymbolTable, Identifier, Identifier, Verb) {
        let symbols = SymbolTable::new();
        let a = symbols.identifier("Confucius").unwrap();
        let b = symbols.identifier("YanHui").unwrap();
        let loves = symbols.verb("loves").unwrap();
        (symbols, a, b, loves)
    }

    #[test]
    fn variables_are_listed_in_slot_order() {
        let (_, _, _, loves) = table();
        let p = Pattern::fact(Slot::var("X"), loves, Slot::var("Y"));
        let names: Vec<&str> = p.variables().map(Variable::name).collect();
        assert_eq!(names, vec!["X", "Y"]);
        assert!(!p.is_ground());
    }

    #[test]
    fn ground_pattern_yields_atom() {
        let (_, a, b, loves) = table();
        let p = Pattern::fact(a, loves, b);
        assert_eq!(p.ground(), Some(Atom::Fact(GroundFact::new(a, loves, b))));
        assert!(Pattern::classification(Slot::var("X"), b).ground().is_none());
    }

    #[test]
    fn from_slots_checks_arity() {
        let (_, a, b, loves) = table();
        let err = Pattern::from_slots(PatternShape::Fact, Some(loves), vec![a.into()]);
        assert!(matches!(err, Err(LoadError::MalformedPattern { .. })));

        let ok = Pattern::from_slots(PatternShape::Classification, None, vec![a.into(), b.into()]);
        assert_eq!(ok.unwrap(), Pattern::classification(a, b));
    }

    #[test]
    fn from_slots_rejects_verb_on_classification() {
        let (_, a, b, loves) = table();
        let err = Pattern::from_slots(
            PatternShape::Classification,
            Some(loves),
            vec![a.into(), b.into()],
        );
        assert!(err.is_err());
    }

    #[test]
    fn from_slots_rejects_variable_proposition() {
        let err = Pattern::from_slots(PatternShape::Proposition, None, vec![Slot::var("P")]);
        assert!(matches!(err, Err(LoadError::MalformedPattern { .. })));
    }

    #[test]
    fn unify_is_consistent() {
        let (_, a, b, _) = table();
        let x = Slot::var("X");
        let mut bindings = Bindings::new();
        assert!(bindings.unify(&x, a));
        assert!(bindings.unify(&x, a));
        assert!(!bindings.unify(&x, b));
        assert_eq!(bindings.len(), 1);
        assert!(bindings.unify(&Slot::Bound(b), b));
        assert!(!bindings.unify(&Slot::Bound(b), a));
    }

    #[test]
    fn render_uses_labels() {
        let (symbols, a, b, loves) = table();
        assert_eq!(
            Pattern::fact(Slot::var("X"), loves, b).render(&symbols),
            "?X loves YanHui"
        );
        assert_eq!(
            Atom::Classification(ClassificationEdge::new(a, b)).render(&symbols),
            "Confucius is-a YanHui"
        );
    }
}

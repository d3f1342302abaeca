//! Query evaluation against converged stores.
//!
//! There is no definitive false: an atom that is absent is [`Answer::Unknown`],
//! never refuted.

use serde::{Deserialize, Serialize};

use crate::infer::matcher;
use crate::pattern::{Atom, Bindings, Pattern};
use crate::store::StoreView;

/// Result of a ground query.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Answer {
    /// Present in the converged knowledge base.
    Proven,
    /// Not derivable from what is known.
    Unknown,
}

impl Answer {
    /// `⊤` or `?`.
    pub fn glyph(self) -> &'static str {
        match self {
            Answer::Proven => "⊤",
            Answer::Unknown => "?",
        }
    }

    pub fn is_proven(self) -> bool {
        matches!(self, Answer::Proven)
    }
}

impl std::fmt::Display for Answer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.glyph())
    }
}

/// Look a ground atom up in its store.
pub fn evaluate(stores: &StoreView<'_>, atom: &Atom) -> Answer {
    if stores.contains(atom) {
        Answer::Proven
    } else {
        Answer::Unknown
    }
}

/// Every substitution under which `pattern` holds, in store order.
pub fn solutions(stores: &StoreView<'_>, pattern: &Pattern) -> Vec<Bindings> {
    matcher::match_pattern(pattern, &Bindings::new(), stores)
}

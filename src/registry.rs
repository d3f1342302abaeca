//! Symbol table: bidirectional label ↔ ID mapping for both namespaces.
//!
//! Each [`SymbolRegistry`] provides O(1) lookups in both directions using two
//! `DashMap`s, so labels can be interned through a shared reference while a
//! parser and the knowledge base hold the table at the same time. Labels are
//! normalized to Unicode NFC so that composed and decomposed spellings of the
//! same CJK or accented label intern to one symbol. Matching is case-sensitive.

use dashmap::DashMap;
use unicode_normalization::UnicodeNormalization;

use crate::error::SymbolResult;
use crate::symbol::{AtomicSymbolAllocator, Identifier, SymbolId, SymbolKind, Verb};

/// Bidirectional registry for a single namespace.
#[derive(Debug)]
pub struct SymbolRegistry {
    kind: SymbolKind,
    /// Forward map: SymbolId → label (source of truth).
    id_to_label: DashMap<SymbolId, String>,
    /// Reverse map: normalized label → SymbolId.
    label_to_id: DashMap<String, SymbolId>,
}

impl SymbolRegistry {
    /// Create a new empty registry for `kind`.
    pub fn new(kind: SymbolKind) -> Self {
        Self {
            kind,
            id_to_label: DashMap::new(),
            label_to_id: DashMap::new(),
        }
    }

    /// Return the ID for `label`, allocating a fresh one on first sight.
    pub fn intern(&self, label: &str, allocator: &AtomicSymbolAllocator) -> SymbolResult<SymbolId> {
        let normalized = normalize(label);
        if let Some(existing) = self.label_to_id.get(&normalized) {
            return Ok(*existing.value());
        }
        let entry = self
            .label_to_id
            .entry(normalized.clone())
            .or_try_insert_with(|| allocator.next_id(self.kind))?;
        let id = *entry.value();
        drop(entry);
        self.id_to_label.entry(id).or_insert(normalized);
        Ok(id)
    }

    /// Look up an ID by label without interning.
    pub fn lookup(&self, label: &str) -> Option<SymbolId> {
        self.label_to_id.get(&normalize(label)).map(|r| *r.value())
    }

    /// Look up the label of an ID.
    pub fn label(&self, id: SymbolId) -> Option<String> {
        self.id_to_label.get(&id).map(|r| r.value().clone())
    }

    /// Number of registered symbols.
    pub fn len(&self) -> usize {
        self.id_to_label.len()
    }

    /// Whether the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.id_to_label.is_empty()
    }
}

fn normalize(label: &str) -> String {
    label.trim().nfc().collect()
}

/// The two symbol namespaces of a knowledge base.
#[derive(Debug)]
pub struct SymbolTable {
    allocator: AtomicSymbolAllocator,
    identifiers: SymbolRegistry,
    verbs: SymbolRegistry,
}

impl SymbolTable {
    pub fn new() -> Self {
        Self {
            allocator: AtomicSymbolAllocator::new(),
            identifiers: SymbolRegistry::new(SymbolKind::Identifier),
            verbs: SymbolRegistry::new(SymbolKind::Verb),
        }
    }

    /// Intern an entity label.
    pub fn identifier(&self, label: &str) -> SymbolResult<Identifier> {
        self.identifiers
            .intern(label, &self.allocator)
            .map(Identifier::new)
    }

    /// Intern a verb label. Interning does not declare the verb.
    pub fn verb(&self, label: &str) -> SymbolResult<Verb> {
        self.verbs.intern(label, &self.allocator).map(Verb::new)
    }

    pub fn lookup_identifier(&self, label: &str) -> Option<Identifier> {
        self.identifiers.lookup(label).map(Identifier::new)
    }

    pub fn lookup_verb(&self, label: &str) -> Option<Verb> {
        self.verbs.lookup(label).map(Verb::new)
    }

    /// Resolve an identifier to its label, falling back to `id:{n}`.
    pub fn identifier_label(&self, id: Identifier) -> String {
        self.identifiers
            .label(id.id())
            .unwrap_or_else(|| id.to_string())
    }

    /// Resolve a verb to its label, falling back to `verb:{n}`.
    pub fn verb_label(&self, verb: Verb) -> String {
        self.verbs
            .label(verb.id())
            .unwrap_or_else(|| verb.to_string())
    }

    /// Number of interned identifiers.
    pub fn identifier_count(&self) -> usize {
        self.identifiers.len()
    }

    /// Number of interned verbs.
    pub fn verb_count(&self) -> usize {
        self.verbs.len()
    }
}

impl Default for SymbolTable {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn interning_is_idempotent() {
        let table = SymbolTable::new();
        let a = table.identifier("Confucius").unwrap();
        let b = table.identifier("Confucius").unwrap();
        assert_eq!(a, b);
        assert_eq!(table.identifier_count(), 1);
    }

    #[test]
    fn namespaces_are_separate() {
        let table = SymbolTable::new();
        let entity = table.identifier("loves").unwrap();
        let verb = table.verb("loves").unwrap();
        assert_ne!(entity.id(), verb.id());
        assert_eq!(table.lookup_verb("loves"), Some(verb));
        assert_eq!(table.lookup_identifier("loves"), Some(entity));
    }

    #[test]
    fn labels_resolve_back() {
        let table = SymbolTable::new();
        let id = table.identifier("顏回").unwrap();
        assert_eq!(table.identifier_label(id), "顏回");
    }

    #[test]
    fn lookup_is_case_sensitive() {
        let table = SymbolTable::new();
        table.identifier("A").unwrap();
        assert!(table.lookup_identifier("a").is_none());
    }

    #[test]
    fn decomposed_and_composed_spellings_collide() {
        let table = SymbolTable::new();
        let composed = table.identifier("caf\u{e9}").unwrap();
        let decomposed = table.identifier("cafe\u{301}").unwrap();
        assert_eq!(composed, decomposed);
    }

    #[test]
    fn unknown_label_falls_back_to_raw_display() {
        let table = SymbolTable::new();
        let stray = Identifier::new(SymbolId::new(99).unwrap());
        assert_eq!(table.identifier_label(stray), "id:99");
    }
}
